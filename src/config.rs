use crate::types::Capabilities;
use std::time::Duration;

// -- Identity --
pub const PLUGIN_NAME: &str = "com_osvr_fove";
pub const MESSAGE_TYPE_NAME: &str = "FovePluginMessage";
pub const LOG_TARGET: &str = "OSVR-FOVE";

// -- Device names as registered with the host --
pub const HEAD_TRACKER_NAME: &str = "HeadTracker";
pub const EYE_TRACKER_NAME: &str = "EyeTracker";

// -- Sensor layout --
pub const HEAD_SENSOR: u32 = 0;
pub const EYE_COUNT: u32 = 2;

// -- Hardware wait --
/// Connectivity checks per detection attempt.
pub const MAX_CONNECT_ATTEMPTS: u32 = 5;
pub const CONNECT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Everything is requested; the host gives no hint of what clients need.
pub const REQUESTED_CAPABILITIES: Capabilities = Capabilities::POSITION
    .union(Capabilities::ORIENTATION)
    .union(Capabilities::GAZE);

// -- JSON descriptors --
pub const HEAD_TRACKER_DESCRIPTOR: &str = include_str!("../descriptors/tracker.json");
pub const EYE_TRACKER_DESCRIPTOR: &str = include_str!("../descriptors/eyetracker.json");
