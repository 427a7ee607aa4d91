//! Host plugin framework seam.
//!
//! The host owns every object registered through [`PluginContext`] and
//! drives them synchronously from one thread: `detect()` until it succeeds,
//! then `update()` once per tick on every registered device.

use crate::types::{GazeDirection, PoseState, TimeValue};
use crate::Result;
use std::time::Duration;

/// Handle to a message type registered with the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageType(pub u32);

/// Pose reporting sink of a tracker device.
pub trait TrackerSink {
    fn report_pose(&mut self, sensor: u32, pose: &PoseState, timestamp: TimeValue);
}

/// Gaze reporting sink of an eye-tracker device.
pub trait EyeTrackerSink {
    fn report_gaze_direction(&mut self, eye: u32, direction: GazeDirection, timestamp: TimeValue);
}

/// Per-tick callback of a registered device.
pub trait DeviceUpdate {
    fn update(&mut self) -> Result<()>;
}

/// Hardware detection callback, retried by the host until it succeeds.
pub trait HardwareDetect {
    fn detect(&mut self, ctx: &mut dyn PluginContext) -> Result<()>;
}

/// Registration surface the host exposes to a plugin.
pub trait PluginContext {
    fn register_message_type(&mut self, name: &str) -> Result<MessageType>;

    /// Create a tracker device and send its JSON descriptor.
    fn create_tracker(&mut self, name: &str, descriptor: &str) -> Result<Box<dyn TrackerSink>>;

    /// Create an eye-tracker device with `eye_count` sensors.
    fn create_eye_tracker(
        &mut self,
        name: &str,
        descriptor: &str,
        eye_count: u32,
    ) -> Result<Box<dyn EyeTrackerSink>>;

    /// Hand a device to the host, which calls its `update()` every tick and
    /// drops it on unload.
    fn register_device(&mut self, device: Box<dyn DeviceUpdate>);

    fn register_hardware_detect(&mut self, detect: Box<dyn HardwareDetect>);
}

/// Time source for report stamps and the hardware wait.
pub trait Clock {
    fn now(&self) -> TimeValue;

    fn sleep(&self, duration: Duration);
}

/// Wall clock and real thread sleep.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> TimeValue {
        TimeValue::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
