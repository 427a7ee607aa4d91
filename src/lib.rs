//! # fove-plugin - FOVE headset device plugin
//!
//! Bridges the FOVE VR headset SDK to an OSVR-style device-plugin host:
//! - Hardware detection with a bounded wait for the headset to connect
//! - Head pose reporting, converted into the host's coordinate frame
//! - Per-eye gaze direction reporting
//! - C FFI for hosts and vendor runtimes written in C/C++
//!
//! ## Quick Start
//! ```no_run
//! use fove_plugin::{register_plugin, HeadsetSdk, PluginContext};
//!
//! fn load(host: &mut dyn PluginContext, sdk: Box<dyn HeadsetSdk>) {
//!     // The host now retries detection and ticks the created devices.
//!     register_plugin(host, sdk).unwrap();
//! }
//! ```

pub mod error;
pub mod types;
pub mod config;
pub mod headset;
pub mod host;
pub mod tracker;
pub mod detection;
pub mod plugin;
pub mod ffi;

#[cfg(test)]
mod testing;

pub use error::PluginError;
pub use types::*;
pub use headset::{Headset, HeadsetHandle, HeadsetSdk};
pub use host::{
    Clock, DeviceUpdate, EyeTrackerSink, HardwareDetect, MessageType, PluginContext, SystemClock,
    TrackerSink,
};
pub use detection::{DetectionState, HardwareDetection};
pub use tracker::{to_host_pose, EyeTracker, HeadTracker};
pub use plugin::{register_plugin, register_plugin_with_clock};

/// Result type alias for plugin operations.
pub type Result<T> = std::result::Result<T, PluginError>;
