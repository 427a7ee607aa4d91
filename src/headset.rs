//! Vendor SDK seam.
//!
//! The FOVE runtime is reached only through these traits. [`HeadsetSdk`]
//! hands out headsets, [`Headset`] is one open session with the device.
//! The detector keeps the owning `Rc`; reporters get a [`HeadsetHandle`],
//! which must be upgraded before every read.

use crate::types::{Capabilities, Eye, GazeVector, HeadPose};
use crate::{PluginError, Result};
use std::rc::{Rc, Weak};

/// One open session with the headset.
pub trait Headset {
    /// Request the capabilities the session should provide.
    fn initialise(&self, capabilities: Capabilities);

    fn is_hardware_connected(&self) -> bool;

    fn hmd_pose(&self) -> HeadPose;

    fn gaze_vector(&self, eye: Eye) -> GazeVector;
}

/// Factory for headset sessions.
pub trait HeadsetSdk {
    /// `None` when the runtime could not create a headset object.
    fn acquire(&self) -> Option<Rc<dyn Headset>>;
}

/// Non-owning reference to the detector's headset.
#[derive(Clone)]
pub struct HeadsetHandle {
    inner: Weak<dyn Headset>,
}

impl HeadsetHandle {
    pub fn new(headset: &Rc<dyn Headset>) -> Self {
        Self {
            inner: Rc::downgrade(headset),
        }
    }

    /// Resolve the handle, or fail if the headset has been released.
    pub fn get(&self) -> Result<Rc<dyn Headset>> {
        self.inner.upgrade().ok_or(PluginError::HandleUnavailable)
    }

    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

impl std::fmt::Debug for HeadsetHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadsetHandle")
            .field("alive", &self.is_alive())
            .finish()
    }
}
