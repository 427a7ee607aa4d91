use crate::config::{
    CONNECT_POLL_INTERVAL, LOG_TARGET, MAX_CONNECT_ATTEMPTS, REQUESTED_CAPABILITIES,
};
use crate::headset::{Headset, HeadsetHandle, HeadsetSdk};
use crate::host::{Clock, HardwareDetect, PluginContext, SystemClock, TrackerSink};
use crate::tracker::{EyeTracker, HeadTracker};
use crate::{PluginError, Result};
use std::rc::Rc;

/// Where the detector stands. Only ever moves from `NotFound` to `Found`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionState {
    NotFound,
    Found,
}

/// Finds the headset, waits for it to connect, then registers the head and
/// eye trackers with the host.
///
/// The host calls [`HardwareDetect::detect`] until it succeeds. After that
/// every call is a no-op, so the headset is acquired and the trackers are
/// created at most once per plugin lifetime.
///
/// The eye tracker is the last fallible step. A head tracker device created
/// by an attempt that fails there is kept and reused by the next attempt, so
/// the host never sees a device twice.
pub struct HardwareDetection {
    sdk: Box<dyn HeadsetSdk>,
    clock: Rc<dyn Clock>,
    state: DetectionState,
    headset: Option<Rc<dyn Headset>>,
    /// Tracker device created by an attempt that failed afterwards.
    head_sink: Option<Box<dyn TrackerSink>>,
}

impl HardwareDetection {
    pub fn new(sdk: Box<dyn HeadsetSdk>) -> Self {
        Self::with_clock(sdk, Rc::new(SystemClock))
    }

    pub fn with_clock(sdk: Box<dyn HeadsetSdk>, clock: Rc<dyn Clock>) -> Self {
        Self {
            sdk,
            clock,
            state: DetectionState::NotFound,
            headset: None,
            head_sink: None,
        }
    }

    pub fn state(&self) -> DetectionState {
        self.state
    }

    /// Handle to the acquired headset, if any.
    pub fn headset(&self) -> Option<HeadsetHandle> {
        self.headset.as_ref().map(HeadsetHandle::new)
    }

    /// Poll connectivity up to [`MAX_CONNECT_ATTEMPTS`] times, sleeping
    /// [`CONNECT_POLL_INTERVAL`] after every negative check.
    fn wait_for_hardware(&self, headset: &dyn Headset) -> Result<()> {
        let mut count = 0;
        while count < MAX_CONNECT_ATTEMPTS {
            if headset.is_hardware_connected() {
                return Ok(());
            }
            log::info!(target: LOG_TARGET, "Waiting for hardware to be connected");
            self.clock.sleep(CONNECT_POLL_INTERVAL);
            count += 1;
        }

        log::error!(
            target: LOG_TARGET,
            "Hardware not connecting after {} try",
            MAX_CONNECT_ATTEMPTS
        );
        Err(PluginError::DeviceNotConnected { attempts: count })
    }
}

impl HardwareDetect for HardwareDetection {
    fn detect(&mut self, ctx: &mut dyn PluginContext) -> Result<()> {
        if self.state == DetectionState::Found {
            return Ok(());
        }

        // A failed earlier attempt leaves its headset here; it is replaced.
        let headset = self.sdk.acquire().ok_or_else(|| {
            log::error!(target: LOG_TARGET, "Unable to create headset");
            PluginError::HandleUnavailable
        })?;
        self.headset = Some(headset.clone());

        // TODO: request only what connected clients need once the host exposes it.
        headset.initialise(REQUESTED_CAPABILITIES);

        self.wait_for_hardware(headset.as_ref())?;
        log::info!(target: LOG_TARGET, "Hardware detected");

        let head_sink = match self.head_sink.take() {
            Some(sink) => sink,
            None => HeadTracker::create_sink(ctx)?,
        };
        let eye_sink = match EyeTracker::create_sink(ctx) {
            Ok(sink) => sink,
            Err(e) => {
                // Keep the head tracker device for the next attempt.
                self.head_sink = Some(head_sink);
                return Err(e);
            }
        };

        let handle = HeadsetHandle::new(&headset);
        let head = HeadTracker::with_sink(head_sink, handle.clone(), self.clock.clone());
        let eyes = EyeTracker::with_sink(eye_sink, handle, self.clock.clone());
        ctx.register_device(Box::new(head));
        ctx.register_device(Box::new(eyes));

        self.state = DetectionState::Found;
        Ok(())
    }
}
