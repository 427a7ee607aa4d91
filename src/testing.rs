//! Test doubles for the vendor SDK, the host and the clock.

use crate::headset::{Headset, HeadsetHandle, HeadsetSdk};
use crate::host::{
    Clock, DeviceUpdate, EyeTrackerSink, HardwareDetect, MessageType, PluginContext, TrackerSink,
};
use crate::types::{Capabilities, Eye, GazeDirection, GazeVector, HeadPose, PoseState, TimeValue};
use crate::types::Vec3;
use crate::{PluginError, Result};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

/// Scripted headset. Connectivity turns true on a given check number.
pub struct FakeHeadset {
    connects_on: Option<u32>,
    checks: Cell<u32>,
    pose: HeadPose,
    gaze: [Vec3; 2],
    initialised: RefCell<Vec<Capabilities>>,
}

impl FakeHeadset {
    pub fn connects_on_check(n: u32) -> Self {
        Self {
            connects_on: Some(n),
            checks: Cell::new(0),
            pose: HeadPose::default(),
            gaze: [Vec3::default(); 2],
            initialised: RefCell::new(Vec::new()),
        }
    }

    pub fn connected() -> Self {
        Self::connects_on_check(1)
    }

    pub fn disconnected() -> Self {
        Self {
            connects_on: None,
            ..Self::connected()
        }
    }

    pub fn with_pose(mut self, pose: HeadPose) -> Self {
        self.pose = pose;
        self
    }

    pub fn with_gaze(mut self, eye: Eye, vector: Vec3) -> Self {
        self.gaze[eye.index() as usize] = vector;
        self
    }

    pub fn connectivity_checks(&self) -> u32 {
        self.checks.get()
    }

    pub fn initialised_with(&self) -> Vec<Capabilities> {
        self.initialised.borrow().clone()
    }
}

impl Headset for FakeHeadset {
    fn initialise(&self, capabilities: Capabilities) {
        self.initialised.borrow_mut().push(capabilities);
    }

    fn is_hardware_connected(&self) -> bool {
        let n = self.checks.get() + 1;
        self.checks.set(n);
        self.connects_on.is_some_and(|on| n >= on)
    }

    fn hmd_pose(&self) -> HeadPose {
        self.pose
    }

    fn gaze_vector(&self, eye: Eye) -> GazeVector {
        GazeVector {
            vector: self.gaze[eye.index() as usize],
        }
    }
}

/// Handle whose headset has already been released.
pub fn dead_handle() -> HeadsetHandle {
    let headset: Rc<dyn Headset> = Rc::new(FakeHeadset::connected());
    HeadsetHandle::new(&headset)
}

/// SDK that always hands out the same headset (or none), counting calls.
pub struct FakeSdk {
    headset: Option<Rc<FakeHeadset>>,
    acquired: Rc<Cell<u32>>,
}

impl FakeSdk {
    pub fn with_headset(headset: Rc<FakeHeadset>) -> Self {
        Self {
            headset: Some(headset),
            acquired: Rc::new(Cell::new(0)),
        }
    }

    pub fn empty() -> Self {
        Self {
            headset: None,
            acquired: Rc::new(Cell::new(0)),
        }
    }

    /// Shared acquisition counter, readable after the SDK is moved away.
    pub fn acquire_count(&self) -> Rc<Cell<u32>> {
        self.acquired.clone()
    }
}

impl HeadsetSdk for FakeSdk {
    fn acquire(&self) -> Option<Rc<dyn Headset>> {
        self.acquired.set(self.acquired.get() + 1);
        self.headset.clone().map(|h| h as Rc<dyn Headset>)
    }
}

/// Frozen clock recording every requested sleep.
#[derive(Default)]
pub struct FakeClock {
    now: TimeValue,
    sleeps: RefCell<Vec<Duration>>,
}

impl FakeClock {
    pub fn at(seconds: i64, microseconds: i32) -> Self {
        Self {
            now: TimeValue {
                seconds,
                microseconds,
            },
            sleeps: RefCell::new(Vec::new()),
        }
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.borrow().clone()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> TimeValue {
        self.now
    }

    fn sleep(&self, duration: Duration) {
        self.sleeps.borrow_mut().push(duration);
    }
}

/// One call into a host reporting sink.
#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    Pose {
        sensor: u32,
        pose: PoseState,
        timestamp: TimeValue,
    },
    Gaze {
        eye: u32,
        direction: GazeDirection,
        timestamp: TimeValue,
    },
}

type ReportLog = Rc<RefCell<Vec<Report>>>;

struct RecordingTracker(ReportLog);

impl TrackerSink for RecordingTracker {
    fn report_pose(&mut self, sensor: u32, pose: &PoseState, timestamp: TimeValue) {
        self.0.borrow_mut().push(Report::Pose {
            sensor,
            pose: *pose,
            timestamp,
        });
    }
}

struct RecordingEyeTracker(ReportLog);

impl EyeTrackerSink for RecordingEyeTracker {
    fn report_gaze_direction(&mut self, eye: u32, direction: GazeDirection, timestamp: TimeValue) {
        self.0.borrow_mut().push(Report::Gaze {
            eye,
            direction,
            timestamp,
        });
    }
}

/// In-memory host: records registrations and sink calls, owns devices.
#[derive(Default)]
pub struct RecordingHost {
    refuse_devices: bool,
    refuse_eye_trackers: u32,
    reports: ReportLog,
    message_types: Vec<String>,
    trackers: Vec<String>,
    eye_trackers: Vec<(String, u32)>,
    devices: Vec<Box<dyn DeviceUpdate>>,
    detectors: Vec<Box<dyn HardwareDetect>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host whose device creation always fails.
    pub fn refusing_devices() -> Self {
        Self {
            refuse_devices: true,
            ..Self::default()
        }
    }

    /// Host that refuses the first `n` eye-tracker creations only.
    pub fn refusing_eye_trackers(n: u32) -> Self {
        Self {
            refuse_eye_trackers: n,
            ..Self::default()
        }
    }

    pub fn reports(&self) -> Vec<Report> {
        self.reports.borrow().clone()
    }

    pub fn message_types(&self) -> &[String] {
        &self.message_types
    }

    pub fn trackers(&self) -> Vec<String> {
        self.trackers.clone()
    }

    pub fn eye_trackers(&self) -> Vec<(String, u32)> {
        self.eye_trackers.clone()
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    pub fn detector_count(&self) -> usize {
        self.detectors.len()
    }

    /// Run every registered detection callback once.
    pub fn run_detection(&mut self) -> Vec<Result<()>> {
        let mut detectors = std::mem::take(&mut self.detectors);
        let results = detectors.iter_mut().map(|d| d.detect(self)).collect();
        detectors.append(&mut self.detectors);
        self.detectors = detectors;
        results
    }

    /// Call `update()` on every registered device.
    pub fn tick(&mut self) -> Vec<Result<()>> {
        self.devices.iter_mut().map(|d| d.update()).collect()
    }
}

impl PluginContext for RecordingHost {
    fn register_message_type(&mut self, name: &str) -> Result<MessageType> {
        self.message_types.push(name.to_string());
        Ok(MessageType(self.message_types.len() as u32 - 1))
    }

    fn create_tracker(&mut self, name: &str, _descriptor: &str) -> Result<Box<dyn TrackerSink>> {
        if self.refuse_devices {
            return Err(PluginError::Host(format!("{} refused", name)));
        }
        self.trackers.push(name.to_string());
        Ok(Box::new(RecordingTracker(self.reports.clone())))
    }

    fn create_eye_tracker(
        &mut self,
        name: &str,
        _descriptor: &str,
        eye_count: u32,
    ) -> Result<Box<dyn EyeTrackerSink>> {
        if self.refuse_devices {
            return Err(PluginError::Host(format!("{} refused", name)));
        }
        if self.refuse_eye_trackers > 0 {
            self.refuse_eye_trackers -= 1;
            return Err(PluginError::Host(format!("{} refused", name)));
        }
        self.eye_trackers.push((name.to_string(), eye_count));
        Ok(Box::new(RecordingEyeTracker(self.reports.clone())))
    }

    fn register_device(&mut self, device: Box<dyn DeviceUpdate>) {
        self.devices.push(device);
    }

    fn register_hardware_detect(&mut self, detect: Box<dyn HardwareDetect>) {
        self.detectors.push(detect);
    }
}
