use crate::config::{EYE_TRACKER_DESCRIPTOR, EYE_TRACKER_NAME, HEAD_SENSOR, LOG_TARGET};
use crate::config::{EYE_COUNT, HEAD_TRACKER_DESCRIPTOR, HEAD_TRACKER_NAME};
use crate::headset::HeadsetHandle;
use crate::host::{Clock, DeviceUpdate, EyeTrackerSink, PluginContext, TrackerSink};
use crate::types::{Eye, GazeDirection, HeadPose, PoseState, Quatd, Vec3d};
use crate::Result;
use std::rc::Rc;

/// Convert a FOVE head pose into the host's frame.
///
/// The two frames differ by a flip of the z axis: rotation w and z change
/// sign, translation z changes sign, everything else passes through.
pub fn to_host_pose(pose: &HeadPose) -> PoseState {
    let q = pose.orientation;
    let p = pose.position;
    PoseState {
        rotation: Quatd::new(-q.w as f64, q.x as f64, q.y as f64, -q.z as f64),
        translation: Vec3d::new(p.x as f64, p.y as f64, -p.z as f64),
    }
}

/// Reports head pose on sensor 0 of a tracker device.
pub struct HeadTracker {
    sink: Box<dyn TrackerSink>,
    headset: HeadsetHandle,
    clock: Rc<dyn Clock>,
}

impl HeadTracker {
    /// Create the tracker device on the host.
    pub fn create(
        ctx: &mut dyn PluginContext,
        headset: HeadsetHandle,
        clock: Rc<dyn Clock>,
    ) -> Result<HeadTracker> {
        let sink = Self::create_sink(ctx)?;
        Ok(Self::with_sink(sink, headset, clock))
    }

    /// Create only the host-side tracker device.
    pub fn create_sink(ctx: &mut dyn PluginContext) -> Result<Box<dyn TrackerSink>> {
        ctx.create_tracker(HEAD_TRACKER_NAME, HEAD_TRACKER_DESCRIPTOR)
    }

    pub fn with_sink(
        sink: Box<dyn TrackerSink>,
        headset: HeadsetHandle,
        clock: Rc<dyn Clock>,
    ) -> HeadTracker {
        HeadTracker {
            sink,
            headset,
            clock,
        }
    }
}

impl DeviceUpdate for HeadTracker {
    fn update(&mut self) -> Result<()> {
        let headset = self.headset.get().map_err(|e| {
            log::error!(target: LOG_TARGET, "Headset is null, return from headTrack update");
            e
        })?;

        let pose = to_host_pose(&headset.hmd_pose());
        let timestamp = self.clock.now();
        self.sink.report_pose(HEAD_SENSOR, &pose, timestamp);
        Ok(())
    }
}

/// Reports per-eye gaze direction on a two-sensor eye-tracker device.
pub struct EyeTracker {
    sink: Box<dyn EyeTrackerSink>,
    headset: HeadsetHandle,
    clock: Rc<dyn Clock>,
}

impl EyeTracker {
    /// Create the eye-tracker device on the host.
    pub fn create(
        ctx: &mut dyn PluginContext,
        headset: HeadsetHandle,
        clock: Rc<dyn Clock>,
    ) -> Result<EyeTracker> {
        let sink = Self::create_sink(ctx)?;
        Ok(Self::with_sink(sink, headset, clock))
    }

    /// Create only the host-side eye-tracker device.
    pub fn create_sink(ctx: &mut dyn PluginContext) -> Result<Box<dyn EyeTrackerSink>> {
        ctx.create_eye_tracker(EYE_TRACKER_NAME, EYE_TRACKER_DESCRIPTOR, EYE_COUNT)
    }

    pub fn with_sink(
        sink: Box<dyn EyeTrackerSink>,
        headset: HeadsetHandle,
        clock: Rc<dyn Clock>,
    ) -> EyeTracker {
        EyeTracker {
            sink,
            headset,
            clock,
        }
    }
}

impl DeviceUpdate for EyeTracker {
    fn update(&mut self) -> Result<()> {
        let headset = self.headset.get().map_err(|e| {
            log::error!(target: LOG_TARGET, "Headset is null, return from eyeTrack update");
            e
        })?;

        // Both eyes are read before stamping so they share one timestamp.
        let gaze = Eye::BOTH.map(|eye| GazeDirection::from(headset.gaze_vector(eye).vector));
        let timestamp = self.clock.now();

        // Direction only; the SDK's gaze origin and convergence depth are not reported.
        for (eye, direction) in Eye::BOTH.into_iter().zip(gaze) {
            self.sink
                .report_gaze_direction(eye.index(), direction, timestamp);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headset::Headset;
    use crate::testing::{dead_handle, FakeClock, FakeHeadset, RecordingHost, Report};
    use crate::types::{Quat, Vec3};
    use crate::PluginError;

    fn clock() -> Rc<FakeClock> {
        Rc::new(FakeClock::at(1_700_000_000, 500))
    }

    #[test]
    fn test_to_host_pose_flips_z() {
        let pose = HeadPose {
            orientation: Quat::new(1.0, 0.0, 0.0, 0.5),
            position: Vec3::new(1.0, 2.0, 3.0),
        };
        let out = to_host_pose(&pose);
        assert_eq!(out.rotation, Quatd::new(-1.0, 0.0, 0.0, -0.5));
        assert_eq!(out.translation, Vec3d::new(1.0, 2.0, -3.0));
    }

    #[test]
    fn test_to_host_pose_passes_x_y_through() {
        let pose = HeadPose {
            orientation: Quat::new(0.5, -0.5, 0.25, -0.25),
            position: Vec3::new(-0.75, 1.5, -2.0),
        };
        let out = to_host_pose(&pose);
        assert_eq!(out.rotation, Quatd::new(-0.5, -0.5, 0.25, 0.25));
        assert_eq!(out.translation, Vec3d::new(-0.75, 1.5, 2.0));
    }

    #[test]
    fn test_head_tracker_reports_converted_pose() {
        let mut host = RecordingHost::new();
        let fake = FakeHeadset::connected().with_pose(HeadPose {
            orientation: Quat::new(1.0, 0.0, 0.0, 0.5),
            position: Vec3::new(1.0, 2.0, 3.0),
        });
        let headset: Rc<dyn Headset> = Rc::new(fake);
        let clock = clock();

        let mut tracker =
            HeadTracker::create(&mut host, HeadsetHandle::new(&headset), clock.clone()).unwrap();
        tracker.update().unwrap();

        let reports = host.reports();
        assert_eq!(reports.len(), 1);
        match &reports[0] {
            Report::Pose {
                sensor,
                pose,
                timestamp,
            } => {
                assert_eq!(*sensor, 0);
                assert_eq!(pose.rotation, Quatd::new(-1.0, 0.0, 0.0, -0.5));
                assert_eq!(pose.translation, Vec3d::new(1.0, 2.0, -3.0));
                assert_eq!(*timestamp, clock.now());
            }
            other => panic!("unexpected report {:?}", other),
        }
    }

    #[test]
    fn test_head_tracker_dead_handle_fails_without_report() {
        let mut host = RecordingHost::new();
        let headset: Rc<dyn Headset> = Rc::new(FakeHeadset::connected());
        let handle = HeadsetHandle::new(&headset);
        drop(headset);

        let mut tracker = HeadTracker::create(&mut host, handle, clock()).unwrap();
        assert_eq!(tracker.update(), Err(PluginError::HandleUnavailable));
        assert!(host.reports().is_empty());
    }

    #[test]
    fn test_eye_tracker_reports_each_eye_distinctly() {
        let mut host = RecordingHost::new();
        let fake = FakeHeadset::connected()
            .with_gaze(Eye::Left, Vec3::new(1.0, 0.0, 0.0))
            .with_gaze(Eye::Right, Vec3::new(0.0, 1.0, 0.0));
        let headset: Rc<dyn Headset> = Rc::new(fake);
        let clock = clock();

        let mut tracker =
            EyeTracker::create(&mut host, HeadsetHandle::new(&headset), clock.clone()).unwrap();
        tracker.update().unwrap();

        assert_eq!(
            host.reports(),
            vec![
                Report::Gaze {
                    eye: 0,
                    direction: Vec3d::new(1.0, 0.0, 0.0),
                    timestamp: clock.now(),
                },
                Report::Gaze {
                    eye: 1,
                    direction: Vec3d::new(0.0, 1.0, 0.0),
                    timestamp: clock.now(),
                },
            ]
        );
    }

    #[test]
    fn test_eye_tracker_dead_handle_fails_without_report() {
        let mut host = RecordingHost::new();
        let mut tracker = EyeTracker::create(&mut host, dead_handle(), clock()).unwrap();
        assert_eq!(tracker.update(), Err(PluginError::HandleUnavailable));
        assert!(host.reports().is_empty());
    }

    #[test]
    fn test_handle_release_observed_between_ticks() {
        let mut host = RecordingHost::new();
        let fake = Rc::new(FakeHeadset::connected());
        let headset: Rc<dyn Headset> = fake.clone();
        let mut tracker =
            HeadTracker::create(&mut host, HeadsetHandle::new(&headset), clock()).unwrap();

        drop(headset);
        // `fake` still holds a strong reference, so the handle stays alive.
        assert!(tracker.update().is_ok());
        drop(fake);
        assert!(tracker.update().is_err());
        assert_eq!(host.reports().len(), 1);
    }

    #[test]
    fn test_eye_tracker_registers_two_sensors() {
        let mut host = RecordingHost::new();
        let _ = EyeTracker::create(&mut host, dead_handle(), clock()).unwrap();
        assert_eq!(host.eye_trackers(), vec![(EYE_TRACKER_NAME.to_string(), 2)]);
    }
}
