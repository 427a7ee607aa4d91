//! Drive the plugin against a simulated headset and a console host.
//!
//! Usage: RUST_LOG=info cargo run --example simulated
//! The headset connects on the third check, then slowly turns its head.

use fove_plugin::{
    register_plugin, DeviceUpdate, EyeTrackerSink, GazeDirection, GazeVector, HardwareDetect,
    HeadPose, Headset, HeadsetSdk, MessageType, PluginContext, PoseState, Quat, TimeValue,
    TrackerSink, Vec3,
};
use fove_plugin::{Capabilities, Eye};
use std::cell::Cell;
use std::rc::Rc;

struct SimulatedHeadset {
    checks: Cell<u32>,
    frame: Cell<u32>,
}

impl Headset for SimulatedHeadset {
    fn initialise(&self, capabilities: Capabilities) {
        println!("headset initialised with {:?}", capabilities);
    }

    fn is_hardware_connected(&self) -> bool {
        self.checks.set(self.checks.get() + 1);
        self.checks.get() >= 3
    }

    fn hmd_pose(&self) -> HeadPose {
        let frame = self.frame.get();
        self.frame.set(frame + 1);
        let half = frame as f32 * 0.05 / 2.0;
        HeadPose {
            orientation: Quat::new(half.cos(), 0.0, half.sin(), 0.0),
            position: Vec3::new(0.0, 1.7, 0.1),
        }
    }

    fn gaze_vector(&self, eye: Eye) -> GazeVector {
        let x = match eye {
            Eye::Left => 0.03,
            Eye::Right => -0.03,
        };
        GazeVector {
            vector: Vec3::new(x, 0.0, 1.0),
        }
    }
}

struct SimulatedSdk;

impl HeadsetSdk for SimulatedSdk {
    fn acquire(&self) -> Option<Rc<dyn Headset>> {
        Some(Rc::new(SimulatedHeadset {
            checks: Cell::new(0),
            frame: Cell::new(0),
        }))
    }
}

struct ConsoleTracker;

impl TrackerSink for ConsoleTracker {
    fn report_pose(&mut self, sensor: u32, pose: &PoseState, timestamp: TimeValue) {
        let (q, t) = (pose.rotation, pose.translation);
        println!(
            "ts={:.3}  pose[{}]  pos=[{:+.3}, {:+.3}, {:+.3}]  quat=[{:+.3}, {:+.3}, {:+.3}, {:+.3}]",
            timestamp.as_secs_f64(),
            sensor,
            t.x, t.y, t.z,
            q.w, q.x, q.y, q.z,
        );
    }
}

struct ConsoleEyeTracker;

impl EyeTrackerSink for ConsoleEyeTracker {
    fn report_gaze_direction(&mut self, eye: u32, d: GazeDirection, timestamp: TimeValue) {
        println!(
            "ts={:.3}  gaze[{}]  dir=[{:+.3}, {:+.3}, {:+.3}]",
            timestamp.as_secs_f64(),
            eye,
            d.x, d.y, d.z
        );
    }
}

#[derive(Default)]
struct ConsoleHost {
    devices: Vec<Box<dyn DeviceUpdate>>,
    detectors: Vec<Box<dyn HardwareDetect>>,
}

impl PluginContext for ConsoleHost {
    fn register_message_type(&mut self, name: &str) -> fove_plugin::Result<MessageType> {
        println!("message type {:?} registered", name);
        Ok(MessageType(0))
    }

    fn create_tracker(
        &mut self,
        name: &str,
        _descriptor: &str,
    ) -> fove_plugin::Result<Box<dyn TrackerSink>> {
        println!("device {:?} created", name);
        Ok(Box::new(ConsoleTracker))
    }

    fn create_eye_tracker(
        &mut self,
        name: &str,
        _descriptor: &str,
        eye_count: u32,
    ) -> fove_plugin::Result<Box<dyn EyeTrackerSink>> {
        println!("device {:?} created with {} eyes", name, eye_count);
        Ok(Box::new(ConsoleEyeTracker))
    }

    fn register_device(&mut self, device: Box<dyn DeviceUpdate>) {
        self.devices.push(device);
    }

    fn register_hardware_detect(&mut self, detect: Box<dyn HardwareDetect>) {
        self.detectors.push(detect);
    }
}

fn main() {
    env_logger::init();

    let mut host = ConsoleHost::default();
    if let Err(e) = register_plugin(&mut host, Box::new(SimulatedSdk)) {
        eprintln!("Failed to load plugin: {}", e);
        std::process::exit(1);
    }

    let mut detectors = std::mem::take(&mut host.detectors);
    for detector in detectors.iter_mut() {
        if let Err(e) = detector.detect(&mut host) {
            eprintln!("Detection failed: {}", e);
            std::process::exit(1);
        }
    }

    for _ in 0..10 {
        for device in host.devices.iter_mut() {
            if let Err(e) = device.update() {
                eprintln!("Update failed: {}", e);
            }
        }
        std::thread::sleep(std::time::Duration::from_millis(16));
    }

    // The detector owns the headset; once it is gone the trackers fail.
    drop(detectors);
    for device in host.devices.iter_mut() {
        if let Err(e) = device.update() {
            println!("after unload: {}", e);
        }
    }
}
