use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// 3-vector in the FOVE SDK's frame.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Unit quaternion in the FOVE SDK's frame.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quat {
    pub w: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Quat {
    pub const IDENTITY: Quat = Quat {
        w: 1.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(w: f32, x: f32, y: f32, z: f32) -> Self {
        Self { w, x, y, z }
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Head pose as read from the headset at one instant.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HeadPose {
    pub orientation: Quat,
    /// Meters.
    pub position: Vec3,
}

/// Gaze reading for one eye.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GazeVector {
    pub vector: Vec3,
}

/// Eye selector. The discriminant is the host's eye sensor index.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Eye {
    Left = 0,
    Right = 1,
}

impl Eye {
    pub const BOTH: [Eye; 2] = [Eye::Left, Eye::Right];

    pub fn index(self) -> u32 {
        self as u32
    }
}

bitflags::bitflags! {
    /// Client capabilities requested from the headset at initialisation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    #[repr(C)]
    pub struct Capabilities: u32 {
        const GAZE        = 1 << 0;
        const ORIENTATION = 1 << 1;
        const POSITION    = 1 << 2;
    }
}

/// Host-side vector (double precision).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec3d {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3d {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl From<Vec3> for Vec3d {
    fn from(v: Vec3) -> Self {
        Self::new(v.x as f64, v.y as f64, v.z as f64)
    }
}

/// Host-side quaternion (double precision).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quatd {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Quatd {
    pub const IDENTITY: Quatd = Quatd {
        w: 1.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }
}

impl Default for Quatd {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Pose in the host's reporting convention.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PoseState {
    pub translation: Vec3d,
    pub rotation: Quatd,
}

impl PoseState {
    pub fn identity() -> Self {
        Self::default()
    }
}

/// Gaze direction as the host receives it. Direction only, no origin.
pub type GazeDirection = Vec3d;

/// Wall-clock timestamp: seconds and microseconds since the Unix epoch.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeValue {
    pub seconds: i64,
    pub microseconds: i32,
}

impl TimeValue {
    pub fn now() -> Self {
        Self::from(SystemTime::now())
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.seconds as f64 + self.microseconds as f64 * 1e-6
    }
}

impl From<SystemTime> for TimeValue {
    fn from(t: SystemTime) -> Self {
        // A clock set before 1970 reports as negative seconds.
        match t.duration_since(UNIX_EPOCH) {
            Ok(d) => Self {
                seconds: d.as_secs() as i64,
                microseconds: d.subsec_micros() as i32,
            },
            Err(e) => {
                let d: Duration = e.duration();
                Self {
                    seconds: -(d.as_secs() as i64),
                    microseconds: -(d.subsec_micros() as i32),
                }
            }
        }
    }
}
