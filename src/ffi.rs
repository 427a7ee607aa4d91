//! C FFI layer for the plugin.
//!
//! A C host loads the plugin with two function tables: one reaching the FOVE
//! runtime ([`FvHeadsetSdk`]) and one reaching its own reporting sinks
//! ([`FvHostCallbacks`]). It then calls `fv_plugin_detect` until it returns
//! 0 and `fv_plugin_update` once per tick.
//! The generated C header is written to `include/fove_plugin.h` by cbindgen.

use crate::config::LOG_TARGET;
use crate::error::LastError;
use crate::headset::{Headset, HeadsetSdk};
use crate::host::{
    DeviceUpdate, EyeTrackerSink, HardwareDetect, MessageType, PluginContext, TrackerSink,
};
use crate::plugin::register_plugin;
use crate::types::{Capabilities, Eye, GazeDirection, GazeVector, HeadPose, PoseState, TimeValue};
use crate::{PluginError, Result};
use std::ffi::{c_char, c_int, c_void, CStr, CString};
use std::ptr::NonNull;
use std::rc::Rc;

/// Last error message for C consumers.
static LAST_ERROR: LastError = LastError::new();

/// Function table reaching the FOVE runtime.
///
/// `acquire` returns an opaque headset pointer or NULL. Every other entry
/// receives that pointer. `release` may be NULL when the runtime owns the
/// headset's lifetime itself.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct FvHeadsetSdk {
    pub user_data: *mut c_void,
    pub acquire: Option<unsafe extern "C" fn(user_data: *mut c_void) -> *mut c_void>,
    pub release: Option<unsafe extern "C" fn(user_data: *mut c_void, headset: *mut c_void)>,
    pub initialise: Option<unsafe extern "C" fn(headset: *mut c_void, capabilities: u32)>,
    pub is_hardware_connected: Option<unsafe extern "C" fn(headset: *mut c_void) -> bool>,
    pub get_hmd_pose: Option<unsafe extern "C" fn(headset: *mut c_void, out: *mut HeadPose)>,
    /// `eye`: 0 = left, 1 = right.
    pub get_gaze_vector:
        Option<unsafe extern "C" fn(headset: *mut c_void, eye: c_int, out: *mut crate::types::Vec3)>,
}

/// Device kinds the plugin asks the host to create.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FvDeviceKind {
    Tracker = 0,
    EyeTracker = 1,
}

/// Function table reaching the host's device registry and reporting sinks.
///
/// `create_device` returns a non-negative device id, or -1 to refuse. When it
/// is NULL the plugin numbers devices itself, starting at 0.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct FvHostCallbacks {
    pub user_data: *mut c_void,
    pub create_device: Option<
        unsafe extern "C" fn(
            user_data: *mut c_void,
            kind: FvDeviceKind,
            name: *const c_char,
            descriptor: *const c_char,
            sensor_count: u32,
        ) -> c_int,
    >,
    pub report_pose: Option<
        unsafe extern "C" fn(
            user_data: *mut c_void,
            device: c_int,
            sensor: u32,
            pose: *const PoseState,
            timestamp: *const TimeValue,
        ),
    >,
    pub report_gaze_direction: Option<
        unsafe extern "C" fn(
            user_data: *mut c_void,
            device: c_int,
            eye: u32,
            direction: *const GazeDirection,
            timestamp: *const TimeValue,
        ),
    >,
}

/// Log levels forwarded to the host's logging sink.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FvLogLevel {
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl From<log::Level> for FvLogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => FvLogLevel::Error,
            log::Level::Warn => FvLogLevel::Warn,
            log::Level::Info => FvLogLevel::Info,
            log::Level::Debug => FvLogLevel::Debug,
            log::Level::Trace => FvLogLevel::Trace,
        }
    }
}

/// Host logging sink. `target` and `message` are only valid during the call.
pub type FvLogCallback =
    unsafe extern "C" fn(level: FvLogLevel, target: *const c_char, message: *const c_char);

// -- Vendor SDK adapter --

/// Validated copy of [`FvHeadsetSdk`].
#[derive(Clone, Copy)]
struct SdkTable {
    user_data: *mut c_void,
    acquire: unsafe extern "C" fn(*mut c_void) -> *mut c_void,
    release: Option<unsafe extern "C" fn(*mut c_void, *mut c_void)>,
    initialise: unsafe extern "C" fn(*mut c_void, u32),
    is_hardware_connected: unsafe extern "C" fn(*mut c_void) -> bool,
    get_hmd_pose: unsafe extern "C" fn(*mut c_void, *mut HeadPose),
    get_gaze_vector: unsafe extern "C" fn(*mut c_void, c_int, *mut crate::types::Vec3),
}

impl SdkTable {
    fn from_ffi(sdk: &FvHeadsetSdk) -> Result<Self> {
        let missing = PluginError::InvalidArgument("incomplete headset SDK table");
        Ok(Self {
            user_data: sdk.user_data,
            acquire: sdk.acquire.ok_or(missing.clone())?,
            release: sdk.release,
            initialise: sdk.initialise.ok_or(missing.clone())?,
            is_hardware_connected: sdk.is_hardware_connected.ok_or(missing.clone())?,
            get_hmd_pose: sdk.get_hmd_pose.ok_or(missing.clone())?,
            get_gaze_vector: sdk.get_gaze_vector.ok_or(missing)?,
        })
    }
}

struct FfiSdk {
    table: SdkTable,
}

impl HeadsetSdk for FfiSdk {
    fn acquire(&self) -> Option<Rc<dyn Headset>> {
        let raw = unsafe { (self.table.acquire)(self.table.user_data) };
        NonNull::new(raw).map(|raw| {
            Rc::new(FfiHeadset {
                table: self.table,
                raw,
            }) as Rc<dyn Headset>
        })
    }
}

/// Headset living on the C side; released when the last owner drops it.
struct FfiHeadset {
    table: SdkTable,
    raw: NonNull<c_void>,
}

impl Headset for FfiHeadset {
    fn initialise(&self, capabilities: Capabilities) {
        unsafe { (self.table.initialise)(self.raw.as_ptr(), capabilities.bits()) }
    }

    fn is_hardware_connected(&self) -> bool {
        unsafe { (self.table.is_hardware_connected)(self.raw.as_ptr()) }
    }

    fn hmd_pose(&self) -> HeadPose {
        let mut pose = HeadPose::default();
        unsafe { (self.table.get_hmd_pose)(self.raw.as_ptr(), &mut pose) };
        pose
    }

    fn gaze_vector(&self, eye: Eye) -> GazeVector {
        let mut gaze = GazeVector::default();
        unsafe { (self.table.get_gaze_vector)(self.raw.as_ptr(), eye as c_int, &mut gaze.vector) };
        gaze
    }
}

impl Drop for FfiHeadset {
    fn drop(&mut self) {
        if let Some(release) = self.table.release {
            unsafe { release(self.table.user_data, self.raw.as_ptr()) };
        }
    }
}

// -- Host adapter --

/// Validated copy of [`FvHostCallbacks`].
#[derive(Clone, Copy)]
struct HostTable {
    user_data: *mut c_void,
    create_device: Option<
        unsafe extern "C" fn(*mut c_void, FvDeviceKind, *const c_char, *const c_char, u32) -> c_int,
    >,
    report_pose:
        unsafe extern "C" fn(*mut c_void, c_int, u32, *const PoseState, *const TimeValue),
    report_gaze_direction:
        unsafe extern "C" fn(*mut c_void, c_int, u32, *const GazeDirection, *const TimeValue),
}

impl HostTable {
    fn from_ffi(host: &FvHostCallbacks) -> Result<Self> {
        let missing = PluginError::InvalidArgument("incomplete host callback table");
        Ok(Self {
            user_data: host.user_data,
            create_device: host.create_device,
            report_pose: host.report_pose.ok_or(missing.clone())?,
            report_gaze_direction: host.report_gaze_direction.ok_or(missing)?,
        })
    }
}

struct FfiTrackerSink {
    host: HostTable,
    device: c_int,
}

impl TrackerSink for FfiTrackerSink {
    fn report_pose(&mut self, sensor: u32, pose: &PoseState, timestamp: TimeValue) {
        unsafe { (self.host.report_pose)(self.host.user_data, self.device, sensor, pose, &timestamp) }
    }
}

struct FfiEyeTrackerSink {
    host: HostTable,
    device: c_int,
}

impl EyeTrackerSink for FfiEyeTrackerSink {
    fn report_gaze_direction(&mut self, eye: u32, direction: GazeDirection, timestamp: TimeValue) {
        unsafe {
            (self.host.report_gaze_direction)(
                self.host.user_data,
                self.device,
                eye,
                &direction,
                &timestamp,
            )
        }
    }
}

/// Plugin context backed by a C host.
struct FfiContext {
    host: HostTable,
    next_device: c_int,
    message_types: Vec<String>,
    devices: Vec<Box<dyn DeviceUpdate>>,
    detectors: Vec<Box<dyn HardwareDetect>>,
}

impl FfiContext {
    fn new(host: HostTable) -> Self {
        Self {
            host,
            next_device: 0,
            message_types: Vec::new(),
            devices: Vec::new(),
            detectors: Vec::new(),
        }
    }

    fn create_device(
        &mut self,
        kind: FvDeviceKind,
        name: &str,
        descriptor: &str,
        sensor_count: u32,
    ) -> Result<c_int> {
        let id = match self.host.create_device {
            Some(create) => {
                let c_name = CString::new(name)
                    .map_err(|_| PluginError::InvalidArgument("device name contains NUL"))?;
                let c_descriptor = CString::new(descriptor)
                    .map_err(|_| PluginError::InvalidArgument("descriptor contains NUL"))?;
                unsafe {
                    create(
                        self.host.user_data,
                        kind,
                        c_name.as_ptr(),
                        c_descriptor.as_ptr(),
                        sensor_count,
                    )
                }
            }
            None => self.next_device,
        };
        if id < 0 {
            return Err(PluginError::Host(format!("{} refused by host", name)));
        }
        self.next_device = id.saturating_add(1);
        log::debug!(target: LOG_TARGET, "Created {:?} device {} as #{}", kind, name, id);
        Ok(id)
    }

    /// Run every detection callback; the first error is returned after all ran.
    fn run_detection(&mut self) -> Result<()> {
        let mut detectors = std::mem::take(&mut self.detectors);
        let mut outcome = Ok(());
        for detector in detectors.iter_mut() {
            if let Err(e) = detector.detect(self) {
                outcome = outcome.and(Err(e));
            }
        }
        detectors.append(&mut self.detectors);
        self.detectors = detectors;
        outcome
    }

    /// Tick every device; the first error is returned after all ran.
    fn tick(&mut self) -> Result<()> {
        let mut outcome = Ok(());
        for device in self.devices.iter_mut() {
            if let Err(e) = device.update() {
                outcome = outcome.and(Err(e));
            }
        }
        outcome
    }
}

impl PluginContext for FfiContext {
    fn register_message_type(&mut self, name: &str) -> Result<MessageType> {
        self.message_types.push(name.to_string());
        Ok(MessageType(self.message_types.len() as u32 - 1))
    }

    fn create_tracker(&mut self, name: &str, descriptor: &str) -> Result<Box<dyn TrackerSink>> {
        let device = self.create_device(FvDeviceKind::Tracker, name, descriptor, 1)?;
        Ok(Box::new(FfiTrackerSink {
            host: self.host,
            device,
        }))
    }

    fn create_eye_tracker(
        &mut self,
        name: &str,
        descriptor: &str,
        eye_count: u32,
    ) -> Result<Box<dyn EyeTrackerSink>> {
        let device = self.create_device(FvDeviceKind::EyeTracker, name, descriptor, eye_count)?;
        Ok(Box::new(FfiEyeTrackerSink {
            host: self.host,
            device,
        }))
    }

    fn register_device(&mut self, device: Box<dyn DeviceUpdate>) {
        self.devices.push(device);
    }

    fn register_hardware_detect(&mut self, detect: Box<dyn HardwareDetect>) {
        self.detectors.push(detect);
    }
}

/// Opaque plugin handle for C consumers.
pub struct FvPlugin(FfiContext);

fn load(sdk: &FvHeadsetSdk, host: &FvHostCallbacks) -> Result<FvPlugin> {
    let sdk = FfiSdk {
        table: SdkTable::from_ffi(sdk)?,
    };
    let mut ctx = FfiContext::new(HostTable::from_ffi(host)?);
    register_plugin(&mut ctx, Box::new(sdk))?;
    Ok(FvPlugin(ctx))
}

fn report(result: Result<()>) -> c_int {
    match result {
        Ok(()) => 0,
        Err(e) => {
            LAST_ERROR.set(&e);
            -1
        }
    }
}

/// Load the plugin. Returns NULL on error (check fv_last_error()).
///
/// # Safety
/// `sdk` and `host` must point to valid tables, or be null. Every function
/// pointer and `user_data` in them must stay valid until `fv_plugin_unload`.
#[no_mangle]
pub unsafe extern "C" fn fv_plugin_load(
    sdk: *const FvHeadsetSdk,
    host: *const FvHostCallbacks,
) -> *mut FvPlugin {
    if sdk.is_null() || host.is_null() {
        LAST_ERROR.set(&PluginError::InvalidArgument("null table"));
        return std::ptr::null_mut();
    }
    match load(&*sdk, &*host) {
        Ok(plugin) => Box::into_raw(Box::new(plugin)),
        Err(e) => {
            LAST_ERROR.set(&e);
            std::ptr::null_mut()
        }
    }
}

/// Run hardware detection. Returns 0 once the headset is found, -1 otherwise.
/// Blocks for up to about one second while waiting for the hardware.
///
/// # Safety
/// `plugin` must be a pointer returned by `fv_plugin_load`, or null.
#[no_mangle]
pub unsafe extern "C" fn fv_plugin_detect(plugin: *mut FvPlugin) -> c_int {
    if plugin.is_null() {
        return -1;
    }
    let plugin = &mut *plugin;
    report(plugin.0.run_detection())
}

/// Tick every detected device. Returns 0 if all reported, -1 otherwise.
///
/// # Safety
/// `plugin` must be a pointer returned by `fv_plugin_load`, or null.
#[no_mangle]
pub unsafe extern "C" fn fv_plugin_update(plugin: *mut FvPlugin) -> c_int {
    if plugin.is_null() {
        return -1;
    }
    let plugin = &mut *plugin;
    report(plugin.0.tick())
}

/// Number of devices created so far, or -1 for a null plugin.
///
/// # Safety
/// `plugin` must be a valid plugin pointer, or null.
#[no_mangle]
pub unsafe extern "C" fn fv_plugin_device_count(plugin: *const FvPlugin) -> c_int {
    if plugin.is_null() {
        return -1;
    }
    let plugin = &*plugin;
    plugin.0.devices.len() as c_int
}

/// Unload the plugin, dropping its devices and releasing the headset.
///
/// # Safety
/// `plugin` must be a pointer returned by `fv_plugin_load`, or null.
#[no_mangle]
pub unsafe extern "C" fn fv_plugin_unload(plugin: *mut FvPlugin) {
    if !plugin.is_null() {
        drop(Box::from_raw(plugin));
    }
}

/// Get the last error message. Returns NULL if no error.
/// The returned pointer is valid until the next plugin API call.
#[no_mangle]
pub extern "C" fn fv_last_error() -> *const c_char {
    LAST_ERROR.as_ptr()
}

struct HostLogger {
    callback: FvLogCallback,
}

impl log::Log for HostLogger {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        let target = CString::new(record.target()).unwrap_or_default();
        let message = CString::new(record.args().to_string()).unwrap_or_default();
        unsafe { (self.callback)(record.level().into(), target.as_ptr(), message.as_ptr()) };
    }

    fn flush(&self) {}
}

/// Route the plugin's log output to the host. Can succeed once per process.
/// Returns 0 on success, -1 if a logger is already installed.
#[no_mangle]
pub extern "C" fn fv_set_log_callback(callback: Option<FvLogCallback>) -> c_int {
    let Some(callback) = callback else {
        return -1;
    };
    match log::set_boxed_logger(Box::new(HostLogger { callback })) {
        Ok(()) => {
            log::set_max_level(log::LevelFilter::Info);
            0
        }
        Err(_) => -1,
    }
}

/// The last error as a Rust string, for embedders linking the crate directly.
pub fn last_error_message() -> Option<String> {
    let ptr = LAST_ERROR.as_ptr();
    if ptr.is_null() {
        return None;
    }
    let msg = unsafe { CStr::from_ptr(ptr) };
    Some(msg.to_string_lossy().into_owned())
}
