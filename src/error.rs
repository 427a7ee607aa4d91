use std::fmt;

/// Errors surfaced by detection and per-tick reporting.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PluginError {
    /// The vendor SDK gave no headset, or the shared handle has been dropped.
    #[error("Headset handle unavailable")]
    HandleUnavailable,

    #[error("Hardware not connecting after {attempts} tries")]
    DeviceNotConnected { attempts: u32 },

    #[error("Host rejected device registration: {0}")]
    Host(String),

    #[error("Failed to register message type {0:?}")]
    MessageTypeRegistration(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),
}

/// Thread-safe last-error storage for the C FFI layer.
///
/// [`LastError::as_ptr`] returns a NUL-terminated string, or null before the
/// first `set`. The pointer stays valid until the next `set`.
pub(crate) struct LastError {
    message: std::sync::Mutex<String>,
}

impl LastError {
    pub const fn new() -> Self {
        Self {
            message: std::sync::Mutex::new(String::new()),
        }
    }

    pub fn set(&self, err: &PluginError) {
        if let Ok(mut msg) = self.message.lock() {
            *msg = fmt::format(format_args!("{}\0", err));
        }
    }

    pub fn as_ptr(&self) -> *const std::ffi::c_char {
        match self.message.lock() {
            Ok(msg) if !msg.is_empty() => msg.as_ptr() as *const std::ffi::c_char,
            _ => std::ptr::null(),
        }
    }
}
