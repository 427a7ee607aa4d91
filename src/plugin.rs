use crate::config::{LOG_TARGET, MESSAGE_TYPE_NAME, PLUGIN_NAME};
use crate::detection::HardwareDetection;
use crate::headset::HeadsetSdk;
use crate::host::{Clock, MessageType, PluginContext};
use crate::{PluginError, Result};
use std::rc::Rc;

/// Plugin entry point, called once when the host loads the plugin.
///
/// Registers the plugin's message type and its hardware detection callback.
/// Devices are created later, by the first successful detection.
pub fn register_plugin(
    ctx: &mut dyn PluginContext,
    sdk: Box<dyn HeadsetSdk>,
) -> Result<MessageType> {
    register_plugin_with_detection(ctx, HardwareDetection::new(sdk))
}

/// Same as [`register_plugin`] with an explicit clock.
pub fn register_plugin_with_clock(
    ctx: &mut dyn PluginContext,
    sdk: Box<dyn HeadsetSdk>,
    clock: Rc<dyn Clock>,
) -> Result<MessageType> {
    register_plugin_with_detection(ctx, HardwareDetection::with_clock(sdk, clock))
}

fn register_plugin_with_detection(
    ctx: &mut dyn PluginContext,
    detection: HardwareDetection,
) -> Result<MessageType> {
    let message_type = ctx.register_message_type(MESSAGE_TYPE_NAME).map_err(|e| {
        log::error!(target: LOG_TARGET, "{}: {}", PLUGIN_NAME, e);
        PluginError::MessageTypeRegistration(MESSAGE_TYPE_NAME.to_string())
    })?;
    ctx.register_hardware_detect(Box::new(detection));
    log::info!(target: LOG_TARGET, "{} loaded", PLUGIN_NAME);
    Ok(message_type)
}
