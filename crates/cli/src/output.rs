//! Output formatting for CLI responses

use anyhow::Error;
use colored::*;
use serde::Serialize;
use serde_json::json;

use macropad_client::{DebugEntry, DeviceConnectionInfo, LogDirection};
use macropad_config::{ConfigAction, DeviceConfig, WidgetKind};

use crate::error::CliError;

/// Print error in JSON format
pub fn print_error_json(error: &Error) {
    let error_json = json!({
        "success": false,
        "error": {
            "message": error.to_string(),
            "type": error_type_name(error)
        }
    });
    print_json(&error_json, "error");
}

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);

    let mut source = error.source();
    while let Some(err) = source {
        eprintln!("  {} {}", "Caused by:".yellow(), err);
        source = err.source();
    }
}

fn error_type_name(error: &Error) -> &'static str {
    match error.downcast_ref::<CliError>() {
        Some(CliError::DeviceNotFound(_)) => "device_not_found",
        Some(CliError::Timeout(_)) => "timeout",
        Some(CliError::Device(_)) => "device_error",
        Some(CliError::Busy(_)) => "busy",
        Some(CliError::InvalidConfiguration(_)) => "invalid_configuration",
        Some(CliError::IoError(_)) => "io_error",
        Some(CliError::JsonError(_)) | Some(CliError::YamlError(_)) => "parse_error",
        Some(CliError::Client(_)) | None => "error",
    }
}

fn print_json<T: Serialize>(value: &T, what: &str) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("Failed to format {} as JSON: {}", what, e),
    }
}

/// Print a plain success message
pub fn print_success(message: &str, json: bool) {
    if json {
        print_json(&json!({"success": true, "message": message}), "result");
    } else {
        println!("{} {}", "✓".green(), message);
    }
}

/// Print connection details
pub fn print_connection_info(info: &DeviceConnectionInfo, json: bool) {
    if json {
        print_json(&json!({"success": true, "device": info}), "device info");
        return;
    }

    println!("{} {}", "Device:".bold(), info.product_name);
    println!(
        "  Serial: {}",
        info.serial_number.as_deref().unwrap_or("unknown")
    );
    println!("  Protocol: {}", info.firmware_version);
}

/// Print a device configuration
pub fn print_config(config: &DeviceConfig, json: bool) {
    if json {
        print_json(&json!({"success": true, "config": config}), "configuration");
        return;
    }

    println!("{}", "Settings:".bold());
    let settings = &config.settings;
    match &settings.wifi {
        Some(wifi) => println!("  Wi-Fi: {}", wifi.ssid.cyan()),
        None => println!("  Wi-Fi: {}", "not set".dimmed()),
    }
    if let Some(offset) = settings.timezone_offset {
        println!("  Timezone: UTC{:+}", offset);
    }
    if settings.api_key.is_some() {
        println!("  API key: {}", "set".green());
    }

    let slots = config.button_slots();
    println!("{}", "Buttons:".bold());
    if slots.is_empty() {
        println!("  {}", "No mappings".yellow());
    }
    for slot in &slots {
        let name = slot.name.as_deref().unwrap_or("");
        println!(
            "  [{}] {} {}",
            slot.index,
            name.bold(),
            describe_actions(&slot.actions).dimmed()
        );
    }
    if let Some(actions) = config.default_mapping() {
        println!("  [default] {}", describe_actions(actions).dimmed());
    }

    if !config.widgets.is_empty() {
        println!("{}", "Widgets:".bold());
        for (id, widget) in &config.widgets {
            let kind = match &widget.kind {
                WidgetKind::Text { .. } => "text",
                WidgetKind::Image { .. } => "image",
            };
            println!(
                "  #{} {} ({}, every {}s) {}",
                id,
                widget.title.bold(),
                kind,
                widget.update_interval_seconds,
                widget.kind.url().dimmed()
            );
        }
    }
}

/// One-line summary of an action list
pub fn describe_actions(actions: &[ConfigAction]) -> String {
    if actions.is_empty() {
        return "(none)".to_string();
    }
    actions
        .iter()
        .map(describe_action)
        .collect::<Vec<_>>()
        .join(" → ")
}

fn describe_action(action: &ConfigAction) -> String {
    match action {
        ConfigAction::KeyPress { keys, modifier } => match modifier {
            Some(modifier) => format!("KeyPress({}+{})", modifier, keys.join("+")),
            None => format!("KeyPress({})", keys.join("+")),
        },
        ConfigAction::MousePress { button } => format!("MousePress({})", button),
        ConfigAction::MouseMove { dx, dy } => format!("MouseMove({}, {})", dx, dy),
        ConfigAction::MouseWheel { amount } => format!("MouseWheel({})", amount),
        ConfigAction::ConsumerPress { usage_id } => format!("ConsumerPress(0x{:x})", usage_id),
        ConfigAction::Delay { ms } => format!("Delay({}ms)", ms),
        ConfigAction::SendString { keys, .. } => format!("SendString({} keys)", keys.len()),
        ConfigAction::Sequence { actions } => format!("Sequence[{}]", describe_actions(actions)),
        other => other.name().to_string(),
    }
}

/// Print debug log entries, newest first
pub fn print_debug_log(entries: &[DebugEntry], json: bool) {
    if json {
        print_json(&json!({"success": true, "log": entries}), "debug log");
        return;
    }

    if entries.is_empty() {
        println!("{}", "Debug log is empty".yellow());
        return;
    }
    for entry in entries {
        let direction = match entry.direction {
            LogDirection::Sent => "→ sent".blue(),
            LogDirection::Received => "← received".green(),
        };
        println!(
            "{} {} {}",
            entry.timestamp.format("%H:%M:%S%.3f").to_string().dimmed(),
            direction,
            entry.data
        );
    }
}
