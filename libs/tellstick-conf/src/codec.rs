//! Serializer and restricted-grammar parser for `tellstick.conf`.
//!
//! The parser is not a general config-language reader. It recognizes only
//! the subset of syntax this module itself produces: `device { ... }`
//! records with an optional nested `parameters { ... }` block. Anything
//! else on a line (the fixed header, comments, unknown keys) is skipped.

use crate::error::{ConfError, Result};
use crate::types::{Device, DeviceParameters};
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;
use tracing::warn;

/// Fixed header emitted at the top of every generated file.
const HEADER_LINES: [&str; 3] = [
    "user = \"root\"",
    "group = \"plugdev\"",
    "ignoreControllerConfirmation = \"false\"",
];

/// Render a device list to conf-file text in list order.
pub fn render_config(devices: &[Device]) -> String {
    let mut out = String::new();
    for line in HEADER_LINES {
        out.push_str(line);
        out.push('\n');
    }

    for device in devices {
        out.push('\n');
        out.push_str("device {\n");
        let _ = writeln!(out, "  id = {}", device.id);
        let _ = writeln!(out, "  name = \"{}\"", device.name);
        let _ = writeln!(out, "  protocol = \"{}\"", device.protocol);
        if !device.model.is_empty() {
            let _ = writeln!(out, "  model = \"{}\"", device.model);
        }
        if !device.parameters.is_empty() {
            out.push_str("  parameters {\n");
            for (name, value) in device.parameters.iter() {
                let _ = writeln!(out, "    {} = \"{}\"", name, value);
            }
            out.push_str("  }\n");
        }
        out.push_str("}\n");
    }

    out
}

/// Write the full conf file for `devices`, replacing any previous content.
pub fn write_config(devices: &[Device], path: &Path) -> Result<()> {
    fs::write(path, render_config(devices))?;
    Ok(())
}

/// Read the conf file back into a device list.
///
/// A missing file is the bootstrap case and yields an empty list. IO and
/// grammar errors are returned to the caller, which treats them as "no
/// baseline" (the only cost is one unnecessary rewrite).
pub fn read_config(path: &Path) -> Result<Vec<Device>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(ConfError::Io(e)),
    };
    parse_config(&text)
}

/// Parser position within the conf grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    /// Between device records (header lines live here too)
    Outside,
    /// Inside a `device { ... }` record
    InDevice,
    /// Inside the nested `parameters { ... }` block
    InParameters,
}

/// Fields collected for the device record currently being parsed.
#[derive(Debug, Default)]
struct PendingDevice {
    id: Option<i64>,
    name: Option<String>,
    protocol: String,
    model: String,
    parameters: DeviceParameters,
}

impl PendingDevice {
    /// A record is only accepted once both `id` and `name` were seen.
    fn finish(self) -> Option<Device> {
        match (self.id, self.name) {
            (Some(id), Some(name)) => Some(Device {
                id,
                name,
                protocol: self.protocol,
                model: self.model,
                parameters: self.parameters,
            }),
            _ => None,
        }
    }
}

/// Parse conf-file text with an explicit finite-state parser.
pub fn parse_config(text: &str) -> Result<Vec<Device>> {
    let mut devices = Vec::new();
    let mut state = ParserState::Outside;
    let mut pending = PendingDevice::default();

    for line in text.lines() {
        let line = line.trim();

        match state {
            ParserState::Outside => {
                if line.starts_with("device {") {
                    pending = PendingDevice::default();
                    state = ParserState::InDevice;
                }
            },
            ParserState::InDevice => {
                if line == "parameters {" {
                    state = ParserState::InParameters;
                } else if line == "}" {
                    let record = std::mem::take(&mut pending);
                    match record.finish() {
                        Some(device) => devices.push(device),
                        None => warn!("Dropping conf device record missing id or name"),
                    }
                    state = ParserState::Outside;
                } else if let Some((key, value)) = split_key_value(line) {
                    match key {
                        "id" => {
                            let id = value.parse::<i64>().map_err(|_| {
                                ConfError::Parse(format!("invalid device id '{}'", value))
                            })?;
                            pending.id = Some(id);
                        },
                        "name" => pending.name = Some(value.to_string()),
                        "protocol" => pending.protocol = value.to_string(),
                        "model" => pending.model = value.to_string(),
                        // Parameter keys also appear flat in hand-edited
                        // files; accept them here like the nested block does.
                        other => {
                            pending.parameters.set(other, value);
                        },
                    }
                }
            },
            ParserState::InParameters => {
                if line == "}" {
                    state = ParserState::InDevice;
                } else if let Some((key, value)) = split_key_value(line) {
                    // Unrecognized parameter names are dropped
                    pending.parameters.set(key, value);
                }
            },
        }
    }

    Ok(devices)
}

/// Split a `key = value` line, stripping surrounding double quotes from
/// the value if present.
fn split_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    Some((key.trim(), value.trim().trim_matches('"')))
}
