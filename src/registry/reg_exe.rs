use std::path::PathBuf;
use std::process::Command;

use super::{is_local_host, Connector, Registry, RegistryKey};
use crate::error::RegistryError;

const LOCAL_ROOT: &str = "HKLM";

/// Connects to registries through `reg.exe`.
///
/// The local machine is addressed as `HKLM`, any other host as
/// `\\HOST\HKLM`, which requires the Remote Registry service on the target.
pub struct RegExeConnector {
    reg_exe: PathBuf,
    local_host: String,
}

impl RegExeConnector {
    pub fn new(reg_exe: impl Into<PathBuf>, local_host: impl Into<String>) -> Self {
        Self {
            reg_exe: reg_exe.into(),
            local_host: local_host.into(),
        }
    }

    fn root_for(&self, host: &str) -> String {
        if is_local_host(host, &self.local_host) {
            LOCAL_ROOT.to_string()
        } else {
            format!(r"\\{}\{}", host.trim_start_matches('\\'), LOCAL_ROOT)
        }
    }
}

impl Connector for RegExeConnector {
    type Registry = RegExeRegistry;

    fn connect(&self, host: &str) -> Result<RegExeRegistry, RegistryError> {
        let registry = RegExeRegistry {
            reg_exe: self.reg_exe.clone(),
            host: host.to_string(),
            root: self.root_for(host),
        };

        registry.query_root()?;
        tracing::debug!(host, root = %registry.root, "connected to registry");

        Ok(registry)
    }
}

/// The `HKLM` hive of one host, read through `reg.exe`.
pub struct RegExeRegistry {
    reg_exe: PathBuf,
    host: String,
    root: String,
}

impl RegExeRegistry {
    /// Lists the root without recursing, which fails fast when the host is
    /// unreachable.
    fn query_root(&self) -> Result<(), RegistryError> {
        let output = Command::new(&self.reg_exe)
            .args(["query", &self.root])
            .output()?;
        if output.status.success() {
            Ok(())
        } else {
            Err(query_error(&self.root, &output.stderr))
        }
    }
}

impl Registry for RegExeRegistry {
    type Key = RegExeKey;

    fn host(&self) -> &str {
        &self.host
    }

    fn open_subkeys(&self, path: &str) -> Result<Vec<RegExeKey>, RegistryError> {
        let full_path = format!(r"{}\{}", self.root, path);
        let output = Command::new(&self.reg_exe)
            .args(["query", &full_path, "/s"])
            .output()?;

        keys_from_output(
            &full_path,
            path,
            output.status.success(),
            &output.stdout,
            &output.stderr,
        )
    }
}

fn query_error(key: &str, stderr: &[u8]) -> RegistryError {
    let message = decode_reg_output(stderr).trim().to_string();
    if message.to_ascii_lowercase().contains("unable to find") {
        RegistryError::KeyNotFound {
            path: key.to_string(),
        }
    } else {
        RegistryError::QueryFailed {
            path: key.to_string(),
            message,
        }
    }
}

/// Interprets the result of `reg query <full_path> /s`.
///
/// `reg.exe` keeps going after a descendant it cannot read and exits with
/// an error at the end. Whatever it printed before that is still used; only
/// a missing location or one that produced no output is an error.
fn keys_from_output(
    full_path: &str,
    location: &str,
    success: bool,
    stdout: &[u8],
    stderr: &[u8],
) -> Result<Vec<RegExeKey>, RegistryError> {
    let text = decode_reg_output(stdout);
    if success {
        return Ok(parse_query_output(&text, location));
    }

    let error = query_error(full_path, stderr);
    if matches!(error, RegistryError::KeyNotFound { .. }) || text.trim().is_empty() {
        return Err(error);
    }

    tracing::debug!(path = full_path, "partial registry listing: {}", error);
    Ok(parse_query_output(&text, location))
}

/// Decodes text written by `reg.exe`.
///
/// Redirected output is UTF-16 when it starts with a byte order mark and
/// otherwise either UTF-8 or the ANSI code page. Bytes that are not valid
/// UTF-8 are read as Windows-1252 so every byte maps to a distinct
/// character.
pub fn decode_reg_output(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFF, 0xFE]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| windows_1252(b)).collect(),
    }
}

fn windows_1252(byte: u8) -> char {
    const HIGH_CONTROLS: [char; 32] = [
        '\u{20AC}', '\u{0081}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}',
        '\u{2021}', '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{008D}',
        '\u{017D}', '\u{008F}', '\u{0090}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}',
        '\u{2022}', '\u{2013}', '\u{2014}', '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}',
        '\u{0153}', '\u{009D}', '\u{017E}', '\u{0178}',
    ];
    match byte {
        0x80..=0x9F => HIGH_CONTROLS[usize::from(byte - 0x80)],
        _ => char::from(byte),
    }
}

/// One value line from `reg query` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegValue {
    pub name: String,
    pub value_type: String,
    pub data: String,
}

/// A subkey captured from a recursive `reg query`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegExeKey {
    name: String,
    values: Vec<RegValue>,
}

impl RegExeKey {
    pub fn values(&self) -> &[RegValue] {
        &self.values
    }
}

impl RegistryKey for RegExeKey {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_string(&self, value_name: &str) -> Result<String, RegistryError> {
        // Value names are case-insensitive in the registry.
        let value = self
            .values
            .iter()
            .find(|v| v.name.eq_ignore_ascii_case(value_name))
            .ok_or_else(|| RegistryError::ValueNotFound {
                name: value_name.to_string(),
            })?;

        value_as_string(value)
    }
}

fn value_as_string(value: &RegValue) -> Result<String, RegistryError> {
    match value.value_type.as_str() {
        "REG_SZ" | "REG_EXPAND_SZ" => Ok(value.data.clone()),
        "REG_MULTI_SZ" => Ok(value
            .data
            .split("\\0")
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("; ")),
        "REG_DWORD" | "REG_QWORD" => {
            let data = value.data.trim();
            let parsed = match data.strip_prefix("0x") {
                Some(hex) => u64::from_str_radix(hex, 16).ok(),
                None => data.parse::<u64>().ok(),
            };
            parsed
                .map(|n| n.to_string())
                .ok_or_else(|| RegistryError::UnsupportedType {
                    name: value.name.clone(),
                    value_type: value.value_type.clone(),
                })
        }
        other => Err(RegistryError::UnsupportedType {
            name: value.name.clone(),
            value_type: other.to_string(),
        }),
    }
}

/// Groups the output of `reg query <location> /s` into the direct subkeys
/// of `location`.
///
/// Output consists of blocks made of a full key path followed by indented
/// `name    TYPE    data` lines. Values of deeper descendants are dropped,
/// and so are the values of `location` itself.
pub fn parse_query_output(output: &str, location: &str) -> Vec<RegExeKey> {
    let marker = location.trim_matches('\\').to_ascii_lowercase();
    let mut keys: Vec<RegExeKey> = Vec::new();
    let mut in_child = false;

    for line in output.lines() {
        if line.trim().is_empty() {
            continue;
        }

        if !line.starts_with(' ') {
            in_child = match child_name(line.trim_end(), &marker) {
                Some(name) => {
                    keys.push(RegExeKey {
                        name: name.to_string(),
                        values: Vec::new(),
                    });
                    true
                }
                None => false,
            };
            continue;
        }

        if !in_child {
            continue;
        }

        if let (Some(value), Some(key)) = (parse_value_line(line), keys.last_mut()) {
            key.values.push(value);
        }
    }

    keys
}

/// Returns the child name if `header` is a direct subkey of the location.
fn child_name<'a>(header: &'a str, marker: &str) -> Option<&'a str> {
    let lowered = header.to_ascii_lowercase();
    let start = lowered.rfind(marker)? + marker.len();
    let rest = header[start..].strip_prefix('\\')?;
    if rest.is_empty() || rest.contains('\\') {
        return None;
    }
    Some(rest)
}

fn parse_value_line(line: &str) -> Option<RegValue> {
    let mut parts = line.trim_start().splitn(3, "    ");
    let name = parts.next()?.to_string();
    let value_type = parts.next()?.trim().to_string();
    if !value_type.starts_with("REG_") {
        return None;
    }
    let data = parts.next().unwrap_or("").trim().to_string();

    Some(RegValue {
        name,
        value_type,
        data,
    })
}
