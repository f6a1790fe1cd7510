use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Command;

use serde::Deserialize;
use serde_json::Value;

use super::{is_local_host, Connector, Registry, RegistryKey};
use crate::error::RegistryError;
use crate::platform::ps_quote;

/// Exit code the listing script uses when the location does not exist.
const EXIT_KEY_NOT_FOUND: i32 = 3;

/// Connects to registries through the .NET registry API in PowerShell.
///
/// Output is forced to UTF-8 JSON, so names survive whatever code page the
/// console uses. Remote hosts are opened with `OpenRemoteBaseKey`, which
/// needs the Remote Registry service on the target like `reg.exe` does.
pub struct PowerShellConnector {
    powershell_exe: PathBuf,
    local_host: String,
}

impl PowerShellConnector {
    pub fn new(powershell_exe: impl Into<PathBuf>, local_host: impl Into<String>) -> Self {
        Self {
            powershell_exe: powershell_exe.into(),
            local_host: local_host.into(),
        }
    }

    fn hive_expr(&self, host: &str) -> String {
        if is_local_host(host, &self.local_host) {
            "[Microsoft.Win32.Registry]::LocalMachine".to_string()
        } else {
            format!(
                "[Microsoft.Win32.RegistryKey]::OpenRemoteBaseKey('LocalMachine', {})",
                ps_quote(host.trim_start_matches('\\'))
            )
        }
    }
}

impl Connector for PowerShellConnector {
    type Registry = PowerShellRegistry;

    fn connect(&self, host: &str) -> Result<PowerShellRegistry, RegistryError> {
        let registry = PowerShellRegistry {
            powershell_exe: self.powershell_exe.clone(),
            host: host.to_string(),
            hive: self.hive_expr(host),
        };

        let script = format!(
            "$ErrorActionPreference = 'Stop'; $hive = {}; $null = $hive.GetSubKeyNames()",
            registry.hive
        );
        registry.run(&script, "HKLM")?;
        tracing::debug!(host, "connected to registry");

        Ok(registry)
    }
}

/// The `HKLM` hive of one host, read through PowerShell.
pub struct PowerShellRegistry {
    powershell_exe: PathBuf,
    host: String,
    hive: String,
}

impl PowerShellRegistry {
    fn run(&self, script: &str, path: &str) -> Result<String, RegistryError> {
        let output = Command::new(&self.powershell_exe)
            .args(["-NoProfile", "-NonInteractive", "-Command", script])
            .output()?;

        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).trim().to_string());
        }

        if output.status.code() == Some(EXIT_KEY_NOT_FOUND) {
            return Err(RegistryError::KeyNotFound {
                path: path.to_string(),
            });
        }

        Err(RegistryError::QueryFailed {
            path: path.to_string(),
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

impl Registry for PowerShellRegistry {
    type Key = PsKey;

    fn host(&self) -> &str {
        &self.host
    }

    fn open_subkeys(&self, path: &str) -> Result<Vec<PsKey>, RegistryError> {
        let script = list_subkeys_script(&self.hive, path);
        let json = self.run(&script, path)?;
        parse_subkeys_json(&json).map_err(|e| RegistryError::QueryFailed {
            path: path.to_string(),
            message: format!("unexpected listing output: {}", e),
        })
    }
}

/// Builds the script that lists the direct subkeys of `path` with their
/// values as JSON.
///
/// A subkey or value that cannot be read is left out instead of failing the
/// listing. DWORD and QWORD values are reinterpreted as unsigned.
fn list_subkeys_script(hive: &str, path: &str) -> String {
    format!(
        "$ErrorActionPreference = 'Stop'; \
         [Console]::OutputEncoding = New-Object System.Text.UTF8Encoding $false; \
         $hive = {hive}; \
         $root = $hive.OpenSubKey({path}); \
         if ($null -eq $root) {{ exit {not_found} }}; \
         $keys = foreach ($name in $root.GetSubKeyNames()) {{ \
           $values = @{{}}; \
           try {{ \
             $key = $root.OpenSubKey($name); \
             if ($null -ne $key) {{ foreach ($valueName in $key.GetValueNames()) {{ try {{ \
               $kind = $key.GetValueKind($valueName).ToString(); \
               $raw = $key.GetValue($valueName, $null, 'DoNotExpandEnvironmentNames'); \
               $data = switch ($kind) {{ \
                 'DWord' {{ [BitConverter]::ToUInt32([BitConverter]::GetBytes([int32]$raw), 0) }} \
                 'QWord' {{ [BitConverter]::ToUInt64([BitConverter]::GetBytes([int64]$raw), 0) }} \
                 'String' {{ [string]$raw }} \
                 'ExpandString' {{ [string]$raw }} \
                 'MultiString' {{ ,[string[]]$raw }} \
                 default {{ $null }} \
               }}; \
               $values[$valueName] = [pscustomobject]@{{ Kind = $kind; Data = $data }} \
             }} catch {{ }} }} }} \
           }} catch {{ }}; \
           [pscustomobject]@{{ Name = $name; Values = $values }} \
         }}; \
         ConvertTo-Json -InputObject @($keys) -Depth 6 -Compress",
        hive = hive,
        path = ps_quote(path),
        not_found = EXIT_KEY_NOT_FOUND,
    )
}

/// A subkey captured from a PowerShell listing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PsKey {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Values", default)]
    values: HashMap<String, PsValue>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PsValue {
    #[serde(rename = "Kind")]
    pub kind: String,
    #[serde(rename = "Data", default)]
    pub data: Value,
}

impl RegistryKey for PsKey {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_string(&self, value_name: &str) -> Result<String, RegistryError> {
        let value = self
            .values
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(value_name))
            .map(|(_, value)| value)
            .ok_or_else(|| RegistryError::ValueNotFound {
                name: value_name.to_string(),
            })?;

        let unsupported = || RegistryError::UnsupportedType {
            name: value_name.to_string(),
            value_type: value.kind.clone(),
        };

        match (value.kind.as_str(), &value.data) {
            ("String" | "ExpandString", Value::String(s)) => Ok(s.clone()),
            ("String" | "ExpandString", Value::Null) => Ok(String::new()),
            ("MultiString", Value::Array(parts)) => Ok(parts
                .iter()
                .filter_map(Value::as_str)
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join("; ")),
            // A single-element string array can come back unwrapped.
            ("MultiString", Value::String(s)) => Ok(s.clone()),
            ("DWord" | "QWord", Value::Number(n)) => n
                .as_u64()
                .map(|n| n.to_string())
                .ok_or_else(unsupported),
            _ => Err(unsupported()),
        }
    }
}

/// Parses the JSON printed by the listing script.
pub fn parse_subkeys_json(raw: &str) -> Result<Vec<PsKey>, serde_json::Error> {
    if raw.is_empty() {
        return Ok(Vec::new());
    }
    match serde_json::from_str::<Value>(raw)? {
        Value::Array(items) => items
            .into_iter()
            .filter(|item| !item.is_null())
            .map(serde_json::from_value)
            .collect(),
        single => Ok(vec![serde_json::from_value(single)?]),
    }
}
