//! Operating system architecture detection.
//!
//! The only reliable way to learn the bitness of a remote Windows host is to
//! ask WMI for `Win32_OperatingSystem.OSArchitecture`. Hosts older than Vista
//! do not expose that property; like offline hosts they are treated as
//! 32-bit.

use std::path::PathBuf;
use std::process::Command;

use serde_json::Value;

use crate::model::Architecture;
use crate::platform::ps_quote;

/// Determines the architecture of a host.
///
/// Implementations never fail: anything that goes wrong degrades to
/// [`Architecture::X86`].
pub trait ArchitectureProbe {
    fn probe(&self, host: &str) -> Architecture;
}

/// Always reports the same architecture. Used when probing is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedProbe(pub Architecture);

impl ArchitectureProbe for FixedProbe {
    fn probe(&self, _host: &str) -> Architecture {
        self.0
    }
}

/// Queries WMI through PowerShell.
pub struct WmiProbe {
    powershell_exe: PathBuf,
}

impl WmiProbe {
    pub fn new(powershell_exe: impl Into<PathBuf>) -> Self {
        Self {
            powershell_exe: powershell_exe.into(),
        }
    }

    fn run_powershell(&self, command: &str) -> Option<String> {
        let output = Command::new(&self.powershell_exe)
            .args(["-NoProfile", "-NonInteractive", "-Command", command])
            .output()
            .ok()?;
        if !output.status.success() {
            return None;
        }
        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if stdout.is_empty() {
            None
        } else {
            Some(stdout)
        }
    }
}

impl ArchitectureProbe for WmiProbe {
    fn probe(&self, host: &str) -> Architecture {
        let command = os_architecture_query(host);
        let architecture = self
            .run_powershell(&command)
            .and_then(|json| parse_os_architecture_json(&json));

        match architecture {
            Some(architecture) => {
                tracing::debug!(host, %architecture, "probed architecture");
                architecture
            }
            None => {
                tracing::warn!(host, "could not determine architecture, assuming 32-bit");
                Architecture::X86
            }
        }
    }
}

fn os_architecture_query(host: &str) -> String {
    format!(
        "Get-CimInstance -ClassName Win32_OperatingSystem -ComputerName {} -ErrorAction Stop \
         | Select-Object -First 1 OSArchitecture | ConvertTo-Json -Compress",
        ps_quote(host)
    )
}

fn parse_os_architecture_json(raw: &str) -> Option<Architecture> {
    let value: Value = serde_json::from_str(raw).ok()?;
    let record = match value {
        Value::Array(arr) => arr.into_iter().next()?,
        single => single,
    };
    let os_architecture = record.get("OSArchitecture")?.as_str()?;

    if os_architecture.contains("64") {
        Some(Architecture::X64)
    } else {
        Some(Architecture::X86)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_64bit_architecture() {
        assert_eq!(
            parse_os_architecture_json(r#"{"OSArchitecture":"64-bit"}"#),
            Some(Architecture::X64)
        );
    }

    #[test]
    fn parses_localized_architecture() {
        assert_eq!(
            parse_os_architecture_json(r#"[{"OSArchitecture":"64 bits"}]"#),
            Some(Architecture::X64)
        );
    }

    #[test]
    fn parses_32bit_architecture() {
        assert_eq!(
            parse_os_architecture_json(r#"{"OSArchitecture":"32-bit"}"#),
            Some(Architecture::X86)
        );
    }

    #[test]
    fn missing_property_is_unknown() {
        // Pre-Vista hosts return the object without OSArchitecture.
        assert_eq!(parse_os_architecture_json(r#"{"OSArchitecture":null}"#), None);
        assert_eq!(parse_os_architecture_json("{}"), None);
        assert_eq!(parse_os_architecture_json("not json"), None);
    }

    #[test]
    fn query_escapes_host_name() {
        let query = os_architecture_query("o'brien-pc");
        assert!(query.contains("-ComputerName 'o''brien-pc'"));
    }

    #[test]
    fn failed_probe_assumes_32bit() {
        let probe = WmiProbe::new("/nonexistent/powershell.exe");
        assert_eq!(probe.probe("WS-0042"), Architecture::X86);
    }

    #[test]
    fn fixed_probe_reports_its_value() {
        assert_eq!(FixedProbe(Architecture::X64).probe("any"), Architecture::X64);
        assert_eq!(FixedProbe::default().probe("any"), Architecture::X86);
    }
}
