//! Host and tool lookups that differ between platforms.

/// Default location of `reg.exe`.
///
/// Absolute System32 paths avoid picking up a different binary from `PATH`.
pub fn default_reg_exe() -> String {
    if cfg!(target_os = "windows") {
        r"C:\Windows\System32\reg.exe".to_string()
    } else {
        "reg".to_string()
    }
}

/// Default location of Windows PowerShell.
pub fn default_powershell_exe() -> String {
    if cfg!(target_os = "windows") {
        r"C:\Windows\System32\WindowsPowerShell\v1.0\powershell.exe".to_string()
    } else {
        "pwsh".to_string()
    }
}

/// Quotes `value` as a single-quoted PowerShell string literal.
pub(crate) fn ps_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Returns the NetBIOS name of the local machine.
///
/// Falls back to `localhost` if neither `COMPUTERNAME` nor `HOSTNAME` is set.
pub fn local_computer_name() -> String {
    computer_name_from(|key| std::env::var(key).ok())
}

fn computer_name_from<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    ["COMPUTERNAME", "HOSTNAME"]
        .into_iter()
        .filter_map(|key| lookup(key))
        .map(|name| name.trim().to_string())
        .find(|name| !name.is_empty())
        .unwrap_or_else(|| "localhost".to_string())
}
