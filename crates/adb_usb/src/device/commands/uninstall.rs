use regex::Regex;
use std::sync::LazyLock;

use crate::device::ADBMessageDevice;
use crate::{ADBError, ADBMessageTransport, Result};

static PACKAGE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_]+(\.[A-Za-z0-9_]+)*$").expect("package name pattern is valid")
});

/// Whether `name` can be passed to `pm` as a single shell word.
pub(crate) fn is_valid_package_name(name: &str) -> bool {
    PACKAGE_NAME.is_match(name)
}

impl<T: ADBMessageTransport> ADBMessageDevice<T> {
    /// Remove `package_name`, keeping its data and cache. Returns what `pm` printed.
    pub(crate) fn uninstall_package(&mut self, package_name: &str) -> Result<String> {
        if !is_valid_package_name(package_name) {
            return Err(ADBError::InvalidPackageName(package_name.to_string()));
        }
        let output = self.run_shell(&format!("pm uninstall -k {package_name}"))?;
        let output = String::from_utf8_lossy(&output).trim_end().to_string();
        log::info!("uninstall {package_name}: {output}");
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::is_valid_package_name;

    #[test]
    fn package_names() {
        assert!(is_valid_package_name("com.example.app"));
        assert!(is_valid_package_name("io.appium.android_apis"));
        assert!(is_valid_package_name("single"));
        assert!(!is_valid_package_name(""));
        assert!(!is_valid_package_name("com.example."));
        assert!(!is_valid_package_name("com..example"));
        assert!(!is_valid_package_name("com.example; reboot"));
        assert!(!is_valid_package_name("$(id)"));
    }
}
