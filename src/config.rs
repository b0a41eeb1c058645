//! Analysis configuration
//!
//! The options decide how faults raised inside built-ins are surfaced. They
//! can be built in code or loaded from a JSON file such as:
//!
//! ```json
//! { "exactMode": false, "nativeExceptionRecovery": true }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Mode flags for one analysis session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisOptions {
    /// Verify a concrete trace: faults always propagate as simulated exceptions
    pub exact_mode: bool,
    /// Turn built-in faults into recoverable diagnostics when possible
    pub native_exception_recovery: bool,
    /// Filename used when a caller does not supply one
    pub default_filename: String,
    /// Nesting limit for function calls and nested `eval`
    pub max_call_depth: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            exact_mode: false,
            native_exception_recovery: true,
            default_filename: "<anonymous>".to_string(),
            max_call_depth: 256,
        }
    }
}

impl AnalysisOptions {
    /// Load options from a JSON string
    pub fn load(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::ConfigError(format!("Failed to parse analysis options: {}", e)))
    }

    /// Load options from a JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::load(&text)
    }

    /// Options for exact-trace verification
    pub fn exact() -> Self {
        Self {
            exact_mode: true,
            ..Self::default()
        }
    }

    /// Enable or disable recoverable diagnostics
    pub fn with_recovery(mut self, enabled: bool) -> Self {
        self.native_exception_recovery = enabled;
        self
    }

    /// Set the fallback filename
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.default_filename = filename.into();
        self
    }

    /// Set the call nesting limit
    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    /// Whether faults may be downgraded to recoverable diagnostics at all
    pub fn allows_recovery(&self) -> bool {
        self.native_exception_recovery && !self.exact_mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_fault_tolerant() {
        let options = AnalysisOptions::default();
        assert!(!options.exact_mode);
        assert!(options.native_exception_recovery);
        assert!(options.allows_recovery());
        assert!(!AnalysisOptions::exact().allows_recovery());
    }

    #[test]
    fn test_load_partial_json() {
        let options = AnalysisOptions::load(r#"{ "exactMode": true }"#).unwrap();
        assert!(options.exact_mode);
        assert!(options.native_exception_recovery);
        assert_eq!(options.max_call_depth, 256);
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let err = AnalysisOptions::load("{ exactMode: ").unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "nativeExceptionRecovery": false, "defaultFilename": "app.js" }}"#
        )
        .unwrap();
        let options = AnalysisOptions::from_file(file.path()).unwrap();
        assert!(!options.native_exception_recovery);
        assert_eq!(options.default_filename, "app.js");
    }
}
