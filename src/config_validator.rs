//! Configuration Validation
//!
//! Collects every invalid setting at startup so the operator sees all of them
//! at once rather than one per restart.

/// Store URI schemes the server can open
pub const SUPPORTED_STORE_SCHEMES: [&str; 4] =
    ["mongodb://", "mongodb+srv://", "memory://", "file://"];

/// A single invalid setting
#[derive(Debug)]
pub struct ConfigValidationError {
    pub field: String,
    pub value: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Invalid configuration for '{}': {} (value: {})",
            self.field, self.message, self.value
        )
    }
}

impl std::error::Error for ConfigValidationError {}

/// Result of config validation
pub type ConfigResult<T> = Result<T, Vec<ConfigValidationError>>;

/// Configuration validator
pub struct ConfigValidator {
    errors: Vec<ConfigValidationError>,
}

impl ConfigValidator {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    fn error(&mut self, field: &str, value: impl std::fmt::Display, message: &str) {
        self.errors.push(ConfigValidationError {
            field: field.to_string(),
            value: value.to_string(),
            message: message.to_string(),
        });
    }

    /// Validate port number (1-65535)
    pub fn validate_port(&mut self, field: &str, port: u16) -> &mut Self {
        if port == 0 {
            self.error(field, port, "Port must be between 1 and 65535");
        }
        self
    }

    /// Validate range (inclusive)
    pub fn validate_range(&mut self, field: &str, value: i64, min: i64, max: i64) -> &mut Self {
        if value < min || value > max {
            self.error(field, value, &format!("Value must be between {} and {}", min, max));
        }
        self
    }

    /// Validate non-empty string
    pub fn validate_non_empty(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.error(field, value, "Value cannot be empty");
        }
        self
    }

    /// Validate a secret without echoing it back
    pub fn validate_secret(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.error(field, "<empty>", "Secret cannot be empty");
        }
        self
    }

    /// Validate the store URI scheme
    pub fn validate_store_uri(&mut self, field: &str, uri: &str) -> &mut Self {
        if !SUPPORTED_STORE_SCHEMES.iter().any(|s| uri.starts_with(s)) {
            self.error(
                field,
                uri,
                &format!("URI must start with one of {}", SUPPORTED_STORE_SCHEMES.join(", ")),
            );
        } else if uri.starts_with("file://") && uri.len() == "file://".len() {
            self.error(field, uri, "file:// URI needs a path");
        } else if uri.starts_with("mongodb") && uri.ends_with("://") {
            self.error(field, uri, "MongoDB URI needs a host");
        }
        self
    }

    /// Finish validation and return result
    pub fn finish(self) -> ConfigResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }

    /// Check if any errors occurred
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Format validation errors for display
pub fn format_validation_errors(errors: &[ConfigValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}
