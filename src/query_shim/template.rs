//! # SQL Templates
//!
//! A template is what a tagged template literal hands its tag function: the
//! literal text segments and the substituted values between them. There is
//! always exactly one more segment than there are values.

use serde_json::Value;

use super::errors::{ShimError, ShimResult};

/// Value slot marker accepted by [`SqlTemplate::from_format`]
pub const FORMAT_SLOT: &str = "{}";

/// Literal segments interleaved with substituted values
#[derive(Debug, Clone, PartialEq)]
pub struct SqlTemplate {
    strings: Vec<String>,
    values: Vec<Value>,
}

impl SqlTemplate {
    /// Start building a template
    pub fn builder() -> SqlTemplateBuilder {
        SqlTemplateBuilder {
            strings: vec![String::new()],
            values: Vec::new(),
        }
    }

    /// Template with no substituted values
    pub fn literal(text: impl Into<String>) -> Self {
        Self {
            strings: vec![text.into()],
            values: Vec::new(),
        }
    }

    /// Parse a format string whose `{}` markers are value slots
    pub fn from_format(text: &str, values: Vec<Value>) -> ShimResult<Self> {
        let strings: Vec<String> = text.split(FORMAT_SLOT).map(str::to_string).collect();
        let slots = strings.len() - 1;
        if slots != values.len() {
            return Err(ShimError::ArityMismatch {
                slots,
                values: values.len(),
            });
        }
        Ok(Self { strings, values })
    }

    /// Literal text segments
    pub fn strings(&self) -> &[String] {
        &self.strings
    }

    /// Substituted values
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Literal text with values dropped
    pub fn joined(&self) -> String {
        self.strings.concat()
    }

    /// Literal text with each value slot replaced by `marker`
    pub fn with_markers(&self, marker: &str) -> String {
        self.strings.join(marker)
    }
}

/// Builder for [`SqlTemplate`]
pub struct SqlTemplateBuilder {
    strings: Vec<String>,
    values: Vec<Value>,
}

impl SqlTemplateBuilder {
    /// Append literal text
    pub fn text(mut self, text: &str) -> Self {
        if let Some(last) = self.strings.last_mut() {
            last.push_str(text);
        }
        self
    }

    /// Append a substituted value
    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.values.push(value.into());
        self.strings.push(String::new());
        self
    }

    pub fn build(self) -> SqlTemplate {
        SqlTemplate {
            strings: self.strings,
            values: self.values,
        }
    }
}
