pub mod dto;

use std::fmt;

use thiserror::Error;

use crate::common::{RESIZED_PREFIX, VALID_IMAGE_EXTENSIONS};

/// Client-input failures. Always reported as 400 responses, never
/// attempted against remote systems.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("'key' must not be empty")]
    EmptyKey,
    #[error("only image files can be processed: '{0}'")]
    NotAnImage(String),
    #[error("'content' is not valid base64: {0}")]
    InvalidContent(String),
}

/// Logical photo name. Always non-empty and trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhotoKey(String);

impl PhotoKey {
    pub fn parse(raw: &str) -> Result<Self, InputError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InputError::EmptyKey);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key of the derived thumbnail copy.
    pub fn derived(&self) -> String {
        format!("{}{}", RESIZED_PREFIX, self.0)
    }

    pub fn extension(&self) -> String {
        self.0
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default()
    }

    pub fn is_image(&self) -> bool {
        VALID_IMAGE_EXTENSIONS.contains(&self.extension().as_str())
    }
}

impl fmt::Display for PhotoKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Optional author metadata stored next to the photo row. Absent fields
/// are kept as empty strings so the row store never sees nulls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhotoMetadata {
    pub email: String,
    pub description: String,
}
