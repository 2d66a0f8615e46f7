use derive_builder::Builder;

use crate::pin::{DEFAULT_PIN_LENGTH, DIGEST_LENGTH};

/// SAS protocol configuration.
///
/// Both parties must use the same configuration or their pins will differ.
#[derive(Debug, Clone, Builder)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct SasConfig {
    /// Number of decimal digits in the pin.
    #[builder(default = "DEFAULT_PIN_LENGTH")]
    pin_length: usize,
}

impl SasConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.pin_length {
            Some(0) => Err("pin length must be at least 1".to_string()),
            Some(len) if len > DIGEST_LENGTH => Err(format!(
                "pin length must be at most {DIGEST_LENGTH}, got {len}"
            )),
            _ => Ok(()),
        }
    }
}

impl Default for SasConfig {
    fn default() -> Self {
        Self {
            pin_length: DEFAULT_PIN_LENGTH,
        }
    }
}

impl SasConfig {
    /// Creates a new builder for SasConfig.
    pub fn builder() -> SasConfigBuilder {
        SasConfigBuilder::default()
    }

    /// Number of decimal digits in the pin.
    pub fn pin_length(&self) -> usize {
        self.pin_length
    }
}
