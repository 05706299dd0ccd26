//! System configuration parameters
//!
//! Select-line wiring, readback policy and boot defaults.

use serde::{Deserialize, Serialize};

use crate::error::LineId;
use crate::pins;

/// How a line write is confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerifyPolicy {
    /// Read the pad level back and compare it to what was driven.
    Readback,
    /// Trust the write.  Only for emulated GPIO whose readback is not
    /// meaningful; mutual exclusion still holds through write ordering.
    Skip,
}

impl Default for VerifyPolicy {
    fn default() -> Self {
        if cfg!(feature = "gpio-emul") {
            Self::Skip
        } else {
            Self::Readback
        }
    }
}

/// Core switch configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwitchConfig {
    // --- Wiring ---
    /// GPIO driving select line 0
    pub select0_gpio: i32,
    /// GPIO driving select line 1
    pub select1_gpio: i32,

    // --- Verification ---
    pub verify: VerifyPolicy,

    // --- Boot ---
    /// Level applied to select line 0 after init (false = connector 0)
    pub default_select0: bool,
    /// Level applied to select line 1 after init (false = connector 0)
    pub default_select1: bool,
}

impl Default for SwitchConfig {
    fn default() -> Self {
        Self {
            select0_gpio: pins::JTAG_SELECT0_GPIO,
            select1_gpio: pins::JTAG_SELECT1_GPIO,
            verify: VerifyPolicy::default(),
            default_select0: false,
            default_select1: false,
        }
    }
}

/// Errors from [`SwitchConfig::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The stored document could not be decoded.
    Malformed,
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Malformed => write!(f, "config malformed"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl SwitchConfig {
    /// Decode a JSON config document and validate it.
    ///
    /// Missing fields are an error; there is no partial overlay on defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json).map_err(|_| ConfigError::Malformed)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject wiring or defaults that could never be applied safely.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.select0_gpio < 0 || self.select1_gpio < 0 {
            return Err(ConfigError::ValidationFailed("select GPIO must be non-negative"));
        }
        if self.select0_gpio == self.select1_gpio {
            return Err(ConfigError::ValidationFailed("select lines share a GPIO"));
        }
        if self.default_select0 && self.default_select1 {
            return Err(ConfigError::ValidationFailed(
                "boot defaults select connector 1 on both lines",
            ));
        }
        Ok(())
    }

    /// Boot default for a line.
    pub fn default_for(&self, line: LineId) -> bool {
        match line {
            LineId::Select0 => self.default_select0,
            LineId::Select1 => self.default_select1,
        }
    }
}
