//! Vendor dialects.
//!
//! A dialect bundles everything that differs between vendors: how paging is
//! disabled, how privilege is requested, and what the prompt looks like.
//! The behavior lives in a static table of [`DialectProfile`] records; the
//! session engine runs one generic algorithm over whichever record was
//! selected.

mod detect;
mod profile;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub use detect::{Detection, detect};
pub use profile::{DialectProfile, EchoStripMode, PrivilegeCommand};

/// Identifies a supported vendor CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectTag {
    /// Cisco IOS / IOS-XE / NX-OS style CLI.
    #[default]
    Cisco,
    /// Huawei VRP.
    Huawei,
}

impl DialectTag {
    /// Lower-case name used in configuration and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            DialectTag::Cisco => "cisco",
            DialectTag::Huawei => "huawei",
        }
    }

    /// The profile for this dialect.
    pub fn profile(&self) -> &'static DialectProfile {
        DialectProfile::get(*self)
    }
}

impl fmt::Display for DialectTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DialectTag {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cisco" => Ok(DialectTag::Cisco),
            "huawei" => Ok(DialectTag::Huawei),
            _ => Err(ConfigError::UnknownDialect { name: s.to_string() }),
        }
    }
}
