use std::fmt;
use std::str::FromStr;

use http::header::{HeaderName, InvalidHeaderName};

/// A header name as it was configured on a signer.
///
/// Lookups on messages are case-insensitive, but the spelling the integrator
/// used is kept so that error messages name the header the way it was given
/// (`Date header required` rather than `date header required`).
#[derive(Debug, Clone)]
pub struct ConfiguredHeader {
    name: HeaderName,
    label: String,
}

impl ConfiguredHeader {
    /// The normalized (lower-case) header name used for lookups.
    pub fn name(&self) -> &HeaderName {
        &self.name
    }
    /// The header name as originally configured.
    pub fn label(&self) -> &str {
        &self.label
    }
    /// The lower-case form folded into canonical messages.
    pub fn as_str(&self) -> &str {
        self.name.as_str()
    }
}

impl FromStr for ConfiguredHeader {
    type Err = InvalidHeaderName;
    fn from_str(s: &str) -> Result<ConfiguredHeader, Self::Err> {
        Ok(ConfiguredHeader {
            name: HeaderName::from_str(s)?,
            label: s.into(),
        })
    }
}

impl From<HeaderName> for ConfiguredHeader {
    fn from(other: HeaderName) -> Self {
        let label = other.as_str().into();
        ConfiguredHeader { name: other, label }
    }
}

impl PartialEq for ConfiguredHeader {
    fn eq(&self, other: &ConfiguredHeader) -> bool {
        self.name == other.name
    }
}

impl Eq for ConfiguredHeader {}

impl PartialEq<str> for ConfiguredHeader {
    fn eq(&self, other: &str) -> bool {
        self.name.as_str().eq_ignore_ascii_case(other)
    }
}

impl PartialEq<&str> for ConfiguredHeader {
    fn eq(&self, other: &&str) -> bool {
        *self == **other
    }
}

impl fmt::Display for ConfiguredHeader {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.label)
    }
}
