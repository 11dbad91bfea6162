use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use super::sanitize;
use crate::error::{Error, ErrorKind};

/// Operating system an asset is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Platform {
    Windows,
    Linux,
    MacOs,
    Android,
    #[default]
    Unknown,
}
impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::Linux => "linux",
            Platform::MacOs => "macos",
            Platform::Android => "android",
            Platform::Unknown => "unknown",
        }
    }
}
impl FromStr for Platform {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match sanitize(s).as_str() {
            "windows" | "win" => Self::Windows,
            "linux" => Self::Linux,
            "macos" | "osx" | "mac" => Self::MacOs,
            "android" => Self::Android,
            "unknown" => Self::Unknown,
            _ => exn::bail!(ErrorKind::ParseError {
                field: "platform",
                value: s.to_string(),
            }),
        })
    }
}
impl Display for Platform {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}
label_serde!(Platform);
