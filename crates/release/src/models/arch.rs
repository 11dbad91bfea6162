use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use super::sanitize;
use crate::error::{Error, ErrorKind};

/// CPU architecture an asset is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Arch {
    X32,
    X64,
    Arm32,
    Arm64,
    /// Runs on several architectures (fat binaries, bundles).
    Universal,
    #[default]
    Unknown,
}
impl Arch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::X32 => "x32",
            Arch::X64 => "x64",
            Arch::Arm32 => "arm32",
            Arch::Arm64 => "arm64",
            Arch::Universal => "universal",
            Arch::Unknown => "unknown",
        }
    }
}
impl FromStr for Arch {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match sanitize(s).as_str() {
            "x32" | "x86" | "i386" | "i686" => Self::X32,
            "x64" | "x8664" | "amd64" => Self::X64,
            "arm32" | "aarch32" | "armv7" => Self::Arm32,
            "arm64" | "aarch64" => Self::Arm64,
            "universal" => Self::Universal,
            "unknown" => Self::Unknown,
            _ => exn::bail!(ErrorKind::ParseError {
                field: "arch",
                value: s.to_string(),
            }),
        })
    }
}
impl Display for Arch {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}
label_serde!(Arch);
