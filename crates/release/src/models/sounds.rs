use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use super::sanitize;
use crate::error::{Error, ErrorKind};

/// Whether a build ships with a soundpack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Sounds {
    Sounds,
    #[default]
    Unknown,
}
impl Sounds {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sounds::Sounds => "sounds",
            Sounds::Unknown => "unknown",
        }
    }
}
impl FromStr for Sounds {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match sanitize(s).as_str() {
            "sounds" | "sound" => Self::Sounds,
            "unknown" => Self::Unknown,
            _ => exn::bail!(ErrorKind::ParseError {
                field: "sounds",
                value: s.to_string(),
            }),
        })
    }
}
impl Display for Sounds {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}
label_serde!(Sounds);
