use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use super::sanitize;
use crate::error::{Error, ErrorKind};

/// Rendering front-end of a game build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Graphics {
    Tiles,
    Ascii,
    #[default]
    Unknown,
}
impl Graphics {
    pub fn as_str(&self) -> &'static str {
        match self {
            Graphics::Tiles => "tiles",
            Graphics::Ascii => "ascii",
            Graphics::Unknown => "unknown",
        }
    }
}
impl FromStr for Graphics {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match sanitize(s).as_str() {
            "tiles" | "graphics" | "graphical" => Self::Tiles,
            "ascii" | "curses" => Self::Ascii,
            "unknown" => Self::Unknown,
            _ => exn::bail!(ErrorKind::ParseError {
                field: "graphics",
                value: s.to_string(),
            }),
        })
    }
}
impl Display for Graphics {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}
label_serde!(Graphics);
