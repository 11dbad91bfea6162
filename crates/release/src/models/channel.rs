use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Release channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    #[default]
    Stable,
    Experimental,
}
impl Channel {
    /// Prereleases are experimental, and so is anything whose name says so
    /// (nightly builds are often published as full releases).
    pub fn infer(name: &str, prerelease: bool) -> Self {
        if prerelease || name.to_lowercase().contains("experimental") {
            Self::Experimental
        } else {
            Self::Stable
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Stable => "stable",
            Channel::Experimental => "experimental",
        }
    }
}
impl Display for Channel {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.as_str())
    }
}
