use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{Arch, AssetMetadata, Graphics, Platform, Sounds};
use crate::classify::{Classification, classify};

/// One downloadable file attached to a release, with its classification.
///
/// The four classification fields are a pure function of `name`; use
/// [`reclassify()`](Self::reclassify) rather than setting them by hand.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetRecord {
    pub name: String,
    pub size: u64,
    pub download_url: String,
    pub platform: Platform,
    pub arch: Arch,
    pub graphics: Graphics,
    pub sounds: Sounds,
    #[serde(with = "super::timestamp")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(with = "super::timestamp")]
    pub updated_at: Option<OffsetDateTime>,
}
impl AssetRecord {
    pub fn from_metadata(metadata: AssetMetadata) -> Self {
        let mut asset = Self {
            name: metadata.name,
            size: metadata.size,
            download_url: metadata.download_url,
            created_at: metadata.created_at,
            updated_at: metadata.updated_at,
            ..Default::default()
        };
        asset.reclassify();
        asset
    }

    pub fn classification(&self) -> Classification {
        Classification {
            platform: self.platform,
            arch: self.arch,
            graphics: self.graphics,
            sounds: self.sounds,
        }
    }

    /// Recompute the classification from the asset name, returning `true` if
    /// any field changed.
    pub fn reclassify(&mut self) -> bool {
        let fresh = classify(&self.name);
        if fresh == self.classification() {
            return false;
        }
        self.platform = fresh.platform;
        self.arch = fresh.arch;
        self.graphics = fresh.graphics;
        self.sounds = fresh.sounds;
        true
    }
}
