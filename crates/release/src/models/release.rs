use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{AssetRecord, Channel, ReleaseMetadata};

/// One published release of a game, as stored in `{game}_releases.json`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseRecord {
    pub id: u64,
    pub name: String,
    /// Unique within one game's release list.
    pub tag_name: String,
    pub prerelease: bool,
    pub channel: Channel,
    /// Configured name of the game this release was fetched for.
    pub game_type: String,
    #[serde(with = "super::timestamp")]
    pub published_at: Option<OffsetDateTime>,
    #[serde(with = "super::timestamp")]
    pub created_at: Option<OffsetDateTime>,
    pub body: Option<String>,
    pub assets: Vec<AssetRecord>,
}
impl ReleaseRecord {
    /// Build a record from fetched metadata, classifying every asset.
    pub fn from_metadata(metadata: ReleaseMetadata, game_type: impl Into<String>) -> Self {
        Self {
            id: metadata.id,
            channel: Channel::infer(&metadata.name, metadata.prerelease),
            name: metadata.name,
            tag_name: metadata.tag_name,
            prerelease: metadata.prerelease,
            game_type: game_type.into(),
            published_at: metadata.published_at,
            created_at: metadata.created_at,
            body: metadata.body,
            assets: metadata.assets.into_iter().map(AssetRecord::from_metadata).collect(),
        }
    }

    /// Reclassify every asset in place. Returns how many assets changed.
    pub fn reclassify(&mut self) -> usize {
        self.assets.iter_mut().map(AssetRecord::reclassify).filter(|changed| *changed).count()
    }
}
