use reldb_release::{AssetMetadata, ReleaseMetadata};
use serde::Deserialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// The subset of the GitHub release payload that gets recorded.
#[derive(Debug, Deserialize)]
pub(crate) struct GitHubRelease {
    pub id: u64,
    pub tag_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    /// Decoded one by one so a single odd asset doesn't cost the release.
    #[serde(default)]
    pub assets: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GitHubAsset {
    pub name: String,
    pub browser_download_url: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}
impl From<GitHubAsset> for AssetMetadata {
    fn from(asset: GitHubAsset) -> Self {
        Self {
            name: asset.name,
            download_url: asset.browser_download_url,
            size: asset.size,
            created_at: timestamp(asset.created_at.as_deref()),
            updated_at: timestamp(asset.updated_at.as_deref()),
        }
    }
}

impl GitHubRelease {
    pub(crate) fn into_metadata(self) -> ReleaseMetadata {
        let tag_name = self.tag_name;
        let assets = self
            .assets
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<GitHubAsset>(value) {
                Ok(asset) => Some(AssetMetadata::from(asset)),
                Err(err) => {
                    tracing::warn!(tag = %tag_name, error = %err, "Skipping malformed asset");
                    None
                },
            })
            .collect();
        let name = match self.name {
            Some(name) if !name.trim().is_empty() => name,
            _ => tag_name.clone(),
        };
        ReleaseMetadata {
            id: self.id,
            name,
            published_at: timestamp(self.published_at.as_deref()),
            created_at: timestamp(self.created_at.as_deref()),
            body: self.body,
            prerelease: self.prerelease,
            assets,
            tag_name,
        }
    }
}

fn timestamp(value: Option<&str>) -> Option<OffsetDateTime> {
    let value = value?;
    match OffsetDateTime::parse(value, &Rfc3339) {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::debug!(value, "Ignoring unparsable timestamp");
            None
        },
    }
}
