use time::OffsetDateTime;

/// Release metadata as handed over by a release source, before any
/// classification happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseMetadata {
    /// Numeric identifier assigned by the hosting service
    pub id: u64,
    /// Display name (sources fall back to the tag name when unnamed)
    pub name: String,
    pub tag_name: String,
    pub published_at: Option<OffsetDateTime>,
    pub created_at: Option<OffsetDateTime>,
    /// Release notes
    pub body: Option<String>,
    pub prerelease: bool,
    pub assets: Vec<AssetMetadata>,
}

/// One downloadable file attached to a [`ReleaseMetadata`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetMetadata {
    pub name: String,
    pub download_url: String,
    /// Size in bytes
    pub size: u64,
    pub created_at: Option<OffsetDateTime>,
    pub updated_at: Option<OffsetDateTime>,
}
