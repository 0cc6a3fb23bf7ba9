//! Common types and utilities shared across ReelSwipe crates.
//!
//! This crate defines the normalized item shape every provider adapter
//! produces, the provider catalogue with its per-provider constants, and the
//! observability helpers used by the binary and integration tests. It stays
//! dependency-light so every crate in the workspace can depend on it.
//!
//! # Overview
//!
//! - [`ProviderKind`]: the four upstream providers and their defaults/ceilings
//! - [`NormalizedItem`] and [`MediaRef`]: the shared output record
//! - [`SearchPage`]: one page of normalized items plus an optional cursor
//! - [`observability`]: centralised tracing/logging initialisation
//!
//! # Examples
//!
//! ```rust
//! use reelswipe_common::{MediaRef, NormalizedItem, ProviderKind};
//!
//! let item = NormalizedItem::new(ProviderKind::Pixabay, "Pixabay: travel")
//!     .with_media(MediaRef::VideoUrl("https://cdn.example/v.mp4".into()));
//! assert_eq!(item.platform, "Pixabay");
//! assert_eq!(item.category, "pixabay");
//! assert_eq!(ProviderKind::Pixabay.ceiling(), 20);
//! ```
use serde::{Deserialize, Serialize};

pub mod observability;

/// Result count used when the caller does not ask for one.
pub const DEFAULT_RESULT_COUNT: u32 = 10;

/// Smallest result count ever forwarded upstream.
pub const MIN_RESULT_COUNT: u32 = 1;

/// Upstream content providers known to the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    YouTube,
    Pexels,
    Pixabay,
    Reddit,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::YouTube,
        ProviderKind::Pexels,
        ProviderKind::Pixabay,
        ProviderKind::Reddit,
    ];

    /// Human-readable provider name, e.g. `"YouTube"`.
    pub fn platform(self) -> &'static str {
        match self {
            ProviderKind::YouTube => "YouTube",
            ProviderKind::Pexels => "Pexels",
            ProviderKind::Pixabay => "Pixabay",
            ProviderKind::Reddit => "Reddit",
        }
    }

    /// Lowercase key used by clients for filtering.
    pub fn category(self) -> &'static str {
        match self {
            ProviderKind::YouTube => "youtube",
            ProviderKind::Pexels => "pexels",
            ProviderKind::Pixabay => "pixabay",
            ProviderKind::Reddit => "reddit",
        }
    }

    /// Search term (or subreddit, for Reddit) used when the caller sends none.
    pub fn default_query(self) -> &'static str {
        match self {
            ProviderKind::YouTube => "trending shorts",
            ProviderKind::Pexels => "nature",
            ProviderKind::Pixabay => "travel",
            ProviderKind::Reddit => "videos",
        }
    }

    /// Hard upper bound on the number of results requested upstream.
    pub fn ceiling(self) -> u32 {
        match self {
            ProviderKind::YouTube | ProviderKind::Reddit => 25,
            ProviderKind::Pexels | ProviderKind::Pixabay => 20,
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.platform())
    }
}

/// Playable reference for an item: a platform video ID or a direct media URL.
///
/// Serialized flattened into the item as either `videoId` or `videoUrl`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaRef {
    #[serde(rename = "videoId")]
    VideoId(String),
    #[serde(rename = "videoUrl")]
    VideoUrl(String),
}

impl Default for MediaRef {
    fn default() -> Self {
        MediaRef::VideoUrl(String::new())
    }
}

impl MediaRef {
    pub fn as_str(&self) -> &str {
        match self {
            MediaRef::VideoId(s) | MediaRef::VideoUrl(s) => s,
        }
    }
}

/// Transient DTO produced by every provider adapter.
///
/// String fields are never null; missing upstream values become `""`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedItem {
    pub title: String,
    pub platform: String,
    pub category: String,
    #[serde(flatten)]
    pub media: MediaRef,
    pub thumb: String,
    pub link: String,
}

impl NormalizedItem {
    /// Start an item for `kind` with platform/category filled in.
    pub fn new(kind: ProviderKind, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            platform: kind.platform().to_string(),
            category: kind.category().to_string(),
            ..Default::default()
        }
    }

    pub fn with_media(mut self, media: MediaRef) -> Self {
        self.media = media;
        self
    }

    pub fn with_thumb(mut self, thumb: impl Into<String>) -> Self {
        self.thumb = thumb.into();
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = link.into();
        self
    }
}

/// One page of adapter output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPage {
    pub items: Vec<NormalizedItem>,
    /// Opaque cursor for the next page; only YouTube hands one back.
    pub next_page_token: Option<String>,
}

impl SearchPage {
    pub fn new(items: Vec<NormalizedItem>) -> Self {
        Self {
            items,
            next_page_token: None,
        }
    }
}
