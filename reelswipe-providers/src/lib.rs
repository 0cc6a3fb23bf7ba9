//! Upstream video providers behind one search interface.
//!
//! Each adapter turns a [`SearchQuery`] into a single provider-specific GET,
//! decodes the provider's JSON and maps it into [`NormalizedItem`]s. A failed
//! call is reported once; nothing is retried.
//!
//! # Examples
//! ```no_run
//! use reelswipe_config::ReelSwipeConfig;
//! use reelswipe_common::ProviderKind;
//! use reelswipe_providers::{ProviderSet, SearchQuery};
//!
//! # async fn demo() -> Result<(), reelswipe_providers::ProviderError> {
//! let providers = ProviderSet::from_config(&ReelSwipeConfig::default())?;
//! let query = SearchQuery::from_params(ProviderKind::Reddit, Some("aww"), Some("5"), None);
//! let page = providers.get(ProviderKind::Reddit).search(&query).await?;
//! println!("{} reddit videos", page.items.len());
//! # Ok(()) }
//! ```
//!
//! [`NormalizedItem`]: reelswipe_common::NormalizedItem
pub mod pexels;
pub mod pixabay;
pub mod query;
pub mod reddit;
pub mod youtube;

use async_trait::async_trait;
use reelswipe_common::{ProviderKind, SearchPage};
use reelswipe_config::{HttpConfig, ReelSwipeConfig};
use reelswipe_http::{HttpClient, HttpError};
use std::sync::Arc;
use std::time::Duration;

pub use pexels::PexelsProvider;
pub use pixabay::PixabayProvider;
pub use query::SearchQuery;
pub use reddit::RedditProvider;
pub use youtube::YoutubeProvider;

#[derive(thiserror::Error, Debug)]
pub enum ProviderError {
    /// The provider needs a key and none was configured.
    #[error("{0} API key is not configured")]
    MissingApiKey(ProviderKind),

    #[error(transparent)]
    Http(#[from] HttpError),

    /// Structured error body returned by the upstream API, kept verbatim.
    #[error("upstream error: {0}")]
    Upstream(serde_json::Value),

    #[error("unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    Url(String),
}

/// One upstream content source.
#[async_trait]
pub trait VideoProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Run a single search against the upstream API.
    async fn search(&self, query: &SearchQuery) -> Result<SearchPage, ProviderError>;
}

/// The four adapters the router dispatches to.
#[derive(Clone)]
pub struct ProviderSet {
    youtube: Arc<dyn VideoProvider>,
    pexels: Arc<dyn VideoProvider>,
    pixabay: Arc<dyn VideoProvider>,
    reddit: Arc<dyn VideoProvider>,
}

impl ProviderSet {
    pub fn new(
        youtube: Arc<dyn VideoProvider>,
        pexels: Arc<dyn VideoProvider>,
        pixabay: Arc<dyn VideoProvider>,
        reddit: Arc<dyn VideoProvider>,
    ) -> Self {
        Self {
            youtube,
            pexels,
            pixabay,
            reddit,
        }
    }

    /// Build every adapter from loaded configuration.
    ///
    /// Missing API keys are not an error here; the affected provider reports
    /// [`ProviderError::MissingApiKey`] when searched.
    pub fn from_config(cfg: &ReelSwipeConfig) -> Result<Self, ProviderError> {
        let p = &cfg.providers;
        let youtube = YoutubeProvider::new(
            http_client(&p.youtube.base_url, &cfg.http)?,
            p.youtube.api_key.clone(),
        );
        let pexels = PexelsProvider::new(
            http_client(&p.pexels.base_url, &cfg.http)?,
            p.pexels.api_key.clone(),
        );
        let pixabay = PixabayProvider::new(
            http_client(&p.pixabay.base_url, &cfg.http)?,
            p.pixabay.api_key.clone(),
        );
        let reddit = RedditProvider::new(
            http_client(&p.reddit.base_url, &cfg.http)?,
            p.reddit.user_agent.clone(),
        );

        for kind in ProviderKind::ALL {
            tracing::debug!(provider = %kind, "providers.configured");
        }

        Ok(Self::new(
            Arc::new(youtube),
            Arc::new(pexels),
            Arc::new(pixabay),
            Arc::new(reddit),
        ))
    }

    pub fn get(&self, kind: ProviderKind) -> &Arc<dyn VideoProvider> {
        match kind {
            ProviderKind::YouTube => &self.youtube,
            ProviderKind::Pexels => &self.pexels,
            ProviderKind::Pixabay => &self.pixabay,
            ProviderKind::Reddit => &self.reddit,
        }
    }
}

fn http_client(base: &str, http: &HttpConfig) -> Result<HttpClient, ProviderError> {
    Ok(HttpClient::new(base)?.with_timeout(http.timeout_secs.map(Duration::from_secs)))
}

/// Configured key, unless it is blank.
pub(crate) fn usable_key(kind: ProviderKind, key: Option<&str>) -> Result<&str, ProviderError> {
    match key.map(str::trim) {
        Some(k) if !k.is_empty() => Ok(k),
        _ => Err(ProviderError::MissingApiKey(kind)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_keys_are_missing() {
        assert!(matches!(
            usable_key(ProviderKind::Pexels, Some("   ")),
            Err(ProviderError::MissingApiKey(ProviderKind::Pexels))
        ));
        assert!(usable_key(ProviderKind::Pexels, None).is_err());
        assert_eq!(usable_key(ProviderKind::Pexels, Some(" k ")).unwrap(), "k");
    }

    #[test]
    fn missing_key_message_names_provider() {
        let err = ProviderError::MissingApiKey(ProviderKind::YouTube);
        assert_eq!(err.to_string(), "YouTube API key is not configured");
    }

    #[test]
    fn http_section_sets_only_the_timeout() {
        let client = http_client("https://pixabay.com", &HttpConfig::default()).unwrap();
        assert_eq!(client.timeout(), None);

        let cfg = HttpConfig {
            timeout_secs: Some(4),
        };
        let client = http_client("https://pixabay.com", &cfg).unwrap();
        assert_eq!(client.timeout(), Some(Duration::from_secs(4)));
    }

    #[test]
    fn set_routes_each_kind_to_its_adapter() {
        let set = ProviderSet::from_config(&ReelSwipeConfig::default()).unwrap();
        for kind in ProviderKind::ALL {
            assert_eq!(set.get(kind).kind(), kind);
        }
    }
}
