//! Pixabay Videos search adapter.
use crate::{ProviderError, SearchQuery, VideoProvider, usable_key};
use async_trait::async_trait;
use reelswipe_common::{MediaRef, NormalizedItem, ProviderKind, SearchPage};
use reelswipe_http::{Auth, HttpClient, RequestOpts};
use serde::Deserialize;
use std::time::Instant;

const SEARCH_PATH: &str = "api/videos/";

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    hits: Option<Vec<Hit>>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(default)]
    videos: Option<Variants>,
    #[serde(default, rename = "userImageURL")]
    user_image_url: Option<String>,
    #[serde(default, rename = "pageURL")]
    page_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Variants {
    #[serde(default)]
    medium: Option<Variant>,
    #[serde(default)]
    small: Option<Variant>,
    #[serde(default)]
    tiny: Option<Variant>,
}

#[derive(Debug, Deserialize)]
struct Variant {
    #[serde(default)]
    url: Option<String>,
}

impl Variants {
    /// medium, then small, then tiny; the first variant present wins.
    fn preferred(self) -> Option<Variant> {
        self.medium.or(self.small).or(self.tiny)
    }
}

pub(crate) fn map_response(term: &str, resp: SearchResponse) -> Vec<NormalizedItem> {
    resp.hits
        .unwrap_or_default()
        .into_iter()
        .map(|h| {
            let video_url = h
                .videos
                .and_then(Variants::preferred)
                .and_then(|v| v.url)
                .unwrap_or_default();

            NormalizedItem::new(ProviderKind::Pixabay, format!("Pixabay: {term}"))
                .with_media(MediaRef::VideoUrl(video_url))
                .with_thumb(h.user_image_url.unwrap_or_default())
                .with_link(h.page_url.unwrap_or_default())
        })
        .collect()
}

#[derive(Clone)]
pub struct PixabayProvider {
    http: HttpClient,
    api_key: Option<String>,
}

impl PixabayProvider {
    pub fn new(http: HttpClient, api_key: Option<String>) -> Self {
        Self { http, api_key }
    }
}

#[async_trait]
impl VideoProvider for PixabayProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Pixabay
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchPage, ProviderError> {
        let key = usable_key(self.kind(), self.api_key.as_deref())?;
        let started = Instant::now();
        tracing::debug!(
            target: "provider.pixabay",
            q = %query.term,
            per_page = query.count,
            "pixabay.search.start"
        );

        let resp: SearchResponse = self
            .http
            .get_json(
                SEARCH_PATH,
                RequestOpts {
                    auth: Some(Auth::Query {
                        name: "key",
                        value: key.into(),
                    }),
                    query: Some(vec![
                        ("q", query.term.as_str().into()),
                        ("per_page", query.count.to_string().into()),
                    ]),
                    ..Default::default()
                },
            )
            .await?;

        let items = map_response(&query.term, resp);
        tracing::info!(
            target: "provider.pixabay",
            q = %query.term,
            item_count = items.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "pixabay.search.success"
        );
        Ok(SearchPage::new(items))
    }
}
