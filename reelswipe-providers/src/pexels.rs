//! Pexels Videos search adapter.
use crate::{ProviderError, SearchQuery, VideoProvider, usable_key};
use async_trait::async_trait;
use reelswipe_common::{MediaRef, NormalizedItem, ProviderKind, SearchPage};
use reelswipe_http::{Auth, HttpClient, RequestOpts};
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use std::time::Instant;

const SEARCH_PATH: &str = "videos/search";
const PREFERRED_QUALITY: &str = "sd";

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    videos: Option<Vec<Video>>,
}

#[derive(Debug, Deserialize)]
struct Video {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    user: Option<User>,
    #[serde(default)]
    video_files: Option<Vec<VideoFile>>,
}

#[derive(Debug, Deserialize)]
struct User {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoFile {
    #[serde(default)]
    quality: Option<String>,
    #[serde(default)]
    link: Option<String>,
}

/// The `sd` file if there is one, else the first listed.
fn pick_file(files: &[VideoFile]) -> Option<&VideoFile> {
    files
        .iter()
        .find(|f| f.quality.as_deref() == Some(PREFERRED_QUALITY))
        .or_else(|| files.first())
}

pub(crate) fn map_response(term: &str, resp: SearchResponse) -> Vec<NormalizedItem> {
    resp.videos
        .unwrap_or_default()
        .into_iter()
        .map(|v| {
            let files = v.video_files.unwrap_or_default();
            let video_url = pick_file(&files)
                .and_then(|f| f.link.clone())
                .unwrap_or_default();
            let title = match v.user.and_then(|u| u.name).filter(|n| !n.is_empty()) {
                Some(name) => format!("{term} by {name}"),
                None => format!("{term} video"),
            };

            NormalizedItem::new(ProviderKind::Pexels, title)
                .with_media(MediaRef::VideoUrl(video_url))
                .with_thumb(v.image.unwrap_or_default())
                .with_link(v.url.unwrap_or_default())
        })
        .collect()
}

#[derive(Clone)]
pub struct PexelsProvider {
    http: HttpClient,
    api_key: Option<String>,
}

impl PexelsProvider {
    pub fn new(http: HttpClient, api_key: Option<String>) -> Self {
        Self { http, api_key }
    }
}

#[async_trait]
impl VideoProvider for PexelsProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Pexels
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchPage, ProviderError> {
        let key = usable_key(self.kind(), self.api_key.as_deref())?;
        let started = Instant::now();
        tracing::debug!(
            target: "provider.pexels",
            q = %query.term,
            per_page = query.count,
            "pexels.search.start"
        );

        let resp: SearchResponse = self
            .http
            .get_json(
                SEARCH_PATH,
                RequestOpts {
                    auth: Some(Auth::Header {
                        name: AUTHORIZATION,
                        value: key.into(),
                    }),
                    query: Some(vec![
                        ("query", query.term.as_str().into()),
                        ("per_page", query.count.to_string().into()),
                    ]),
                    ..Default::default()
                },
            )
            .await?;

        let items = map_response(&query.term, resp);
        tracing::info!(
            target: "provider.pexels",
            q = %query.term,
            item_count = items.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "pexels.search.success"
        );
        Ok(SearchPage::new(items))
    }
}
