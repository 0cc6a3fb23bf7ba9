//! YouTube Data API v3 search adapter.
//!
//! Unlike the other adapters, a structured upstream error (any body with an
//! `error` key, whatever the status) is returned verbatim as
//! [`ProviderError::Upstream`] so the route can hand it back unchanged.
use crate::{ProviderError, SearchQuery, VideoProvider, usable_key};
use async_trait::async_trait;
use reelswipe_common::{MediaRef, NormalizedItem, ProviderKind, SearchPage};
use reelswipe_http::{Auth, HttpClient, RequestOpts};
use serde::Deserialize;
use serde_json::Value;
use std::time::Instant;

const SEARCH_PATH: &str = "youtube/v3/search";
const SHORTS_BASE: &str = "https://www.youtube.com/shorts/";
const FALLBACK_TITLE: &str = "YouTube Video";

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    items: Option<Vec<SearchItem>>,
    #[serde(default, rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    id: Option<ItemId>,
    #[serde(default)]
    snippet: Option<Snippet>,
}

#[derive(Debug, Deserialize)]
struct ItemId {
    #[serde(default, rename = "videoId")]
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    thumbnails: Option<Thumbnails>,
}

#[derive(Debug, Deserialize)]
struct Thumbnails {
    #[serde(default)]
    high: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    #[serde(default)]
    url: Option<String>,
}

pub(crate) fn map_response(resp: SearchResponse) -> SearchPage {
    let items = resp
        .items
        .unwrap_or_default()
        .into_iter()
        .map(|item| {
            let video_id = item.id.and_then(|id| id.video_id).unwrap_or_default();
            let (title, thumb) = match item.snippet {
                Some(s) => (
                    s.title,
                    s.thumbnails.and_then(|t| t.high).and_then(|h| h.url),
                ),
                None => (None, None),
            };
            let title = title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| FALLBACK_TITLE.to_string());

            NormalizedItem::new(ProviderKind::YouTube, title)
                .with_link(format!("{SHORTS_BASE}{video_id}"))
                .with_media(MediaRef::VideoId(video_id))
                .with_thumb(thumb.unwrap_or_default())
        })
        .collect();

    SearchPage {
        items,
        next_page_token: resp.next_page_token.filter(|t| !t.is_empty()),
    }
}

#[derive(Clone)]
pub struct YoutubeProvider {
    http: HttpClient,
    api_key: Option<String>,
}

impl YoutubeProvider {
    pub fn new(http: HttpClient, api_key: Option<String>) -> Self {
        Self { http, api_key }
    }
}

#[async_trait]
impl VideoProvider for YoutubeProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::YouTube
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchPage, ProviderError> {
        let key = usable_key(self.kind(), self.api_key.as_deref())?;

        let mut params: Vec<(&str, std::borrow::Cow<'_, str>)> = vec![
            ("part", "snippet".into()),
            ("type", "video".into()),
            ("maxResults", query.count.to_string().into()),
            ("q", query.term.as_str().into()),
        ];
        if let Some(token) = &query.cursor {
            params.push(("pageToken", token.as_str().into()));
        }

        let started = Instant::now();
        tracing::debug!(
            target: "provider.youtube",
            q = %query.term,
            max = query.count,
            has_page_token = query.cursor.is_some(),
            "youtube.search.start"
        );

        let body: Value = self
            .http
            .get_json(
                SEARCH_PATH,
                RequestOpts {
                    auth: Some(Auth::Query {
                        name: "key",
                        value: key.into(),
                    }),
                    query: Some(params),
                    accept_error_status: true,
                    ..Default::default()
                },
            )
            .await?;

        if body.get("error").is_some() {
            tracing::warn!(
                target: "provider.youtube",
                q = %query.term,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "youtube.search.upstream_error"
            );
            return Err(ProviderError::Upstream(body));
        }

        let page = map_response(serde_json::from_value(body)?);
        tracing::info!(
            target: "provider.youtube",
            q = %query.term,
            item_count = page.items.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "youtube.search.success"
        );
        Ok(page)
    }
}
