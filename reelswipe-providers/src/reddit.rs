//! Reddit "hot" listing adapter. Public JSON, no key, native videos only.
use crate::{ProviderError, SearchQuery, VideoProvider};
use async_trait::async_trait;
use reelswipe_common::{MediaRef, NormalizedItem, ProviderKind, SearchPage};
use reelswipe_http::{HttpClient, RequestOpts};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use std::time::Instant;
use url::Url;

const WEB_BASE: &str = "https://www.reddit.com";
const FALLBACK_TITLE: &str = "Reddit Video";

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Listing {
    #[serde(default)]
    data: Option<ListingData>,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Option<Vec<Child>>,
}

#[derive(Debug, Deserialize)]
struct Child {
    #[serde(default)]
    data: Option<Post>,
}

#[derive(Debug, Deserialize)]
struct Post {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    is_video: Option<bool>,
    #[serde(default)]
    media: Option<Media>,
    #[serde(default)]
    thumbnail: Option<String>,
    #[serde(default)]
    permalink: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Media {
    #[serde(default)]
    reddit_video: Option<RedditVideo>,
}

#[derive(Debug, Deserialize)]
struct RedditVideo {
    #[serde(default)]
    fallback_url: Option<String>,
}

impl Post {
    /// Fallback media URL of a native Reddit video, if this post is one.
    fn native_video_url(&self) -> Option<&str> {
        if self.is_video != Some(true) {
            return None;
        }
        self.media
            .as_ref()?
            .reddit_video
            .as_ref()?
            .fallback_url
            .as_deref()
            .filter(|u| !u.is_empty())
    }
}

pub(crate) fn map_listing(listing: Listing) -> Vec<NormalizedItem> {
    listing
        .data
        .and_then(|d| d.children)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|c| c.data)
        .filter_map(|post| {
            let video_url = post.native_video_url()?.to_string();
            // Reddit uses placeholders such as "self", "default" or "nsfw".
            let thumb = post
                .thumbnail
                .filter(|t| t.starts_with("http"))
                .unwrap_or_default();
            let title = post
                .title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| FALLBACK_TITLE.to_string());
            let link = format!("{WEB_BASE}{}", post.permalink.unwrap_or_default());

            Some(
                NormalizedItem::new(ProviderKind::Reddit, title)
                    .with_media(MediaRef::VideoUrl(video_url))
                    .with_thumb(thumb)
                    .with_link(link),
            )
        })
        .collect()
}

/// `<base>/r/<subreddit>/hot.json`, with the subreddit percent-encoded as one segment.
fn hot_listing_url(base: &Url, subreddit: &str) -> Result<Url, ProviderError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ProviderError::Url(format!("{base} cannot be a base URL")))?
        .pop_if_empty()
        .extend(["r", subreddit, "hot.json"]);
    Ok(url)
}

#[derive(Clone)]
pub struct RedditProvider {
    http: HttpClient,
    user_agent: String,
}

impl RedditProvider {
    pub fn new(http: HttpClient, user_agent: String) -> Self {
        Self { http, user_agent }
    }
}

#[async_trait]
impl VideoProvider for RedditProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Reddit
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchPage, ProviderError> {
        let url = hot_listing_url(self.http.base(), &query.term)?;

        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.user_agent)
                .map_err(|e| ProviderError::Url(format!("invalid user agent: {e}")))?,
        );

        let started = Instant::now();
        tracing::debug!(
            target: "provider.reddit",
            subreddit = %query.term,
            limit = query.count,
            "reddit.search.start"
        );

        let listing: Listing = self
            .http
            .get_json(
                url.as_str(),
                RequestOpts {
                    headers: Some(headers),
                    query: Some(vec![("limit", query.count.to_string().into())]),
                    allow_absolute: true,
                    ..Default::default()
                },
            )
            .await?;

        let items = map_listing(listing);
        tracing::info!(
            target: "provider.reddit",
            subreddit = %query.term,
            item_count = items.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "reddit.search.success"
        );
        Ok(SearchPage::new(items))
    }
}
