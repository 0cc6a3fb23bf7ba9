mod common;

use reelswipe_common::{MediaRef, ProviderKind};
use reelswipe_config::ReelSwipeConfig;
use reelswipe_http::{HttpClient, HttpError};
use reelswipe_providers::{
    PexelsProvider, PixabayProvider, ProviderError, ProviderSet, RedditProvider, SearchQuery,
    VideoProvider, YoutubeProvider,
};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> HttpClient {
    HttpClient::new(&server.uri()).expect("mock base url")
}

fn query(kind: ProviderKind, term: &str, count: &str, cursor: Option<&str>) -> SearchQuery {
    SearchQuery::from_params(kind, Some(term), Some(count), cursor)
}

#[tokio::test]
async fn youtube_sends_expected_params_and_maps_items() -> anyhow::Result<()> {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/youtube/v3/search"))
        .and(query_param("part", "snippet"))
        .and(query_param("type", "video"))
        .and(query_param("maxResults", "25"))
        .and(query_param("q", "cats"))
        .and(query_param("key", "yt-key"))
        .and(query_param("pageToken", "NEXT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "nextPageToken": "AFTER",
            "items": [{
                "id": { "videoId": "v1" },
                "snippet": { "title": "cat", "thumbnails": { "high": { "url": "https://i/1.jpg" } } }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let yt = YoutubeProvider::new(client(&server), Some("yt-key".into()));
    let page = yt
        .search(&query(ProviderKind::YouTube, "cats", "100", Some("NEXT")))
        .await?;

    assert_eq!(page.next_page_token.as_deref(), Some("AFTER"));
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].media, MediaRef::VideoId("v1".into()));
    assert_eq!(page.items[0].link, "https://www.youtube.com/shorts/v1");
    Ok(())
}

#[tokio::test]
async fn youtube_omits_page_token_when_absent() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/youtube/v3/search"))
        .and(query_param_is_missing("pageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let yt = YoutubeProvider::new(client(&server), Some("yt-key".into()));
    let page = yt
        .search(&query(ProviderKind::YouTube, "cats", "5", None))
        .await?;
    assert!(page.items.is_empty());
    assert_eq!(page.next_page_token, None);
    Ok(())
}

#[tokio::test]
async fn youtube_error_body_is_passed_through_verbatim() {
    let server = MockServer::start().await;
    let upstream = json!({
        "error": {
            "code": 403,
            "message": "The request cannot be completed because you have exceeded your quota.",
            "errors": [{ "reason": "quotaExceeded", "domain": "youtube.quota" }]
        }
    });
    Mock::given(method("GET"))
        .and(path("/youtube/v3/search"))
        .respond_with(ResponseTemplate::new(403).set_body_json(upstream.clone()))
        .mount(&server)
        .await;

    let yt = YoutubeProvider::new(client(&server), Some("yt-key".into()));
    let err = yt
        .search(&query(ProviderKind::YouTube, "cats", "5", None))
        .await
        .unwrap_err();

    match err {
        ProviderError::Upstream(body) => assert_eq!(body, upstream),
        other => panic!("expected upstream passthrough, got {other:?}"),
    }
}

#[tokio::test]
async fn youtube_error_body_keeps_key_order() {
    let server = MockServer::start().await;
    let raw = r#"{"error":{"code":400,"message":"bad","errors":[],"status":"INVALID_ARGUMENT"}}"#;
    Mock::given(method("GET"))
        .and(path("/youtube/v3/search"))
        .respond_with(ResponseTemplate::new(400).set_body_raw(raw, "application/json"))
        .mount(&server)
        .await;

    let yt = YoutubeProvider::new(client(&server), Some("yt-key".into()));
    let err = yt
        .search(&query(ProviderKind::YouTube, "cats", "5", None))
        .await
        .unwrap_err();

    match err {
        ProviderError::Upstream(body) => assert_eq!(serde_json::to_string(&body).unwrap(), raw),
        other => panic!("expected upstream passthrough, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_key_fails_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let yt = YoutubeProvider::new(client(&server), None);
    let err = yt
        .search(&query(ProviderKind::YouTube, "cats", "5", None))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::MissingApiKey(ProviderKind::YouTube)));

    let px = PexelsProvider::new(client(&server), Some(" ".into()));
    let err = px
        .search(&query(ProviderKind::Pexels, "cats", "5", None))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::MissingApiKey(ProviderKind::Pexels)));
}

#[tokio::test]
async fn pexels_uses_authorization_header() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/videos/search"))
        .and(header("authorization", "px-key"))
        .and(query_param("query", "nature"))
        .and(query_param("per_page", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "videos": [{
                "url": "https://www.pexels.com/video/9/",
                "image": "https://images.pexels.com/9.jpg",
                "user": { "name": "Lee" },
                "video_files": [
                    { "quality": "hd", "link": "https://cdn/hd.mp4" },
                    { "quality": "sd", "link": "https://cdn/sd.mp4" }
                ]
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let px = PexelsProvider::new(client(&server), Some("px-key".into()));
    let page = px
        .search(&SearchQuery::from_params(ProviderKind::Pexels, None, Some("21"), None))
        .await?;

    assert_eq!(page.items[0].title, "nature by Lee");
    assert_eq!(page.items[0].media.as_str(), "https://cdn/sd.mp4");
    assert_eq!(page.next_page_token, None);
    Ok(())
}

#[tokio::test]
async fn pixabay_sends_key_and_maps_title() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/videos/"))
        .and(query_param("key", "pb-key"))
        .and(query_param("q", "travel"))
        .and(query_param("per_page", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 1,
            "hits": [{
                "pageURL": "https://pixabay.com/videos/id-5/",
                "userImageURL": "",
                "videos": { "small": { "url": "https://cdn/s.mp4" } }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let pb = PixabayProvider::new(client(&server), Some("pb-key".into()));
    let page = pb
        .search(&SearchQuery::from_params(ProviderKind::Pixabay, Some("  "), None, None))
        .await?;

    assert_eq!(page.items[0].title, "Pixabay: travel");
    assert_eq!(page.items[0].media.as_str(), "https://cdn/s.mp4");
    assert_eq!(page.items[0].thumb, "");
    Ok(())
}

#[tokio::test]
async fn upstream_failure_status_is_an_http_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/videos/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let pb = PixabayProvider::new(client(&server), Some("pb-key".into()));
    let err = pb
        .search(&query(ProviderKind::Pixabay, "travel", "5", None))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Http(HttpError::Api { .. })));
}

#[tokio::test]
async fn reddit_fetches_hot_listing_with_user_agent() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/aww/hot.json"))
        .and(query_param("limit", "25"))
        .and(header("user-agent", "ReelSwipe/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "kind": "Listing",
            "data": { "children": [
                { "kind": "t3", "data": {
                    "title": "puppy",
                    "is_video": true,
                    "media": { "reddit_video": { "fallback_url": "https://v.redd.it/p/DASH_480.mp4" } },
                    "thumbnail": "https://thumbs/p.jpg",
                    "permalink": "/r/aww/comments/p/puppy/"
                }},
                { "kind": "t3", "data": {
                    "title": "image post",
                    "is_video": false,
                    "media": null,
                    "thumbnail": "default",
                    "permalink": "/r/aww/comments/q/image/"
                }}
            ]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let rd = RedditProvider::new(client(&server), "ReelSwipe/1.0".into());
    let page = rd
        .search(&query(ProviderKind::Reddit, " aww ", "30", None))
        .await?;

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].title, "puppy");
    assert_eq!(
        page.items[0].link,
        "https://www.reddit.com/r/aww/comments/p/puppy/"
    );
    Ok(())
}

#[tokio::test]
async fn provider_set_honours_configured_base_urls() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/videos/hot.json"))
        .and(query_param("limit", "10"))
        .and(header("user-agent", "custom-agent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "children": [] } })))
        .expect(1)
        .mount(&server)
        .await;

    let mut cfg = ReelSwipeConfig::default();
    cfg.providers.reddit.base_url = server.uri();
    cfg.providers.reddit.user_agent = "custom-agent".into();

    let set = ProviderSet::from_config(&cfg)?;
    let page = set
        .get(ProviderKind::Reddit)
        .search(&SearchQuery::from_params(ProviderKind::Reddit, None, None, None))
        .await?;
    assert!(page.items.is_empty());
    Ok(())
}
