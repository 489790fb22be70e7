use axum::body::Body;
use axum::extract::{Query, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceExt;

use youtube_transcript_service::config::UpstreamConfig;
use youtube_transcript_service::server::{router, AppState};
use youtube_transcript_service::TranscriptPipeline;

const ROUTE: &str = "/api/transcript";

/// Canned behaviour of the fake video platform
struct FakePlatform {
    page_status: StatusCode,
    page_html: String,
    transcript: Value,
}

impl FakePlatform {
    fn healthy() -> Self {
        Self {
            page_status: StatusCode::OK,
            page_html: r#"<html><script>ytcfg.set({"INNERTUBE_API_KEY":"KEY123","INNERTUBE_CONTEXT":{"client":{"clientName":"WEB","clientVersion":"2.20240101.00.00"}}})</script></html>"#.to_string(),
            transcript: json!({
                "actions": [{
                    "updateEngagementPanelAction": {
                        "content": {
                            "transcriptRenderer": {
                                "content": {
                                    "transcriptSearchPanelRenderer": {
                                        "body": {
                                            "transcriptSegmentListRenderer": {
                                                "initialSegments": [
                                                    { "transcriptSegmentRenderer": { "startMs": "0", "endMs": "1500", "snippet": { "runs": [{ "text": "We're no strangers" }] } } },
                                                    { "transcriptSegmentRenderer": { "startMs": "1500", "endMs": "4200", "snippet": { "runs": [{ "text": "to love" }] } } },
                                                    { "transcriptSegmentRenderer": { "startMs": "4200", "endMs": "7000", "snippet": { "runs": [{ "text": "You know the rules" }] } } }
                                                ]
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }]
            }),
        }
    }
}

async fn watch_page(
    State(platform): State<Arc<FakePlatform>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let browser_like = headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map_or(false, |ua| ua.starts_with("Mozilla/5.0"));
    let has_language = headers.contains_key("accept-language");

    if !browser_like || !has_language || query.get("v").map(String::as_str) != Some("dQw4w9WgXcQ") {
        return (StatusCode::FORBIDDEN, "bot detected").into_response();
    }

    (platform.page_status, Html(platform.page_html.clone())).into_response()
}

async fn get_transcript(
    State(platform): State<Arc<FakePlatform>>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Response {
    if query.get("key").map(String::as_str) != Some("KEY123") {
        return (StatusCode::FORBIDDEN, "API key not valid").into_response();
    }

    let client = &body["context"]["client"];
    let well_formed = body["videoId"] == "dQw4w9WgXcQ"
        && client["clientVersion"] == "2.20240101.00.00"
        && client["clientName"] == "WEB"
        && client["hl"] == "en"
        && client["gl"] == "US"
        && client["mainAppWebInfo"]["graftUrl"] == "/watch?v=dQw4w9WgXcQ";
    if !well_formed {
        return (StatusCode::BAD_REQUEST, "bad request body").into_response();
    }

    Json(platform.transcript.clone()).into_response()
}

async fn spawn_platform(platform: FakePlatform) -> String {
    let app = Router::new()
        .route("/watch", get(watch_page))
        .route("/youtubei/v1/get_transcript", post(get_transcript))
        .with_state(Arc::new(platform));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

fn service(base_url: String) -> Router {
    let upstream = UpstreamConfig {
        base_url,
        ..UpstreamConfig::default()
    };
    let pipeline = TranscriptPipeline::new(&upstream).unwrap();
    router(AppState::new(pipeline), ROUTE)
}

async fn post_url(app: Router, url: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(ROUTE)
        .header("content-type", "application/json")
        .body(Body::from(json!({ "url": url }).to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_end_to_end_success() {
    let base_url = spawn_platform(FakePlatform::healthy()).await;
    let url = "https://www.youtube.com/watch?v=dQw4w9WgXcQ&list=RD";

    let (status, body) = post_url(service(base_url), url).await;

    assert_eq!(status, StatusCode::OK, "body: {}", body);
    assert_eq!(body["videoId"], "dQw4w9WgXcQ");
    assert_eq!(body["videoUrl"], url);

    let transcript = body["transcript"].as_array().unwrap();
    assert_eq!(transcript.len(), 3);
    assert_eq!(transcript[0]["text"], "We're no strangers");
    assert_eq!(transcript[1]["text"], "to love");
    assert_eq!(transcript[2]["text"], "You know the rules");
    assert_eq!(transcript[1]["start"], 1.5);
    assert_eq!(transcript[1]["duration"], 2.7);
}

#[tokio::test]
async fn test_watch_page_failure_reports_status() {
    let platform = FakePlatform {
        page_status: StatusCode::SERVICE_UNAVAILABLE,
        ..FakePlatform::healthy()
    };
    let base_url = spawn_platform(platform).await;

    let (status, body) = post_url(service(base_url), "https://youtu.be/dQw4w9WgXcQ").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to fetch video page: 503");
    assert_eq!(body["videoId"], "dQw4w9WgXcQ");
}

#[tokio::test]
async fn test_page_without_tokens_is_scrape_miss() {
    let platform = FakePlatform {
        page_html: "<html>Before you continue to YouTube</html>".to_string(),
        ..FakePlatform::healthy()
    };
    let base_url = spawn_platform(platform).await;

    let (status, body) = post_url(service(base_url), "https://youtu.be/dQw4w9WgXcQ").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Could not find API key");
}

#[tokio::test]
async fn test_rejected_key_reports_transcript_status() {
    let platform = FakePlatform {
        page_html: r#""INNERTUBE_API_KEY":"STALE","clientVersion":"2.20240101.00.00""#.to_string(),
        ..FakePlatform::healthy()
    };
    let base_url = spawn_platform(platform).await;

    let (status, body) = post_url(service(base_url), "https://www.youtube.com/embed/dQw4w9WgXcQ").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to fetch transcript list: 403");
    assert!(!body.to_string().contains("API key not valid"));
}

#[tokio::test]
async fn test_video_without_transcript() {
    let platform = FakePlatform {
        transcript: json!({ "responseContext": { "visitorData": "x" } }),
        ..FakePlatform::healthy()
    };
    let base_url = spawn_platform(platform).await;

    let (status, body) = post_url(service(base_url), "https://youtu.be/dQw4w9WgXcQ").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "No transcript data found (missing actions)");
}

#[tokio::test]
async fn test_unreachable_upstream_is_500() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let (status, body) = post_url(service(base_url), "https://youtu.be/dQw4w9WgXcQ").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Failed to fetch transcript. Please try again.");
    let error = body["error"].as_str().unwrap();
    assert!(error.starts_with("Request to upstream failed"));
    assert!(!error.contains("http://"), "upstream URL leaked: {}", error);
}
