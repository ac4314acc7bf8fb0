use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use http_body_util::{BodyExt, Full};
use hyper::{Method, Request, StatusCode, header};
use serde_json::{Value, json};

use mediagate_acl::{ControlPlane, SharedSecret};
use mediagate_config::Settings;
use mediagate_db::{FailureCounter, MemoryStore, Store};
use mediagate_error::{GateError, Result};
use mediagate_extract::{Extractor, FormatSummary, MediaInfo, MediaStream};
use mediagate_server::{AppState, ClientIp, route};

const SECRET: &str = "s3cret";

/// 호출 기록만 남기는 가짜 추출기
#[derive(Default)]
struct StubExtractor {
    extract_calls: AtomicUsize,
    last_format: Mutex<Option<String>>,
}

impl StubExtractor {
    fn extract_calls(&self) -> usize {
        self.extract_calls.load(Ordering::SeqCst)
    }

    fn last_format(&self) -> Option<String> {
        self.last_format.lock().unwrap().clone()
    }
}

#[async_trait]
impl Extractor for StubExtractor {
    async fn extract(&self, url: &str) -> Result<MediaInfo> {
        self.extract_calls.fetch_add(1, Ordering::SeqCst);
        if url.contains("broken") {
            return Err(GateError::Upstream("This video is unavailable.".to_string()));
        }
        Ok(MediaInfo {
            title: format!("title of {url}"),
            thumbnail: None,
            duration: Some(12.0),
            formats: vec![FormatSummary {
                format_id: "18".to_string(),
                ext: "mp4".to_string(),
                resolution: "360p".to_string(),
                filesize: "1.0 MiB".to_string(),
                note: "360p".to_string(),
                vcodec: "avc1".to_string(),
                acodec: "mp4a".to_string(),
            }],
        })
    }

    async fn direct_url(&self, _url: &str, format: &str) -> Result<String> {
        *self.last_format.lock().unwrap() = Some(format.to_string());
        Ok(format!("https://cdn.example/{format}"))
    }

    async fn stream(&self, _url: &str, format: &str) -> Result<MediaStream> {
        *self.last_format.lock().unwrap() = Some(format.to_string());
        let chunks = vec![Ok(Bytes::from_static(b"abc")), Ok(Bytes::from_static(b"def"))];
        Ok(futures::stream::iter(chunks).boxed())
    }
}

struct TestApp {
    state: AppState,
    store: Arc<MemoryStore>,
    extractor: Arc<StubExtractor>,
}

async fn app_with(password: Option<&str>) -> TestApp {
    let mut settings = Settings::default();
    settings.server.admin.password = password.map(str::to_string);
    app_from(settings).await
}

async fn app_from(settings: Settings) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let failures = Arc::new(FailureCounter::new());
    let control = Arc::new(ControlPlane::new(store.clone(), failures.clone()));
    control.init().await;

    let extractor = Arc::new(StubExtractor::default());
    let gate = Arc::new(SharedSecret::new(settings.server.admin.password.clone()));
    let state = AppState::new(settings, control, gate, extractor.clone(), failures);

    TestApp {
        state,
        store,
        extractor,
    }
}

async fn app() -> TestApp {
    app_with(Some(SECRET)).await
}

fn request(method: Method, uri: &str, body: Option<Value>, token: Option<&str>) -> Request<Full<Bytes>> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = body.map(|b| b.to_string()).unwrap_or_default();
    builder.body(Full::new(Bytes::from(body))).unwrap()
}

async fn call(
    app: &TestApp,
    method: Method,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let response = route(request(method, uri, body, token), app.state.clone())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn admin(app: &TestApp, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    call(app, method, uri, body, Some(SECRET)).await
}

#[tokio::test]
async fn blocked_lookup_is_not_logged_until_unblocked() {
    let app = app().await;
    let lookup = json!({ "url": "https://badsite.com/video/1" });

    let (status, _) = admin(&app, Method::POST, "/api/admin/blocked-domains", Some(json!({ "domain": "badsite.com" }))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = call(&app, Method::POST, "/api/get-data", Some(lookup.clone()), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Access to this website is blocked by the administrator.");
    assert_eq!(app.store.log_count(), 0);
    assert_eq!(app.extractor.extract_calls(), 0);

    let (status, _) = admin(&app, Method::DELETE, "/api/admin/blocked-domains", Some(json!({ "domain": "badsite.com" }))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(&app, Method::POST, "/api/get-data", Some(lookup), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "title of https://badsite.com/video/1");
    assert_eq!(app.extractor.extract_calls(), 1);

    let (status, logs) = admin(&app, Method::GET, "/api/admin/requests", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(logs.as_array().unwrap().len(), 1);
    assert_eq!(logs[0]["url"], "https://badsite.com/video/1");
}

#[tokio::test]
async fn admin_requires_bearer_secret() {
    let app = app().await;

    let (status, body) = call(&app, Method::GET, "/api/admin/blocked-domains", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "error": "Unauthorized" }));

    let (status, wrong) = call(&app, Method::GET, "/api/admin/blocked-domains", None, Some("nope")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong, body);

    let (status, _) = admin(&app, Method::GET, "/api/admin/blocked-domains", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn unconfigured_admin_is_distinguishable() {
    let app = app_with(None).await;

    for token in [None, Some("anything")] {
        let (status, body) = call(&app, Method::GET, "/api/admin/settings", None, token).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Admin not configured.");
    }

    let (status, body) = call(&app, Method::POST, "/api/admin/login", Some(json!({ "password": "" })), None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn login_checks_password() {
    let app = app().await;

    let (status, body) = call(&app, Method::POST, "/api/admin/login", Some(json!({ "password": SECRET })), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true }));

    let (status, body) = call(&app, Method::POST, "/api/admin/login", Some(json!({ "password": "wrong" })), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn blocklist_crud() {
    let app = app().await;
    let path = "/api/admin/blocked-domains";

    for _ in 0..2 {
        let (status, _) = admin(&app, Method::POST, path, Some(json!({ "domain": "dup.com" }))).await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (_, list) = admin(&app, Method::GET, path, None).await;
    assert_eq!(list, json!(["dup.com"]));

    let (status, _) = admin(&app, Method::DELETE, path, Some(json!({ "domain": "never.com" }))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = admin(&app, Method::POST, path, Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Domain is required.");
}

#[tokio::test]
async fn redirect_setting_round_trip() {
    let app = app().await;
    let path = "/api/admin/settings";

    let (_, original) = admin(&app, Method::GET, path, None).await;
    assert_eq!(original, json!({ "is_redirect_mode_enabled": false }));

    let (status, body) = admin(&app, Method::POST, path, Some(json!({ "is_redirect_mode_enabled": true }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "is_redirect_mode_enabled": true }));

    let (_, read_back) = admin(&app, Method::GET, path, None).await;
    assert_eq!(read_back["is_redirect_mode_enabled"], true);

    admin(&app, Method::POST, path, Some(json!({ "is_redirect_mode_enabled": false }))).await;
    let (_, read_back) = admin(&app, Method::GET, path, None).await;
    assert_eq!(read_back, original);

    let (status, _) = admin(&app, Method::POST, path, Some(json!({ "is_redirect_mode_enabled": "true" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn store_outage_fails_writes_and_degrades_reads() {
    let app = app().await;
    app.store.set_failing(true);

    let (status, body) = admin(&app, Method::POST, "/api/admin/blocked-domains", Some(json!({ "domain": "x.com" }))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Storage is unavailable.");

    let (status, logs) = admin(&app, Method::GET, "/api/admin/requests", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(logs, json!([]));

    // 기록 실패는 조회 응답에 영향 없음
    let (status, _) = call(&app, Method::POST, "/api/get-data", Some(json!({ "url": "https://ok.example/1" })), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, stats) = admin(&app, Method::GET, "/api/admin/stats", None).await;
    assert_eq!(stats["storeFailures"], 3);
}

#[tokio::test]
async fn lookup_validation_and_upstream_errors() {
    let app = app().await;

    let (status, _) = call(&app, Method::POST, "/api/get-data", Some(json!({ "url": "  " })), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(&app, Method::POST, "/api/get-data", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(&app, Method::POST, "/api/get-data", Some(json!({ "url": "https://broken.example/1" })), None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "This video is unavailable.");
}

#[tokio::test]
async fn metadata_is_cached_until_cleared() {
    let app = app().await;
    let lookup = json!({ "url": "https://v.example/1" });

    call(&app, Method::POST, "/api/get-data", Some(lookup.clone()), None).await;
    call(&app, Method::POST, "/api/get-data", Some(lookup.clone()), None).await;
    assert_eq!(app.extractor.extract_calls(), 1);
    assert_eq!(app.store.log_count(), 2);

    let (_, stats) = admin(&app, Method::GET, "/api/admin/stats", None).await;
    assert_eq!(stats["cacheSize"], 1);

    let (status, body) = admin(&app, Method::POST, "/api/admin/clear-cache", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Cache cleared.");

    call(&app, Method::POST, "/api/get-data", Some(lookup), None).await;
    assert_eq!(app.extractor.extract_calls(), 2);
}

#[tokio::test]
async fn get_url_honours_blocklist() {
    let app = app().await;
    admin(&app, Method::POST, "/api/admin/blocked-domains", Some(json!({ "domain": "badsite.com" }))).await;

    let (status, _) = call(&app, Method::POST, "/api/get-url", Some(json!({ "url": "https://badsite.com/v", "format_id": "18" })), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call(&app, Method::POST, "/api/get-url", Some(json!({ "url": "https://ok.example/v", "format_id": "18" })), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "direct_url": "https://cdn.example/18" }));
}

#[tokio::test]
async fn download_streams_or_redirects() {
    let app = app().await;
    let uri = "/api/download?url=https%3A%2F%2Fok.example%2Fv&format_id=137&title=My%20Clip&video_only=true";

    let response = route(request(Method::GET, uri, None, None), app.state.clone()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"My_Clip.mp4\""
    );
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"abcdef");
    assert_eq!(app.extractor.last_format().as_deref(), Some("137+bestaudio"));

    admin(&app, Method::POST, "/api/admin/settings", Some(json!({ "is_redirect_mode_enabled": true }))).await;
    let uri = "/api/download?url=https%3A%2F%2Fok.example%2Fv&format_id=22";
    let response = route(request(Method::GET, uri, None, None), app.state.clone()).await.unwrap();
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[header::LOCATION], "https://cdn.example/22");
}

#[tokio::test]
async fn health_cors_and_analytics() {
    let app = app().await;

    let response = route(request(Method::GET, "/health", None, None), app.state.clone()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");

    let response = route(request(Method::OPTIONS, "/api/get-data", None, None), app.state.clone()).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    call(&app, Method::POST, "/api/get-data", Some(json!({ "url": "https://v.example/1" })), None).await;
    let (status, body) = admin(&app, Method::GET, "/api/admin/analytics", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dailyCounts"][0]["request_count"], 1);

    let (status, _) = call(&app, Method::GET, "/api/image-proxy?url=http%3A%2F%2Flocalhost%2Fa.png", None, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn store_is_shared_with_control_plane() {
    let app = app().await;
    app.store.add_domain("direct.com").await.unwrap();

    // 저장소 직접 변경은 재적재 전까지 보이지 않음
    let (status, _) = call(&app, Method::POST, "/api/get-data", Some(json!({ "url": "https://direct.com/1" })), None).await;
    assert_eq!(status, StatusCode::OK);

    app.state.control.reload_domains().await.unwrap();
    let (status, _) = call(&app, Method::POST, "/api/get-data", Some(json!({ "url": "https://direct.com/1" })), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn api_requests_are_rate_limited_per_client() {
    let mut settings = Settings::default();
    settings.server.admin.password = Some(SECRET.to_string());
    settings.server.rate_limit.api_requests = 4;
    settings.server.rate_limit.login_requests = 2;
    let app = app_from(settings).await;

    let from = |ip: &str, uri: &str, body: Value| {
        let mut req = request(Method::POST, uri, Some(body), None);
        req.extensions_mut().insert(ClientIp(ip.parse().unwrap()));
        req
    };
    let send = |req: Request<Full<Bytes>>| route(req, app.state.clone());

    // 로그인은 더 좁은 제한을 받는다
    let login = json!({ "password": "wrong" });
    for _ in 0..2 {
        let response = send(from("10.0.0.1", "/api/admin/login", login.clone())).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
    let response = send(from("10.0.0.1", "/api/admin/login", login.clone())).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({ "error": "Too many login attempts. Please try again later." }));

    // 네 번째 /api 요청까지 허용, 다섯 번째부터 거부
    let lookup = json!({ "url": "https://a.example/v" });
    let response = send(from("10.0.0.1", "/api/get-data", lookup.clone())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let response = send(from("10.0.0.1", "/api/get-data", lookup.clone())).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(app.extractor.extract_calls(), 1);

    // 다른 클라이언트와 /api 밖의 경로는 영향 없음
    let response = send(from("10.0.0.2", "/api/get-data", lookup)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let (status, _) = call(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}
