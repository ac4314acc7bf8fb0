// mediagate-server/src/state.rs

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::Empty;
use hyper_rustls::HttpsConnector;
use hyper_util::client::legacy::Client as HyperClient;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;

use mediagate_acl::{Authenticator, ControlPlane};
use mediagate_config::Settings;
use mediagate_db::FailureCounter;
use mediagate_extract::{Extractor, MetadataCache};

use crate::rate_limit::RateLimits;

/// 이미지 프록시용 HTTPS 클라이언트
pub type ImageClient = HyperClient<HttpsConnector<HttpConnector>, Empty<Bytes>>;

/// 애플리케이션의 공유 상태를 관리하는 구조체
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub control: Arc<ControlPlane>,
    pub gate: Arc<dyn Authenticator>,
    pub extractor: Arc<dyn Extractor>,
    pub cache: Arc<MetadataCache>,
    pub failures: Arc<FailureCounter>,
    pub image_client: Arc<ImageClient>,
    pub rate_limits: Arc<RateLimits>,
}

impl AppState {
    pub fn new(
        settings: Settings,
        control: Arc<ControlPlane>,
        gate: Arc<dyn Authenticator>,
        extractor: Arc<dyn Extractor>,
        failures: Arc<FailureCounter>,
    ) -> Self {
        let server = &settings.server;
        let cache = if server.cache_enabled {
            MetadataCache::new(server.cache_size, Duration::from_secs(server.cache_ttl_seconds))
        } else {
            MetadataCache::disabled()
        };

        Self {
            rate_limits: Arc::new(RateLimits::new(&server.rate_limit)),
            image_client: Arc::new(build_image_client()),
            cache: Arc::new(cache),
            settings: Arc::new(settings),
            control,
            gate,
            extractor,
            failures,
        }
    }

    /// 요청 본문 최대 크기
    pub fn body_limit(&self) -> usize {
        self.settings.server.max_body_bytes
    }
}

fn build_image_client() -> ImageClient {
    // HTTP 커넥터 설정
    let mut http = HttpConnector::new();
    http.set_keepalive(Some(Duration::from_secs(30))); // 연결 유지 시간
    http.set_nodelay(true); // TCP_NODELAY 활성화
    http.set_connect_timeout(Some(Duration::from_secs(10)));
    http.enforce_http(false); // https 스킴은 rustls 가 처리

    let https = hyper_rustls::HttpsConnectorBuilder::new()
        .with_webpki_roots()
        .https_or_http()
        .enable_http1()
        .enable_http2()
        .wrap_connector(http);

    HyperClient::builder(TokioExecutor::new())
        .pool_idle_timeout(Duration::from_secs(30)) // 유휴 연결 타임아웃
        .pool_max_idle_per_host(16) // 호스트당 최대 유휴 연결 수
        .build(https)
}
