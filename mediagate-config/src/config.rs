use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use mediagate_error::Result;

use crate::extractor::ExtractorConfig;

/// 서버 설정 (config.yml)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bind_host: String,
    pub bind_port: u16,
    pub worker_threads: Option<usize>,
    /// 정적 파일 루트 (index.html 포함)
    pub public_dir: String,
    /// JSON 요청 본문 최대 크기
    pub max_body_bytes: usize,
    pub cache_enabled: bool,
    pub cache_size: usize,
    pub cache_ttl_seconds: u64,
    pub extractor: ExtractorConfig,
    pub admin: AdminConfig,
    pub rate_limit: RateLimitConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    /// 기본설정으로 생성
    #[must_use]
    pub fn new() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            bind_port: 4000,
            worker_threads: None,
            public_dir: "public".to_string(),
            max_body_bytes: 64 * 1024,
            cache_enabled: true,
            cache_size: 1000,
            cache_ttl_seconds: 3600,
            extractor: ExtractorConfig::default(),
            admin: AdminConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }

    /// 설정파일에서 설정 로드
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config = serde_yml::from_str(&contents)?;

        Ok(config)
    }

    /// 바인딩 주소
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.bind_port)
    }

    /// 워커 스레드 수 (미설정시 CPU 코어 수)
    pub fn worker_threads(&self) -> usize {
        self.worker_threads
            .filter(|n| *n > 0)
            .unwrap_or_else(num_cpus::get)
    }
}

/// 관리자 설정
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// 관리자 공유 비밀번호 (비어있으면 미설정)
    pub password: Option<String>,
}

/// 클라이언트 IP 별 요청 빈도 제한
///
/// 창(window) 안에서 허용하는 요청 수. 0 이면 해당 제한을 끈다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub window_seconds: u64,
    /// `/api/*` 전체
    pub api_requests: u32,
    /// `/api/admin/login`
    pub login_requests: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_seconds: 15 * 60,
            api_requests: 200,
            login_requests: 5,
        }
    }
}
