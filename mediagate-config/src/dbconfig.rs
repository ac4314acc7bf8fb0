use std::{path::Path};
use std::fs::File;
use std::io::Read;

use serde::{Deserialize, Serialize};

use mediagate_error::{Result};

/// 데이터베이스 설정
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    /// PostgreSQL 연결 문자열, 없으면 저장소 없이 동작
    pub url: Option<String>,
    /// 연결 풀 설정
    pub pool: PoolConfig,
}

impl DbConfig {
    /// 설정파일에서 db 설정 로드
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        let config: DbConfig = serde_yml::from_str(&contents)?;

        Ok(config)
    }

    /// 연결 문자열 설정 여부
    pub fn is_configured(&self) -> bool {
        self.url.as_deref().is_some_and(|url| !url.trim().is_empty())
    }
}

/// 데이터베이스 연결 풀 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// 시작시 미리 여는 연결 수
    pub min_connections: usize,
    /// 최대 연결 수
    pub max_connections: usize,
    /// 연결 타임아웃(초)
    pub connection_timeout_seconds: u64,
    /// 반환된 연결의 재사용 검사 제한 시간(초)
    pub recycle_timeout_seconds: u64,
    /// 쿼리 타임아웃(초)
    pub query_timeout_seconds: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min_connections: 1,
            max_connections: 10, // 최대 연결풀
            connection_timeout_seconds: 10,  // 연결 시도 타임아웃 10초
            recycle_timeout_seconds: 5,
            query_timeout_seconds: 10,
        }
    }
}
