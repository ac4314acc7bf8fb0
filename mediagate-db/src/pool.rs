use std::sync::Arc;
use std::time::Duration;

use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod, Runtime};
use log::{debug, info};
use tokio_postgres::{NoTls, config::Config};

use mediagate_config::DbConfig;
use mediagate_error::{GateError, Result};

/// db 풀 인스턴스
#[derive(Clone)]
pub struct DatabasePool {
    pool: Arc<Pool>,
}

impl DatabasePool {
    /// db 풀 생성
    pub async fn new(dbconfig: &DbConfig) -> Result<Self> {
        info!("db 풀 초기화");

        if !dbconfig.is_configured() {
            return Err(GateError::Unconfigured("Database not configured.".to_string()));
        }
        let url = dbconfig.url.as_deref().unwrap_or_default().trim();

        // PostgreSQL 설정 생성
        let pg_config = Self::create_pg_config(url, dbconfig)?;

        // 연결 풀 생성
        let pool = Self::create_connection_pool(pg_config, dbconfig).await?;

        info!(
            "데이터베이스 연결 풀 초기화 완료 (최소 연결 수: {}, 최대 연결 수: {})",
            dbconfig.pool.min_connections, dbconfig.pool.max_connections
        );

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// 연결 문자열에서 `PostgreSQL` 설정 생성
    fn create_pg_config(url: &str, dbconfig: &DbConfig) -> Result<Config> {
        let mut pg_config: Config = url
            .parse()
            .map_err(|e| GateError::Config(format!("DB 연결 문자열 파싱 실패: {e}")))?;

        pg_config
            .connect_timeout(Duration::from_secs(
                dbconfig.pool.connection_timeout_seconds,
            ))
            .keepalives(true);

        Ok(pg_config)
    }

    /// 연결 풀 생성 및 테스트
    async fn create_connection_pool(pg_config: Config, dbconfig: &DbConfig) -> Result<Pool> {
        // 연결 풀 설정
        let mgr_config = ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        };
        let mgr = Manager::from_config(pg_config, NoTls, mgr_config);

        let max_size = dbconfig.pool.max_connections.max(1);

        // 풀 빌더 설정
        let pool = Pool::builder(mgr)
            .max_size(max_size)
            .runtime(Runtime::Tokio1)
            .wait_timeout(Some(Duration::from_secs(
                dbconfig.pool.connection_timeout_seconds,
            )))
            .create_timeout(Some(Duration::from_secs(
                dbconfig.pool.connection_timeout_seconds,
            )))
            // 반환된 연결의 재사용 검사에 허용하는 시간
            .recycle_timeout(Some(Duration::from_secs(
                dbconfig.pool.recycle_timeout_seconds,
            )))
            .build()
            .map_err(|e| GateError::Database(format!("db 풀 생성 실패: {e}")))?;

        // 최소 연결 확보 (동시에 잡고 있다가 풀로 반환)
        let warm = dbconfig.pool.min_connections.clamp(1, max_size);
        let mut held = Vec::with_capacity(warm);
        for _ in 0..warm {
            let conn = pool
                .get()
                .await
                .map_err(|e| GateError::Database(format!("데이터베이스 연결 테스트 실패: {e}")))?;
            held.push(conn);
        }
        debug!("초기 연결 {}개 확보", held.len());

        // 간단한 쿼리로 연결 확인
        if let Some(conn) = held.first() {
            conn.query_one("SELECT 1", &[])
                .await
                .map_err(|e| GateError::Database(format!("데이터베이스 쿼리 테스트 실패: {e}")))?;
        }
        drop(held);

        Ok(pool)
    }

    /// 연결 풀에서 연결 가져오기
    pub async fn get_connection(&self) -> Result<deadpool_postgres::Object> {
        self.pool
            .get()
            .await
            .map_err(|e| GateError::Database(format!("연결 풀에서 연결 가져오기 실패: {e}")))
    }

    /// 연결 풀 상태 정보
    pub fn pool_status(&self) -> PoolStatus {
        let status = self.pool.status();
        PoolStatus {
            size: status.size,
            available: status.available,
            waiting: status.waiting,
        }
    }
}

/// 연결 풀 상태 정보
#[derive(Debug, Clone)]
pub struct PoolStatus {
    pub size: usize,
    pub available: usize,
    pub waiting: usize,
}

/// 데이터베이스 풀 초기화 함수
pub async fn initialize_dbpool(config: &DbConfig) -> Result<DatabasePool> {
    DatabasePool::new(config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn blank_url_is_unconfigured() {
        let mut config = DbConfig::default();
        config.url = Some("   ".to_string());
        assert!(matches!(initialize_dbpool(&config).await, Err(GateError::Unconfigured(_))));
    }

    #[tokio::test]
    async fn malformed_url_is_config_error() {
        let mut config = DbConfig::default();
        config.url = Some("not a connection string ===".to_string());
        assert!(matches!(initialize_dbpool(&config).await, Err(GateError::Config(_))));
    }
}
