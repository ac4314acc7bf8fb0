use std::sync::Arc;
use std::time::Duration;

use log::{error, info, warn};
use once_cell::sync::Lazy;

use mediagate_acl::{ControlPlane, SharedSecret};
use mediagate_config::Settings;
use mediagate_db::{
    FailureCounter, OfflineStore, PgStore, Store, initialize_db, initialize_dbpool,
};
use mediagate_error::{GateError, Result};
use mediagate_extract::YtDlp;
use mediagate_logging::init_logger;
use mediagate_server::{ApiServer, AppState};

/// 파일 디스크립터 제한 설정
static FD_LIMIT: Lazy<u64> = Lazy::new(|| {
    std::env::var("FD_LIMIT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(65536) // 기본값 64K
});

/// 시스템 리소스 제한 설정
fn setup_resource_limits() {
    #[cfg(unix)]
    {
        use nix::sys::resource::{Resource, setrlimit};
        // fd 제한 늘리기
        match setrlimit(Resource::RLIMIT_NOFILE, *FD_LIMIT, *FD_LIMIT) {
            Ok(_) => {
                info!("파일 디스크립터 제한 {}", *FD_LIMIT);
            }
            Err(e) => {
                warn!("파일 디스크립터 제한 설정 실패: {:?}", e);
            }
        }
    }
}

/// 저장소 선택
///
/// 연결 문자열이 없거나 db 에 연결할 수 없으면 오프라인 저장소로 계속 진행한다.
async fn open_store(settings: &Settings) -> Arc<dyn Store> {
    let pool = match initialize_dbpool(&settings.database).await {
        Ok(pool) => pool,
        Err(GateError::Unconfigured(msg)) => {
            warn!("DATABASE_URL 미설정. 관리자 기능과 요청 기록 비활성화: {msg}");
            return Arc::new(OfflineStore::unconfigured());
        }
        Err(e) => {
            error!("db 연결 실패. 오프라인 모드로 시작: {e}");
            return Arc::new(OfflineStore::unreachable(e.to_string()));
        }
    };

    if let Err(e) = initialize_db(&pool).await {
        error!("db 초기화 실패: {e}");
    }

    let status = pool.pool_status();
    info!(
        "db 풀 준비 완료 (size: {}, available: {}, waiting: {})",
        status.size, status.available, status.waiting
    );

    let query_timeout = Duration::from_secs(settings.database.pool.query_timeout_seconds);
    Arc::new(PgStore::new(pool, query_timeout))
}

async fn run(settings: Settings) -> Result<()> {
    let store = open_store(&settings).await;

    let failures = Arc::new(FailureCounter::new());
    let control = Arc::new(ControlPlane::new(store, failures.clone()));
    control.init().await;

    let gate = Arc::new(SharedSecret::new(settings.server.admin.password.clone()));
    let extractor = Arc::new(YtDlp::new(settings.server.extractor.clone()));

    let state = AppState::new(settings, control, gate, extractor, failures);
    ApiServer::new(state).run().await
}

fn main() -> Result<()> {
    // 로거 세팅
    init_logger();

    // fd 세팅
    setup_resource_limits();

    info!("mediagate 서버 시작");

    // 통합 설정 로드
    let settings = Settings::new()?;

    // 런타임 세팅
    let worker_threads = settings.server.worker_threads();
    info!("워커 스레드 {worker_threads}개");
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .enable_all()
        .build()?;

    runtime.block_on(run(settings))
}
