use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::net::AddrParseError;
use std::sync::PoisonError;
use tokio::time::error::Elapsed;
use deadpool_postgres::PoolError;
use serde_json::Error as JsonError;
use serde_yml::Error as YmlError;
use tokio_postgres::Error as PgError;

/// mediagate 의 모든 에러 타입을 정의합니다.
#[derive(Debug)]
pub enum GateError {
    /// 설정 관련 에러
    Config(String),

    /// 필수 배포 설정(관리자 비밀번호, DB 연결 문자열) 누락
    Unconfigured(String),

    /// 네트워크 입출력 에러
    Io(io::Error),

    /// 데이터베이스 관련 에러
    Database(String),

    /// 저장소에 접근할 수 없음 (연결 실패로 오프라인 모드)
    StoreUnavailable(String),

    /// 요청 빈도 제한 초과
    RateLimited(String),

    /// 차단 정책에 의한 거부
    Forbidden(String),

    /// 잘못된 요청
    BadRequest(String),

    /// 리소스 없음
    NotFound(String),

    /// 외부 추출기(yt-dlp) 또는 업스트림 실패
    Upstream(String),

    /// 타임아웃 에러
    Timeout(String),

    /// 내부 상태 관련 에러
    Internal(String),

    /// 기타 에러
    Other(String),
}

impl fmt::Display for GateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateError::Config(msg) => write!(f, "설정 에러: {}", msg),
            GateError::Unconfigured(msg) => write!(f, "설정 누락: {}", msg),
            GateError::Io(err) => write!(f, "I/O 에러: {}", err),
            GateError::Database(msg) => write!(f, "데이터베이스 에러: {}", msg),
            GateError::StoreUnavailable(msg) => write!(f, "저장소 사용 불가: {}", msg),
            GateError::RateLimited(msg) => write!(f, "요청 제한 초과: {}", msg),
            GateError::Forbidden(msg) => write!(f, "접근 거부: {}", msg),
            GateError::BadRequest(msg) => write!(f, "잘못된 요청: {}", msg),
            GateError::NotFound(msg) => write!(f, "찾을 수 없음: {}", msg),
            GateError::Upstream(msg) => write!(f, "업스트림 에러: {}", msg),
            GateError::Timeout(msg) => write!(f, "타임아웃 에러: {}", msg),
            GateError::Internal(msg) => write!(f, "내부 에러: {}", msg),
            GateError::Other(msg) => write!(f, "기타 에러: {}", msg),
        }
    }
}

impl StdError for GateError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            GateError::Io(err) => Some(err),
            _ => None,
        }
    }
}

/// Result 타입 별칭 정의
pub type Result<T> = std::result::Result<T, GateError>;

/// From 트레이트 구현으로 다양한 에러 타입을 GateError로 변환
impl From<io::Error> for GateError {
    fn from(err: io::Error) -> Self {
        GateError::Io(err)
    }
}

impl From<AddrParseError> for GateError {
    fn from(err: AddrParseError) -> Self {
        GateError::Config(format!("주소 파싱 에러: {}", err))
    }
}

impl From<PoolError> for GateError {
    fn from(err: PoolError) -> Self {
        GateError::Database(format!("DB 풀 에러: {}", err))
    }
}

impl From<PgError> for GateError {
    fn from(err: PgError) -> Self {
        GateError::Database(format!("PostgreSQL 에러: {}", err))
    }
}

impl From<Elapsed> for GateError {
    fn from(err: Elapsed) -> Self {
        GateError::Timeout(format!("작업 타임아웃: {}", err))
    }
}

impl<T> From<PoisonError<T>> for GateError {
    fn from(err: PoisonError<T>) -> Self {
        GateError::Internal(format!("락 포이즌 에러: {}", err))
    }
}

impl From<Box<dyn StdError + Send + Sync>> for GateError {
    fn from(err: Box<dyn StdError + Send + Sync>) -> Self {
        GateError::Other(format!("{}", err))
    }
}

impl From<JsonError> for GateError {
    fn from(err: JsonError) -> Self {
        GateError::BadRequest(format!("Invalid JSON: {}", err))
    }
}

impl From<YmlError> for GateError {
    fn from(err: YmlError) -> Self {
        GateError::Config(format!("YAML 파싱 에러: {}", err))
    }
}

impl From<String> for GateError {
    fn from(err: String) -> Self {
        GateError::Other(err)
    }
}

impl From<&str> for GateError {
    fn from(err: &str) -> Self {
        GateError::Other(err.to_string())
    }
}

/// 에러 처리 유틸리티 함수
pub fn upstream_err<E: fmt::Display>(err: E) -> GateError {
    GateError::Upstream(format!("{}", err))
}
