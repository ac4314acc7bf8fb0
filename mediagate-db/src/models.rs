use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// 리다이렉트 모드 설정 키
pub const REDIRECT_MODE_KEY: &str = "is_redirect_mode_enabled";

/// 관리자 화면 기본 조회 건수
pub const RECENT_LOG_LIMIT: usize = 50;

/// 분석 기본 기간(일)
pub const ANALYTICS_DAYS: u32 = 30;

/// 요청 기록
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestLogEntry {
    pub url: String,
    pub timestamp: DateTime<Utc>,
}

/// 일별 요청 수
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub request_date: NaiveDate,
    pub request_count: i64,
}
