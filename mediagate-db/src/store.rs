use std::collections::HashSet;

use async_trait::async_trait;

use mediagate_error::Result;

use crate::models::{DailyCount, RequestLogEntry};

/// 영속 저장소 인터페이스
///
/// 모든 작업은 실패를 `Result` 로 돌려준다. 읽기 경로에서 기본값으로 대체할지,
/// 쓰기 경로에서 호출자에게 전달할지는 호출하는 쪽이 결정한다.
#[async_trait]
pub trait Store: Send + Sync {
    /// 저장소 이름 (로그용)
    fn name(&self) -> &'static str;

    /// 요청 URL 기록. 빈 URL 은 아무것도 하지 않는다.
    async fn append_log(&self, url: &str) -> Result<()>;

    /// 차단 도메인 전체 조회
    async fn list_domains(&self) -> Result<HashSet<String>>;

    /// 차단 도메인 추가. 이미 있으면 무시.
    async fn add_domain(&self, domain: &str) -> Result<()>;

    /// 차단 도메인 삭제. 없으면 무시.
    async fn remove_domain(&self, domain: &str) -> Result<()>;

    /// 설정값 조회. 없는 키는 false.
    async fn get_setting(&self, key: &str) -> Result<bool>;

    /// 설정값 저장
    async fn set_setting(&self, key: &str, value: bool) -> Result<()>;

    /// 최근 요청 기록, 최신순
    async fn recent_logs(&self, limit: usize) -> Result<Vec<RequestLogEntry>>;

    /// 최근 `days` 일 동안의 일별 요청 수, 최신 날짜순
    async fn daily_counts(&self, days: u32) -> Result<Vec<DailyCount>>;
}
