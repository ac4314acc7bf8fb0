use std::collections::HashSet;

use async_trait::async_trait;

use mediagate_error::{GateError, Result};

use crate::models::{DailyCount, RequestLogEntry};
use crate::store::Store;

/// DB 없이 동작할 때 사용하는 저장소
///
/// 모든 작업이 실패한다. 연결 문자열이 없으면 `Unconfigured`,
/// 시작시 DB에 접근하지 못했으면 `StoreUnavailable`.
pub struct OfflineStore {
    reason: OfflineReason,
}

#[derive(Debug, Clone)]
enum OfflineReason {
    Unconfigured,
    Unreachable(String),
}

impl OfflineStore {
    /// 연결 문자열 미설정
    pub fn unconfigured() -> Self {
        Self {
            reason: OfflineReason::Unconfigured,
        }
    }

    /// 시작시 연결 실패
    pub fn unreachable(detail: impl Into<String>) -> Self {
        Self {
            reason: OfflineReason::Unreachable(detail.into()),
        }
    }

    fn error(&self) -> GateError {
        match &self.reason {
            OfflineReason::Unconfigured => {
                GateError::Unconfigured("Database not configured.".to_string())
            }
            OfflineReason::Unreachable(detail) => GateError::StoreUnavailable(detail.clone()),
        }
    }
}

#[async_trait]
impl Store for OfflineStore {
    fn name(&self) -> &'static str {
        "offline"
    }

    async fn append_log(&self, _url: &str) -> Result<()> {
        Err(self.error())
    }

    async fn list_domains(&self) -> Result<HashSet<String>> {
        Err(self.error())
    }

    async fn add_domain(&self, _domain: &str) -> Result<()> {
        Err(self.error())
    }

    async fn remove_domain(&self, _domain: &str) -> Result<()> {
        Err(self.error())
    }

    async fn get_setting(&self, _key: &str) -> Result<bool> {
        Err(self.error())
    }

    async fn set_setting(&self, _key: &str, _value: bool) -> Result<()> {
        Err(self.error())
    }

    async fn recent_logs(&self, _limit: usize) -> Result<Vec<RequestLogEntry>> {
        Err(self.error())
    }

    async fn daily_counts(&self, _days: u32) -> Result<Vec<DailyCount>> {
        Err(self.error())
    }
}
