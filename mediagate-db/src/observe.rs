use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use log::error;

use mediagate_error::GateError;

/// 저장소 작업 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    AppendLog,
    ListDomains,
    AddDomain,
    RemoveDomain,
    GetSetting,
    SetSetting,
    RecentLogs,
    DailyCounts,
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StoreOp::AppendLog => "append_log",
            StoreOp::ListDomains => "list_domains",
            StoreOp::AddDomain => "add_domain",
            StoreOp::RemoveDomain => "remove_domain",
            StoreOp::GetSetting => "get_setting",
            StoreOp::SetSetting => "set_setting",
            StoreOp::RecentLogs => "recent_logs",
            StoreOp::DailyCounts => "daily_counts",
        };
        f.write_str(name)
    }
}

/// 저장소 실패 관찰자
///
/// 읽기 경로는 실패를 빈 결과로 대체하므로, "실제로 비어있음" 과 "저장소 실패" 는
/// 이 훅으로만 구분된다.
pub trait StoreObserver: Send + Sync {
    fn store_failed(&self, op: StoreOp, err: &GateError);
}

/// 기본 관찰자: 에러 로그 + 실패 횟수 집계
#[derive(Debug, Default)]
pub struct FailureCounter {
    failures: AtomicU64,
}

impl FailureCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 누적 실패 횟수
    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }
}

impl StoreObserver for FailureCounter {
    fn store_failed(&self, op: StoreOp, err: &GateError) {
        self.failures.fetch_add(1, Ordering::Relaxed);
        error!("저장소 작업 실패 ({op}): {err}");
    }
}
