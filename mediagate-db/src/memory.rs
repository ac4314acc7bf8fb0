use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};

use mediagate_error::{GateError, Result};

use crate::models::{DailyCount, RequestLogEntry};
use crate::store::Store;

#[derive(Default)]
struct Tables {
    logs: Vec<RequestLogEntry>,
    domains: HashSet<String>,
    settings: HashMap<String, bool>,
}

/// 프로세스 내부 저장소 (테스트, 로컬 실행용)
///
/// `set_failing(true)` 이후의 모든 작업은 `GateError::Database` 를 돌려준다.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 장애 주입
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// 저장된 요청 기록 수
    pub fn log_count(&self) -> usize {
        self.tables.lock().map(|t| t.logs.len()).unwrap_or(0)
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(GateError::Database("memory store is failing".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn append_log(&self, url: &str) -> Result<()> {
        self.check()?;
        if url.is_empty() {
            return Ok(());
        }
        let mut tables = self.tables.lock()?;
        tables.logs.push(RequestLogEntry {
            url: url.to_string(),
            timestamp: Utc::now(),
        });
        Ok(())
    }

    async fn list_domains(&self) -> Result<HashSet<String>> {
        self.check()?;
        Ok(self.tables.lock()?.domains.clone())
    }

    async fn add_domain(&self, domain: &str) -> Result<()> {
        self.check()?;
        self.tables.lock()?.domains.insert(domain.to_string());
        Ok(())
    }

    async fn remove_domain(&self, domain: &str) -> Result<()> {
        self.check()?;
        self.tables.lock()?.domains.remove(domain);
        Ok(())
    }

    async fn get_setting(&self, key: &str) -> Result<bool> {
        self.check()?;
        Ok(self.tables.lock()?.settings.get(key).copied().unwrap_or(false))
    }

    async fn set_setting(&self, key: &str, value: bool) -> Result<()> {
        self.check()?;
        self.tables.lock()?.settings.insert(key.to_string(), value);
        Ok(())
    }

    async fn recent_logs(&self, limit: usize) -> Result<Vec<RequestLogEntry>> {
        self.check()?;
        let tables = self.tables.lock()?;
        // 삽입 순서가 곧 시간 순서
        Ok(tables.logs.iter().rev().take(limit).cloned().collect())
    }

    async fn daily_counts(&self, days: u32) -> Result<Vec<DailyCount>> {
        self.check()?;
        let since = Utc::now() - Duration::days(i64::from(days));
        let tables = self.tables.lock()?;

        let mut by_day: HashMap<_, i64> = HashMap::new();
        for entry in tables.logs.iter().filter(|e| e.timestamp > since) {
            *by_day.entry(entry.timestamp.date_naive()).or_default() += 1;
        }
        let mut counts: Vec<DailyCount> = by_day
            .into_iter()
            .map(|(request_date, request_count)| DailyCount {
                request_date,
                request_count,
            })
            .collect();
        counts.sort_by(|a, b| b.request_date.cmp(&a.request_date));
        Ok(counts)
    }
}
