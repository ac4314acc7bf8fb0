use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, error};

use mediagate_error::{GateError, Result};

use crate::models::{DailyCount, RequestLogEntry};
use crate::pool::DatabasePool;
use crate::sql::{blocked_domains, request_logs, settings};
use crate::store::Store;

/// PostgreSQL 저장소
///
/// 작업마다 풀에서 커넥션 하나를 가져오고 작업이 끝나면(성공/실패 모두) 반환한다.
pub struct PgStore {
    pool: DatabasePool,
    query_timeout: Duration,
}

impl PgStore {
    pub fn new(pool: DatabasePool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    /// 쿼리 타임아웃 적용
    async fn timed<T, F>(&self, op: &str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        match tokio::time::timeout(self.query_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                error!("{op} 쿼리 타임아웃 ({}초)", self.query_timeout.as_secs());
                Err(GateError::Timeout(format!("{op} timed out")))
            }
        }
    }
}

#[async_trait]
impl Store for PgStore {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn append_log(&self, url: &str) -> Result<()> {
        if url.is_empty() {
            return Ok(());
        }
        self.timed("append_log", async {
            let conn = self.pool.get_connection().await?;
            conn.execute(request_logs::INSERT_LOG, &[&url]).await?;
            Ok::<_, GateError>(())
        })
        .await
    }

    async fn list_domains(&self) -> Result<HashSet<String>> {
        self.timed("list_domains", async {
            let conn = self.pool.get_connection().await?;
            let rows = conn.query(blocked_domains::SELECT_DOMAINS, &[]).await?;

            let mut domains = HashSet::with_capacity(rows.len());
            for row in rows {
                match row.try_get::<usize, String>(0) {
                    Ok(domain) => {
                        domains.insert(domain);
                    }
                    Err(e) => {
                        error!("DB 행에서 도메인 문자열 추출 실패: {e}");
                    }
                }
            }
            debug!("차단 도메인 {}개 조회", domains.len());
            Ok::<_, GateError>(domains)
        })
        .await
    }

    async fn add_domain(&self, domain: &str) -> Result<()> {
        self.timed("add_domain", async {
            let conn = self.pool.get_connection().await?;
            let inserted = conn.execute(blocked_domains::INSERT_DOMAIN, &[&domain]).await?;
            debug!("차단 도메인 추가: {domain} ({inserted}건)");
            Ok::<_, GateError>(())
        })
        .await
    }

    async fn remove_domain(&self, domain: &str) -> Result<()> {
        self.timed("remove_domain", async {
            let conn = self.pool.get_connection().await?;
            let deleted = conn.execute(blocked_domains::DELETE_DOMAIN, &[&domain]).await?;
            debug!("차단 도메인 삭제: {domain} ({deleted}건)");
            Ok::<_, GateError>(())
        })
        .await
    }

    async fn get_setting(&self, key: &str) -> Result<bool> {
        self.timed("get_setting", async {
            let conn = self.pool.get_connection().await?;
            let row = conn.query_opt(settings::SELECT_VALUE, &[&key]).await?;
            let value = match row {
                Some(row) => row.try_get::<usize, bool>(0)?,
                None => false,
            };
            Ok::<_, GateError>(value)
        })
        .await
    }

    async fn set_setting(&self, key: &str, value: bool) -> Result<()> {
        self.timed("set_setting", async {
            let conn = self.pool.get_connection().await?;
            conn.execute(settings::UPSERT_VALUE, &[&key, &value]).await?;
            Ok::<_, GateError>(())
        })
        .await
    }

    async fn recent_logs(&self, limit: usize) -> Result<Vec<RequestLogEntry>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.timed("recent_logs", async {
            let conn = self.pool.get_connection().await?;
            let rows = conn.query(request_logs::SELECT_RECENT, &[&limit]).await?;

            let mut entries = Vec::with_capacity(rows.len());
            for row in rows {
                let url: String = row.try_get(0)?;
                let timestamp: DateTime<Utc> = row.try_get(1)?;
                entries.push(RequestLogEntry { url, timestamp });
            }
            Ok::<_, GateError>(entries)
        })
        .await
    }

    async fn daily_counts(&self, days: u32) -> Result<Vec<DailyCount>> {
        let days = i32::try_from(days).unwrap_or(i32::MAX);
        self.timed("daily_counts", async {
            let conn = self.pool.get_connection().await?;
            let rows = conn.query(request_logs::SELECT_DAILY_COUNTS, &[&days]).await?;

            let mut counts = Vec::with_capacity(rows.len());
            for row in rows {
                let request_date: NaiveDate = row.try_get(0)?;
                let request_count: i64 = row.try_get(1)?;
                counts.push(DailyCount {
                    request_date,
                    request_count,
                });
            }
            Ok::<_, GateError>(counts)
        })
        .await
    }
}
