use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::Mutex;

use mediagate_db::{
    DailyCount, REDIRECT_MODE_KEY, RequestLogEntry, Store, StoreObserver, StoreOp,
};
use mediagate_error::{GateError, Result};

use crate::mirror::Mirror;

/// 저장소와 메모리 사본을 묶어 "쓰기 후 재적재" 규칙을 지키는 관리 계층
///
/// 모든 쓰기는 저장소 반영 직후 같은 호출 안에서 사본을 통째로 다시 읽는다.
/// 쓰기를 한 호출자는 응답을 받는 시점에 자신의 변경을 볼 수 있다.
/// 쓰기와 재적재는 `write_lock` 아래에서 한 단위로 실행된다. 늦게 끝난 재적재가
/// 더 최신 사본을 덮어쓰지 않는다.
pub struct ControlPlane {
    store: Arc<dyn Store>,
    mirror: Mirror,
    observer: Arc<dyn StoreObserver>,
    write_lock: Mutex<()>,
}

impl ControlPlane {
    pub fn new(store: Arc<dyn Store>, observer: Arc<dyn StoreObserver>) -> Self {
        Self {
            store,
            mirror: Mirror::new(),
            observer,
            write_lock: Mutex::new(()),
        }
    }

    /// 초기화: 차단 목록과 설정 적재. 실패해도 빈 상태로 계속 진행.
    pub async fn init(&self) {
        info!("관리 상태 초기화 (저장소: {})", self.store.name());
        if let Err(e) = self.reload_domains().await {
            warn!("차단 도메인 초기 적재 실패, 빈 목록으로 시작: {e}");
        }
        if let Err(e) = self.reload_settings().await {
            warn!("설정 초기 적재 실패, 기본값으로 시작: {e}");
        }
    }

    pub fn mirror(&self) -> &Mirror {
        &self.mirror
    }

    /// 차단 목록 전체 재적재. 실패시 기존 목록 유지.
    pub async fn reload_domains(&self) -> Result<usize> {
        match self.store.list_domains().await {
            Ok(domains) => {
                let count = domains.len();
                self.mirror.replace_domains(domains);
                Ok(count)
            }
            Err(e) => {
                self.observer.store_failed(StoreOp::ListDomains, &e);
                Err(e)
            }
        }
    }

    /// 설정 재적재. 실패시 기존 값 유지.
    pub async fn reload_settings(&self) -> Result<bool> {
        match self.store.get_setting(REDIRECT_MODE_KEY).await {
            Ok(enabled) => {
                self.mirror.set_redirect_mode(enabled);
                Ok(enabled)
            }
            Err(e) => {
                self.observer.store_failed(StoreOp::GetSetting, &e);
                Err(e)
            }
        }
    }

    /// URL 차단여부 (메모리 사본 기준)
    pub fn is_blocked(&self, url: &str) -> bool {
        self.mirror.is_blocked(url)
    }

    /// 현재 차단 목록
    pub fn blocked_domains(&self) -> Vec<String> {
        self.mirror.domains()
    }

    /// 리다이렉트 모드 여부
    pub fn redirect_mode(&self) -> bool {
        self.mirror.redirect_mode()
    }

    /// 차단 도메인 추가 후 재적재
    pub async fn add_domain(&self, domain: &str) -> Result<()> {
        let domain = normalize_domain(domain)?;
        let _guard = self.write_lock.lock().await;
        if let Err(e) = self.store.add_domain(domain).await {
            self.observer.store_failed(StoreOp::AddDomain, &e);
            return Err(e);
        }
        self.reload_domains().await?;
        info!("차단 도메인 추가: {domain}");
        Ok(())
    }

    /// 차단 도메인 삭제 후 재적재
    pub async fn remove_domain(&self, domain: &str) -> Result<()> {
        let domain = normalize_domain(domain)?;
        let _guard = self.write_lock.lock().await;
        if let Err(e) = self.store.remove_domain(domain).await {
            self.observer.store_failed(StoreOp::RemoveDomain, &e);
            return Err(e);
        }
        self.reload_domains().await?;
        info!("차단 도메인 삭제: {domain}");
        Ok(())
    }

    /// 리다이렉트 모드 저장 후 재적재. 재적재된 값을 돌려준다.
    pub async fn set_redirect_mode(&self, enabled: bool) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        if let Err(e) = self.store.set_setting(REDIRECT_MODE_KEY, enabled).await {
            self.observer.store_failed(StoreOp::SetSetting, &e);
            return Err(e);
        }
        self.reload_settings().await
    }

    /// 요청 기록. 실패는 관찰자에만 전달하고 호출자에게 알리지 않는다.
    pub async fn record_request(&self, url: &str) {
        if url.is_empty() {
            return;
        }
        match self.store.append_log(url).await {
            Ok(()) => debug!("요청 기록: {url}"),
            Err(e) => self.observer.store_failed(StoreOp::AppendLog, &e),
        }
    }

    /// 최근 요청 기록. 실패시 빈 목록.
    pub async fn recent_requests(&self, limit: usize) -> Vec<RequestLogEntry> {
        self.store.recent_logs(limit).await.unwrap_or_else(|e| {
            self.observer.store_failed(StoreOp::RecentLogs, &e);
            Vec::new()
        })
    }

    /// 일별 요청 수. 실패시 빈 목록.
    pub async fn daily_counts(&self, days: u32) -> Vec<DailyCount> {
        self.store.daily_counts(days).await.unwrap_or_else(|e| {
            self.observer.store_failed(StoreOp::DailyCounts, &e);
            Vec::new()
        })
    }
}

fn normalize_domain(domain: &str) -> Result<&str> {
    let domain = domain.trim();
    if domain.is_empty() {
        return Err(GateError::BadRequest("Domain is required.".to_string()));
    }
    Ok(domain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use mediagate_db::{FailureCounter, MemoryStore, OfflineStore};

    /// 첫 번째 목록 조회만 읽은 뒤 잠시 멈추는 저장소
    struct SlowFirstList {
        inner: MemoryStore,
        delayed: AtomicBool,
    }

    #[async_trait]
    impl Store for SlowFirstList {
        fn name(&self) -> &'static str {
            "slow"
        }
        async fn append_log(&self, url: &str) -> Result<()> {
            self.inner.append_log(url).await
        }
        async fn list_domains(&self) -> Result<HashSet<String>> {
            let domains = self.inner.list_domains().await?;
            if !self.delayed.swap(true, Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            Ok(domains)
        }
        async fn add_domain(&self, domain: &str) -> Result<()> {
            self.inner.add_domain(domain).await
        }
        async fn remove_domain(&self, domain: &str) -> Result<()> {
            self.inner.remove_domain(domain).await
        }
        async fn get_setting(&self, key: &str) -> Result<bool> {
            self.inner.get_setting(key).await
        }
        async fn set_setting(&self, key: &str, value: bool) -> Result<()> {
            self.inner.set_setting(key, value).await
        }
        async fn recent_logs(&self, limit: usize) -> Result<Vec<RequestLogEntry>> {
            self.inner.recent_logs(limit).await
        }
        async fn daily_counts(&self, days: u32) -> Result<Vec<DailyCount>> {
            self.inner.daily_counts(days).await
        }
    }

    fn plane() -> (Arc<MemoryStore>, Arc<FailureCounter>, ControlPlane) {
        let store = Arc::new(MemoryStore::new());
        let counter = Arc::new(FailureCounter::new());
        let plane = ControlPlane::new(store.clone(), counter.clone());
        (store, counter, plane)
    }

    #[tokio::test]
    async fn add_is_visible_immediately() {
        let (_, _, plane) = plane();
        plane.add_domain("badsite.com").await.unwrap();
        assert!(plane.is_blocked("https://badsite.com/video/1"));
    }

    #[tokio::test]
    async fn remove_keeps_overlapping_domains() {
        let (_, _, plane) = plane();
        plane.add_domain("badsite.com").await.unwrap();
        plane.add_domain("site.com").await.unwrap();

        plane.remove_domain("badsite.com").await.unwrap();
        assert!(plane.is_blocked("https://badsite.com/video/1"));

        plane.remove_domain("site.com").await.unwrap();
        assert!(!plane.is_blocked("https://badsite.com/video/1"));
    }

    #[tokio::test]
    async fn domains_are_trimmed_and_deduplicated() {
        let (_, _, plane) = plane();
        plane.add_domain("  badsite.com ").await.unwrap();
        plane.add_domain("badsite.com").await.unwrap();
        assert_eq!(plane.blocked_domains(), vec!["badsite.com".to_string()]);

        plane.remove_domain("never-added.com").await.unwrap();
        assert!(matches!(plane.add_domain("   ").await, Err(GateError::BadRequest(_))));
    }

    #[tokio::test]
    async fn init_picks_up_existing_state() {
        let store = Arc::new(MemoryStore::new());
        store.add_domain("old.com").await.unwrap();
        store.set_setting(REDIRECT_MODE_KEY, true).await.unwrap();

        let plane = ControlPlane::new(store, Arc::new(FailureCounter::new()));
        assert!(!plane.is_blocked("https://old.com/"));
        plane.init().await;
        assert!(plane.is_blocked("https://old.com/"));
        assert!(plane.redirect_mode());
    }

    #[tokio::test]
    async fn redirect_mode_toggles() {
        let (_, _, plane) = plane();
        let original = plane.redirect_mode();
        assert!(plane.set_redirect_mode(!original).await.unwrap() != original);
        assert_eq!(plane.set_redirect_mode(original).await.unwrap(), original);
        assert_eq!(plane.redirect_mode(), original);
    }

    #[tokio::test]
    async fn failed_reload_keeps_previous_set() {
        let (store, counter, plane) = plane();
        plane.add_domain("badsite.com").await.unwrap();

        store.set_failing(true);
        assert!(plane.reload_domains().await.is_err());
        assert!(plane.is_blocked("https://badsite.com/"));
        assert_eq!(counter.failures(), 1);
    }

    #[tokio::test]
    async fn read_failures_degrade_but_are_observed() {
        let (store, counter, plane) = plane();
        plane.record_request("https://a.example/1").await;
        store.set_failing(true);

        plane.record_request("https://a.example/2").await;
        assert!(plane.recent_requests(50).await.is_empty());
        assert!(plane.daily_counts(30).await.is_empty());
        assert_eq!(counter.failures(), 3);

        store.set_failing(false);
        assert_eq!(plane.recent_requests(50).await.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_writes_leave_latest_state() {
        let inner = MemoryStore::new();
        inner.add_domain("y.com").await.unwrap();
        let store = Arc::new(SlowFirstList {
            inner,
            delayed: AtomicBool::new(false),
        });
        let plane = ControlPlane::new(store.clone(), Arc::new(FailureCounter::new()));

        // 추가 쪽 재적재가 {x, y} 를 읽고 멈춘 사이에 삭제가 들어온다
        let (added, removed) = tokio::join!(plane.add_domain("x.com"), plane.remove_domain("y.com"));
        added.unwrap();
        removed.unwrap();

        let mut stored: Vec<String> = store.list_domains().await.unwrap().into_iter().collect();
        stored.sort();
        assert_eq!(stored, vec!["x.com".to_string()]);
        assert_eq!(plane.blocked_domains(), stored);
        assert!(!plane.is_blocked("https://y.com/"));
    }

    #[tokio::test]
    async fn writes_fail_without_database() {
        let counter = Arc::new(FailureCounter::new());
        let plane = ControlPlane::new(Arc::new(OfflineStore::unconfigured()), counter.clone());
        plane.init().await;

        assert!(matches!(plane.add_domain("a.com").await, Err(GateError::Unconfigured(_))));
        assert!(matches!(plane.set_redirect_mode(true).await, Err(GateError::Unconfigured(_))));
        assert!(!plane.redirect_mode());
        assert!(plane.blocked_domains().is_empty());
    }
}
