use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use log::{debug, error, info};

/// 저장소 상태의 메모리 사본
///
/// 차단 도메인 집합은 통째로 교체된다. 쓰기는 새 집합을 만든 뒤 핸들만 바꾸고,
/// 읽기는 현재 핸들을 복제해서 사용하므로 부분적으로 갱신된 집합은 보이지 않는다.
pub struct Mirror {
    // 차단된 도메인 목록
    blocked_domains: RwLock<Arc<HashSet<String>>>,
    // 리다이렉트 모드
    redirect_mode: AtomicBool,
}

impl Default for Mirror {
    fn default() -> Self {
        Self::new()
    }
}

impl Mirror {
    /// 새로운 `Mirror` 인스턴스 생성
    pub fn new() -> Self {
        Self {
            blocked_domains: RwLock::new(Arc::new(HashSet::new())),
            redirect_mode: AtomicBool::new(false),
        }
    }

    /// 현재 차단 목록 핸들
    pub fn snapshot(&self) -> Arc<HashSet<String>> {
        match self.blocked_domains.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => {
                error!("blocked_domains RwLock 읽기 잠금 실패 (snapshot): {poisoned}");
                Arc::clone(&poisoned.into_inner())
            }
        }
    }

    /// URL 차단여부
    ///
    /// 차단 도메인 중 하나라도 URL 의 부분 문자열이면 차단.
    pub fn is_blocked(&self, url: &str) -> bool {
        if url.is_empty() {
            return false;
        }

        let domains = self.snapshot();
        match domains.iter().find(|domain| url.contains(domain.as_str())) {
            Some(domain) => {
                debug!("차단된 도메인 포함 URL: {url} ({domain})");
                true
            }
            None => false,
        }
    }

    /// 차단 목록 전체 교체
    pub fn replace_domains(&self, domains: HashSet<String>) {
        let count = domains.len();
        let fresh = Arc::new(domains);
        match self.blocked_domains.write() {
            Ok(mut guard) => *guard = fresh,
            Err(poisoned) => {
                error!("blocked_domains RwLock 쓰기 잠금 실패 (교체 중): {poisoned}");
                *poisoned.into_inner() = fresh;
            }
        }
        info!("차단 도메인 목록 교체 완료. {count}개의 도메인");
    }

    /// 정렬된 차단 목록
    pub fn domains(&self) -> Vec<String> {
        let mut domains: Vec<String> = self.snapshot().iter().cloned().collect();
        domains.sort();
        domains
    }

    /// 리다이렉트 모드 여부
    pub fn redirect_mode(&self) -> bool {
        self.redirect_mode.load(Ordering::Acquire)
    }

    /// 리다이렉트 모드 설정
    pub fn set_redirect_mode(&self, enabled: bool) {
        self.redirect_mode.store(enabled, Ordering::Release);
        info!(
            "리다이렉트 모드 {}",
            if enabled { "활성화" } else { "비활성화" }
        );
    }
}
