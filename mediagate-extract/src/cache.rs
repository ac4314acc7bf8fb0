use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use log::{debug, error};
use lru::LruCache;

use crate::types::MediaInfo;

/// URL 별 메타데이터 캐시 (LRU + TTL)
pub struct MetadataCache {
    entries: Option<Mutex<LruCache<String, (Instant, MediaInfo)>>>,
    ttl: Duration,
}

impl MetadataCache {
    /// `capacity` 가 0 이면 캐시 비활성화
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let entries = NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap)));
        Self { entries, ttl }
    }

    pub fn disabled() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub fn get(&self, url: &str) -> Option<MediaInfo> {
        let entries = self.entries.as_ref()?;
        let mut cache = match entries.lock() {
            Ok(cache) => cache,
            Err(e) => {
                error!("메타데이터 캐시 잠금 실패: {e}");
                return None;
            }
        };

        let fresh = match cache.get(url) {
            Some((stored_at, info)) if stored_at.elapsed() < self.ttl => Some(info.clone()),
            Some(_) => None,
            None => return None,
        };
        if fresh.is_none() {
            debug!("만료된 캐시 항목 제거: {url}");
            cache.pop(url);
        }
        fresh
    }

    pub fn insert(&self, url: &str, info: MediaInfo) {
        let Some(entries) = self.entries.as_ref() else {
            return;
        };
        match entries.lock() {
            Ok(mut cache) => {
                cache.put(url.to_string(), (Instant::now(), info));
            }
            Err(e) => error!("메타데이터 캐시 잠금 실패: {e}"),
        }
    }

    pub fn len(&self) -> usize {
        self.entries
            .as_ref()
            .and_then(|entries| entries.lock().ok().map(|cache| cache.len()))
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Some(entries) = self.entries.as_ref() {
            match entries.lock() {
                Ok(mut cache) => cache.clear(),
                Err(e) => error!("메타데이터 캐시 잠금 실패: {e}"),
            }
        }
    }
}
