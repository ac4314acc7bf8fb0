use std::net::{IpAddr, Ipv4Addr};
use std::num::NonZeroU32;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter};
use log::{debug, info};

use mediagate_config::RateLimitConfig;

type KeyedLimiter = RateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock>;

/// 요청한 클라이언트 주소 (서버가 요청 확장에 넣는다)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIp(pub IpAddr);

/// 클라이언트 IP 별 요청 제한
///
/// 창 안에서 `requests` 번까지 한꺼번에 허용하고, 이후로는 `window / requests`
/// 마다 한 번씩 다시 채워진다.
pub struct RateLimits {
    api: Option<KeyedLimiter>,
    login: Option<KeyedLimiter>,
}

impl RateLimits {
    pub fn new(config: &RateLimitConfig) -> Self {
        if !config.enabled {
            info!("요청 빈도 제한 비활성화");
            return Self::disabled();
        }
        let window = Duration::from_secs(config.window_seconds.max(1));
        Self {
            api: keyed(config.api_requests, window),
            login: keyed(config.login_requests, window),
        }
    }

    pub fn disabled() -> Self {
        Self {
            api: None,
            login: None,
        }
    }

    /// `/api/*` 요청 허용 여부
    pub fn check_api(&self, ip: IpAddr) -> bool {
        allow(self.api.as_ref(), ip, "api")
    }

    /// 로그인 시도 허용 여부
    pub fn check_login(&self, ip: IpAddr) -> bool {
        allow(self.login.as_ref(), ip, "login")
    }

    /// 다 채워진 키 정리
    pub fn retain_recent(&self) {
        for limiter in [&self.api, &self.login].into_iter().flatten() {
            limiter.retain_recent();
        }
    }
}

fn keyed(requests: u32, window: Duration) -> Option<KeyedLimiter> {
    let burst = NonZeroU32::new(requests)?;
    let quota = Quota::with_period(window / requests)?.allow_burst(burst);
    Some(RateLimiter::keyed(quota))
}

fn allow(limiter: Option<&KeyedLimiter>, ip: IpAddr, kind: &str) -> bool {
    let Some(limiter) = limiter else {
        return true;
    };
    if limiter.check_key(&ip).is_err() {
        debug!("요청 제한 초과 ({kind}): {ip}");
        return false;
    }
    true
}

/// 주소를 알 수 없는 요청은 하나의 키로 묶는다
pub fn client_ip(ip: Option<&ClientIp>) -> IpAddr {
    ip.map(|c| c.0).unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}
