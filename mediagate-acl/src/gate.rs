use std::fmt;

use log::{debug, warn};

/// 관리자 인증 거부 사유
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// 서버에 관리자 비밀번호가 설정되지 않음
    NotConfigured,
    /// Authorization 헤더 없음
    MissingCredentials,
    /// Bearer 가 아니거나 값 불일치
    InvalidCredentials,
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Denial::NotConfigured => f.write_str("관리자 비밀번호 미설정"),
            Denial::MissingCredentials => f.write_str("인증 헤더 없음"),
            Denial::InvalidCredentials => f.write_str("인증 정보 불일치"),
        }
    }
}

/// 관리자 인증 방식
///
/// 핸들러는 이 트레이트만 사용하므로 해시 토큰 등 다른 방식으로 교체할 수 있다.
pub trait Authenticator: Send + Sync {
    /// `Authorization` 헤더 검사
    fn authorize(&self, authorization: Option<&str>) -> Result<(), Denial>;

    /// 로그인 비밀번호 검사
    fn verify_password(&self, password: &str) -> Result<(), Denial>;
}

/// 단일 공유 비밀번호 인증
///
/// 설정값의 앞뒤 공백은 버린다. 로그인 비밀번호와 Bearer 토큰 모두 정리된 값과
/// 정확히 같아야 한다.
pub struct SharedSecret {
    secret: Option<String>,
}

impl SharedSecret {
    pub fn new(secret: Option<String>) -> Self {
        let secret = secret
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        if secret.is_none() {
            warn!("관리자 비밀번호가 설정되지 않음. 관리자 기능 비활성화");
        }
        Self { secret }
    }

    fn secret(&self) -> Result<&str, Denial> {
        self.secret.as_deref().ok_or(Denial::NotConfigured)
    }
}

impl Authenticator for SharedSecret {
    fn authorize(&self, authorization: Option<&str>) -> Result<(), Denial> {
        let secret = self.secret()?;
        let header = authorization.ok_or(Denial::MissingCredentials)?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or(Denial::InvalidCredentials)?;

        if token == secret {
            Ok(())
        } else {
            debug!("관리자 토큰 불일치");
            Err(Denial::InvalidCredentials)
        }
    }

    fn verify_password(&self, password: &str) -> Result<(), Denial> {
        let secret = self.secret()?;
        if password == secret {
            Ok(())
        } else {
            Err(Denial::InvalidCredentials)
        }
    }
}
