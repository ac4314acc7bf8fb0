use std::fmt;

use mediagate_error::GateError;

/// yt-dlp 실패 분류
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    Private,
    LoginRequired,
    Unavailable,
    Unsupported,
    NotFound,
    SiteChanged,
    /// 마지막 에러 줄을 그대로 전달
    Other(String),
    Unknown,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Private => f.write_str("This video is private."),
            Failure::LoginRequired => f.write_str(
                "This video is private or age-restricted. A valid cookie file may be required.",
            ),
            Failure::Unavailable => f.write_str("This video is unavailable."),
            Failure::Unsupported => f.write_str("This website or URL is not supported."),
            Failure::NotFound => f.write_str("Video not found (404)."),
            Failure::SiteChanged => f.write_str("This site has changed its structure."),
            Failure::Other(line) => write!(f, "yt-dlp ERROR: {line}"),
            Failure::Unknown => f.write_str("An unknown error occurred."),
        }
    }
}

impl From<Failure> for GateError {
    fn from(failure: Failure) -> Self {
        GateError::Upstream(failure.to_string())
    }
}

/// stderr 내용으로 실패 원인 분류 (먼저 일치한 규칙 우선)
pub fn classify_failure(stderr: &str) -> Failure {
    const RULES: [(&str, Failure); 6] = [
        ("private video", Failure::Private),
        ("Sign in to confirm", Failure::LoginRequired),
        ("Video unavailable", Failure::Unavailable),
        ("Unsupported URL", Failure::Unsupported),
        ("404", Failure::NotFound),
        ("KeyError", Failure::SiteChanged),
    ];

    if let Some((_, failure)) = RULES.iter().find(|(needle, _)| stderr.contains(needle)) {
        return failure.clone();
    }

    match stderr.lines().map(str::trim).filter(|l| !l.is_empty()).last() {
        Some(line) => Failure::Other(line.to_string()),
        None => Failure::Unknown,
    }
}
