use serde::{Deserialize, Serialize};

/// 클라이언트에 내려주는 미디어 정보
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaInfo {
    pub title: String,
    pub thumbnail: Option<String>,
    /// 초 단위 길이
    pub duration: Option<f64>,
    pub formats: Vec<FormatSummary>,
}

/// 포맷 요약
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatSummary {
    pub format_id: String,
    pub ext: String,
    pub resolution: String,
    /// 사람이 읽는 크기 ("12.3 MiB", "N/A")
    pub filesize: String,
    pub note: String,
    pub vcodec: String,
    pub acodec: String,
}

/// `yt-dlp -J` 출력 중 사용하는 필드
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawInfo {
    pub title: Option<String>,
    pub thumbnail: Option<String>,
    pub duration: Option<f64>,
    pub formats: Option<Vec<RawFormat>>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct RawFormat {
    pub format_id: Option<String>,
    pub ext: Option<String>,
    pub resolution: Option<String>,
    pub height: Option<u32>,
    pub filesize: Option<f64>,
    pub filesize_approx: Option<f64>,
    /// 전체 비트레이트 (kbit/s)
    pub tbr: Option<f64>,
    pub format_note: Option<String>,
    pub vcodec: Option<String>,
    pub acodec: Option<String>,
}
