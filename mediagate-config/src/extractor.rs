use std::path::Path;

use serde::{Deserialize, Serialize};

/// yt-dlp 실행 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// yt-dlp 실행파일 경로
    pub ytdlp_path: String,
    /// ffmpeg 위치 (--ffmpeg-location)
    pub ffmpeg_path: Option<String>,
    /// 쿠키 파일 경로, 파일이 있을 때만 전달
    pub cookies_path: String,
    /// 메타데이터/직접 URL 조회 타임아웃(초)
    pub timeout_seconds: u64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: "yt-dlp".to_string(),
            ffmpeg_path: None,
            cookies_path: "cookies.txt".to_string(),
            timeout_seconds: 120,
        }
    }
}

impl ExtractorConfig {
    /// 존재하는 쿠키 파일 경로
    pub fn cookie_file(&self) -> Option<&str> {
        if !self.cookies_path.is_empty() && Path::new(&self.cookies_path).is_file() {
            Some(self.cookies_path.as_str())
        } else {
            None
        }
    }
}
