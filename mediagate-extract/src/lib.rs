mod cache;
mod failure;
mod format;
mod types;
mod ytdlp;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use mediagate_error::Result;

pub use cache::MetadataCache;
pub use failure::{Failure, classify_failure};
pub use format::{human_filesize, summarize};
pub use types::{FormatSummary, MediaInfo, RawFormat, RawInfo};
pub use ytdlp::YtDlp;

/// 다운로드 바이트 스트림
pub type MediaStream = BoxStream<'static, Result<Bytes>>;

/// 외부 미디어 추출기
#[async_trait]
pub trait Extractor: Send + Sync {
    /// 제목, 썸네일, 길이, 포맷 목록 조회
    async fn extract(&self, url: &str) -> Result<MediaInfo>;

    /// 선택한 포맷의 직접 다운로드 URL
    async fn direct_url(&self, url: &str, format: &str) -> Result<String>;

    /// 선택한 포맷의 바이트 스트림
    async fn stream(&self, url: &str, format: &str) -> Result<MediaStream>;
}
