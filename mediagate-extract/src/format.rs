use crate::types::{FormatSummary, MediaInfo, RawFormat, RawInfo};

const MIB: f64 = 1024.0 * 1024.0;

/// yt-dlp 원본 정보를 클라이언트용으로 정리
pub fn summarize(raw: RawInfo) -> MediaInfo {
    let duration = raw.duration.filter(|d| d.is_finite() && *d > 0.0);
    let formats = raw
        .formats
        .unwrap_or_default()
        .iter()
        .filter_map(|format| summarize_format(format, duration))
        .collect();

    MediaInfo {
        title: raw.title.unwrap_or_default(),
        thumbnail: raw.thumbnail,
        duration,
        formats,
    }
}

fn summarize_format(format: &RawFormat, duration: Option<f64>) -> Option<FormatSummary> {
    let format_id = format.format_id.as_deref().filter(|id| !id.is_empty())?;
    let ext = format.ext.clone().unwrap_or_default();
    // 스토리보드/이미지 포맷 제외
    if ext == "mhtml" {
        return None;
    }
    if format.vcodec.as_deref().is_some_and(|v| v.contains("images")) {
        return None;
    }

    let resolution = format
        .resolution
        .clone()
        .filter(|r| !r.is_empty())
        .or_else(|| format.height.map(|h| format!("{h}p")))
        .unwrap_or_else(|| "audio only".to_string());

    Some(FormatSummary {
        format_id: format_id.to_string(),
        ext,
        resolution,
        filesize: human_filesize(estimate_size(format, duration)),
        note: format.format_note.clone().unwrap_or_default(),
        vcodec: format.vcodec.clone().unwrap_or_else(|| "none".to_string()),
        acodec: format.acodec.clone().unwrap_or_else(|| "none".to_string()),
    })
}

/// 크기 추정: filesize, filesize_approx, 비트레이트 x 길이 순
fn estimate_size(format: &RawFormat, duration: Option<f64>) -> Option<f64> {
    format
        .filesize
        .or(format.filesize_approx)
        .filter(|size| *size > 0.0)
        .or_else(|| {
            let tbr = format.tbr.filter(|t| *t > 0.0)?;
            Some(tbr * 1000.0 / 8.0 * duration?)
        })
}

/// 바이트 수를 MiB/GiB 문자열로
pub fn human_filesize(bytes: Option<f64>) -> String {
    match bytes {
        Some(bytes) if bytes > 0.0 => {
            let mib = bytes / MIB;
            if mib >= 1000.0 {
                format!("{:.2} GiB", mib / 1024.0)
            } else {
                format!("{:.1} MiB", mib)
            }
        }
        _ => "N/A".to_string(),
    }
}
