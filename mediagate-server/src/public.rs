use std::error::Error as StdError;

use futures::TryStreamExt;
use http_body_util::{BodyExt, StreamBody};
use hyper::body::{Body, Frame};
use hyper::header::{self, HeaderValue};
use hyper::{Request, Response, StatusCode};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::json;

use mediagate_error::{GateError, Result};

use crate::http::{GateBody, empty, json_response, query_params, read_json};
use crate::state::AppState;

const BLOCKED_MESSAGE: &str = "Access to this website is blocked by the administrator.";

/// 다운로드 파일명 최대 길이 (확장자 제외)
const MAX_FILENAME_LEN: usize = 100;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LookupBody {
    url: Option<String>,
    format_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct DirectUrl {
    direct_url: String,
}

/// 차단 목록 확인
fn ensure_allowed(state: &AppState, url: &str) -> Result<()> {
    if state.control.is_blocked(url) {
        info!("차단된 URL 요청 거부: {url}");
        return Err(GateError::Forbidden(BLOCKED_MESSAGE.to_string()));
    }
    Ok(())
}

fn required(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// POST /api/get-data
///
/// 차단 확인 → 요청 기록 → 캐시 또는 추출기 호출 순서를 지킨다.
pub async fn get_data<B>(req: Request<B>, state: &AppState) -> Result<Response<GateBody>>
where
    B: Body,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let body: LookupBody = read_json(req.into_body(), state.body_limit()).await?;
    let url = required(body.url).ok_or_else(|| GateError::BadRequest("URL is required.".to_string()))?;

    ensure_allowed(state, &url)?;
    state.control.record_request(&url).await;

    if let Some(info) = state.cache.get(&url) {
        debug!("메타데이터 캐시 적중: {url}");
        return Ok(json_response(StatusCode::OK, &info));
    }

    let info = state.extractor.extract(&url).await?;
    state.cache.insert(&url, info.clone());
    Ok(json_response(StatusCode::OK, &info))
}

/// POST /api/get-url
pub async fn get_url<B>(req: Request<B>, state: &AppState) -> Result<Response<GateBody>>
where
    B: Body,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let body: LookupBody = read_json(req.into_body(), state.body_limit()).await?;
    let (Some(url), Some(format_id)) = (required(body.url), required(body.format_id)) else {
        return Err(GateError::BadRequest("URL and format_id are required.".to_string()));
    };

    ensure_allowed(state, &url)?;
    let direct_url = state.extractor.direct_url(&url, &format_id).await?;
    Ok(json_response(StatusCode::OK, &DirectUrl { direct_url }))
}

/// GET /api/download
///
/// 리다이렉트 모드면 직접 URL 로 302, 아니면 yt-dlp 출력을 그대로 중계한다.
pub async fn download<B>(req: Request<B>, state: &AppState) -> Result<Response<GateBody>> {
    let mut params = query_params(req.uri());
    let (Some(url), Some(format_id)) = (required(params.remove("url")), required(params.remove("format_id"))) else {
        return Err(GateError::BadRequest("URL and format_id are required.".to_string()));
    };

    ensure_allowed(state, &url)?;

    let video_only = params.get("video_only").is_some_and(|v| v == "true");
    let format = if video_only {
        format!("{format_id}+bestaudio")
    } else {
        format_id
    };

    if state.control.redirect_mode() {
        let direct_url = state.extractor.direct_url(&url, &format).await?;
        let location = HeaderValue::from_str(&direct_url)
            .map_err(|_| GateError::Upstream("Extractor returned an invalid URL.".to_string()))?;
        debug!("다운로드 리다이렉트: {url} → {direct_url}");

        let mut response = Response::new(empty());
        *response.status_mut() = StatusCode::FOUND;
        response.headers_mut().insert(header::LOCATION, location);
        return Ok(response);
    }

    let filename = format!("{}.mp4", sanitize_filename(params.get("title").map(String::as_str)));
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
        .map_err(|e| GateError::Internal(format!("Content-Disposition 생성 실패: {e}")))?;

    let stream = state.extractor.stream(&url, &format).await?;
    info!("다운로드 스트림 시작: {url} ({format})");

    let body = StreamBody::new(stream.map_ok(Frame::data)).boxed_unsync();
    let mut response = Response::new(body);
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("video/mp4"));
    headers.insert(header::CONTENT_DISPOSITION, disposition);
    Ok(response)
}

/// GET /health
pub fn health() -> Response<GateBody> {
    json_response(
        StatusCode::OK,
        &json!({ "status": "ok", "message": "Server is healthy." }),
    )
}

/// 헤더에 안전한 파일명 (영숫자, `_`, `.`, `-` 외에는 `_`)
pub fn sanitize_filename(title: Option<&str>) -> String {
    let name: String = title
        .unwrap_or_default()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_FILENAME_LEN)
        .collect();

    if name.is_empty() { "video".to_string() } else { name }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filenames_are_sanitized() {
        assert_eq!(sanitize_filename(Some("My Clip: part 1/2")), "My_Clip__part_1_2");
        assert_eq!(sanitize_filename(Some("한글.mp4")), "__.mp4");
        assert_eq!(sanitize_filename(None), "video");
        assert_eq!(sanitize_filename(Some("")), "video");
        assert_eq!(sanitize_filename(Some(&"a".repeat(300))).len(), 100);
    }
}
