use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use http_body_util::{BodyExt, Empty};
use hyper::header::{self, HeaderValue};
use hyper::{Request, Response, StatusCode, Uri};
use log::{debug, info, warn};

use mediagate_error::{GateError, Result};

use crate::http::{GateBody, text_response};
use crate::state::AppState;

/// 업스트림 응답 헤더 대기 시간
const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// 썸네일 이미지 중계 (사설망 주소 차단)
pub async fn image_proxy(raw_url: Option<&str>, state: &AppState) -> Result<Response<GateBody>> {
    let raw_url = raw_url
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| GateError::BadRequest("Image URL is required.".to_string()))?;

    let uri = ensure_public_url(raw_url).await?;

    let request = Request::get(uri.clone())
        .header(header::REFERER, raw_url)
        .header(header::USER_AGENT, USER_AGENT)
        .body(Empty::new())
        .map_err(|e| GateError::BadRequest(format!("Invalid image URL: {e}")))?;

    let response = match tokio::time::timeout(FETCH_TIMEOUT, state.image_client.request(request)).await {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            warn!("이미지 요청 실패 ({uri}): {e}");
            return Ok(text_response(StatusCode::NOT_FOUND, "Image not found"));
        }
        Err(_) => {
            warn!("이미지 요청 타임아웃 ({uri})");
            return Ok(text_response(StatusCode::NOT_FOUND, "Image not found"));
        }
    };

    if !response.status().is_success() {
        debug!("이미지 업스트림 응답코드: {} ({uri})", response.status());
        return Ok(text_response(StatusCode::NOT_FOUND, "Image not found"));
    }

    let (parts, body) = response.into_parts();
    let content_type = parts
        .headers
        .get(header::CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("application/octet-stream"));

    let body = body
        .map_err(|e| GateError::Upstream(format!("Image stream failed: {e}")))
        .boxed_unsync();

    let mut relayed = Response::new(body);
    relayed.headers_mut().insert(header::CONTENT_TYPE, content_type);
    relayed.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=86400"),
    );
    Ok(relayed)
}

/// http(s) 이고 공인 주소로만 해석되는 URL 인지 확인
pub async fn ensure_public_url(raw_url: &str) -> Result<Uri> {
    let uri: Uri = raw_url
        .parse()
        .map_err(|_| GateError::BadRequest("Invalid image URL.".to_string()))?;

    let port = match uri.scheme_str() {
        Some("http") => 80,
        Some("https") => 443,
        _ => return Err(GateError::BadRequest("Invalid image URL.".to_string())),
    };
    let host = uri
        .host()
        .map(|h| h.trim_start_matches('[').trim_end_matches(']'))
        .filter(|h| !h.is_empty())
        .ok_or_else(|| GateError::BadRequest("Invalid image URL.".to_string()))?;

    if host.eq_ignore_ascii_case("localhost") {
        info!("로컬 주소 이미지 요청 차단: {raw_url}");
        return Err(GateError::Forbidden("Access to private addresses is not allowed.".to_string()));
    }

    let port = uri.port_u16().unwrap_or(port);
    let addrs: Vec<IpAddr> = match tokio::net::lookup_host((host, port)).await {
        Ok(addrs) => addrs.map(|addr| addr.ip()).collect(),
        Err(e) => {
            debug!("이미지 호스트 해석 실패 ({host}): {e}");
            return Err(GateError::BadRequest("Could not resolve image host.".to_string()));
        }
    };
    if addrs.is_empty() {
        return Err(GateError::BadRequest("Could not resolve image host.".to_string()));
    }

    if let Some(ip) = addrs.iter().find(|ip| !is_public_ip(ip)) {
        info!("사설 주소 이미지 요청 차단: {raw_url} ({ip})");
        return Err(GateError::Forbidden("Access to private addresses is not allowed.".to_string()));
    }
    Ok(uri)
}

/// 공인 IP 여부 (사설, 루프백, 링크로컬, 예약 대역 제외)
pub fn is_public_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_public_v4(v4),
        IpAddr::V6(v6) => {
            if let Some(mapped) = v6.to_ipv4_mapped() {
                return is_public_v4(&mapped);
            }
            let first = v6.segments()[0];
            !(v6.is_loopback()
                || v6.is_unspecified()
                || v6.is_multicast()
                || (first & 0xfe00) == 0xfc00 // 고유 로컬 fc00::/7
                || (first & 0xffc0) == 0xfe80) // 링크 로컬 fe80::/10
        }
    }
}

fn is_public_v4(v4: &Ipv4Addr) -> bool {
    let [a, b, ..] = v4.octets();
    !(v4.is_private()
        || v4.is_loopback()
        || v4.is_link_local()
        || v4.is_broadcast()
        || v4.is_unspecified()
        || v4.is_documentation()
        || v4.is_multicast()
        || a == 0
        || (a == 100 && (64..128).contains(&b)) // CGNAT 100.64.0.0/10
        || (a == 198 && (b == 18 || b == 19)) // 벤치마크 198.18.0.0/15
        || a >= 240)
}
