use std::collections::HashMap;
use std::error::Error as StdError;

use bytes::Bytes;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full, Limited};
use hyper::body::Body;
use hyper::header::{self, HeaderValue};
use hyper::{Response, StatusCode, Uri};
use log::{debug, error, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use mediagate_error::{GateError, Result};

/// 모든 응답 본문 타입 (고정 본문과 다운로드 스트림 공용)
pub type GateBody = UnsyncBoxBody<Bytes, GateError>;

/// 고정 본문
pub fn full(bytes: impl Into<Bytes>) -> GateBody {
    Full::new(bytes.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// 빈 본문
pub fn empty() -> GateBody {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// 상태코드 + 본문 + Content-Type 으로 응답 생성
pub fn respond(status: StatusCode, content_type: &'static str, body: GateBody) -> Response<GateBody> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

/// JSON 응답
pub fn json_response<T: Serialize + ?Sized>(status: StatusCode, value: &T) -> Response<GateBody> {
    match serde_json::to_vec(value) {
        Ok(bytes) => respond(status, "application/json", full(bytes)),
        Err(e) => {
            error!("응답 JSON 직렬화 실패: {e}");
            error_json(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error.")
        }
    }
}

/// `{"error": message}` 응답
pub fn error_json(status: StatusCode, message: &str) -> Response<GateBody> {
    let body = json!({ "error": message }).to_string();
    respond(status, "application/json", full(body))
}

/// 텍스트 응답
pub fn text_response(status: StatusCode, message: &str) -> Response<GateBody> {
    respond(status, "text/plain; charset=utf-8", full(message.to_string()))
}

/// 에러 → HTTP 응답
pub fn error_response(err: &GateError) -> Response<GateBody> {
    let (status, message) = match err {
        GateError::Unconfigured(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.as_str()),
        GateError::RateLimited(msg) => (StatusCode::TOO_MANY_REQUESTS, msg.as_str()),
        GateError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.as_str()),
        GateError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
        GateError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.as_str()),
        GateError::Database(_) | GateError::StoreUnavailable(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "Storage is unavailable.")
        }
        GateError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg.as_str()),
        GateError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "The request timed out."),
        GateError::Io(_) | GateError::Internal(_) | GateError::Config(_) | GateError::Other(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error.")
        }
    };

    if status.is_server_error() {
        error!("요청 처리 실패 ({status}): {err}");
    } else {
        debug!("요청 거부 ({status}): {err}");
    }
    error_json(status, message)
}

/// 요청 본문을 JSON 으로 읽기 (크기 제한 적용)
pub async fn read_json<B, T>(body: B, limit: usize) -> Result<T>
where
    B: Body,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
    T: DeserializeOwned,
{
    let bytes = match Limited::new(body, limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!("요청 본문 읽기 실패: {e}");
            return Err(GateError::BadRequest(
                "Request body is too large or unreadable.".to_string(),
            ));
        }
    };
    Ok(serde_json::from_slice(&bytes)?)
}

/// 쿼리 문자열 파싱 (`+` 는 공백, 퍼센트 인코딩 해제)
pub fn query_params(uri: &Uri) -> HashMap<String, String> {
    let Some(query) = uri.query() else {
        return HashMap::new();
    };

    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    let raw = raw.replace('+', " ");
    match urlencoding::decode(&raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw,
    }
}

/// CORS 헤더 추가
pub fn with_cors(mut response: Response<GateBody>) -> Response<GateBody> {
    response.headers_mut().insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    response
}

/// OPTIONS 사전 요청 응답
pub fn preflight() -> Response<GateBody> {
    let mut response = Response::new(empty());
    *response.status_mut() = StatusCode::NO_CONTENT;
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, DELETE, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization"),
    );
    headers.insert(header::ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static("86400"));
    with_cors(response)
}
