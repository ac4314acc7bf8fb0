use std::error::Error as StdError;

use hyper::body::Body;
use hyper::header;
use hyper::{Method, Request, Response, StatusCode};
use log::{info, warn};
use serde::Deserialize;
use serde_json::{Value, json};

use mediagate_acl::Denial;
use mediagate_db::{ANALYTICS_DAYS, RECENT_LOG_LIMIT};
use mediagate_error::{GateError, Result};

use crate::http::{GateBody, error_json, json_response, read_json};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LoginBody {
    password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DomainBody {
    domain: Option<String>,
}

/// 인증 거부 응답 (미설정은 500, 나머지는 구분 없이 401)
fn denied(denial: Denial) -> Response<GateBody> {
    match denial {
        Denial::NotConfigured => {
            error_json(StatusCode::INTERNAL_SERVER_ERROR, "Admin not configured.")
        }
        Denial::MissingCredentials | Denial::InvalidCredentials => {
            error_json(StatusCode::UNAUTHORIZED, "Unauthorized")
        }
    }
}

/// `/api/admin/*` 처리
pub async fn handle<B>(req: Request<B>, state: &AppState) -> Result<Response<GateBody>>
where
    B: Body,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    if path == "/api/admin/login" {
        if method != Method::POST {
            return Ok(error_json(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed."));
        }
        return login(req, state).await;
    }

    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    if let Err(denial) = state.gate.authorize(authorization) {
        warn!("관리자 요청 거부 ({denial}): {method} {path}");
        return Ok(denied(denial));
    }

    match (method, path.as_str()) {
        (Method::GET, "/api/admin/requests") => {
            let entries = state.control.recent_requests(RECENT_LOG_LIMIT).await;
            Ok(json_response(StatusCode::OK, &entries))
        }
        (Method::GET, "/api/admin/blocked-domains") => {
            Ok(json_response(StatusCode::OK, &state.control.blocked_domains()))
        }
        (Method::POST, "/api/admin/blocked-domains") => {
            let domain = domain_from(req, state).await?;
            state.control.add_domain(&domain).await?;
            Ok(json_response(StatusCode::CREATED, &json!({ "success": true })))
        }
        (Method::DELETE, "/api/admin/blocked-domains") => {
            let domain = domain_from(req, state).await?;
            state.control.remove_domain(&domain).await?;
            Ok(json_response(StatusCode::OK, &json!({ "success": true })))
        }
        (Method::GET, "/api/admin/settings") => Ok(json_response(
            StatusCode::OK,
            &json!({ "is_redirect_mode_enabled": state.control.redirect_mode() }),
        )),
        (Method::POST, "/api/admin/settings") => update_settings(req, state).await,
        (Method::GET, "/api/admin/stats") => Ok(json_response(
            StatusCode::OK,
            &json!({
                "cacheSize": state.cache.len(),
                "storeFailures": state.failures.failures(),
            }),
        )),
        (Method::POST, "/api/admin/clear-cache") => {
            state.cache.clear();
            info!("메타데이터 캐시 비움");
            Ok(json_response(
                StatusCode::OK,
                &json!({ "success": true, "message": "Cache cleared." }),
            ))
        }
        (Method::GET, "/api/admin/analytics") => {
            let counts = state.control.daily_counts(ANALYTICS_DAYS).await;
            Ok(json_response(StatusCode::OK, &json!({ "dailyCounts": counts })))
        }
        _ => Err(GateError::NotFound("Not found.".to_string())),
    }
}

async fn login<B>(req: Request<B>, state: &AppState) -> Result<Response<GateBody>>
where
    B: Body,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let body: LoginBody = read_json(req.into_body(), state.body_limit()).await?;
    match state.gate.verify_password(&body.password) {
        Ok(()) => {
            info!("관리자 로그인 성공");
            Ok(json_response(StatusCode::OK, &json!({ "success": true })))
        }
        Err(Denial::NotConfigured) => Ok(json_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            &json!({ "success": false, "error": "Admin not configured." }),
        )),
        Err(denial) => {
            warn!("관리자 로그인 실패: {denial}");
            Ok(json_response(
                StatusCode::UNAUTHORIZED,
                &json!({ "success": false, "error": "Invalid password." }),
            ))
        }
    }
}

async fn domain_from<B>(req: Request<B>, state: &AppState) -> Result<String>
where
    B: Body,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let body: DomainBody = read_json(req.into_body(), state.body_limit()).await?;
    body.domain
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| GateError::BadRequest("Domain is required.".to_string()))
}

/// 설정 변경. 값은 JSON boolean 만 허용.
async fn update_settings<B>(req: Request<B>, state: &AppState) -> Result<Response<GateBody>>
where
    B: Body,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let body: Value = read_json(req.into_body(), state.body_limit()).await?;
    let Some(enabled) = body.get("is_redirect_mode_enabled").and_then(Value::as_bool) else {
        return Err(GateError::BadRequest(
            "is_redirect_mode_enabled must be a boolean.".to_string(),
        ));
    };

    let enabled = state.control.set_redirect_mode(enabled).await?;
    Ok(json_response(
        StatusCode::OK,
        &json!({ "success": true, "is_redirect_mode_enabled": enabled }),
    ))
}
