use std::error::Error as StdError;

use hyper::body::Body;
use hyper::{Method, Request, Response};
use log::debug;

use mediagate_error::{GateError, Result};

use crate::http::{GateBody, error_response, preflight, query_params, with_cors};
use crate::rate_limit::{ClientIp, client_ip};
use crate::state::AppState;
use crate::{admin, image_proxy, public, static_files};

/// 요청 핸들러
///
/// 처리 중 발생한 에러는 모두 HTTP 응답으로 변환되므로 항상 `Ok` 를 반환한다.
pub async fn route<B>(req: Request<B>, state: AppState) -> Result<Response<GateBody>>
where
    B: Body,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    debug!("incoming: {} {}", req.method(), req.uri());

    if req.method() == Method::OPTIONS {
        return Ok(preflight());
    }

    let response = match dispatch(req, &state).await {
        Ok(response) => response,
        Err(err) => error_response(&err),
    };
    Ok(with_cors(response))
}

async fn dispatch<B>(req: Request<B>, state: &AppState) -> Result<Response<GateBody>>
where
    B: Body,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let path = req.uri().path().to_string();

    if path.starts_with("/api/") {
        let ip = client_ip(req.extensions().get::<ClientIp>());
        if !state.rate_limits.check_api(ip) {
            return Err(GateError::RateLimited(
                "Too many requests, please try again later.".to_string(),
            ));
        }
        if req.method() == Method::POST
            && path == "/api/admin/login"
            && !state.rate_limits.check_login(ip)
        {
            return Err(GateError::RateLimited(
                "Too many login attempts. Please try again later.".to_string(),
            ));
        }
    }

    if path.starts_with("/api/admin/") {
        return admin::handle(req, state).await;
    }

    match (req.method().clone(), path.as_str()) {
        (Method::GET, "/health") => Ok(public::health()),
        (Method::POST, "/api/get-data") => public::get_data(req, state).await,
        (Method::POST, "/api/get-url") => public::get_url(req, state).await,
        (Method::GET, "/api/download") => public::download(req, state).await,
        (Method::GET, "/api/image-proxy") => {
            let params = query_params(req.uri());
            image_proxy::image_proxy(params.get("url").map(String::as_str), state).await
        }
        (_, p) if p.starts_with("/api/") => Err(GateError::NotFound("Not found.".to_string())),
        (Method::GET, p) => static_files::serve(&state.settings.server.public_dir, p).await,
        _ => Err(GateError::NotFound("Not found.".to_string())),
    }
}
