use std::path::{Component, Path, PathBuf};

use futures::TryStreamExt;
use http_body_util::{BodyExt, StreamBody};
use hyper::body::Frame;
use hyper::header::{self, HeaderValue};
use hyper::{Response, StatusCode};
use log::debug;
use tokio_util::io::ReaderStream;

use mediagate_error::{GateError, Result};

use crate::http::GateBody;

/// 정적 파일 제공. 없는 경로는 index.html 로 대체 (SPA)
pub async fn serve(public_dir: &str, request_path: &str) -> Result<Response<GateBody>> {
    let root = Path::new(public_dir);
    let relative = safe_relative_path(request_path)?;

    let candidate = root.join(&relative);
    let path = if !relative.as_os_str().is_empty() && is_file(&candidate).await {
        candidate
    } else {
        let index = root.join("index.html");
        if !is_file(&index).await {
            debug!("정적 파일 없음: {request_path}");
            return Err(GateError::NotFound("Not found.".to_string()));
        }
        index
    };

    let file = tokio::fs::File::open(&path).await?;
    let mime = mime_guess::from_path(&path).first_or_octet_stream();
    let content_type = HeaderValue::from_str(mime.essence_str())
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));

    let stream = ReaderStream::new(file)
        .map_ok(Frame::data)
        .map_err(GateError::from);
    let mut response = Response::new(StreamBody::new(stream).boxed_unsync());
    *response.status_mut() = StatusCode::OK;
    response.headers_mut().insert(header::CONTENT_TYPE, content_type);
    Ok(response)
}

/// 요청 경로를 루트 기준 상대 경로로 변환 (`..` 포함시 거부)
fn safe_relative_path(request_path: &str) -> Result<PathBuf> {
    let decoded = urlencoding::decode(request_path)
        .map_err(|_| GateError::BadRequest("Invalid path.".to_string()))?;

    let mut relative = PathBuf::new();
    for component in Path::new(decoded.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(GateError::BadRequest("Invalid path.".to_string()));
            }
        }
    }
    Ok(relative)
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}
