use std::time::Duration;

use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as AutoConnBuilder;
use log::{debug, error, info};
use tokio::net::TcpListener;

use crate::rate_limit::ClientIp;
use crate::router::route;
use crate::state::AppState;

use mediagate_error::Result;

/// API 서버 구조체
pub struct ApiServer {
    /// 공유 상태 (설정, 관리 계층, 추출기)
    state: AppState,
}

impl ApiServer {
    /// 새로운 서버 인스턴스를 생성
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// 서버실행
    pub async fn run(&self) -> Result<()> {
        // 바인딩 주소
        let addr = self.state.settings.server.bind_addr();
        let listener = TcpListener::bind(&addr).await?;
        info!("API 서버 시작: {addr}");

        // 요청 제한 키 정리
        let limits = self.state.rate_limits.clone();
        let window = self.state.settings.server.rate_limit.window_seconds.max(1);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(window));
            loop {
                interval.tick().await;
                limits.retain_recent();
            }
        });

        loop {
            let (stream, client_addr) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    error!("커넥션 수락 실패: {e}");
                    continue;
                }
            };
            let state = self.state.clone();

            tokio::spawn(async move {
                let io = TokioIo::new(stream);
                if let Err(err) = AutoConnBuilder::new(TokioExecutor::new())
                    .serve_connection(
                        io,
                        service_fn(move |mut req: Request<Incoming>| {
                            req.extensions_mut().insert(ClientIp(client_addr.ip()));
                            route(req, state.clone())
                        }),
                    )
                    .await
                {
                    error!("커넥션 에러: {err}");
                } else {
                    debug!("커넥션 종료: {client_addr}");
                }
            });
        }
    }
}
