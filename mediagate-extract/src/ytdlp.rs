use std::process::{Output, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use log::{debug, error, warn};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio_util::io::ReaderStream;

use mediagate_config::ExtractorConfig;
use mediagate_error::{GateError, Result, upstream_err};

use crate::failure::classify_failure;
use crate::format::summarize;
use crate::types::{MediaInfo, RawInfo};
use crate::{Extractor, MediaStream};

// yt-dlp 실행파일을 직접 실행한다.
// 설정된 경로(기본 PATH 의 yt-dlp)에 실행파일이 있어야 한다.
pub struct YtDlp {
    config: ExtractorConfig,
}

impl YtDlp {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// 공통 인자(쿠키, ffmpeg 위치)가 붙은 명령
    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.config.ytdlp_path);
        if let Some(cookies) = self.config.cookie_file() {
            cmd.arg("--cookies").arg(cookies);
        }
        if let Some(ffmpeg) = self.config.ffmpeg_path.as_deref() {
            cmd.arg("--ffmpeg-location").arg(ffmpeg);
        }
        cmd.kill_on_drop(true);
        cmd
    }

    /// 명령 실행 (타임아웃 적용). 실패 종료는 stderr 로 분류한다.
    async fn run(&self, mut cmd: Command) -> Result<Output> {
        debug!("yt-dlp 실행: {cmd:?}");
        let timeout = Duration::from_secs(self.config.timeout_seconds.max(1));

        let output = match tokio::time::timeout(timeout, cmd.output()).await {
            Ok(output) => output.map_err(|e| {
                error!("yt-dlp 실행 실패: {e}");
                GateError::Upstream(format!("Failed to run yt-dlp: {e}"))
            })?,
            Err(_) => {
                error!("yt-dlp 실행 타임아웃 ({}초)", timeout.as_secs());
                return Err(GateError::Timeout("yt-dlp did not finish in time".to_string()));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("yt-dlp 비정상 종료 ({}): {}", output.status, stderr.trim());
            return Err(classify_failure(&stderr).into());
        }
        Ok(output)
    }
}

#[async_trait]
impl Extractor for YtDlp {
    async fn extract(&self, url: &str) -> Result<MediaInfo> {
        let mut cmd = self.command();
        cmd.arg("-J")
            .arg("--no-playlist")
            .arg("--no-warnings")
            .arg("--")
            .arg(url);

        let output = self.run(cmd).await?;
        let raw: RawInfo = serde_json::from_slice(&output.stdout).map_err(|e| {
            error!("yt-dlp JSON 파싱 실패: {e}");
            upstream_err("Failed to parse video data from extractor.")
        })?;

        Ok(summarize(raw))
    }

    async fn direct_url(&self, url: &str, format: &str) -> Result<String> {
        let mut cmd = self.command();
        cmd.arg("-f").arg(format).arg("--get-url").arg("--").arg(url);

        let output = self.run(cmd).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);

        // 영상+음성 분리 포맷은 여러 줄이 나오므로 첫 줄 사용
        stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)
            .ok_or_else(|| upstream_err("Failed to get direct URL."))
    }

    async fn stream(&self, url: &str, format: &str) -> Result<MediaStream> {
        let mut cmd = self.command();
        cmd.arg("-f")
            .arg(format)
            .arg("-o")
            .arg("-")
            .arg("--")
            .arg(url)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        debug!("yt-dlp 스트림 실행: {cmd:?}");

        let mut child = cmd.spawn().map_err(|e| {
            error!("yt-dlp 실행 실패: {e}");
            GateError::Upstream(format!("Failed to run yt-dlp: {e}"))
        })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| GateError::Internal("yt-dlp stdout not captured".to_string()))?;
        let stderr = child.stderr.take();

        // stderr 는 로그로만 남기고, 종료를 기다려 좀비 프로세스를 회수한다
        tokio::spawn(async move {
            if let Some(stderr) = stderr {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    warn!("yt-dlp stderr: {line}");
                }
            }
            match child.wait().await {
                Ok(status) if status.success() => debug!("yt-dlp 스트림 종료"),
                Ok(status) => warn!("yt-dlp 스트림 비정상 종료: {status}"),
                Err(e) => error!("yt-dlp 종료 대기 실패: {e}"),
            }
        });

        let stream = ReaderStream::new(stdout).map(|chunk| chunk.map_err(GateError::from));
        Ok(stream.boxed())
    }
}
