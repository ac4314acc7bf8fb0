use std::io::Write;

use chrono::Local;
use env_logger::{Builder, Env};
use log::LevelFilter;

/// 로거 세팅
///
/// 디버그 빌드는 `[시간 레벨 파일:라인] 메시지` 형식, 릴리즈 빌드는 Info 레벨 기본 형식.
/// `RUST_LOG` 가 있으면 레벨 필터를 덮어쓴다.
pub fn init_logger() {
    let mut builder = build_logger();
    if let Err(e) = builder.try_init() {
        eprintln!("로거 초기화 실패: {e}");
    }
}

fn build_logger() -> Builder {
    #[cfg(debug_assertions)]
    {
        let mut builder = Builder::new();
        builder
            .filter(None, LevelFilter::Debug)
            .filter_module("tokio_postgres", LevelFilter::Info)
            .parse_env(Env::default())
            .format(|buf, record| {
                writeln!(
                    buf,
                    "[{} {} {}:{}] {}",
                    Local::now().format("%Y-%m-%d %H:%M:%S"),
                    record.level(),
                    record.file().unwrap_or("unknown"),
                    record.line().unwrap_or(0),
                    record.args()
                )
            });
        builder
    }

    #[cfg(not(debug_assertions))]
    {
        let mut builder = Builder::new();
        builder
            .filter(None, LevelFilter::Info)
            .parse_env(Env::default())
            .format(|buf, record| {
                writeln!(
                    buf,
                    "[{} {}] {}",
                    Local::now().format("%Y-%m-%d %H:%M:%S"),
                    record.level(),
                    record.args()
                )
            });
        builder
    }
}
