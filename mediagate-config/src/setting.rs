use std::path::Path;

use log::{info};

use mediagate_error::{GateError, Result};

use crate::config::Config;
use crate::dbconfig::DbConfig;

/// 통합 세팅 인스턴스
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub server: Config,
    pub database: DbConfig,
}

impl Settings {
    /// Setting 생성 (설정파일 + 환경변수)
    pub fn new() -> Result<Self> {
        let server = Self::load_server_config()?;
        let database = Self::load_db_config()?;

        let mut settings = Self {
            server,
            database,
        };
        settings.apply_overrides(|key| std::env::var(key).ok());

        Ok(settings)
    }

    /// 환경변수 덮어쓰기
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(port) = lookup("PORT").and_then(|v| v.trim().parse().ok()) {
            self.server.bind_port = port;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            info!("DATABASE_URL 환경변수 사용");
            self.database.url = Some(url);
        }
        if let Some(password) = lookup("ADMIN_PASSWORD") {
            self.server.admin.password = Some(password);
        }
        if let Some(path) = lookup("COOKIES_PATH") {
            self.server.extractor.cookies_path = path;
        }
        if let Some(path) = lookup("YTDLP_PATH") {
            self.server.extractor.ytdlp_path = path;
        }
        if let Some(path) = lookup("FFMPEG_PATH") {
            self.server.extractor.ffmpeg_path = Some(path);
        }
    }

    /// 서버 설정 로드
    fn load_server_config() -> Result<Config> {
        // yml 파일 유무 확인
        if Path::new("config.yml").exists() {
            info!("서버 설정파일 로드: config.yml");
            match Config::from_file("config.yml") {
                Ok(config) => Ok(config),
                Err(e) => {
                    Err(GateError::Config(format!("서버 설정파일 로드 실패: {}", e)))
                }
            }
        } else {
            // 기본설정사용
            info!("서버 기본설정 사용");
            Ok(Config::new())
        }
    }

    /// db 설정 로드
    fn load_db_config() -> Result<DbConfig> {
        // yml 파일 유무 확인
        if Path::new("db.yml").exists() {
            info!("DB 설정파일 로드: db.yml");
            match DbConfig::from_file("db.yml") {
                Ok(config) => Ok(config),
                Err(e) => {
                    Err(GateError::Config(format!("DB 설정파일 로드 실패: {}", e)))
                }
            }
        } else {
            // 기본설정사용
            info!("DB 기본설정 사용");
            Ok(DbConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn overrides_from_environment() {
        let vars = env(&[
            ("PORT", "9000"),
            ("DATABASE_URL", "postgres://db/media"),
            ("ADMIN_PASSWORD", "hunter2"),
            ("COOKIES_PATH", "/etc/cookies.txt"),
            ("FFMPEG_PATH", "/opt/bin/ffmpeg"),
        ]);
        let mut settings = Settings::default();
        settings.apply_overrides(|k| vars.get(k).cloned());

        assert_eq!(settings.server.bind_port, 9000);
        assert_eq!(settings.database.url.as_deref(), Some("postgres://db/media"));
        assert_eq!(settings.server.admin.password.as_deref(), Some("hunter2"));
        assert_eq!(settings.server.extractor.cookies_path, "/etc/cookies.txt");
        assert_eq!(settings.server.extractor.ffmpeg_path.as_deref(), Some("/opt/bin/ffmpeg"));
        assert_eq!(settings.server.extractor.ytdlp_path, "yt-dlp");
    }

    #[test]
    fn empty_and_invalid_values_are_ignored() {
        let vars = env(&[("PORT", "not-a-port"), ("ADMIN_PASSWORD", "")]);
        let mut settings = Settings::default();
        settings.apply_overrides(|k| vars.get(k).cloned());

        assert_eq!(settings.server.bind_port, 4000);
        assert!(settings.server.admin.password.is_none());
        assert!(!settings.database.is_configured());
    }
}
