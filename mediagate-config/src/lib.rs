pub mod setting;
pub mod config;
pub mod dbconfig;
pub mod extractor;

pub use setting::Settings;
pub use config::{AdminConfig, Config, RateLimitConfig};
pub use dbconfig::{DbConfig, PoolConfig};
pub use extractor::ExtractorConfig;
