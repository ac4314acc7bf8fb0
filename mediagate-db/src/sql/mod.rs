pub mod blocked_domains;
pub mod request_logs;
pub mod settings;
