pub mod server;
pub mod state;
mod admin;
mod http;
mod image_proxy;
mod public;
mod rate_limit;
mod router;
mod static_files;

pub use server::ApiServer;
pub use state::{AppState, ImageClient};
pub use rate_limit::{ClientIp, RateLimits};
pub use router::route;
pub use http::GateBody;
