pub mod control;
pub mod gate;
pub mod mirror;

pub use control::ControlPlane;
pub use gate::{Authenticator, Denial, SharedSecret};
pub use mirror::Mirror;
