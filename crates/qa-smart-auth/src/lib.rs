//! Three-tier smart-authentication resolver (component D): locates a login
//! form's selectors without operator configuration, then drives and verifies
//! the login. Grounded on
//! `examples/original_source/src/auth/smart_auth.py`.

mod auth;
mod detect;
mod errors;
mod types;
mod verify;
mod vision;

pub use auth::{authenticate_and_capture_state, resolve_selectors};
pub use errors::SmartAuthError;
pub use types::{Credentials, DetectionMethod, ExplicitSelectors, LoginSelectors, SmartAuthResult};
pub use verify::verify_login_success;
