//! Browser session factory and the `BrowserSession`/`PageHandle` trait
//! boundary (component B). The core pipeline (crawler, action runner,
//! smart-auth, assertions) depends only on `session::{BrowserSession,
//! PageHandle}`; `chromium` is the ambient default driver.

pub mod chromium;
pub mod errors;
pub mod factory;
pub mod session;
pub mod stealth;
pub mod types;

pub use errors::BrowserError;
pub use factory::BrowserSessionFactory;
pub use session::{BrowserSession, PageHandle};
pub use types::{
    ConsoleLevel, ConsoleLogEntry, Cookie, NetworkLogEntry, StorageState, Viewport, WaitUntil,
    BENIGN_CONSOLE_PATTERNS,
};
