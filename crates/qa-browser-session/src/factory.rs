use crate::chromium::ChromiumBrowserSession;
use crate::errors::BrowserError;
use crate::session::BrowserSession;
use crate::types::{StorageState, Viewport};

/// Produces stealth-patched, optionally video-recording sessions; seeds with
/// storage state (component B).
pub struct BrowserSessionFactory {
    headless: bool,
    viewport: Viewport,
}

impl BrowserSessionFactory {
    pub fn new(headless: bool, viewport: Viewport) -> Self {
        Self { headless, viewport }
    }

    /// Acquire a fresh isolated session. `storage_state` seeds cookies when
    /// the test `requires_auth`; pass `None` for an unauthenticated session.
    pub async fn acquire(
        &self,
        storage_state: Option<StorageState>,
    ) -> Result<Box<dyn BrowserSession>, BrowserError> {
        let session = ChromiumBrowserSession::launch(self.headless, self.viewport, storage_state).await?;
        Ok(Box::new(session))
    }
}
