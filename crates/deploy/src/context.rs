//! Explicit per-instance deploy context.

use std::sync::Arc;

use staticship_validation::{LimitsCell, PlatformLimits};
use tracing::debug;

use crate::error::DeployError;
use crate::remote::{LimitsFetcher, SpaChecker, Transport};

/// Everything a deploy needs besides its input: the platform limits for
/// this instance and the remote collaborators.
///
/// Passed explicitly to every deploy; there is no process-wide state.
pub struct DeployContext {
    limits: LimitsCell,
    fetcher: Arc<dyn LimitsFetcher>,
    spa: Arc<dyn SpaChecker>,
    transport: Arc<dyn Transport>,
}

impl DeployContext {
    pub fn new(
        fetcher: Arc<dyn LimitsFetcher>,
        spa: Arc<dyn SpaChecker>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            limits: LimitsCell::new(),
            fetcher,
            spa,
            transport,
        }
    }

    /// Builds a context where one client plays every collaborator role.
    pub fn with_client<C>(client: Arc<C>) -> Self
    where
        C: LimitsFetcher + SpaChecker + Transport + 'static,
    {
        Self::new(client.clone(), client.clone(), client)
    }

    /// Returns the limits, failing if they were never fetched.
    pub fn limits(&self) -> Result<&PlatformLimits, DeployError> {
        Ok(self.limits.get()?)
    }

    /// Sets the limits directly, e.g. from a cached copy.
    pub fn set_limits(&self, limits: PlatformLimits) {
        self.limits.set(limits);
    }

    /// Fetches the limits on first use; later calls reuse them.
    pub async fn ensure_limits(&self) -> Result<&PlatformLimits, DeployError> {
        if !self.limits.is_set() {
            let fetched = self.fetcher.fetch_limits().await?;
            debug!(
                max_file_size = fetched.max_file_size,
                max_files_count = fetched.max_files_count,
                max_total_size = fetched.max_total_size,
                "platform limits fetched"
            );
            self.limits.set(fetched);
        }
        self.limits()
    }

    pub fn spa_checker(&self) -> &dyn SpaChecker {
        self.spa.as_ref()
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }
}
