//! Single-page-application auto-configuration.

use staticship_transfer::FileRecord;
use tracing::{debug, info, warn};

use crate::remote::SpaChecker;

/// Reserved path of the platform configuration file.
pub const SPA_CONFIG_PATH: &str = "ship.json";

/// Catch-all rewrite routing every path to the root document.
pub const SPA_REWRITE_CONFIG: &str =
    r#"{"rewrites":[{"source":"/(.*)","destination":"/index.html"}]}"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpaState {
    Unchecked,
    /// Rewrite config added.
    Configured,
    Skipped,
}

/// Adds a rewrite config to SPA uploads. Runs at most once.
pub struct SpaConfigurator<'a> {
    checker: &'a dyn SpaChecker,
    state: SpaState,
}

impl<'a> SpaConfigurator<'a> {
    pub fn new(checker: &'a dyn SpaChecker) -> Self {
        Self {
            checker,
            state: SpaState::Unchecked,
        }
    }

    pub fn state(&self) -> SpaState {
        self.state
    }

    /// Checks the file set and appends the rewrite config when the checker
    /// says it is an SPA.
    ///
    /// Checker errors count as "not an SPA". A set that already has a
    /// config file, or a disabled check, is left alone.
    pub async fn configure(&mut self, records: &mut Vec<FileRecord>, enabled: bool) -> SpaState {
        if self.state != SpaState::Unchecked {
            return self.state;
        }

        self.state = if !enabled {
            debug!("SPA detection disabled");
            SpaState::Skipped
        } else if records.iter().any(|r| r.path() == SPA_CONFIG_PATH) {
            debug!(path = SPA_CONFIG_PATH, "config file already present");
            SpaState::Skipped
        } else {
            match self.checker.check(records.as_slice()).await {
                Ok(true) => {
                    records.push(FileRecord::from_bytes(
                        SPA_CONFIG_PATH,
                        SPA_REWRITE_CONFIG.as_bytes().to_vec(),
                    ));
                    info!(path = SPA_CONFIG_PATH, "SPA detected, rewrite config added");
                    SpaState::Configured
                }
                Ok(false) => SpaState::Skipped,
                Err(e) => {
                    warn!(error = %e, "SPA check failed, deploying unmodified");
                    SpaState::Skipped
                }
            }
        };

        self.state
    }
}
