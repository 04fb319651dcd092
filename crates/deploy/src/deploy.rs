//! Deploy orchestrator.
//!
//! Drives one deploy through its stages: limits, ingestion, SPA
//! configuration, encoding and upload. Progress events are best-effort and
//! cancellation is checked between stages.

use std::sync::Arc;

use staticship_transfer::FileRecord;
use staticship_validation::{PlatformLimits, ValidationOutcome};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::context::DeployContext;
use crate::encoder::{encode_buffered, encode_form};
use crate::error::DeployError;
use crate::memory::{preflight, prepare_files};
use crate::scanner::prepare_paths;
use crate::spa::{SpaConfigurator, SpaState};
use crate::types::{DeployEvent, DeployInput, DeployOptions, Deployment};

/// Which front-end produced the records; selects the body encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Runtime {
    Filesystem,
    Memory,
}

/// Runs deploys against one [`DeployContext`].
pub struct Deployer {
    ctx: Arc<DeployContext>,
    events_tx: mpsc::Sender<DeployEvent>,
    events_rx: Option<mpsc::Receiver<DeployEvent>>,
}

impl Deployer {
    pub fn new(ctx: Arc<DeployContext>) -> Self {
        let (events_tx, events_rx) = mpsc::channel(64);
        Self {
            ctx,
            events_tx,
            events_rx: Some(events_rx),
        }
    }

    /// Takes the event receiver. Can only be called once.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<DeployEvent>> {
        self.events_rx.take()
    }

    pub fn context(&self) -> &DeployContext {
        &self.ctx
    }

    /// Fetches the platform limits unless already known.
    pub async fn ensure_limits(&self) -> Result<&PlatformLimits, DeployError> {
        self.ctx.ensure_limits().await
    }

    /// Validates in-memory files as a batch without uploading anything.
    ///
    /// Filesystem inputs are validated while scanning, so they are rejected
    /// here with an environment error.
    pub async fn preflight(&self, input: &DeployInput) -> Result<ValidationOutcome, DeployError> {
        match input {
            DeployInput::Paths(_) => Err(DeployError::Environment(
                "preflight requires in-memory files".into(),
            )),
            DeployInput::Files(files) => {
                let limits = self.ctx.ensure_limits().await?;
                Ok(preflight(files, limits))
            }
        }
    }

    /// Prepares, encodes and uploads one deployment.
    pub async fn deploy(
        &self,
        input: DeployInput,
        options: &DeployOptions,
    ) -> Result<Deployment, DeployError> {
        check_cancelled(options)?;
        let limits = self.ctx.ensure_limits().await?;

        self.emit(DeployEvent::Scanning);
        let (runtime, mut records) = match input {
            DeployInput::Paths(paths) => (
                Runtime::Filesystem,
                prepare_paths(&paths, limits, options.flatten).await?,
            ),
            DeployInput::Files(files) => (
                Runtime::Memory,
                prepare_files(files, limits, options.flatten).await?,
            ),
        };
        if records.is_empty() {
            return Err(DeployError::NoFiles);
        }
        self.emit(DeployEvent::Prepared {
            files: records.len(),
            bytes: records.iter().map(FileRecord::size).sum(),
        });

        let mut spa = SpaConfigurator::new(self.ctx.spa_checker());
        if spa.configure(&mut records, options.spa_detect).await == SpaState::Configured {
            self.emit(DeployEvent::SpaConfigured);
        }

        check_cancelled(options)?;
        let labels = options.labels.as_slice();
        let via = options.via.as_deref();
        let body = match runtime {
            Runtime::Filesystem => encode_buffered(&records, labels, via).await?,
            Runtime::Memory => encode_form(&records, labels, via).await?,
        };
        debug!(?runtime, payload = ?body.payload, "deploy body encoded");

        self.emit(DeployEvent::Uploading);
        let deployment = self.ctx.transport().deploy(body).await?;
        info!(
            deployment = %deployment.deployment,
            files = records.len(),
            status = %deployment.status,
            "deployment created"
        );
        Ok(deployment)
    }

    fn emit(&self, event: DeployEvent) {
        let _ = self.events_tx.try_send(event);
    }
}

fn check_cancelled(options: &DeployOptions) -> Result<(), DeployError> {
    match &options.cancel {
        Some(token) if token.is_cancelled() => Err(DeployError::Cancelled),
        _ => Ok(()),
    }
}
