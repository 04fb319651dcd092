//! Mock collaborators shared by the unit tests.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use staticship_transfer::FileRecord;
use staticship_validation::PlatformLimits;

use crate::encoder::DeployBody;
use crate::error::DeployError;
use crate::remote::{LimitsFetcher, SpaChecker, Transport};
use crate::types::Deployment;

pub(crate) fn limits() -> PlatformLimits {
    PlatformLimits {
        max_file_size: 1024 * 1024,
        max_files_count: 100,
        max_total_size: 10 * 1024 * 1024,
        allowed_mime_types: vec![
            "text/".into(),
            "image/".into(),
            "application/".into(),
            "font/".into(),
        ],
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum SpaReply {
    Yes,
    No,
    Fail,
}

pub(crate) struct MockRemote {
    limits: PlatformLimits,
    fail_limits: bool,
    spa: SpaReply,
    limit_fetches: AtomicUsize,
    spa_checks: AtomicUsize,
    bodies: Mutex<Vec<DeployBody>>,
}

impl MockRemote {
    pub(crate) fn new() -> Self {
        Self {
            limits: limits(),
            fail_limits: false,
            spa: SpaReply::No,
            limit_fetches: AtomicUsize::new(0),
            spa_checks: AtomicUsize::new(0),
            bodies: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn with_limits(mut self, limits: PlatformLimits) -> Self {
        self.limits = limits;
        self
    }

    pub(crate) fn failing_limits(mut self) -> Self {
        self.fail_limits = true;
        self
    }

    pub(crate) fn with_spa(mut self, reply: SpaReply) -> Self {
        self.spa = reply;
        self
    }

    pub(crate) fn limit_fetches(&self) -> usize {
        self.limit_fetches.load(Ordering::SeqCst)
    }

    pub(crate) fn spa_checks(&self) -> usize {
        self.spa_checks.load(Ordering::SeqCst)
    }

    pub(crate) fn take_bodies(&self) -> Vec<DeployBody> {
        std::mem::take(&mut *self.bodies.lock().unwrap())
    }
}

impl LimitsFetcher for MockRemote {
    fn fetch_limits(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<PlatformLimits, DeployError>> + Send + '_>> {
        Box::pin(async move {
            self.limit_fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail_limits {
                Err(DeployError::Transport("config endpoint unavailable".into()))
            } else {
                Ok(self.limits.clone())
            }
        })
    }
}

impl SpaChecker for MockRemote {
    fn check<'a>(
        &'a self,
        _files: &'a [FileRecord],
    ) -> Pin<Box<dyn Future<Output = Result<bool, DeployError>> + Send + 'a>> {
        Box::pin(async move {
            self.spa_checks.fetch_add(1, Ordering::SeqCst);
            match self.spa {
                SpaReply::Yes => Ok(true),
                SpaReply::No => Ok(false),
                SpaReply::Fail => Err(DeployError::Transport("spa-check timed out".into())),
            }
        })
    }
}

impl Transport for MockRemote {
    fn deploy(
        &self,
        body: DeployBody,
    ) -> Pin<Box<dyn Future<Output = Result<Deployment, DeployError>> + Send + '_>> {
        Box::pin(async move {
            self.bodies.lock().unwrap().push(body);
            Ok(Deployment {
                deployment: "dep-1".into(),
                files: 0,
                size: 0,
                status: "pending".into(),
                url: None,
            })
        })
    }
}
