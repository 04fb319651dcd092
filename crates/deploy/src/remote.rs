//! Collaborator traits for the platform side of a deploy.
//!
//! The API client implements these on top of HTTP. Keeping them as traits
//! keeps the pipeline decoupled from transport and testable with mocks.

use std::future::Future;
use std::pin::Pin;

use staticship_transfer::FileRecord;
use staticship_validation::PlatformLimits;

use crate::encoder::DeployBody;
use crate::error::DeployError;
use crate::types::Deployment;

/// Fetches the platform's business-rule limits.
pub trait LimitsFetcher: Send + Sync {
    fn fetch_limits(
        &self,
    ) -> Pin<Box<dyn Future<Output = Result<PlatformLimits, DeployError>> + Send + '_>>;
}

/// Heuristic check for single-page-application layouts.
///
/// Failures are never fatal: callers treat an error as "not an SPA".
pub trait SpaChecker: Send + Sync {
    fn check<'a>(
        &'a self,
        files: &'a [FileRecord],
    ) -> Pin<Box<dyn Future<Output = Result<bool, DeployError>> + Send + 'a>>;
}

/// Uploads an encoded deploy body.
pub trait Transport: Send + Sync {
    fn deploy(
        &self,
        body: DeployBody,
    ) -> Pin<Box<dyn Future<Output = Result<Deployment, DeployError>> + Send + '_>>;
}
