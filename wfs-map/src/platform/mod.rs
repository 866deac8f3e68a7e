//! Provides platform specific logic and [`PlatformService`] to access it.

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::WfsMapError;

pub mod native;

pub use native::NativePlatformService;

/// Service fetching remote data. The layer loader is generic over it so that the transport can be
/// replaced, e.g. by an in-memory service in tests.
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// Loads a byte array from the given url.
    async fn load_bytes_from_url(&self, url: &str) -> Result<Bytes, WfsMapError>;
}

#[async_trait]
impl<T: PlatformService + ?Sized> PlatformService for std::sync::Arc<T> {
    async fn load_bytes_from_url(&self, url: &str) -> Result<Bytes, WfsMapError> {
        (**self).load_bytes_from_url(url).await
    }
}
