//! Network client boundary
//!
//! The pipeline only talks to the network through [`NetworkClient`] and
//! [`StreamHandle`]. [`TnClient`] is the HTTP implementation; tests substitute
//! in-memory ones.

mod http;
mod retry;
mod signer;

pub use http::TnClient;
pub use retry::RetryPolicy;
pub use signer::Signer;

use crate::error::Result;
use crate::models::{DateRange, RawRecord, StreamKind, StreamLocator};

/// Entry point to the stream network
#[async_trait::async_trait]
pub trait NetworkClient: Send + Sync {
    /// Resolve a stream, checking it exists and has the expected kind
    async fn load_stream(
        &self,
        locator: &StreamLocator,
        kind: StreamKind,
    ) -> Result<Box<dyn StreamHandle>>;
}

/// A loaded stream
#[async_trait::async_trait]
pub trait StreamHandle: Send + Sync {
    /// Which stream this is
    fn locator(&self) -> &StreamLocator;

    /// Primitive or composed
    fn kind(&self) -> StreamKind;

    /// Records whose date falls in `range`, in network order
    async fn get_records(&self, range: &DateRange) -> Result<Vec<RawRecord>>;

    /// Index levels for `range`, same shape as records
    async fn get_index(&self, range: &DateRange) -> Result<Vec<RawRecord>>;
}
