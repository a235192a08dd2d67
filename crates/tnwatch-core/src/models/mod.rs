//! Data models for tnwatch

mod alert;
mod metrics;
mod record;
mod stream;

pub use alert::*;
pub use metrics::*;
pub use record::*;
pub use stream::*;
