use crate::error::StoreError;
use crate::types::{Location, Reference};

pub type StoreResult<T, E = StoreError> = std::result::Result<T, E>;

/// A pluggable blob store backend.
///
/// Backends that cannot perform an operation return
/// `StoreError::Unimplemented` for it rather than leaving it out, so any
/// backend can stand in for any other behind `dyn Store`.
pub trait Store: std::fmt::Debug + Send + Sync {
    /// Base endpoint the backend was configured with.
    fn endpoint(&self) -> &str;

    /// Fetches the blob behind `reference`, together with any alternate
    /// locations the backend knows about.
    fn get(&self, reference: &Reference) -> StoreResult<(Vec<u8>, Vec<Location>)>;

    /// Stores `data` and returns the reference it can be fetched by.
    fn put(&self, data: &[u8]) -> StoreResult<Reference>;

    fn delete(&self, reference: &Reference) -> StoreResult<()>;
}
