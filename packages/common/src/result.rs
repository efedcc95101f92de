use crate::error::StoreError;

/// Result alias for store and local storage calls
pub type StoreResult<T> = Result<T, StoreError>;
