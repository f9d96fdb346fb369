use thiserror::Error;

/// Error types for the prefwatch crate.
///
/// Store-level I/O failures are never represented here; they surface as
/// `false` write outcomes. Errors are reserved for precondition violations
/// and subscription-pipeline failures.
#[derive(Error, Debug)]
pub enum PrefwatchError {
    /// A keyed mutation was attempted through the aggregate key view.
    #[error("cannot {operation} through the aggregate key view")]
    AggregateMutation {
        /// The rejected operation ("set" or "clear").
        operation: &'static str,
    },

    /// A subscription branch failed while feeding an aggregation.
    #[error("subscription to '{key}' failed: {details}")]
    Subscription {
        /// Key of the failing branch.
        key: String,
        /// Failure details.
        details: String,
    },
}

/// A specialized `Result` type for prefwatch operations.
///
/// This type alias simplifies error handling by defaulting the error type
/// to `PrefwatchError` for all prefwatch operations.
pub type Result<T> = std::result::Result<T, PrefwatchError>;
