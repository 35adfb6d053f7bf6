//! Error taxonomy for the motivation engine.

/// Domain-level error type shared by the core and its port adapters.
///
/// Recovery rules differ per variant: `Validation` surfaces to the caller
/// unchanged, `Generation` is always recovered via fallback text, `Cache`
/// degrades to a miss/no-op, and `Persistence` on the on-demand path is
/// logged without failing the request.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Bad caller input (missing user id, empty mission list).
    #[error("Validation error: {0}")]
    Validation(String),

    /// The text-generation service failed or timed out.
    #[error("Text generation unavailable: {0}")]
    Generation(String),

    /// A cache read or write failed.
    #[error("Cache unavailable: {0}")]
    Cache(String),

    /// The notification log could not be written.
    #[error("Persistence failure: {0}")]
    Persistence(String),

    /// An upstream collaborator (goal service) call failed.
    #[error("Upstream service error: {0}")]
    Upstream(String),
}
