/// Errors raised by the pure domain layer. Everything here is an input
/// problem; infrastructure failures live in the storage and ledger crates.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),
}
