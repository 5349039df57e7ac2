//! Error code contract shared by the engine's typed errors.

/// Maps a typed error onto a stable machine-readable code.
///
/// Hosts key user-facing copy and retry behavior off these codes rather than
/// off `Display` strings, which are free to change.
pub trait ErrorCode {
    /// Stable code, e.g. `"E_INVALID_ENDPOINT"`.
    fn error_code(&self) -> &'static str;

    /// Whether retrying the same call can plausibly succeed.
    fn retryable(&self) -> bool {
        false
    }
}
