#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavError {
    #[error("no route matches `{path}`")]
    NotFound { path: String },
    #[error("resolving `{path}` failed: {message}")]
    Resolution { path: String, message: String },
    #[error("navigation to `{path}` was superseded by a newer one")]
    Superseded { path: String },
    #[error("`{path}` did not become available within {waited_ms} ms")]
    Timeout { path: String, waited_ms: u64 },
    #[error("invalid navigation target `{target}`: {reason}")]
    InvalidTarget { target: String, reason: String },
}
