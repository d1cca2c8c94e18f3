/// Errors reported by the position and overlay services.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// The service cannot answer right now.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// The frame is no longer attached to the host document.
    #[error("frame is detached from the host document")]
    DetachedFrame,

    /// Any other service failure.
    #[error("service failed: {0}")]
    Failed(String),
}

/// Errors that can occur in host operations.
///
/// Ignored, untrusted and unprocessed messages are not errors: they are
/// reported as a `false` dispatch result. These variants cover failures a
/// handler could not absorb and misuse of the bootstrap.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// A collaborating service failed while a handler was running.
    #[error("service error: {0}")]
    Service(#[from] ServiceError),

    /// A response could not be encoded.
    #[error("codec error: {0}")]
    Codec(#[from] framehost_codec::CodecError),

    /// The page already has a messaging host installed.
    #[error("messaging host already initialized for this page")]
    AlreadyInitialized,
}

pub type Result<T> = std::result::Result<T, HostError>;
