/// Errors that can occur during envelope encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The data does not start with the protocol tag.
    #[error("missing protocol prefix (expected \"amp-\")")]
    MissingPrefix,

    /// The data carries the tag but no JSON object.
    #[error("missing message body")]
    MissingBody,

    /// An outbound payload did not serialize to a JSON object.
    #[error("payload must serialize to a JSON object")]
    PayloadNotObject,

    /// The body is not a valid envelope.
    #[error("invalid message json: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CodecError>;
