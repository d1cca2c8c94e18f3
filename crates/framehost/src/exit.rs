use std::fmt;
use std::io;

use framehost_codec::CodecError;
use framehost_host::HostError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// The input was read but does not describe anything we can act on.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(DATA_INVALID, message)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => FAILURE,
        io::ErrorKind::InvalidData | io::ErrorKind::InvalidInput => DATA_INVALID,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn json_error(context: &str, err: serde_json::Error) -> CliError {
    match err.classify() {
        serde_json::error::Category::Io => CliError::new(INTERNAL, format!("{context}: {err}")),
        _ => CliError::invalid(format!("{context}: {err}")),
    }
}

pub fn codec_error(context: &str, err: CodecError) -> CliError {
    CliError::invalid(format!("{context}: {err}"))
}

pub fn host_error(context: &str, err: HostError) -> CliError {
    match err {
        HostError::Codec(err) => codec_error(context, err),
        HostError::Service(_) => CliError::new(FAILURE, format!("{context}: {err}")),
        HostError::AlreadyInitialized => CliError::new(INTERNAL, format!("{context}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use framehost_host::ServiceError;

    use super::*;

    #[test]
    fn codec_failures_are_data_invalid() {
        let err = codec_error("decode", CodecError::MissingPrefix);
        assert_eq!(err.code, DATA_INVALID);
        assert!(err.message.starts_with("decode: "));
    }

    #[test]
    fn host_errors_map_by_kind() {
        let service = host_error("replay", HostError::Service(ServiceError::DetachedFrame));
        assert_eq!(service.code, FAILURE);
        let init = host_error("replay", HostError::AlreadyInitialized);
        assert_eq!(init.code, INTERNAL);
        let codec = host_error("replay", HostError::Codec(CodecError::MissingBody));
        assert_eq!(codec.code, DATA_INVALID);
    }

    #[test]
    fn missing_file_is_a_plain_failure() {
        let err = io_error(
            "read scenario",
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(err.code, FAILURE);
    }
}
