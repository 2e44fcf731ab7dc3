use thiserror::Error;

/// A received message failed header validation.
///
/// Per-frame, non-fatal: the caller drops the frame and keeps reading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameFormatError {
    #[error("frame is {actual} bytes, shorter than the {expected}-byte header")]
    TooShort { expected: usize, actual: usize },
    #[error("frame does not begin with the STARTER delimiter")]
    MissingStarter,
}
