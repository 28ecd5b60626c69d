/// Conditions raised while relaying a single stream.
///
/// The first three are recovered inside the session (logged and skipped).
/// `Transport` terminates the owning session and nothing else.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Content type missing; dropping audio echo for sequence {sequence_num}")]
    MissingContentType { sequence_num: u32 },
    #[error("Unrecognized payload")]
    UnrecognizedPayload,
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),
    #[error("Transport error: {0}")]
    Transport(String),
}

impl RelayError {
    /// Returns true if the session may keep processing after this condition.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, RelayError::Transport(_))
    }
}
