/// Per-call data owned by a single stream session.
///
/// Holds the negotiated content type and the DTMF echo counter. It is never
/// shared between sessions, so it carries no locking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    content_type: Option<String>,
    dtmf_sequence: u32,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the call's content type, replacing any earlier value.
    ///
    /// An empty value leaves the content type unknown.
    pub fn set_content_type(&mut self, value: impl Into<String>) {
        let value = value.into();
        self.content_type = (!value.is_empty()).then_some(value);
    }

    /// The negotiated content type, or `None` while it is still unknown.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Returns the sequence number for the next DTMF echo, starting at 1.
    pub fn next_dtmf_sequence(&mut self) -> u32 {
        self.dtmf_sequence = self.dtmf_sequence.wrapping_add(1).max(1);
        self.dtmf_sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_unknown_by_default() {
        let session = SessionState::new();
        assert_eq!(session.content_type(), None);
    }

    #[test]
    fn test_set_content_type_overwrites() {
        let mut session = SessionState::new();
        session.set_content_type("audio/mulaw;rate=8000");
        session.set_content_type("audio/mulaw;rate=8000");
        assert_eq!(session.content_type(), Some("audio/mulaw;rate=8000"));

        session.set_content_type("audio/l16;rate=16000");
        assert_eq!(session.content_type(), Some("audio/l16;rate=16000"));
    }

    #[test]
    fn test_empty_content_type_means_unknown() {
        let mut session = SessionState::new();
        session.set_content_type("audio/mulaw;rate=8000");
        session.set_content_type("");
        assert_eq!(session.content_type(), None);
    }

    #[test]
    fn test_dtmf_sequence_is_monotonic_from_one() {
        let mut session = SessionState::new();
        assert_eq!(session.next_dtmf_sequence(), 1);
        assert_eq!(session.next_dtmf_sequence(), 2);
        assert_eq!(session.next_dtmf_sequence(), 3);
    }
}
