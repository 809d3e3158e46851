//! Error types for the PDF construction engine.
//!
//! Every error here is fatal: serialization is a single deterministic pass
//! over caller-supplied data, so there is no retry or partial-success mode.

/// Result type alias for PDF construction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while assembling a PDF document.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Same logical name bound to two different underlying objects
    #[error("redefining named object: '{0}'")]
    NamingConflict(String),

    /// A reference survived to format time without a registry entry
    #[error("forward reference to '{0}' not resolved upon final formatting")]
    UnresolvedReference(String),

    /// Stream formatted with no payload set
    #[error("stream content not set")]
    MalformedStream,

    /// Two names compete for an object number, or a number falls outside
    /// its subsection's declared range
    #[error("cross-reference collision: {0}")]
    CrossReferenceCollision(String),

    /// Size or Root missing at trailer construction
    #[error("trailer requires the {0} key")]
    TrailerConstraint(&'static str),

    /// Malformed outline input: bad level jump, negative depth, or an
    /// unresolvable destination
    #[error("outline structure error: {0}")]
    OutlineStructure(String),

    /// A document instance was asked to serialize a second time
    #[error("document already serialized; a second save is not allowed")]
    ReuseViolation,

    /// Formatted object count diverged from the registry after the pass
    #[error("serialization pass formatted {formatted} objects but registry holds {registered}")]
    CountMismatch {
        /// Objects actually emitted
        formatted: usize,
        /// Objects the registry had assigned numbers to
        registered: usize,
    },

    /// Stream filter failure (compression or armoring)
    #[error("stream filter error: {0}")]
    Filter(String),

    /// Unsupported version feature key
    #[error("unsupported feature: {0}")]
    Unsupported(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_naming_conflict_message() {
        let err = Error::NamingConflict("Page3".to_string());
        let msg = format!("{}", err);
        assert!(msg.contains("redefining"));
        assert!(msg.contains("Page3"));
    }

    #[test]
    fn test_unresolved_reference_message() {
        let err = Error::UnresolvedReference("BasicFonts".to_string());
        assert!(format!("{}", err).contains("BasicFonts"));
    }

    #[test]
    fn test_count_mismatch_message() {
        let err = Error::CountMismatch {
            formatted: 4,
            registered: 5,
        };
        let msg = format!("{}", err);
        assert!(msg.contains('4'));
        assert!(msg.contains('5'));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
