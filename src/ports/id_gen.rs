//! ID generator port for naming conversations.

/// Generates conversation identifiers.
///
/// Transcripts record the id, so replay substitutes a predictable sequence.
pub trait IdGenerator: Send + Sync {
    /// Generates a new unique identifier string.
    fn generate_id(&self) -> String;
}
