/// Store-wide invariant violations. Fatal to the maintenance pass that hits them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexError {
    #[error("inconsistent index after {stage}: expected {expected} entries, found {actual}")]
    InconsistentIndex {
        stage: String,
        expected: usize,
        actual: usize,
    },

    #[error("duplicate scar id: {scar_id}")]
    DuplicateScarId { scar_id: String },

    #[error("unknown scar id: {scar_id}")]
    UnknownScar { scar_id: String },
}
