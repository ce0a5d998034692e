/// Snapshot of how far a session has advanced, for presentation layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
    /// Seconds left on the clock; `None` for untimed sessions and outside
    /// `Active`.
    pub remaining_seconds: Option<u32>,
    pub is_complete: bool,
}
