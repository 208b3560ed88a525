//! Defines structures and types for progress reporting.

/// Represents a snapshot of the progress during a long-running operation.
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    /// A description of the current stage (e.g., "Resolving lemmas").
    pub stage_description: String,
    /// Number of items processed in the current stage.
    pub current_item: u64,
    /// Total number of items expected in the current stage (if calculable).
    pub total_items: Option<u64>,
    /// An optional message providing more context (e.g., "48210 forms").
    pub message: Option<String>,
}

/// Type alias for the progress callback function.
///
/// Resolution is single-threaded, so the callback only needs to be `FnMut`.
pub type ProgressCallback = Box<dyn FnMut(ProgressUpdate)>;

impl ProgressUpdate {
    pub fn new(
        stage_description: String,
        current_item: u64,
        total_items: Option<u64>,
        message: Option<String>,
    ) -> Self {
        ProgressUpdate {
            stage_description,
            current_item,
            total_items,
            message,
        }
    }

    /// Creates a new progress update for the start of a stage.
    pub fn new_stage(description: String, total_items: Option<u64>) -> Self {
        Self::new(description, 0, total_items, None)
    }

    pub fn is_complete(&self) -> bool {
        self.total_items
            .is_some_and(|total| self.current_item >= total)
    }
}
