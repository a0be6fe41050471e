use std::fmt;

/// Phase of a pyramid build, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildStage {
    /// Reading a huge image band by band into the base level.
    Banding,
    /// Generating the reduced pyramid levels.
    Levels,
    /// Rebuilding the base level at a new canvas width.
    Resizing,
}

impl fmt::Display for BuildStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Banding => write!(f, "Opening image"),
            Self::Levels => write!(f, "Building pyramid"),
            Self::Resizing => write!(f, "Fitting to canvas"),
        }
    }
}

/// Thread-safe progress reporting for pyramid builds.
///
/// All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A new stage has started. `total_items` is the number of bands or
    /// levels in this stage, if known.
    fn begin_stage(&self, _stage: BuildStage, _total_items: Option<usize>) {}

    /// `items_done` work items of the current stage are complete.
    fn advance(&self, _items_done: usize) {}

    fn finish_stage(&self) {}
}

/// Reporter that ignores every update.
pub struct NoProgress;
impl ProgressReporter for NoProgress {}
