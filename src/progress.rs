/// Stages of a walkshed computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Buffering,
    Clipping,
}

/// Observer notified around each stage, e.g. to show a "processing" indicator
/// before the blocking clip pass starts.
pub trait Progress {
    fn started(&self, _stage: Stage) {}
    fn finished(&self, _stage: Stage) {}
}

/// Ignores all notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {}
