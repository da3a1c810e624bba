//! Pipeline stage progress reporting.
//!
//! The runner notifies an observer as each stage starts and finishes;
//! callers pick console output, silence, or their own sink. This is the
//! pipeline's only output channel besides the returned result.

/// Observer for pipeline stage transitions.
pub trait PipelineProgress: Send + Sync {
    fn on_stage_start(&self, stage: &str);
    fn on_stage_complete(&self, stage: &str);
}

/// Prints one line per stage to stdout.
pub struct StdoutProgress;

impl PipelineProgress for StdoutProgress {
    fn on_stage_start(&self, stage: &str) {
        println!("[straddlelab] {stage}...");
    }

    fn on_stage_complete(&self, _stage: &str) {}
}

/// Discards all notifications. Used by tests and embedding callers.
pub struct SilentProgress;

impl PipelineProgress for SilentProgress {
    fn on_stage_start(&self, _stage: &str) {}
    fn on_stage_complete(&self, _stage: &str) {}
}
