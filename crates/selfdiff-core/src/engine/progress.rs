/// Progress events emitted by the workflows.
///
/// A workflow is a sequence of phases (unwrapping, indexing, correlation sweep, writing). A phase
/// may contain one task with a known number of steps; the correlation sweep reports one step per
/// reference frame, the unwrap pass one step per frame written.
#[derive(Debug, Clone)]
pub enum Progress {
    PhaseStart { name: &'static str },
    PhaseFinish,

    /// `total_steps` is 0 when the length of the task is not known up front.
    TaskStart { total_steps: u64 },
    TaskIncrement,
    TaskFinish,

    Message(String),
}

/// Receives progress events. Must be `Sync`: parallel workers report from their own threads.
pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    /// A reporter that drops every event.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }

    /// Runs `body` between a `PhaseStart` and a `PhaseFinish` event. `PhaseFinish` is only sent
    /// when `body` succeeds.
    pub fn phase<T, E>(
        &self,
        name: &'static str,
        body: impl FnOnce() -> Result<T, E>,
    ) -> Result<T, E> {
        self.report(Progress::PhaseStart { name });
        let result = body()?;
        self.report(Progress::PhaseFinish);
        Ok(result)
    }
}
