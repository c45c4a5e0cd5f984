/// Coarse progress events emitted by long-running engine operations.
#[derive(Debug, Clone)]
pub enum Progress {
    /// A named stage of work began.
    StageStart { name: &'static str },
    /// Position within the current stage, 0-100.
    Percent(u8),
    /// The current stage finished.
    StageFinish,
    /// Free-form status line for the caller to surface verbatim.
    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

/// Forwards progress events to an optional callback; a reporter without a
/// callback swallows everything, so library code can report
/// unconditionally.
#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
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
}
