use crate::core::io::cube::{self, CubeError};
use crate::core::models::grid::ScalarGrid;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum LoadError {
    /// The cancel token was raised; the partial buffer was discarded.
    #[error("Density load cancelled")]
    Cancelled,

    #[error(transparent)]
    Cube(CubeError),

    /// The loader thread went away without publishing a result.
    #[error("Internal loader error: {0}")]
    Internal(String),
}

impl From<CubeError> for LoadError {
    fn from(error: CubeError) -> Self {
        match error {
            CubeError::Interrupted => LoadError::Cancelled,
            other => LoadError::Cube(other),
        }
    }
}

/// Cooperative cancellation flag shared between the loader thread and its
/// owner. Cancellation is best-effort polling, not preemptive: the loader
/// checks the flag roughly once per 1% of points read and there is no
/// timeout.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Events published by a [`DensityLoadTask`].
///
/// Progress arrives at roughly 1% granularity; exactly one `Finished`
/// event terminates the stream, and the grid buffer crosses the thread
/// boundary only inside it.
#[derive(Debug)]
pub enum LoadEvent {
    Progress { percent: u8 },
    Finished(Result<ScalarGrid, LoadError>),
}

/// A density grid load running on a background thread.
///
/// The interactive thread keeps working while the load streams points in;
/// it may poll [`events`](DensityLoadTask::events) itself or block in
/// [`wait_with`](DensityLoadTask::wait_with). The consumer must not touch
/// any grid data before observing `Finished` - which is structurally
/// guaranteed here, since the only grid handle is the one the terminal
/// event carries.
#[derive(Debug)]
pub struct DensityLoadTask {
    events: Receiver<LoadEvent>,
    cancel: CancelToken,
    handle: Option<JoinHandle<()>>,
}

impl DensityLoadTask {
    /// Starts loading `path` in the background, selecting `channel` when
    /// the file interleaves several.
    pub fn spawn(path: impl Into<PathBuf>, channel: usize) -> Self {
        Self::spawn_with(path, channel, CancelToken::new())
    }

    /// Like [`spawn`](DensityLoadTask::spawn), but polls a caller-supplied
    /// cancel token.
    pub fn spawn_with(path: impl Into<PathBuf>, channel: usize, cancel: CancelToken) -> Self {
        let path = path.into();
        let (sender, events) = mpsc::channel();
        let token = cancel.clone();
        let handle = thread::spawn(move || run_load(path, channel, sender, token));
        Self {
            events,
            cancel,
            handle: Some(handle),
        }
    }

    /// The event stream, for callers that poll from an interactive loop.
    pub fn events(&self) -> &Receiver<LoadEvent> {
        &self.events
    }

    /// A clone of the task's cancel token.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Requests cooperative cancellation.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Blocks until the terminal event, forwarding progress along the way.
    pub fn wait_with(mut self, mut on_progress: impl FnMut(u8)) -> Result<ScalarGrid, LoadError> {
        let mut outcome = Err(LoadError::Internal(
            "loader thread exited without publishing a result".to_string(),
        ));
        while let Ok(event) = self.events.recv() {
            match event {
                LoadEvent::Progress { percent } => on_progress(percent),
                LoadEvent::Finished(result) => {
                    outcome = result;
                    break;
                }
            }
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        outcome
    }

    /// Blocks until the terminal event, discarding progress.
    pub fn wait(self) -> Result<ScalarGrid, LoadError> {
        self.wait_with(|_| {})
    }
}

fn run_load(path: PathBuf, channel: usize, sender: Sender<LoadEvent>, cancel: CancelToken) {
    debug!(path = %path.display(), channel, "Density load started.");
    let result = load(&path, channel, &sender, &cancel);
    match &result {
        Ok(grid) => info!(points = grid.len(), "Density load complete."),
        Err(LoadError::Cancelled) => debug!("Density load cancelled; partial buffer discarded."),
        Err(error) => warn!(%error, "Density load failed."),
    }
    // The single publish point: the buffer transfers to the consumer here
    // and nowhere else. A dropped receiver just discards the result.
    let _ = sender.send(LoadEvent::Finished(result));
}

fn load(
    path: &Path,
    channel: usize,
    sender: &Sender<LoadEvent>,
    cancel: &CancelToken,
) -> Result<ScalarGrid, LoadError> {
    let file = File::open(path).map_err(CubeError::from)?;
    let grid = cube::read_cube_with(
        BufReader::new(file),
        channel,
        |percent| {
            let _ = sender.send(LoadEvent::Progress { percent });
        },
        || cancel.is_cancelled(),
    )?;
    Ok(grid)
}
