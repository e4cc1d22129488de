//! Streaming save job
//!
//! A background job that reads an entire source video frame by frame, runs
//! each frame through a fixed chain snapshot, and writes the result to a
//! sink. The snapshot is taken once when the job starts: edits to the live
//! chain during saving never affect an in-flight save - what you see when
//! you start the save is what you get.
//!
//! The job runs on its own worker thread so it never blocks frame display or
//! chain edits, and it owns its source and sink exclusively for its
//! lifetime. Both are closed on every exit path.

use crate::chain::ChainSnapshot;
use crate::error::{Error, Result};
use crate::io::{FrameSink, FrameSource};
use crate::pipeline::apply_chain;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// Save job state machine: `Pending -> Running -> {Completed | Failed |
/// Cancelled}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveState {
    /// Spawned but not yet processing
    Pending,
    /// Streaming frames
    Running,
    /// All frames written
    Completed {
        /// Total number of frames written
        frames: u64,
    },
    /// Aborted by a read, write, or filter error
    Failed(String),
    /// Aborted by a cancellation request
    Cancelled,
}

impl SaveState {
    /// Whether this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SaveState::Completed { .. } | SaveState::Failed(_) | SaveState::Cancelled
        )
    }
}

/// Outcome of the streaming loop, before resource cleanup
enum LoopOutcome {
    Completed(u64),
    Cancelled,
}

/// A running or finished save job
///
/// Dropping a `SaveJob` detaches the worker; the job runs to completion on
/// its own.
pub struct SaveJob {
    state: Arc<Mutex<SaveState>>,
    cancel: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl SaveJob {
    /// Spawn a save job over a fixed snapshot
    ///
    /// `progress` receives the index of every frame written. Notifications
    /// are advisory: the channel is unbounded and a dropped receiver never
    /// blocks or fails the job.
    pub fn spawn(
        source: Box<dyn FrameSource>,
        sink: Box<dyn FrameSink>,
        snapshot: ChainSnapshot,
        progress: Option<Sender<u64>>,
    ) -> Result<SaveJob> {
        let state = Arc::new(Mutex::new(SaveState::Pending));
        let cancel = Arc::new(AtomicBool::new(false));

        let worker_state = Arc::clone(&state);
        let worker_cancel = Arc::clone(&cancel);

        let worker = thread::Builder::new()
            .name("vfu-save-worker".to_string())
            .spawn(move || {
                save_worker(source, sink, snapshot, worker_state, worker_cancel, progress);
            })
            .map_err(|e| Error::Init(format!("Failed to spawn save worker: {}", e)))?;

        Ok(SaveJob {
            state,
            cancel,
            worker: Some(worker),
        })
    }

    /// Current state of the job
    pub fn state(&self) -> SaveState {
        self.state.lock().clone()
    }

    /// Whether the job has reached a terminal state
    pub fn is_finished(&self) -> bool {
        self.state().is_terminal()
    }

    /// Request cooperative cancellation
    ///
    /// The flag is checked once per frame; cleanup is identical to the
    /// failure path. Cancelling a finished job has no effect.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// Block until the job reaches a terminal state and return it
    pub fn wait(mut self) -> SaveState {
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Save worker panicked");
                let mut state = self.state.lock();
                if !state.is_terminal() {
                    *state = SaveState::Failed("Save worker panicked".to_string());
                }
            }
        }
        self.state()
    }
}

/// Worker thread body: stream every frame, then release resources and record
/// the terminal state
fn save_worker(
    mut source: Box<dyn FrameSource>,
    mut sink: Box<dyn FrameSink>,
    snapshot: ChainSnapshot,
    state: Arc<Mutex<SaveState>>,
    cancel: Arc<AtomicBool>,
    progress: Option<Sender<u64>>,
) {
    info!(
        "Save started: {} filter(s), {}x{} @ {} fps",
        snapshot.len(),
        source.width(),
        source.height(),
        source.frame_rate()
    );
    *state.lock() = SaveState::Running;

    let fps = source.frame_rate();
    let result = stream_frames(
        source.as_mut(),
        sink.as_mut(),
        &snapshot,
        &cancel,
        progress,
        fps,
    );

    // Release both resources on every exit path; a close failure on an
    // otherwise clean run is itself a failure
    let source_closed = source.close();
    let sink_closed = sink.close();

    let terminal = match result {
        Ok(LoopOutcome::Cancelled) => {
            info!("Save cancelled");
            SaveState::Cancelled
        }
        Ok(LoopOutcome::Completed(frames)) => match (source_closed, sink_closed) {
            (Ok(()), Ok(())) => {
                info!("Save completed: {} frames", frames);
                SaveState::Completed { frames }
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!("Save failed while closing: {}", e);
                SaveState::Failed(e.to_string())
            }
        },
        Err(e) => {
            warn!("Save failed: {}", e);
            if let Err(close_err) = source_closed.and(sink_closed) {
                warn!("Cleanup after failed save also failed: {}", close_err);
            }
            SaveState::Failed(e.to_string())
        }
    };

    *state.lock() = terminal;
}

/// The per-frame loop: read, apply the snapshot, write, report progress
fn stream_frames(
    source: &mut dyn FrameSource,
    sink: &mut dyn FrameSink,
    snapshot: &ChainSnapshot,
    cancel: &AtomicBool,
    progress: Option<Sender<u64>>,
    fps: f64,
) -> Result<LoopOutcome> {
    let log_every = (fps * 10.0).round().max(1.0) as u64;
    let mut index: u64 = 0;

    loop {
        if cancel.load(Ordering::SeqCst) {
            return Ok(LoopOutcome::Cancelled);
        }

        let frame = match source.read_frame() {
            Ok(frame) => frame,
            Err(Error::EndOfStream) => return Ok(LoopOutcome::Completed(index)),
            Err(e) => return Err(e),
        };

        let filtered = apply_chain(frame, snapshot)?;
        sink.write_frame(&filtered)?;

        if let Some(tx) = &progress {
            // Advisory only; a dropped receiver must not stop the job
            let _ = tx.send(index);
        }
        index += 1;
        if index % log_every == 0 {
            debug!("{} seconds saved", (index as f64 / fps).round());
        }
    }
}

/// Owner of the save path enforcing the single-flight policy
///
/// A second save requested while one is running is rejected with
/// [`Error::SaveInProgress`]; a finished job is replaced.
pub struct SaveManager {
    current: Mutex<Option<SaveJob>>,
}

impl SaveManager {
    /// Create a manager with no job
    pub fn new() -> Self {
        SaveManager {
            current: Mutex::new(None),
        }
    }

    /// Start a save job unless one is still in flight
    pub fn start(
        &self,
        source: Box<dyn FrameSource>,
        sink: Box<dyn FrameSink>,
        snapshot: ChainSnapshot,
        progress: Option<Sender<u64>>,
    ) -> Result<()> {
        let mut current = self.current.lock();
        if let Some(job) = current.as_ref() {
            if !job.is_finished() {
                return Err(Error::SaveInProgress);
            }
        }
        *current = Some(SaveJob::spawn(source, sink, snapshot, progress)?);
        Ok(())
    }

    /// State of the most recent job, if any
    pub fn state(&self) -> Option<SaveState> {
        self.current.lock().as_ref().map(|job| job.state())
    }

    /// Request cancellation of the current job, if any
    pub fn cancel(&self) {
        if let Some(job) = self.current.lock().as_ref() {
            job.cancel();
        }
    }

    /// Wait for the current job to finish and return its terminal state
    pub fn wait(&self) -> Option<SaveState> {
        let job = self.current.lock().take();
        job.map(|job| job.wait())
    }
}

impl Default for SaveManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(!SaveState::Pending.is_terminal());
        assert!(!SaveState::Running.is_terminal());
        assert!(SaveState::Completed { frames: 0 }.is_terminal());
        assert!(SaveState::Failed("boom".to_string()).is_terminal());
        assert!(SaveState::Cancelled.is_terminal());
    }

    #[test]
    fn test_manager_starts_empty() {
        let manager = SaveManager::new();
        assert!(manager.state().is_none());
        assert!(manager.wait().is_none());
    }
}
