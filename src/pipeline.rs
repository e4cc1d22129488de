//! Pipeline executor
//!
//! Applies a chain snapshot to one frame. Used identically by the live
//! preview path and by the background save job: both take a consistent
//! snapshot first and call [`apply_chain`] outside any lock.

use crate::chain::ChainSnapshot;
use crate::error::Result;
use crate::frame::VideoFrame;

/// Apply every filter of a snapshot to a frame, in ascending position order
///
/// The output of each filter feeds the next; ordering is the entire semantic
/// contract. An empty snapshot is the identity function. This function is
/// pure given its snapshot and performs no locking.
pub fn apply_chain(frame: VideoFrame, snapshot: &ChainSnapshot) -> Result<VideoFrame> {
    let mut frame = frame;
    for entry in snapshot.entries() {
        frame = entry.filter.apply(&frame, &entry.values)?;
    }
    Ok(frame)
}
