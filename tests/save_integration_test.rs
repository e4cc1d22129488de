//! Integration tests for the streaming save job
//!
//! Covers snapshot isolation from live-chain edits, failure semantics,
//! resource release, cancellation, and the single-flight policy.

use std::sync::mpsc;
use std::time::Duration;
use vfu_lib::chain::ActiveFilterChain;
use vfu_lib::registry::FilterRegistry;
use vfu_lib::save::{SaveJob, SaveManager, SaveState};
use vfu_lib::Error;

#[path = "common/mod.rs"]
mod common;

use common::*;

fn source_of(n: u64, fps: f64) -> MemorySource {
    let frames = (0..n).map(|i| gradient_frame(8, 6, i)).collect();
    MemorySource::new(frames, fps)
}

/// A plain save writes every frame, filtered, in order
#[test]
fn test_save_writes_all_frames() {
    let registry = FilterRegistry::with_builtins();
    let chain = ActiveFilterChain::new();
    chain.add(registry.get("Grayscale").unwrap());

    let source = source_of(20, 25.0);
    let sink = MemorySink::new();
    let written = sink.frames();

    let job = SaveJob::spawn(Box::new(source), Box::new(sink), chain.snapshot(), None).unwrap();
    assert_eq!(job.wait(), SaveState::Completed { frames: 20 });

    let written = written.lock();
    assert_eq!(written.len(), 20);
    for frame in written.iter() {
        for px in frame.data.chunks_exact(3) {
            assert_eq!(px[0], px[1]);
            assert_eq!(px[1], px[2]);
        }
    }
}

/// Progress notifications carry every frame index, in order
#[test]
fn test_progress_reports_every_frame() {
    let chain = ActiveFilterChain::new();
    let (tx, rx) = mpsc::channel();

    let job = SaveJob::spawn(
        Box::new(source_of(10, 25.0)),
        Box::new(MemorySink::new()),
        chain.snapshot(),
        Some(tx),
    )
    .unwrap();
    assert_eq!(job.wait(), SaveState::Completed { frames: 10 });

    let indices: Vec<u64> = rx.try_iter().collect();
    assert_eq!(indices, (0..10).collect::<Vec<_>>());
}

/// A consumer that never listens must not block the job
#[test]
fn test_dropped_progress_receiver_does_not_block() {
    let chain = ActiveFilterChain::new();
    let (tx, rx) = mpsc::channel();
    drop(rx);

    let job = SaveJob::spawn(
        Box::new(source_of(50, 25.0)),
        Box::new(MemorySink::new()),
        chain.snapshot(),
        Some(tx),
    )
    .unwrap();
    assert_eq!(job.wait(), SaveState::Completed { frames: 50 });
}

/// Scenario 3: edits to the live chain after the save starts do not affect
/// the in-flight save - the fixed snapshot is used for all frames
#[test]
fn test_save_is_isolated_from_chain_drift() {
    let registry = FilterRegistry::with_builtins();
    let chain = ActiveFilterChain::new();
    let lum_handle = chain.add(registry.get("Luminosity").unwrap());
    chain.set_param(lum_handle, "Luminosity", 50.0).unwrap();
    chain.add(registry.get("Grayscale").unwrap());

    let snapshot = chain.snapshot();
    let sink = MemorySink::new();
    let written = sink.frames();
    let job = SaveJob::spawn(
        Box::new(source_of(300, 30.0)),
        Box::new(sink),
        snapshot.clone(),
        None,
    )
    .unwrap();

    // Race the save with structural edits to the live chain
    chain.remove(lum_handle).unwrap();
    assert_eq!(chain.len(), 1);

    assert_eq!(job.wait(), SaveState::Completed { frames: 300 });

    // Every output frame matches the original 2-entry snapshot
    let written = written.lock();
    assert_eq!(written.len(), 300);
    for (i, frame) in written.iter().enumerate() {
        let expected =
            vfu_lib::apply_chain(gradient_frame(8, 6, i as u64), &snapshot).unwrap();
        assert_eq!(*frame, expected, "frame {} drifted", i);
    }
}

/// Scenario 4: a destination write failure on frame 150 of 300 fails the
/// job, releases both resources, and writes nothing past frame 150
#[test]
fn test_write_failure_aborts_and_releases() {
    let chain = ActiveFilterChain::new();
    let source = source_of(300, 30.0);
    let source_closed = source.closed_flag();

    let sink = MemorySink::failing_at(150);
    let sink_closed = sink.closed_flag();
    let written = sink.frames();

    let job = SaveJob::spawn(Box::new(source), Box::new(sink), chain.snapshot(), None).unwrap();
    match job.wait() {
        SaveState::Failed(msg) => assert!(msg.contains("simulated write failure"), "{}", msg),
        other => panic!("expected Failed, got {:?}", other),
    }

    assert!(*source_closed.lock(), "source must be released on failure");
    assert!(*sink_closed.lock(), "sink must be released on failure");
    assert_eq!(written.lock().len(), 150);
}

/// Running out of frames is normal termination, not a failure
#[test]
fn test_empty_source_completes_with_zero_frames() {
    let chain = ActiveFilterChain::new();
    let source = MemorySource::new(Vec::new(), 25.0);
    let source_closed = source.closed_flag();

    let job = SaveJob::spawn(
        Box::new(source),
        Box::new(MemorySink::new()),
        chain.snapshot(),
        None,
    )
    .unwrap();
    assert_eq!(job.wait(), SaveState::Completed { frames: 0 });
    assert!(*source_closed.lock());
}

/// Cancellation is cooperative, checked once per frame, with cleanup
/// identical to the failure path
#[test]
fn test_cancellation_stops_the_job() {
    let chain = ActiveFilterChain::new();
    let source = source_of(100_000, 30.0);
    let source_closed = source.closed_flag();
    let sink = MemorySink::new();
    let sink_closed = sink.closed_flag();
    let written = sink.frames();

    let job = SaveJob::spawn(Box::new(source), Box::new(sink), chain.snapshot(), None).unwrap();
    job.cancel();
    assert_eq!(job.wait(), SaveState::Cancelled);

    assert!(*source_closed.lock());
    assert!(*sink_closed.lock());
    assert!(written.lock().len() < 100_000);
}

/// A second save while one is running is rejected, not interleaved
#[test]
fn test_second_save_is_rejected() {
    let chain = ActiveFilterChain::new();
    let manager = SaveManager::new();

    manager
        .start(
            Box::new(source_of(100_000, 30.0)),
            Box::new(MemorySink::new()),
            chain.snapshot(),
            None,
        )
        .unwrap();

    let second = manager.start(
        Box::new(source_of(10, 30.0)),
        Box::new(MemorySink::new()),
        chain.snapshot(),
        None,
    );
    assert!(matches!(second, Err(Error::SaveInProgress)));

    manager.cancel();
    let state = manager.wait().unwrap();
    assert!(state.is_terminal());
}

/// Once the previous job finished, the manager accepts a new one
#[test]
fn test_manager_accepts_save_after_completion() {
    let chain = ActiveFilterChain::new();
    let manager = SaveManager::new();

    manager
        .start(
            Box::new(source_of(5, 25.0)),
            Box::new(MemorySink::new()),
            chain.snapshot(),
            None,
        )
        .unwrap();
    assert_eq!(manager.wait(), Some(SaveState::Completed { frames: 5 }));

    manager
        .start(
            Box::new(source_of(5, 25.0)),
            Box::new(MemorySink::new()),
            chain.snapshot(),
            None,
        )
        .unwrap();
    assert_eq!(manager.wait(), Some(SaveState::Completed { frames: 5 }));
}

/// The save job never blocks chain reads: a snapshot remains cheap while a
/// job is running
#[test]
fn test_chain_stays_responsive_during_save() {
    let registry = FilterRegistry::with_builtins();
    let chain = ActiveFilterChain::new();
    chain.add(registry.get("Blur").unwrap());

    let job = SaveJob::spawn(
        Box::new(source_of(10_000, 30.0)),
        Box::new(MemorySink::new()),
        chain.snapshot(),
        None,
    )
    .unwrap();

    let start = std::time::Instant::now();
    for _ in 0..100 {
        let _ = chain.snapshot();
        let h = chain.add(registry.get("Sharpen").unwrap());
        chain.remove(h).unwrap();
    }
    assert!(
        start.elapsed() < Duration::from_secs(5),
        "chain edits must not stall behind the save job"
    );

    job.cancel();
    assert!(job.wait().is_terminal());
}
