// src/painter/tests.rs

use super::*;
use crate::color::{Color, NamedColor};
use anyhow::anyhow;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use test_log::test;

const CANVAS: Size = Size::new(64, 64);

// --- Test collaborators ---

#[derive(Default)]
struct RecordingReceiver {
    frames: Mutex<Vec<Arc<Texture>>>,
}

impl RecordingReceiver {
    fn frames(&self) -> Vec<Arc<Texture>> {
        self.frames.lock().unwrap().clone()
    }

    fn count(&self) -> usize {
        self.frames.lock().unwrap().len()
    }
}

impl TextureReceiver for RecordingReceiver {
    fn update_texture(&self, texture: Arc<Texture>) {
        self.frames.lock().unwrap().push(texture);
    }
}

struct BlankProvider;

impl TextureProvider for BlankProvider {
    fn new_texture(&self, size: Size) -> anyhow::Result<Texture> {
        Ok(Texture::new(size))
    }
}

struct FailingProvider;

impl TextureProvider for FailingProvider {
    fn new_texture(&self, _size: Size) -> anyhow::Result<Texture> {
        Err(anyhow!("out of texture memory"))
    }
}

/// Counts how many times it has been applied.
struct CountingOp {
    applied: Arc<AtomicUsize>,
    ready: bool,
}

impl Operation for CountingOp {
    fn apply(&self, _texture: &mut Texture) -> bool {
        self.applied.fetch_add(1, Ordering::SeqCst);
        self.ready
    }
}

fn started() -> (EventLoop, Arc<RecordingReceiver>) {
    let receiver = Arc::new(RecordingReceiver::default());
    let mut event_loop = EventLoop::new(receiver.clone(), CANVAS);
    event_loop.initiate(&BlankProvider).unwrap();
    (event_loop, receiver)
}

// --- Lifecycle ---

#[test]
fn initiate_starts_worker_and_terminate_stops_it() {
    let (mut event_loop, _receiver) = started();
    assert_eq!(event_loop.phase(), LoopPhase::Running);
    assert!(event_loop.is_running());

    event_loop.terminate().unwrap();
    assert_eq!(event_loop.phase(), LoopPhase::Terminated);
    assert!(!event_loop.is_running());
}

#[test]
fn initiate_twice_is_rejected() {
    let (mut event_loop, _receiver) = started();
    assert!(matches!(
        event_loop.initiate(&BlankProvider),
        Err(LoopError::AlreadyStarted)
    ));
    event_loop.terminate().unwrap();
}

#[test]
fn allocation_failure_is_reported_and_nothing_runs() {
    let receiver = Arc::new(RecordingReceiver::default());
    let mut event_loop = EventLoop::new(receiver, CANVAS);
    let err = event_loop.initiate(&FailingProvider).unwrap_err();
    assert!(matches!(err, LoopError::Allocation(_)));
    assert_eq!(event_loop.phase(), LoopPhase::Created);
}

#[test]
fn terminate_is_idempotent() {
    let (mut event_loop, _receiver) = started();
    event_loop.terminate().unwrap();
    event_loop.terminate().unwrap();
}

#[test]
fn terminate_without_initiate_closes_queue() {
    let receiver = Arc::new(RecordingReceiver::default());
    let mut event_loop = EventLoop::new(receiver.clone(), CANVAS);
    event_loop.enqueue(MarkReady).unwrap();
    event_loop.terminate().unwrap();

    assert_eq!(receiver.count(), 0);
    assert!(matches!(
        event_loop.initiate(&BlankProvider),
        Err(LoopError::Terminated)
    ));
}

// --- Publishing ---

#[test]
fn fills_are_published_only_after_mark_ready() {
    let (mut event_loop, receiver) = started();

    event_loop.enqueue(fill_texture(NamedColor::White.into())).unwrap();
    event_loop
        .enqueue(fill_texture(Color::Rgb(85, 217, 104)))
        .unwrap();
    event_loop.terminate().unwrap();
    assert_eq!(receiver.count(), 0, "receiver got a texture too early");
}

#[test]
fn ready_operation_publishes_the_mutated_buffer_once() {
    let (mut event_loop, receiver) = started();

    event_loop.enqueue(fill_texture(NamedColor::White.into())).unwrap();
    event_loop
        .enqueue(fill_texture(Color::Rgb(85, 217, 104)))
        .unwrap();
    event_loop.enqueue(MarkReady).unwrap();
    event_loop.terminate().unwrap();

    let frames = receiver.frames();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].pixel(0, 0), Some([85, 217, 104, 255]));
    assert_eq!(event_loop.frames_published(), 1);
}

#[test]
fn mark_ready_is_eventually_published_without_terminate() {
    let (mut event_loop, receiver) = started();
    event_loop.enqueue(MarkReady).unwrap();

    let mut waited = Duration::ZERO;
    while receiver.count() == 0 && waited < Duration::from_secs(5) {
        thread::sleep(Duration::from_millis(5));
        waited += Duration::from_millis(5);
    }
    assert_eq!(receiver.count(), 1);
    event_loop.terminate().unwrap();
}

#[test]
fn buffers_alternate_between_publishes() {
    let (mut event_loop, receiver) = started();

    event_loop.enqueue(fill_texture(NamedColor::Red.into())).unwrap();
    event_loop.enqueue(MarkReady).unwrap();
    event_loop.enqueue(draw_rectangle(Rect::new(0, 0, 1, 1), NamedColor::Blue.into()))
        .unwrap();
    event_loop.enqueue(MarkReady).unwrap();
    event_loop.terminate().unwrap();

    let frames = receiver.frames();
    assert_eq!(frames.len(), 2);
    // The second frame was built in the initial blank buffer, not on top of
    // the first published frame.
    assert_eq!(frames[1].pixel(0, 0), Some([0, 0, 255, 255]));
    assert_eq!(frames[1].pixel(5, 5), Some([0, 0, 0, 0]));
    // The first frame was never touched after it was handed over.
    assert_eq!(frames[0].pixel(0, 0), Some([255, 0, 0, 255]));
}

#[test]
fn frame_held_by_receiver_is_never_mutated() {
    let (mut event_loop, receiver) = started();

    // Three publishes: the third reuses the slot of the first frame, which
    // the receiver still holds.
    for color in [NamedColor::Red, NamedColor::Green, NamedColor::White] {
        event_loop.enqueue(fill_texture(color.into())).unwrap();
        event_loop.enqueue(MarkReady).unwrap();
    }
    event_loop.terminate().unwrap();

    let frames = receiver.frames();
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[0].pixel(1, 1), Some([255, 0, 0, 255]));
    assert_eq!(frames[1].pixel(1, 1), Some([0, 128, 0, 255]));
    assert_eq!(frames[2].pixel(1, 1), Some([255, 255, 255, 255]));
}

#[test]
fn composite_with_trailing_mark_ready_publishes() {
    let (mut event_loop, receiver) = started();
    let mut batch = CompositeOperation::default();
    batch.push(fill_texture(NamedColor::Green.into()));
    batch.push(MarkReady);

    event_loop.enqueue(batch).unwrap();
    event_loop.terminate().unwrap();
    assert_eq!(receiver.count(), 1);
}

// --- Draining ---

#[test]
fn terminate_drains_all_pending_operations() {
    let (mut event_loop, _receiver) = started();
    let applied = Arc::new(AtomicUsize::new(0));

    for _ in 0..500 {
        event_loop
            .enqueue(CountingOp {
                applied: applied.clone(),
                ready: false,
            })
            .unwrap();
    }
    event_loop.terminate().unwrap();
    assert_eq!(applied.load(Ordering::SeqCst), 500);
}

#[test]
fn terminate_waits_for_slow_operation() {
    let (mut event_loop, _receiver) = started();
    let finished = Arc::new(AtomicUsize::new(0));
    let flag = finished.clone();

    event_loop
        .enqueue(TextureFn::new(move |_| {
            thread::sleep(Duration::from_millis(50));
            flag.fetch_add(1, Ordering::SeqCst);
        }))
        .unwrap();
    event_loop.terminate().unwrap();
    assert_eq!(finished.load(Ordering::SeqCst), 1);
}

#[test]
fn enqueue_after_terminate_is_rejected() {
    let (mut event_loop, _receiver) = started();
    let sender = event_loop.sender();
    event_loop.terminate().unwrap();

    assert!(sender.is_closed());
    assert!(matches!(
        event_loop.enqueue(MarkReady),
        Err(LoopError::Terminated)
    ));
    assert!(matches!(sender.enqueue(MarkReady), Err(LoopError::Terminated)));
}

#[test]
fn concurrent_producers_are_all_applied() {
    let (mut event_loop, receiver) = started();
    let applied = Arc::new(AtomicUsize::new(0));

    let producers: Vec<_> = (0..8)
        .map(|_| {
            let sender = event_loop.sender();
            let applied = applied.clone();
            thread::spawn(move || {
                for i in 0..100 {
                    sender
                        .enqueue(CountingOp {
                            applied: applied.clone(),
                            ready: i % 10 == 9,
                        })
                        .unwrap();
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().unwrap();
    }
    event_loop.terminate().unwrap();

    assert_eq!(applied.load(Ordering::SeqCst), 800);
    assert_eq!(receiver.count(), 80);
}

#[test]
fn enqueue_all_keeps_batch_order() {
    let (mut event_loop, receiver) = started();
    let batch: Vec<BoxedOperation> = vec![
        Box::new(fill_texture(NamedColor::White.into())),
        Box::new(draw_rectangle(Rect::new(0, 0, 2, 2), NamedColor::Red.into())),
        Box::new(MarkReady),
    ];
    assert_eq!(event_loop.sender().enqueue_all(batch).unwrap(), 3);
    event_loop.terminate().unwrap();

    let frames = receiver.frames();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].pixel(1, 1), Some([255, 0, 0, 255]));
    assert_eq!(frames[0].pixel(3, 3), Some([255, 255, 255, 255]));
}

#[test]
fn drop_terminates_running_loop() {
    let applied = Arc::new(AtomicUsize::new(0));
    {
        let (event_loop, _receiver) = started();
        event_loop
            .enqueue(CountingOp {
                applied: applied.clone(),
                ready: true,
            })
            .unwrap();
    }
    assert_eq!(applied.load(Ordering::SeqCst), 1);
}

#[test]
fn drop_before_initiate_closes_queue_for_senders() {
    let receiver = Arc::new(RecordingReceiver::default());
    let event_loop = EventLoop::new(receiver.clone(), CANVAS);
    let sender = event_loop.sender();
    sender.enqueue(MarkReady).unwrap();

    drop(event_loop);

    assert!(sender.is_closed());
    assert!(matches!(
        sender.enqueue(MarkReady),
        Err(LoopError::Terminated)
    ));
    assert_eq!(receiver.count(), 0);
}
