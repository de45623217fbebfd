//! Overlapping start/stop/teardown from several threads

use crabdepth::testing::FakeGenerator;
use crabdepth::types::RawFrame;
use crabdepth::{DepthDevice, StreamKind, Variant};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

#[test]
fn test_concurrent_start_stop_teardown_does_not_deadlock() {
    let (image, depth, log) = FakeGenerator::pair();
    let device = Arc::new(
        DepthDevice::attach(Variant::PrimeSense, Box::new(image), Box::new(depth)).unwrap(),
    );
    device.set_depth_registration(true).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let device = device.clone();
            thread::spawn(move || {
                for round in 0..50 {
                    match (worker + round) % 4 {
                        0 => {
                            let _ = device.start_depth_stream();
                            let _ = device.start_image_stream();
                        }
                        1 => {
                            let _ = device.stop_image_stream();
                        }
                        2 => {
                            let _ = device.stop_depth_stream();
                        }
                        _ => device.teardown(),
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("worker panicked");
    }

    device.teardown();
    assert!(!device.is_image_stream_running());
    assert!(!device.is_depth_stream_running());
    assert!(!device.is_depth_registered());
    assert!(
        log.count(StreamKind::Image, "unregister_from_new_data")
            <= log.count(StreamKind::Image, "register_for_new_data")
    );
}

#[test]
fn test_no_frames_after_stop_returns() {
    let (image, depth, _) = FakeGenerator::pair();
    let producer = image.clone();
    let device = Arc::new(
        DepthDevice::attach(Variant::Kinect, Box::new(image), Box::new(depth)).unwrap(),
    );

    let stopped = Arc::new(AtomicBool::new(false));
    let late_frame = Arc::new(AtomicBool::new(false));
    {
        let stopped = stopped.clone();
        let late_frame = late_frame.clone();
        device.set_image_listener(move |_| {
            if stopped.load(Ordering::SeqCst) {
                late_frame.store(true, Ordering::SeqCst);
            }
        });
    }
    device.start_image_stream().unwrap();

    let emitter = thread::spawn(move || {
        for id in 0..500 {
            producer.emit(RawFrame::new(id, 640, 480, vec![0; 16]));
        }
    });

    device.stop_image_stream().unwrap();
    stopped.store(true, Ordering::SeqCst);
    emitter.join().unwrap();

    assert!(!late_frame.load(Ordering::SeqCst));
}
