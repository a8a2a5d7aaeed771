//! One-shot ("tmp") handlers.

mod common;

use common::{Message, Topic, init_tracing};
use std::{
    sync::{
        Arc, Barrier,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    thread,
};
use warden::{
    Flow, Registry, WardenError,
    testing::{CallLog, RecordingHandler},
};

fn registry() -> Registry<Topic, Message> {
    init_tracing();
    Registry::new()
}

#[test]
fn test_one_shot_fires_once() {
    let registry = registry();
    let log = CallLog::new();
    let id = registry
        .register_one_shot(Topic::Message, [], RecordingHandler::new("tmp", &log))
        .unwrap();

    assert!(registry.trigger(&Topic::Message, &Message::chat("hi")).unwrap());
    assert!(!registry.is_registered(Topic::Message, id));
    assert!(!registry.trigger(&Topic::Message, &Message::chat("hi")).unwrap());
    assert_eq!(log.count("tmp"), 1);
}

#[test]
fn test_one_shot_is_removed_even_when_it_passes() {
    let registry = registry();
    let log = CallLog::new();
    registry
        .register_one_shot(Topic::Message, [], RecordingHandler::new("tmp", &log).returning(Flow::Pass))
        .unwrap();
    registry.register(Topic::Message, [], RecordingHandler::new("next", &log)).unwrap();

    registry.trigger(&Topic::Message, &Message::chat("hi")).unwrap();
    registry.trigger(&Topic::Message, &Message::chat("hi")).unwrap();
    assert_eq!(log.calls(), vec!["tmp", "next", "next"]);
}

#[test]
fn test_one_shot_with_failing_guard_stays() {
    let registry = registry();
    let log = CallLog::new();
    registry
        .register_one_shot(
            Topic::Message,
            [warden::Guard::field("body", "exit")],
            RecordingHandler::new("tmp", &log),
        )
        .unwrap();

    assert!(!registry.trigger(&Topic::Message, &Message::chat("hi")).unwrap());
    assert!(registry.trigger(&Topic::Message, &Message::chat("exit")).unwrap());
    assert!(!registry.trigger(&Topic::Message, &Message::chat("exit")).unwrap());
    assert_eq!(log.count("tmp"), 1);
}

#[test]
fn test_one_shot_that_fails_is_kept_until_it_succeeds() {
    let registry = registry();
    let failed_once = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&failed_once);
    let id = registry
        .register_one_shot(Topic::Message, [], move |_: &Message| {
            if flag.swap(true, Ordering::SeqCst) {
                Ok(())
            } else {
                Err("Oops")
            }
        })
        .unwrap();

    let err = registry
        .trigger(&Topic::Message, &Message::chat("hi"))
        .unwrap_err();
    assert!(matches!(err, WardenError::Handler { .. }));
    assert!(registry.is_registered(Topic::Message, id));

    assert!(registry.trigger(&Topic::Message, &Message::chat("hi")).unwrap());
    assert!(!registry.is_registered(Topic::Message, id));
}

#[test]
fn test_in_flight_one_shot_is_skipped_by_a_concurrent_trigger() {
    let registry = registry();
    let log = CallLog::new();
    let barrier = Arc::new(Barrier::new(2));

    let gate = Arc::clone(&barrier);
    let tmp_log = log.clone();
    registry
        .register_one_shot(Topic::Message, [], move |_: &Message| {
            tmp_log.record("tmp");
            // Started.
            gate.wait();
            // Released.
            gate.wait();
        })
        .unwrap();
    registry.register(Topic::Message, [], RecordingHandler::new("next", &log)).unwrap();

    thread::scope(|s| {
        let first = s.spawn(|| registry.trigger(&Topic::Message, &Message::chat("hi")));

        barrier.wait();
        assert!(registry.trigger(&Topic::Message, &Message::chat("hi")).unwrap());
        barrier.wait();

        assert!(first.join().unwrap().unwrap());
    });

    assert!(registry.trigger(&Topic::Message, &Message::chat("hi")).unwrap());
    assert_eq!(log.count("tmp"), 1);
    assert_eq!(log.count("next"), 2);
}

#[test]
fn test_concurrent_triggers_fire_one_shot_exactly_once() {
    let registry = registry();
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    registry
        .register_one_shot(Topic::Message, [], move |_: &Message| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

    let start = Barrier::new(16);
    thread::scope(|s| {
        for _ in 0..16 {
            s.spawn(|| {
                start.wait();
                registry.trigger(&Topic::Message, &Message::chat("hi")).unwrap();
            });
        }
    });

    assert_eq!(fired.load(Ordering::SeqCst), 1);
}
