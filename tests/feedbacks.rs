// Copyright (c) 2024 Mike Tsao

use float_cmp::approx_eq;
use jolt::{cores::REST_THRESHOLD, prelude::*};
use more_asserts::{assert_gt, assert_lt};
use std::{cell::RefCell, rc::Rc};

const FRAME: Seconds = Seconds(1.0 / 60.0);

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn run(f: &mut Feedback, delta: Seconds, frames: usize) {
    for _ in 0..frames {
        f.tick(&FrameDelta::uniform(delta));
    }
}

fn float_tween(seconds: f64, from: f64, to: f64, mode: TweenMode) -> FeedbackKind {
    FeedbackKind::Float(ValueTweenCore::new_with(
        TimedActionCore::new_with(Seconds(seconds), Easing::Linear),
        mode,
        from,
        to,
    ))
}

// A one-second linear move from the origin is halfway there after half a
// second of 60 fps frames.
#[test]
fn position_tween_hits_its_midpoint() {
    init_logging();
    let position = Rc::new(RefCell::new(Vector::zeros()));
    let mut f = Feedback::new_with(FeedbackKind::Vector(ValueTweenCore::new_with(
        TimedActionCore::new_with(Seconds(1.0), Easing::Linear),
        TweenMode::Absolute,
        Vector::zeros(),
        Vector::new(10.0, 0.0, 0.0),
    )))
    .bound(Rc::clone(&position))
    .unwrap();

    f.play_default();
    run(&mut f, FRAME, 30);
    let p = *position.borrow();
    assert!(approx_eq!(f64, p.x, 5.0, epsilon = 1e-6), "got {p}");
    assert_eq!(p.y, 0.0);
    assert_eq!(p.z, 0.0);
    assert!(f.is_playing());

    run(&mut f, FRAME, 31);
    assert_eq!(*position.borrow(), Vector::new(10.0, 0.0, 0.0));
    assert!(!f.is_playing());
}

#[test]
fn zero_length_tween_writes_once_and_finishes() {
    init_logging();
    let writes = Rc::new(RefCell::new(Vec::default()));
    let log = Rc::clone(&writes);
    let mut f = Feedback::new_with(float_tween(0.0, 0.0, 3.0, TweenMode::Absolute))
        .bound(PropertyBinding::new(FnProperty::new(
            || Some(0.0),
            move |v: f64| {
                log.borrow_mut().push(v);
                true
            },
        )))
        .unwrap();

    f.play_default();
    assert!(!f.is_playing());
    run(&mut f, FRAME, 5);
    assert_eq!(*writes.borrow(), vec![3.0]);
}

// Running backward for t seconds lands where running forward for d - t
// seconds does.
#[test]
fn backward_mirrors_forward() {
    let forward_host = Rc::new(RefCell::new(0.0));
    let backward_host = Rc::new(RefCell::new(0.0));
    let backward_settings = FeedbackSettingsBuilder::default()
        .timing(
            TimingBuilder::default()
                .play_direction(PlayDirection::AlwaysBackward)
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();
    let mut forward = Feedback::new_with(float_tween(1.0, 0.0, 10.0, TweenMode::Absolute))
        .bound(Rc::clone(&forward_host))
        .unwrap();
    let mut backward = Feedback::new_with_settings(
        backward_settings,
        float_tween(1.0, 0.0, 10.0, TweenMode::Absolute),
    )
    .bound(Rc::clone(&backward_host))
    .unwrap();

    forward.play_default();
    backward.play_default();
    assert_eq!(*backward_host.borrow(), 10.0);

    run(&mut forward, Seconds(0.1), 7);
    run(&mut backward, Seconds(0.1), 3);
    assert!(approx_eq!(
        f64,
        *forward_host.borrow(),
        *backward_host.borrow(),
        epsilon = 1e-9
    ));

    run(&mut backward, Seconds(0.1), 8);
    assert_eq!(*backward_host.borrow(), 0.0);
    assert!(!backward.is_playing());
}

#[test]
fn relative_tween_offsets_from_where_the_target_was() {
    let scale = Rc::new(RefCell::new(Vector::new(1.0, 2.0, 3.0)));
    let mut f = Feedback::new_with(FeedbackKind::Vector(ValueTweenCore::new_with(
        TimedActionCore::new_with(Seconds(0.5), Easing::EaseInOutCubic),
        TweenMode::Relative,
        Vector::zeros(),
        Vector::new(10.0, 0.0, 0.0),
    )))
    .bound(Rc::clone(&scale))
    .unwrap();
    f.play_default();
    run(&mut f, FRAME, 31);
    assert_eq!(*scale.borrow(), Vector::new(11.0, 2.0, 3.0));

    f.restore_initial_values();
    assert_eq!(*scale.borrow(), Vector::new(1.0, 2.0, 3.0));
}

#[test]
fn intensity_scales_the_tween() {
    let host = Rc::new(RefCell::new(0.0));
    let mut f = Feedback::new_with(float_tween(0.5, 0.0, 10.0, TweenMode::Absolute))
        .bound(Rc::clone(&host))
        .unwrap();
    f.play(Vector::zeros(), 0.5);
    run(&mut f, FRAME, 31);
    assert!(approx_eq!(f64, *host.borrow(), 5.0));

    // With intensity turned off, every play is full strength.
    f.settings_mut().use_intensity = false;
    f.play(Vector::zeros(), 0.5);
    run(&mut f, FRAME, 31);
    assert_eq!(*host.borrow(), 10.0);
}

#[test]
fn stop_leaves_the_last_written_value_unless_asked_to_reset() {
    let host = Rc::new(RefCell::new(2.0));
    let mut f = Feedback::new_with(float_tween(1.0, 0.0, 10.0, TweenMode::Absolute))
        .bound(Rc::clone(&host))
        .unwrap();
    f.play_default();
    run(&mut f, Seconds(0.1), 5);
    f.stop_default();
    let stopped_at = *host.borrow();
    assert!(approx_eq!(f64, stopped_at, 5.0, epsilon = 1e-9));
    run(&mut f, Seconds(0.1), 5);
    assert_eq!(*host.borrow(), stopped_at, "nothing moves after a stop");

    *host.borrow_mut() = 2.0;
    f.settings_mut().reset_on_stop = true;
    f.play_default();
    run(&mut f, Seconds(0.1), 5);
    f.stop_default();
    assert_eq!(*host.borrow(), 2.0);
}

#[test]
fn spring_at_rest_stays_put() {
    let mut spring = SpringCore::uniform(Normal::new(0.5), 4.0);
    spring.teleport(Vector::new(1.0, 1.0, 1.0));
    spring.move_to(Vector::new(1.0, 1.0, 1.0));
    for _ in 0..120 {
        spring.step(FRAME.0);
    }
    assert_eq!(spring.current(), Vector::new(1.0, 1.0, 1.0));
    assert!(spring.is_at_rest());
}

// A bump with damping 0.4 at 6 Hz overshoots, rings, and comes to rest back
// where it started.
#[test]
fn bumped_spring_rings_and_settles() {
    init_logging();
    let camera = Rc::new(RefCell::new(Vector::zeros()));
    let mut f = Feedback::new_with(FeedbackKind::Spring(SpringMotion::new_with(
        SpringCore::uniform(Normal::new(0.4), 6.0),
        SpringAction::Bump(Vector::new(30.0, 0.0, 0.0)),
    )))
    .bound(Rc::clone(&camera))
    .unwrap();
    f.play_default();

    let mut peak: f64 = 0.0;
    let mut trough: f64 = 0.0;
    let mut frames = 0;
    while f.is_playing() {
        run(&mut f, FRAME, 1);
        peak = peak.max(camera.borrow().x);
        trough = trough.min(camera.borrow().x);
        frames += 1;
        assert_lt!(frames, 600, "spring never settled");
    }
    assert_gt!(peak, 0.1);
    assert_lt!(trough, 0.0, "underdamped springs overshoot");
    assert!(camera.borrow().x.abs() < REST_THRESHOLD);
}

#[test]
fn repeats_run_the_tween_again() {
    let writes = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&writes);
    let settings = FeedbackSettingsBuilder::default()
        .timing(
            TimingBuilder::default()
                .number_of_repeats(2)
                .delay_between_repeats(Seconds(0.1))
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();
    let mut f =
        Feedback::new_with_settings(settings, float_tween(0.0, 0.0, 1.0, TweenMode::Absolute))
            .bound(PropertyBinding::new(FnProperty::new(
                || Some(0.0),
                move |_: f64| {
                    *counter.borrow_mut() += 1;
                    true
                },
            )))
            .unwrap();
    assert!(approx_eq!(f64, f.total_duration().0, 0.2));

    f.play_default();
    assert_eq!(*writes.borrow(), 1);
    run(&mut f, Seconds(0.05), 10);
    assert_eq!(*writes.borrow(), 3);
    assert!(!f.is_playing());
}
