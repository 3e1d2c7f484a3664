// Copyright (c) 2024 Mike Tsao

use float_cmp::approx_eq;
use jolt::prelude::*;
use more_asserts::{assert_ge, assert_gt, assert_le, assert_lt};
use std::{cell::RefCell, rc::Rc};

const FRAME: Seconds = Seconds(1.0 / 60.0);

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn labeled(label: &str, kind: FeedbackKind) -> Feedback {
    Feedback::new_with_settings(
        FeedbackSettingsBuilder::default()
            .label(label)
            .build()
            .unwrap(),
        kind,
    )
}

fn fade(seconds: f64) -> FeedbackKind {
    FeedbackKind::Float(ValueTweenCore::new_with(
        TimedActionCore::new_with(Seconds(seconds), Easing::Linear),
        TweenMode::Absolute,
        0.0,
        1.0,
    ))
}

fn slide(seconds: f64) -> FeedbackKind {
    FeedbackKind::Vector(ValueTweenCore::new_with(
        TimedActionCore::new_with(Seconds(seconds), Easing::EaseOutQuadratic),
        TweenMode::Absolute,
        Vector::zeros(),
        Vector::new(0.0, 4.0, 0.0),
    ))
}

fn events(player: &mut FeedbackPlayer) -> Vec<PlayerEvent> {
    player
        .take_signals()
        .into_iter()
        .filter_map(|s| match s {
            PlayerSignal::Event(e) => Some(e),
            PlayerSignal::Effect(_) => None,
        })
        .collect()
}

// Fade a panel in, wait for the fade, then slide it up. The slide mustn't
// start early, and the whole thing takes about as long as the player says.
#[test]
fn holding_pause_chains_a_cutscene() {
    init_logging();
    let alpha = Rc::new(RefCell::new(0.0));
    let offset = Rc::new(RefCell::new(Vector::zeros()));
    let mut player = FeedbackPlayer::default()
        .with_feedback(
            labeled("fade", fade(0.2))
                .bound(Rc::clone(&alpha))
                .unwrap(),
        )
        .with_feedback(Feedback::new_with(FeedbackKind::HoldingPause(
            HoldingPauseMarker::default(),
        )))
        .with_feedback(
            labeled("slide", slide(0.2))
                .bound(Rc::clone(&offset))
                .unwrap(),
        );
    let expected = player.total_duration();
    assert!(approx_eq!(f64, expected.0, 0.4));

    player.play_default();
    let mut elapsed = Seconds::zero();
    while player.is_playing() {
        if *alpha.borrow() < 1.0 {
            assert_eq!(*offset.borrow(), Vector::zeros(), "slide started early");
        }
        player.tick(&FrameDelta::uniform(FRAME));
        elapsed = elapsed.plus(FRAME);
        assert_lt!(elapsed.0, 2.0, "never finished");
    }
    assert_eq!(*alpha.borrow(), 1.0);
    assert_eq!(*offset.borrow(), Vector::new(0.0, 4.0, 0.0));
    assert_ge!(elapsed.0, expected.0 - 1e-9);
    assert_le!(elapsed.0, expected.0 + 3.0 * FRAME.0);

    let events = events(&mut player);
    assert_eq!(events.first(), Some(&PlayerEvent::Play));
    assert_eq!(events.last(), Some(&PlayerEvent::Complete));
}

// Only the part after the loop start repeats.
#[test]
fn looper_repeats_only_from_loop_start() {
    init_logging();
    let intro = Rc::new(RefCell::new(0));
    let body = Rc::new(RefCell::new(0));
    let counting = |counter: &Rc<RefCell<i32>>| {
        let counter = Rc::clone(counter);
        Feedback::new_with(fade(0.0))
            .bound(PropertyBinding::new(FnProperty::new(
                || Some(0.0),
                move |_: f64| {
                    *counter.borrow_mut() += 1;
                    true
                },
            )))
            .unwrap()
    };
    let mut player = FeedbackPlayer::default()
        .with_feedback(counting(&intro))
        .with_feedback(Feedback::new_with(FeedbackKind::LoopStart))
        .with_feedback(counting(&body))
        .with_feedback(Feedback::new_with(FeedbackKind::Pause(
            PauseMarker::new_with(Seconds(0.05)),
        )))
        .with_feedback(Feedback::new_with(FeedbackKind::Looper(
            LoopMarker::new_with(3).with_pause(Seconds(0.05)),
        )));
    player.play_default();
    for _ in 0..120 {
        player.tick(&FrameDelta::uniform(FRAME));
    }
    assert_eq!(*intro.borrow(), 1);
    assert_eq!(*body.borrow(), 4);
    assert!(!player.is_playing());

    let loops = events(&mut player)
        .into_iter()
        .filter(|e| *e == PlayerEvent::Loop)
        .count();
    assert_eq!(loops, 3);

    // A second play loops just as many times.
    player.play_default();
    for _ in 0..120 {
        player.tick(&FrameDelta::uniform(FRAME));
    }
    assert_eq!(*body.borrow(), 8);
}

#[test]
fn script_driven_pause_splits_a_sequence() {
    let alpha = Rc::new(RefCell::new(0.0));
    let offset = Rc::new(RefCell::new(Vector::zeros()));
    let mut player = FeedbackPlayer::default()
        .with_feedback(
            Feedback::new_with(fade(0.1))
                .bound(Rc::clone(&alpha))
                .unwrap(),
        )
        .with_feedback(Feedback::new_with(FeedbackKind::Pause(
            PauseMarker::script_driven(None),
        )))
        .with_feedback(
            Feedback::new_with(slide(0.0))
                .bound(Rc::clone(&offset))
                .unwrap(),
        );
    assert!(
        approx_eq!(f64, player.total_duration().0, 0.1),
        "waiting on the host adds nothing"
    );

    player.play_default();
    for _ in 0..60 {
        player.tick(&FrameDelta::uniform(FRAME));
    }
    assert_eq!(*alpha.borrow(), 1.0);
    assert!(player.is_playing());
    assert!(player.is_waiting_for_resume());
    assert_eq!(*offset.borrow(), Vector::zeros());

    player.resume();
    assert_eq!(*offset.borrow(), Vector::new(0.0, 4.0, 0.0));
    player.tick(&FrameDelta::uniform(FRAME));
    assert!(!player.is_playing());
}

#[test]
fn seeded_chance_is_reproducible() {
    let run = |seed: u128| {
        let hits = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&hits);
        let settings = FeedbackSettingsBuilder::default()
            .chance(Normal::new(0.5))
            .build()
            .unwrap();
        let mut player = FeedbackPlayer::default().with_feedback(
            Feedback::new_with_settings(settings, fade(0.0))
                .bound(PropertyBinding::new(FnProperty::new(
                    || Some(0.0),
                    move |_: f64| {
                        *counter.borrow_mut() += 1;
                        true
                    },
                )))
                .unwrap(),
        );
        player.set_rng_seed(seed);
        for _ in 0..200 {
            player.play_default();
            player.tick(&FrameDelta::uniform(FRAME));
        }
        let count = *hits.borrow();
        count
    };
    let first = run(42);
    assert_gt!(first, 50);
    assert_lt!(first, 150);
    assert_eq!(run(42), first, "same seed, same rolls");
}

// A player survives a trip through JSON, minus its bindings, which the host
// reattaches by label.
#[test]
fn json_round_trip_then_rebind() {
    init_logging();
    let original = FeedbackPlayer::new_with(
        PlayerSettingsBuilder::default()
            .initial_delay(Seconds(0.1))
            .build()
            .unwrap(),
    )
    .with_feedback(labeled("fade", fade(0.2)))
    .with_feedback(Feedback::new_with(FeedbackKind::HoldingPause(
        HoldingPauseMarker::new_with(Seconds(0.1)),
    )))
    .with_feedback(labeled("slide", slide(0.2)));
    let json = original.to_json().unwrap();

    let mut player = FeedbackPlayer::from_json(&json).unwrap();
    assert_eq!(player.feedbacks().len(), 3);
    assert!(approx_eq!(
        f64,
        player.total_duration().0,
        original.total_duration().0
    ));

    let alpha = Rc::new(RefCell::new(0.0));
    let offset = Rc::new(RefCell::new(Vector::zeros()));
    player
        .feedback_by_label_mut("fade")
        .unwrap()
        .bind(Rc::clone(&alpha))
        .unwrap();
    player
        .feedback_by_label_mut("slide")
        .unwrap()
        .bind(Rc::clone(&offset))
        .unwrap();
    assert!(player.feedback_by_label_mut("missing").is_none());

    player.play_default();
    for _ in 0..60 {
        player.tick(&FrameDelta::uniform(FRAME));
    }
    assert_eq!(*alpha.borrow(), 1.0);
    assert_eq!(*offset.borrow(), Vector::new(0.0, 4.0, 0.0));
    assert!(!player.is_playing());
}

#[test]
fn malformed_json_is_an_error() {
    assert!(FeedbackPlayer::from_json("{\"feedbacks\": 7}").is_err());
    assert!(FeedbackPlayer::from_json("").is_err());
}
