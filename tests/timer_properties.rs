//! Property tests for the countdown state machine.

use proptest::prelude::*;
use simple_timer::state::{
    format_duration, RunState, TickOutcome, TimerState, MAX_DURATION_SECONDS,
};

#[derive(Debug, Clone)]
enum Op {
    Start,
    Pause,
    Reset,
    Tick,
    Acknowledge,
    ToggleSound,
    Minutes(u32),
    Seconds(u32),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        2 => Just(Op::Start),
        1 => Just(Op::Pause),
        1 => Just(Op::Reset),
        6 => Just(Op::Tick),
        1 => Just(Op::Acknowledge),
        1 => Just(Op::ToggleSound),
        2 => (0u32..=150u32).prop_map(Op::Minutes),
        2 => (0u32..=120u32).prop_map(Op::Seconds),
    ]
}

proptest! {
    /// Setting minutes then seconds from 00:00 reproduces any valid duration.
    #[test]
    fn minutes_then_seconds_round_trip(n in 0u32..=MAX_DURATION_SECONDS) {
        let mut timer = TimerState::default();
        timer.set_minutes(n / 60);
        timer.set_seconds(n % 60);
        prop_assert_eq!(timer.duration_seconds(), n);
    }

    /// Any minutes value above 99 clamps to 99:59.
    #[test]
    fn large_minutes_clamp(minutes in 100u32..=u32::MAX, seconds in 0u32..60) {
        let mut timer = TimerState::default();
        timer.set_seconds(seconds);
        timer.set_minutes(minutes);
        prop_assert_eq!(timer.duration_seconds(), MAX_DURATION_SECONDS);
    }

    /// Display always has the MM:SS shape and round-trips the value.
    #[test]
    fn display_is_zero_padded(n in 0u32..=MAX_DURATION_SECONDS) {
        let shown = format_duration(n);
        prop_assert_eq!(shown.len(), 5);
        let (mm, ss) = shown.split_once(':').unwrap();
        prop_assert_eq!(mm.parse::<u32>().unwrap() * 60 + ss.parse::<u32>().unwrap(), n);
    }

    /// Arbitrary command sequences never break the state invariants.
    #[test]
    fn invariants_hold_for_any_sequence(ops in proptest::collection::vec(arb_op(), 1..64)) {
        let mut timer = TimerState::default();

        for op in ops {
            let before = timer.clone();
            match op {
                Op::Start => {
                    let started = timer.start();
                    if started {
                        prop_assert!(before.duration_seconds() > 0);
                    }
                }
                Op::Pause => {
                    timer.pause();
                    prop_assert_eq!(timer.duration_seconds(), before.duration_seconds());
                }
                Op::Reset => {
                    timer.reset();
                    prop_assert_eq!(timer.duration_seconds(), 0);
                    prop_assert_eq!(timer.run_state(), RunState::Idle);
                }
                Op::Tick => match timer.tick() {
                    TickOutcome::Ignored => {
                        prop_assert_eq!(timer.duration_seconds(), before.duration_seconds());
                    }
                    TickOutcome::Counting(left) => {
                        prop_assert_eq!(left + 1, before.duration_seconds());
                    }
                    TickOutcome::Finished { play_sound } => {
                        prop_assert_eq!(before.duration_seconds(), 1);
                        prop_assert_eq!(timer.duration_seconds(), 0);
                        prop_assert_eq!(timer.run_state(), RunState::Finished);
                        prop_assert_eq!(play_sound, timer.sound_enabled());
                    }
                    TickOutcome::Halted => {
                        prop_assert_eq!(timer.run_state(), RunState::Idle);
                    }
                },
                Op::Acknowledge => {
                    timer.acknowledge_finished();
                    prop_assert!(!timer.alert_pending());
                }
                Op::ToggleSound => {
                    prop_assert_eq!(timer.toggle_sound(), !before.sound_enabled());
                }
                Op::Minutes(m) => timer.set_minutes(m),
                Op::Seconds(s) => timer.set_seconds(s),
            }

            prop_assert!(timer.duration_seconds() <= MAX_DURATION_SECONDS);
            prop_assert_eq!(timer.alert_pending(), timer.run_state() == RunState::Finished);
        }
    }
}
