use std::f64::consts::PI;

use proptest::prelude::*;
use qcels_est::{DriverState, LevelSchedule};

#[test]
fn level_count_follows_log2_of_budget() {
    let schedule = LevelSchedule::new(100.0, 5).unwrap();
    assert_eq!(schedule.final_level(), 4);
    assert_eq!(schedule.level_count(), 5);
    assert!((schedule.spacing(4) - 20.0).abs() < 1e-12);
    assert!((schedule.spacing(0) - 1.25).abs() < 1e-12);
    assert_eq!(schedule.times(4), vec![0.0, 20.0, 40.0, 60.0, 80.0]);
}

#[test]
fn exact_power_of_two_ratio_is_not_rounded_down() {
    let schedule = LevelSchedule::new(80.0, 5).unwrap();
    assert_eq!(schedule.final_level(), 4);
    let flat = LevelSchedule::new(5.0, 5).unwrap();
    assert_eq!(flat.final_level(), 0);
    assert_eq!(flat.half_width(0), PI / 2.0);
}

#[test]
fn budget_smaller_than_time_steps_is_rejected() {
    let err = LevelSchedule::new(4.0, 5).unwrap_err();
    assert_eq!(err.info().code, "time-budget-too-small");
    assert!(LevelSchedule::new(0.0, 5).unwrap_err().is_invalid_argument());
    assert!(LevelSchedule::new(10.0, 0).unwrap_err().is_invalid_argument());
    assert!(LevelSchedule::new(f64::NAN, 5).is_err());
}

#[test]
fn driver_state_walks_every_level_once() {
    let mut state = DriverState::Preprocessing;
    let mut visited = Vec::new();
    while let Some(level) = state.level() {
        visited.push(level);
        state = state.advance(3);
    }
    assert_eq!(visited, vec![0, 1, 2, 3]);
    assert!(state.is_done());
    assert_eq!(DriverState::Preprocessing.advance(0), DriverState::Done);
    assert_eq!(DriverState::Done.advance(5), DriverState::Done);
}

proptest! {
    #[test]
    fn half_width_halves_every_level(total in 5.0f64..5000.0, steps in 1usize..6) {
        prop_assume!(total / steps as f64 >= 1.0);
        let schedule = LevelSchedule::new(total, steps).unwrap();
        for level in 1..=schedule.final_level() {
            let ratio = schedule.half_width(level) / schedule.half_width(level - 1);
            prop_assert!((ratio - 0.5).abs() < 1e-12);
        }
        let last = schedule.spacing(schedule.final_level()) * steps as f64;
        prop_assert!(last <= total + 1e-9);
        prop_assert!(last > total / 2.0);
    }
}
