use core::time::Duration;

use timer_core::clock::Millis;
use timer_core::countdown::{CountdownValue, MAX_TOTAL_SECONDS, SECONDS_PER_MINUTE, TimeUnit};

fn from_total(total: u32) -> CountdownValue {
    CountdownValue::new(total / SECONDS_PER_MINUTE, total % SECONDS_PER_MINUTE)
}

#[test]
fn minute_and_second_views_recompose_total() {
    for total in 0..=MAX_TOTAL_SECONDS {
        let value = from_total(total);
        assert_eq!(value.total_seconds(), total);
        assert_eq!(value.minutes() * 60 + value.seconds(), total);
    }
}

#[test]
fn seconds_decrement_at_zero_stays_zero() {
    let mut value = CountdownValue::default();
    assert_eq!(value.decrement(), 0);
    assert!(value.time_is_up());
}

#[test]
fn minutes_decrement_keeps_remainder() {
    let mut value = CountdownValue::new(1, 5);
    value.set_unit_minutes();
    assert_eq!(value.decrement(), 5);
    assert_eq!((value.minutes(), value.seconds()), (0, 5));
    assert_eq!(value.decrement(), 5);
}

#[test]
fn increment_at_max_is_clamped() {
    let mut value = from_total(MAX_TOTAL_SECONDS);
    assert_eq!(value.increment(), MAX_TOTAL_SECONDS);
    value.set_unit(TimeUnit::Minutes);
    assert_eq!(value.increment(), MAX_TOTAL_SECONDS);
}

#[test]
fn field_setters_are_independent() {
    for minutes in 0..60 {
        for seconds in 0..60 {
            let mut value = CountdownValue::default();
            value.set_minutes(minutes);
            value.set_seconds(seconds);
            value.set_minutes(minutes);
            assert_eq!(
                (value.minutes(), value.seconds()),
                (minutes, seconds),
                "{minutes}:{seconds}"
            );
        }
    }
}

#[test]
fn minutes_setter_clamps_total() {
    let mut value = CountdownValue::new(0, 30);
    value.set_minutes(60);
    assert_eq!(value.total_seconds(), MAX_TOTAL_SECONDS);
}

#[test]
fn countdown_clock_uses_wrapping_time() {
    let mut value = CountdownValue::new(0, 3);
    let start = Millis::from_raw(u32::MAX - 100);
    value.start(start);
    assert!(!value.elapsed(start + Duration::from_millis(996), Duration::from_millis(997)));
    assert!(value.elapsed(start + Duration::from_millis(997), Duration::from_millis(997)));
}
