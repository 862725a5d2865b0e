// SPDX-License-Identifier: BUSL-1.1
// Copyright 2025 Alfred Jean LLC

use super::*;
use proptest::prelude::*;

#[test]
fn parses_ground_and_basement() {
    assert_eq!("1".parse::<Floor>().unwrap().axis(), 1);
    assert_eq!("999".parse::<Floor>().unwrap().axis(), 999);
    assert_eq!("B1".parse::<Floor>().unwrap().axis(), -1);
    assert_eq!("B99".parse::<Floor>().unwrap().axis(), -99);
}

#[test]
fn rejects_zero() {
    assert!("0".parse::<Floor>().is_err());
    assert!("B0".parse::<Floor>().is_err());
}

#[test]
fn rejects_leading_zeros() {
    assert!("01".parse::<Floor>().is_err());
    assert!("B01".parse::<Floor>().is_err());
}

#[test]
fn rejects_non_numeric_tail() {
    assert!("12a".parse::<Floor>().is_err());
    assert!("B".parse::<Floor>().is_err());
    assert!("".parse::<Floor>().is_err());
}

#[test]
fn rejects_out_of_range() {
    assert!("1000".parse::<Floor>().is_err());
    assert!("B100".parse::<Floor>().is_err());
}

#[test]
fn compare_orders_by_axis() {
    let b1: Floor = "B1".parse().unwrap();
    let one: Floor = "1".parse().unwrap();
    let ten: Floor = "10".parse().unwrap();
    assert_eq!(b1.compare(&one), -1);
    assert_eq!(one.compare(&ten), -1);
    assert_eq!(ten.compare(&ten), 0);
    assert_eq!(ten.compare(&one), 1);
}

#[test]
fn in_range_checks_bounds() {
    let lo: Floor = "B1".parse().unwrap();
    let hi: Floor = "10".parse().unwrap();
    let mid: Floor = "5".parse().unwrap();
    let outside: Floor = "11".parse().unwrap();
    assert!(mid.in_range(lo, hi));
    assert!(!outside.in_range(lo, hi));
}

#[test]
fn step_towards_skips_zero() {
    let lo: Floor = "B5".parse().unwrap();
    let hi: Floor = "5".parse().unwrap();
    let one: Floor = "1".parse().unwrap();
    let minus_one: Floor = "B1".parse().unwrap();

    assert_eq!(one.step_towards(minus_one, lo, hi).unwrap().axis(), -1);
    assert_eq!(minus_one.step_towards(one, lo, hi).unwrap().axis(), 1);
}

#[test]
fn step_towards_fails_outside_range() {
    let lo: Floor = "1".parse().unwrap();
    let hi: Floor = "5".parse().unwrap();
    let cur: Floor = "1".parse().unwrap();
    let dst: Floor = "1".parse().unwrap();
    // Already at destination: no movement, stays in range trivially.
    assert_eq!(cur.step_towards(dst, lo, hi).unwrap().axis(), 1);

    let below: Floor = "B1".parse().unwrap();
    assert!(cur.step_towards(below, lo, hi).is_none());
}

#[test]
fn step_one_skips_zero_in_either_direction() {
    let one: Floor = "1".parse().unwrap();
    let minus_one: Floor = "B1".parse().unwrap();
    assert_eq!(one.step_one(false).unwrap().axis(), -1);
    assert_eq!(minus_one.step_one(true).unwrap().axis(), 1);
}

#[test]
fn step_one_fails_past_the_bound() {
    let top: Floor = "999".parse().unwrap();
    assert!(top.step_one(true).is_none());
}

#[test]
fn display_round_trips_through_parse() {
    for label in ["1", "999", "B1", "B99", "42"] {
        let floor: Floor = label.parse().unwrap();
        assert_eq!(floor.to_string(), label);
    }
}

proptest! {
    #[test]
    fn render_parse_round_trip(n in 1i32..=999) {
        let above: Floor = n.to_string().parse().unwrap();
        prop_assert_eq!(above.axis(), n);
        prop_assert_eq!(above.to_string(), n.to_string());

        let basement_label = format!("B{n}");
        if n <= 99 {
            let below: Floor = basement_label.parse().unwrap();
            prop_assert_eq!(below.axis(), -n);
            prop_assert_eq!(below.to_string(), basement_label);
        }
    }
}
