// SPDX-License-Identifier: BUSL-1.1
// Copyright 2025 Alfred Jean LLC

use super::*;

#[test]
fn parses_registration() {
    let msg = Message::parse_from_car("CAR A B2 10").unwrap();
    assert_eq!(
        msg,
        Message::Register { name: "A".to_owned(), lowest: "B2".to_owned(), highest: "10".to_owned() }
    );
}

#[test]
fn parses_status() {
    let msg = Message::parse_from_car("STATUS MOVING 3 7").unwrap();
    assert_eq!(
        msg,
        Message::Status {
            status: "MOVING".to_owned(),
            current: "3".to_owned(),
            destination: "7".to_owned(),
        }
    );
}

#[test]
fn parses_emergency_and_individual_service() {
    assert_eq!(Message::parse_from_car("EMERGENCY").unwrap(), Message::Emergency);
    assert_eq!(
        Message::parse_from_car("INDIVIDUAL SERVICE").unwrap(),
        Message::IndividualService
    );
}

#[test]
fn parses_call() {
    let msg = Message::parse_from_car("CALL 1 5").unwrap();
    assert_eq!(msg, Message::Call { source: "1".to_owned(), destination: "5".to_owned() });
}

#[test]
fn rejects_unknown_verb() {
    assert!(Message::parse_from_car("HONK").is_err());
    assert!(Message::parse_from_car("").is_err());
}

#[test]
fn parses_floor_to_car() {
    let msg = Message::parse_to_car("FLOOR B1").unwrap();
    assert_eq!(msg, Message::Floor { label: "B1".to_owned() });
}

#[test]
fn rejects_wrong_verb_for_role() {
    assert!(Message::parse_to_car("CAR A B1 10").is_err());
    assert!(Message::parse_call_response("FLOOR 1").is_err());
}

#[test]
fn parses_call_response() {
    assert_eq!(
        Message::parse_call_response("CAR A").unwrap(),
        Message::CarAssigned { name: "A".to_owned() }
    );
    assert_eq!(Message::parse_call_response("UNAVAILABLE").unwrap(), Message::Unavailable);
}

#[test]
fn to_wire_round_trips_each_variant() {
    let register = Message::Register {
        name: "A".to_owned(),
        lowest: "B1".to_owned(),
        highest: "10".to_owned(),
    };
    assert_eq!(register.to_wire(), "CAR A B1 10");
    assert_eq!(Message::parse_from_car(&register.to_wire()).unwrap(), register);

    let status = Message::Status {
        status: "IDLE".to_owned(),
        current: "1".to_owned(),
        destination: "1".to_owned(),
    };
    assert_eq!(Message::parse_from_car(&status.to_wire()).unwrap(), status);

    assert_eq!(Message::Emergency.to_wire(), "EMERGENCY");
    assert_eq!(Message::IndividualService.to_wire(), "INDIVIDUAL SERVICE");

    let floor = Message::Floor { label: "B1".to_owned() };
    assert_eq!(Message::parse_to_car(&floor.to_wire()).unwrap(), floor);

    let assigned = Message::CarAssigned { name: "A".to_owned() };
    assert_eq!(Message::parse_call_response(&assigned.to_wire()).unwrap(), assigned);
    assert_eq!(Message::parse_call_response(&Message::Unavailable.to_wire()).unwrap(), Message::Unavailable);

    let call = Message::Call { source: "1".to_owned(), destination: "5".to_owned() };
    assert_eq!(Message::parse_from_car(&call.to_wire()).unwrap(), call);
}

#[test]
fn looks_like_floor_validates_token() {
    assert!(looks_like_floor("B1"));
    assert!(looks_like_floor("10"));
    assert!(!looks_like_floor("0"));
    assert!(!looks_like_floor("abc"));
}
