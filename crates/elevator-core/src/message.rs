// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The wire protocol's message verbs.
//!
//! Every frame (see [`crate::framed`]) carries one ASCII line of
//! space-separated tokens. Rather than dispatch on the leading token at
//! every call site, the whole surface is parsed once into a [`Message`]
//! and unknown verbs become a [`ParseMessageError`] instead of a silent
//! fallthrough branch.

use std::fmt;

use crate::floor::Floor;

/// A parsed wire message, in either direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Call client -> dispatcher: request a ride.
    Call { source: String, destination: String },
    /// Dispatcher -> call client: a car was assigned.
    CarAssigned { name: String },
    /// Dispatcher -> call client: no car can serve this call.
    Unavailable,
    /// Car -> dispatcher: register this car, first message on the connection.
    Register { name: String, lowest: String, highest: String },
    /// Car -> dispatcher: status changed.
    Status { status: String, current: String, destination: String },
    /// Car -> dispatcher: entering emergency mode, connection will close.
    Emergency,
    /// Car -> dispatcher: entering individual service mode, connection will close.
    IndividualService,
    /// Dispatcher -> car: go to this floor next.
    Floor { label: String },
}

/// Error returned when a wire line does not match any known verb.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMessageError {
    pub line: String,
}

impl fmt::Display for ParseMessageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognised message: {:?}", self.line)
    }
}

impl std::error::Error for ParseMessageError {}

impl Message {
    /// Render this message as the ASCII line sent over the wire (no framing).
    pub fn to_wire(&self) -> String {
        match self {
            Message::Call { source, destination } => format!("CALL {source} {destination}"),
            Message::CarAssigned { name } => format!("CAR {name}"),
            Message::Unavailable => "UNAVAILABLE".to_owned(),
            Message::Register { name, lowest, highest } => {
                format!("CAR {name} {lowest} {highest}")
            }
            Message::Status { status, current, destination } => {
                format!("STATUS {status} {current} {destination}")
            }
            Message::Emergency => "EMERGENCY".to_owned(),
            Message::IndividualService => "INDIVIDUAL SERVICE".to_owned(),
            Message::Floor { label } => format!("FLOOR {label}"),
        }
    }

    /// Parse a wire line into a [`Message`].
    ///
    /// `CAR <name>` (one token after `CAR`) is ambiguous with a bare
    /// assignment response versus a three-field registration; the caller
    /// picks the right variant for its role via [`Message::parse_car_client`]
    /// or [`Message::parse_from_car`], since a dispatcher only ever sees
    /// registrations and a call client only ever sees assignments.
    pub fn parse_from_car(line: &str) -> Result<Message, ParseMessageError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.as_slice() {
            ["CAR", name, lowest, highest] => Ok(Message::Register {
                name: (*name).to_owned(),
                lowest: (*lowest).to_owned(),
                highest: (*highest).to_owned(),
            }),
            ["STATUS", status, current, destination] => Ok(Message::Status {
                status: (*status).to_owned(),
                current: (*current).to_owned(),
                destination: (*destination).to_owned(),
            }),
            ["EMERGENCY"] => Ok(Message::Emergency),
            ["INDIVIDUAL", "SERVICE"] => Ok(Message::IndividualService),
            ["CALL", source, destination] => Ok(Message::Call {
                source: (*source).to_owned(),
                destination: (*destination).to_owned(),
            }),
            _ => Err(ParseMessageError { line: line.to_owned() }),
        }
    }

    /// Parse a dispatcher -> car line.
    pub fn parse_to_car(line: &str) -> Result<Message, ParseMessageError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.as_slice() {
            ["FLOOR", label] => Ok(Message::Floor { label: (*label).to_owned() }),
            _ => Err(ParseMessageError { line: line.to_owned() }),
        }
    }

    /// Parse a dispatcher -> call-client line.
    pub fn parse_call_response(line: &str) -> Result<Message, ParseMessageError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.as_slice() {
            ["CAR", name] => Ok(Message::CarAssigned { name: (*name).to_owned() }),
            ["UNAVAILABLE"] => Ok(Message::Unavailable),
            _ => Err(ParseMessageError { line: line.to_owned() }),
        }
    }
}

/// Parse a floor token, discarding the position; used by callers that only
/// need to validate a token looks like a floor without caring about its axis.
pub fn looks_like_floor(token: &str) -> bool {
    token.parse::<Floor>().is_ok()
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
