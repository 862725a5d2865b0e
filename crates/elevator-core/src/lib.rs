// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared types and protocol code for the elevator control system: the
//! floor-label codec, the wire message grammar, the length-prefixed framing
//! over it, the car status enum, the SCAN floor queue, the error taxonomy,
//! and the process-shared memory region binding the car, the safety
//! monitor, and the manual-service tool together.

pub mod error;
pub mod floor;
pub mod framed;
pub mod message;
pub mod queue;
pub mod shared;
pub mod status;

pub use error::{ElevatorError, ErrorKind};
pub use floor::Floor;
pub use message::Message;
pub use queue::FloorQueue;
pub use status::CarStatus;
