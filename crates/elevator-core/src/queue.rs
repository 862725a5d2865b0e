// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-car SCAN-discipline floor queue.
//!
//! New stops are spliced in so the car keeps sweeping in one direction as
//! far as it can before reversing, rather than serving requests in arrival
//! order. [`sweep_insertion_index`] is the pure core of that policy, kept
//! free of the queue's storage so it can be tested directly against the
//! scenarios a SCAN elevator is expected to get right.

use crate::floor::Floor;
use crate::status::CarStatus;

/// The car's effective position for scheduling purposes.
///
/// A car mid-transition (`Closing` toward a different floor, or physically
/// `Between` floors) is treated as already one step closer to its
/// destination than `current_floor` says, so a new request doesn't get
/// queued behind a stop the car is about to leave anyway.
pub fn effective_position(status: CarStatus, current: Floor, destination: Floor) -> Floor {
    if status.is_transitional() && current.axis() != destination.axis() {
        let direction = if destination.axis() > current.axis() { 1 } else { -1 };
        Floor::from_axis(current.axis() + direction).unwrap_or(current)
    } else {
        current
    }
}

/// An estimated-time-of-arrival score for ranking candidate cars: distance
/// to `target` from the car's effective position, plus the number of stops
/// already queued ahead of it.
pub fn eta(position: Floor, queue_len: usize, target: Floor) -> i64 {
    (position.axis() - target.axis()).unsigned_abs() as i64 + queue_len as i64
}

/// Where to splice `new_floor` into `queue` (given in travel order) so the
/// car keeps sweeping in `going_up`'s direction for as long as possible.
///
/// Mirrors the original controller's `add_to_queue` walk floor-for-floor:
/// the first stop already in flight is skipped as a fixed anchor, then the
/// remaining stops are scanned in the sweep's order until the new floor no
/// longer fits, or the sweep crosses back over `car_pos` into the return
/// leg, in which case the new floor belongs in that leg instead and is
/// appended.
pub fn sweep_insertion_index(queue: &[Floor], car_pos: i32, going_up: bool, new_floor: i32) -> usize {
    if going_up {
        if new_floor <= car_pos {
            return queue.len();
        }
        let is_down_sweep = queue
            .iter()
            .map(|f| f.axis())
            .filter(|&f| f > car_pos)
            .any(|f| new_floor < f);
        if is_down_sweep {
            return queue.len();
        }

        let mut idx = 0;
        let mut skipped_first = false;
        if let Some(first) = queue.first().map(|f| f.axis()) {
            if first > car_pos {
                if new_floor < first {
                    // insert ahead of the anchor; idx stays 0
                } else {
                    idx = 1;
                    skipped_first = true;
                }
            }
        }
        while idx < queue.len() {
            let curr = queue[idx].axis();
            if curr < car_pos {
                break;
            }
            if skipped_first {
                if new_floor > curr {
                    break;
                }
            } else if new_floor < curr {
                break;
            }
            idx += 1;
        }
        idx
    } else {
        if new_floor >= car_pos {
            return queue.len();
        }
        let mut idx = 0;
        let mut skipped_first = false;
        if let Some(first) = queue.first().map(|f| f.axis()) {
            if first < car_pos {
                if new_floor > first {
                    // insert ahead of the anchor; idx stays 0
                } else {
                    idx = 1;
                    skipped_first = true;
                }
            }
        }
        while idx < queue.len() {
            let curr = queue[idx].axis();
            if curr > car_pos {
                break;
            }
            if skipped_first {
                if new_floor < curr {
                    break;
                }
            } else if new_floor > curr {
                break;
            }
            idx += 1;
        }
        idx
    }
}

/// A car's ordered stops under SCAN discipline.
#[derive(Debug, Clone, Default)]
pub struct FloorQueue {
    floors: Vec<Floor>,
}

impl FloorQueue {
    pub fn new() -> Self {
        Self { floors: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.floors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.floors.len()
    }

    pub fn front(&self) -> Option<Floor> {
        self.floors.first().copied()
    }

    pub fn as_slice(&self) -> &[Floor] {
        &self.floors
    }

    pub fn clear(&mut self) {
        self.floors.clear();
    }

    /// Remove and return the current stop.
    pub fn pop_front(&mut self) -> Option<Floor> {
        if self.floors.is_empty() {
            None
        } else {
            Some(self.floors.remove(0))
        }
    }

    /// Splice `floor` into the queue under SCAN discipline. Returns `false`
    /// without changing anything if `floor` is already queued.
    pub fn push(&mut self, floor: Floor, car_pos: Floor, current: Floor, destination: Floor) -> bool {
        if self.floors.contains(&floor) {
            return false;
        }
        if self.floors.is_empty() {
            self.floors.push(floor);
            return true;
        }

        let going_up = if current.axis() != destination.axis() {
            destination.axis() > current.axis()
        } else {
            self.floors[0].axis() > current.axis()
        };

        let idx = sweep_insertion_index(&self.floors, car_pos.axis(), going_up, floor.axis());
        self.floors.insert(idx, floor);
        true
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
