// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The process-shared car record: a fixed-size record in POSIX shared
//! memory (`/car<name>`), guarded by a process-shared mutex and condition
//! variable. It is the only intra-host synchronisation surface the car
//! state machine, the safety monitor, the network agent, and the
//! manual-service tool all touch.
//!
//! Working with a process-shared `pthread_mutex_t`/`pthread_cond_t` pair
//! and raw `mmap` pointers is inherently `unsafe`; every block below is
//! paired with a `// SAFETY:` comment justifying it.

#![allow(unsafe_code)]

mod raw;

use std::ffi::{c_void, CString};
use std::time::Duration;

use nix::fcntl::OFlag;
use nix::libc;
use nix::sys::mman::{mmap, munmap, shm_open, shm_unlink, MapFlags, ProtFlags};
use nix::sys::stat::Mode;
use nix::unistd::{close, ftruncate};
use std::num::NonZeroUsize;
use std::ptr::NonNull;
use tracing::{debug, warn};

use crate::error::ElevatorError;
use crate::floor::Floor;
use crate::status::CarStatus;

const MAX_FLOOR_LEN: usize = 4;
const MAX_STATUS_LEN: usize = 8;

/// Byte-for-byte layout of the shared record, matching the original
/// fixed-width C struct: two floor labels, a status literal, and eight
/// single-byte flags, guarded by process-shared pthread primitives.
#[repr(C)]
struct CarRecordRaw {
    mutex: libc::pthread_mutex_t,
    cond: libc::pthread_cond_t,
    current_floor: [u8; MAX_FLOOR_LEN],
    destination_floor: [u8; MAX_FLOOR_LEN],
    status: [u8; MAX_STATUS_LEN],
    open_button: u8,
    close_button: u8,
    safety_system: u8,
    door_obstruction: u8,
    overload: u8,
    emergency_stop: u8,
    individual_service_mode: u8,
    emergency_mode: u8,
}

fn encode_floor(floor: Floor, out: &mut [u8; MAX_FLOOR_LEN]) {
    let label = floor.to_string();
    out.fill(0);
    out[..label.len()].copy_from_slice(label.as_bytes());
}

fn decode_floor(bytes: &[u8; MAX_FLOOR_LEN]) -> Result<Floor, ElevatorError> {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    std::str::from_utf8(&bytes[..end])
        .ok()
        .and_then(|s| s.parse::<Floor>().ok())
        .ok_or_else(|| ElevatorError::validation("shared region holds an invalid floor label"))
}

fn encode_status(status: CarStatus, out: &mut [u8; MAX_STATUS_LEN]) {
    let label = status.as_str();
    out.fill(0);
    out[..label.len()].copy_from_slice(label.as_bytes());
}

fn decode_status(bytes: &[u8; MAX_STATUS_LEN]) -> Result<CarStatus, ElevatorError> {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    std::str::from_utf8(&bytes[..end])
        .ok()
        .and_then(|s| s.parse::<CarStatus>().ok())
        .ok_or_else(|| ElevatorError::validation("shared region holds an invalid car status"))
}

fn shm_path(car_name: &str) -> Result<CString, ElevatorError> {
    CString::new(format!("/car{car_name}"))
        .map_err(|_| ElevatorError::validation("car name contains a NUL byte"))
}

/// A mapped, locked-and-initialised (or opened) shared car record.
///
/// The creator's [`Drop`] unlinks the shared-memory object (`shm_unlink`) in
/// addition to unmapping it; an opener only unmaps.
pub struct SharedCarRegion {
    ptr: NonNull<CarRecordRaw>,
    owns: bool,
    name: String,
}

// SAFETY: the region is backed by POSIX shared memory designed for
// concurrent multi-process access; every access goes through the
// process-shared mutex in `CarRecordRaw`.
unsafe impl Send for SharedCarRegion {}
unsafe impl Sync for SharedCarRegion {}

impl SharedCarRegion {
    /// Create a brand-new region for `car_name`, failing if one already
    /// exists. Initialises the mutex, condvar, and fields: both floor
    /// labels set to `lowest`, status `Closed`, every flag cleared.
    pub fn create(car_name: &str, lowest: Floor) -> Result<Self, ElevatorError> {
        let path = shm_path(car_name)?;
        let fd = shm_open(path.as_c_str(), OFlag::O_CREAT | OFlag::O_EXCL | OFlag::O_RDWR, Mode::from_bits_truncate(0o666))
            .map_err(|e| ElevatorError::resource(format!("shm_open {car_name}: {e}")))?;

        let size = std::mem::size_of::<CarRecordRaw>();
        if let Err(e) = ftruncate(fd, size as libc::off_t) {
            let _ = close(fd);
            let _ = shm_unlink(path.as_c_str());
            return Err(ElevatorError::resource(format!("ftruncate {car_name}: {e}")));
        }

        let ptr = map(fd, size).inspect_err(|_| {
            let _ = shm_unlink(path.as_c_str());
        });
        let _ = close(fd);
        let ptr = ptr?;

        // SAFETY: `ptr` is a fresh mapping sized for `CarRecordRaw`, not yet
        // read by any other process.
        unsafe {
            if let Err(e) = raw::init_shared_mutex(std::ptr::addr_of_mut!((*ptr.as_ptr()).mutex)) {
                munmap(ptr.cast::<c_void>().as_ptr(), size).ok();
                let _ = shm_unlink(path.as_c_str());
                return Err(e);
            }
            if let Err(e) = raw::init_shared_cond(std::ptr::addr_of_mut!((*ptr.as_ptr()).cond)) {
                munmap(ptr.cast::<c_void>().as_ptr(), size).ok();
                let _ = shm_unlink(path.as_c_str());
                return Err(e);
            }

            let record = ptr.as_ptr();
            encode_floor(lowest, &mut (*record).current_floor);
            encode_floor(lowest, &mut (*record).destination_floor);
            encode_status(CarStatus::Closed, &mut (*record).status);
            (*record).open_button = 0;
            (*record).close_button = 0;
            (*record).safety_system = 0;
            (*record).door_obstruction = 0;
            (*record).overload = 0;
            (*record).emergency_stop = 0;
            (*record).individual_service_mode = 0;
            (*record).emergency_mode = 0;
        }

        debug!(car = car_name, %lowest, "created shared car region");
        Ok(Self { ptr, owns: true, name: car_name.to_owned() })
    }

    /// Open a region that another process already created for `car_name`.
    pub fn open(car_name: &str) -> Result<Self, ElevatorError> {
        let path = shm_path(car_name)?;
        let fd = shm_open(path.as_c_str(), OFlag::O_RDWR, Mode::empty())
            .map_err(|e| ElevatorError::resource(format!("shm_open {car_name}: {e}")))?;
        let size = std::mem::size_of::<CarRecordRaw>();
        let ptr = map(fd, size);
        let _ = close(fd);
        let ptr = ptr?;
        debug!(car = car_name, "opened shared car region");
        Ok(Self { ptr, owns: false, name: car_name.to_owned() })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lock the record and return a guard through which to read or mutate it.
    pub fn lock(&self) -> CarGuard<'_> {
        // SAFETY: `self.ptr` stays valid for the region's lifetime.
        unsafe {
            raw::lock(std::ptr::addr_of_mut!((*self.ptr.as_ptr()).mutex));
        }
        CarGuard { region: self }
    }
}

impl Drop for SharedCarRegion {
    fn drop(&mut self) {
        let size = std::mem::size_of::<CarRecordRaw>();
        if self.owns {
            // SAFETY: only the creator destroys the primitives, and only
            // after unmapping is about to remove the last local reference;
            // other processes racing this call is the documented limitation
            // of this teardown path (see SPEC_FULL.md's shutdown sequence).
            unsafe {
                raw::destroy_mutex(std::ptr::addr_of_mut!((*self.ptr.as_ptr()).mutex));
                raw::destroy_cond(std::ptr::addr_of_mut!((*self.ptr.as_ptr()).cond));
            }
        }
        // SAFETY: `self.ptr` was produced by a matching `mmap` of this size.
        unsafe {
            let _ = munmap(self.ptr.cast::<c_void>().as_ptr(), size);
        }
        if self.owns {
            if let Ok(path) = shm_path(&self.name) {
                if let Err(e) = shm_unlink(path.as_c_str()) {
                    warn!(car = %self.name, error = %e, "shm_unlink failed during teardown");
                }
            }
        }
    }
}

fn map(fd: std::os::unix::io::RawFd, size: usize) -> Result<NonNull<CarRecordRaw>, ElevatorError> {
    let len = NonZeroUsize::new(size).expect("CarRecordRaw is never zero-sized");
    // SAFETY: `fd` is open and sized to at least `size` bytes by the caller.
    let addr = unsafe {
        mmap(None, len, ProtFlags::PROT_READ | ProtFlags::PROT_WRITE, MapFlags::MAP_SHARED, fd, 0)
            .map_err(|e| ElevatorError::resource(format!("mmap: {e}")))?
    };
    NonNull::new(addr as *mut CarRecordRaw)
        .ok_or_else(|| ElevatorError::resource("mmap returned a null pointer"))
}

/// A held lock on a [`SharedCarRegion`]. Unlocks the mutex on drop.
pub struct CarGuard<'a> {
    region: &'a SharedCarRegion,
}

impl CarGuard<'_> {
    fn record(&self) -> &CarRecordRaw {
        // SAFETY: the mutex is held for the lifetime of this guard.
        unsafe { &*self.region.ptr.as_ptr() }
    }

    fn record_mut(&mut self) -> &mut CarRecordRaw {
        // SAFETY: the mutex is held for the lifetime of this guard.
        unsafe { &mut *self.region.ptr.as_ptr() }
    }

    pub fn current_floor(&self) -> Result<Floor, ElevatorError> {
        decode_floor(&self.record().current_floor)
    }

    pub fn set_current_floor(&mut self, floor: Floor) {
        encode_floor(floor, &mut self.record_mut().current_floor);
    }

    pub fn destination_floor(&self) -> Result<Floor, ElevatorError> {
        decode_floor(&self.record().destination_floor)
    }

    pub fn set_destination_floor(&mut self, floor: Floor) {
        encode_floor(floor, &mut self.record_mut().destination_floor);
    }

    pub fn status(&self) -> Result<CarStatus, ElevatorError> {
        decode_status(&self.record().status)
    }

    pub fn set_status(&mut self, status: CarStatus) {
        encode_status(status, &mut self.record_mut().status);
    }

    pub fn open_button(&self) -> bool {
        self.record().open_button != 0
    }

    /// Read and clear the open-door button, mirroring the edge-consumed
    /// semantics of a momentary hardware button.
    pub fn take_open_button(&mut self) -> bool {
        let pressed = self.record().open_button != 0;
        self.record_mut().open_button = 0;
        pressed
    }

    pub fn set_open_button(&mut self, pressed: bool) {
        self.record_mut().open_button = pressed as u8;
    }

    pub fn take_close_button(&mut self) -> bool {
        let pressed = self.record().close_button != 0;
        self.record_mut().close_button = 0;
        pressed
    }

    pub fn set_close_button(&mut self, pressed: bool) {
        self.record_mut().close_button = pressed as u8;
    }

    pub fn safety_system(&self) -> u8 {
        self.record().safety_system
    }

    pub fn set_safety_system(&mut self, value: u8) {
        self.record_mut().safety_system = value;
    }

    pub fn door_obstruction(&self) -> bool {
        self.record().door_obstruction != 0
    }

    pub fn set_door_obstruction(&mut self, value: bool) {
        self.record_mut().door_obstruction = value as u8;
    }

    pub fn overload(&self) -> bool {
        self.record().overload != 0
    }

    pub fn set_overload(&mut self, value: bool) {
        self.record_mut().overload = value as u8;
    }

    pub fn emergency_stop(&self) -> bool {
        self.record().emergency_stop != 0
    }

    pub fn set_emergency_stop(&mut self, value: bool) {
        self.record_mut().emergency_stop = value as u8;
    }

    pub fn individual_service_mode(&self) -> bool {
        self.record().individual_service_mode != 0
    }

    pub fn set_individual_service_mode(&mut self, value: bool) {
        self.record_mut().individual_service_mode = value as u8;
    }

    pub fn emergency_mode(&self) -> bool {
        self.record().emergency_mode != 0
    }

    pub fn set_emergency_mode(&mut self, value: bool) {
        self.record_mut().emergency_mode = value as u8;
    }

    /// Wake every other thread/process blocked in [`CarGuard::wait_timeout`]
    /// on this region. Call this while still holding the guard, after every
    /// material state change, per the shared region's broadcast invariant.
    pub fn notify_all(&self) {
        // SAFETY: the mutex backing this condvar is held by this guard.
        unsafe {
            raw::broadcast(std::ptr::addr_of_mut!((*self.region.ptr.as_ptr()).cond));
        }
    }

    /// Release the mutex, wait on the condvar for up to `timeout` or until
    /// broadcast, then reacquire the mutex. Returns `true` if woken by a
    /// broadcast (spurious or real), `false` on timeout.
    pub fn wait_timeout(&mut self, timeout: Duration) -> bool {
        // SAFETY: the mutex is held by this guard and matches the condvar.
        unsafe {
            raw::wait_timeout(
                std::ptr::addr_of_mut!((*self.region.ptr.as_ptr()).cond),
                std::ptr::addr_of_mut!((*self.region.ptr.as_ptr()).mutex),
                timeout,
            )
        }
    }
}

impl Drop for CarGuard<'_> {
    fn drop(&mut self) {
        // SAFETY: this guard holds the lock acquired in `SharedCarRegion::lock`.
        unsafe {
            raw::unlock(std::ptr::addr_of_mut!((*self.region.ptr.as_ptr()).mutex));
        }
    }
}

#[cfg(test)]
#[path = "shared_tests.rs"]
mod tests;
