// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Raw `pthread` bindings for a process-shared mutex and condition variable.
//!
//! `nix` has no safe wrapper for `PTHREAD_PROCESS_SHARED` attributes, so this
//! module talks to `libc` directly. Every public function documents the
//! caller invariant it depends on; [`super::SharedCarRegion`] is the only
//! caller, and `unsafe_code` is allowed for this whole `shared` module (see
//! the `#![allow(unsafe_code)]` on `shared/mod.rs`), not just this file.

#![allow(unsafe_code)]

use nix::libc;
use std::mem::MaybeUninit;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::error::ElevatorError;

/// Initialise `mutex` in place with the `PTHREAD_PROCESS_SHARED` attribute.
///
/// # Safety
/// `mutex` must point to valid, writable memory for a `pthread_mutex_t` that
/// is not already initialised, and must outlive every thread/process that
/// locks it.
pub unsafe fn init_shared_mutex(mutex: *mut libc::pthread_mutex_t) -> Result<(), ElevatorError> {
    let mut attr = MaybeUninit::<libc::pthread_mutexattr_t>::uninit();
    if libc::pthread_mutexattr_init(attr.as_mut_ptr()) != 0 {
        return Err(ElevatorError::resource("pthread_mutexattr_init failed"));
    }
    let attr_ptr = attr.as_mut_ptr();
    let result = (|| {
        if libc::pthread_mutexattr_setpshared(attr_ptr, libc::PTHREAD_PROCESS_SHARED) != 0 {
            return Err(ElevatorError::resource("pthread_mutexattr_setpshared failed"));
        }
        if libc::pthread_mutex_init(mutex, attr_ptr) != 0 {
            return Err(ElevatorError::resource("pthread_mutex_init failed"));
        }
        Ok(())
    })();
    libc::pthread_mutexattr_destroy(attr_ptr);
    result
}

/// Initialise `cond` in place with the `PTHREAD_PROCESS_SHARED` attribute.
///
/// # Safety
/// Same contract as [`init_shared_mutex`], for a `pthread_cond_t`.
pub unsafe fn init_shared_cond(cond: *mut libc::pthread_cond_t) -> Result<(), ElevatorError> {
    let mut attr = MaybeUninit::<libc::pthread_condattr_t>::uninit();
    if libc::pthread_condattr_init(attr.as_mut_ptr()) != 0 {
        return Err(ElevatorError::resource("pthread_condattr_init failed"));
    }
    let attr_ptr = attr.as_mut_ptr();
    let result = (|| {
        if libc::pthread_condattr_setpshared(attr_ptr, libc::PTHREAD_PROCESS_SHARED) != 0 {
            return Err(ElevatorError::resource("pthread_condattr_setpshared failed"));
        }
        if libc::pthread_cond_init(cond, attr_ptr) != 0 {
            return Err(ElevatorError::resource("pthread_cond_init failed"));
        }
        Ok(())
    })();
    libc::pthread_condattr_destroy(attr_ptr);
    result
}

/// Lock `mutex`, blocking the calling thread.
///
/// # Safety
/// `mutex` must be a live, initialised process-shared mutex.
pub unsafe fn lock(mutex: *mut libc::pthread_mutex_t) {
    let rc = libc::pthread_mutex_lock(mutex);
    debug_assert_eq!(rc, 0, "pthread_mutex_lock failed: {rc}");
}

/// Unlock `mutex`.
///
/// # Safety
/// `mutex` must be locked by the calling thread.
pub unsafe fn unlock(mutex: *mut libc::pthread_mutex_t) {
    let rc = libc::pthread_mutex_unlock(mutex);
    debug_assert_eq!(rc, 0, "pthread_mutex_unlock failed: {rc}");
}

/// Wake every thread waiting on `cond`.
///
/// # Safety
/// The calling thread must hold the mutex associated with `cond`.
pub unsafe fn broadcast(cond: *mut libc::pthread_cond_t) {
    let rc = libc::pthread_cond_broadcast(cond);
    debug_assert_eq!(rc, 0, "pthread_cond_broadcast failed: {rc}");
}

/// Wait on `cond` for up to `timeout`, or until woken by a broadcast.
///
/// The deadline is computed against `CLOCK_REALTIME`, matching the clock a
/// freshly-initialised `pthread_condattr_t` uses when no explicit clock
/// attribute is set. Returns `true` if woken (spuriously or by a real
/// broadcast), `false` on timeout.
///
/// # Safety
/// `mutex` must be locked by the calling thread and associated with `cond`.
pub unsafe fn wait_timeout(
    cond: *mut libc::pthread_cond_t,
    mutex: *mut libc::pthread_mutex_t,
    timeout: Duration,
) -> bool {
    let deadline = SystemTime::now() + timeout;
    let since_epoch = deadline.duration_since(UNIX_EPOCH).unwrap_or(Duration::ZERO);
    let ts = libc::timespec {
        tv_sec: since_epoch.as_secs() as libc::time_t,
        tv_nsec: since_epoch.subsec_nanos() as i64,
    };
    let rc = libc::pthread_cond_timedwait(cond, mutex, &ts);
    rc == 0
}

/// Destroy `mutex`. Only the region's creator should call this, and only
/// after every other process has stopped using the mapping.
///
/// # Safety
/// `mutex` must not be locked or waited on by any thread when this runs.
pub unsafe fn destroy_mutex(mutex: *mut libc::pthread_mutex_t) {
    let _ = libc::pthread_mutex_destroy(mutex);
}

/// Destroy `cond`. Same contract as [`destroy_mutex`].
///
/// # Safety
/// `cond` must not be waited on by any thread when this runs.
pub unsafe fn destroy_cond(cond: *mut libc::pthread_cond_t) {
    let _ = libc::pthread_cond_destroy(cond);
}

#[cfg(test)]
#[path = "raw_tests.rs"]
mod tests;
