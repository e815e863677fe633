//! Scoped environment variables for tests.
//!
//! The process environment is global, so every mutation goes through one
//! re-entrant mutex. Setting or removing a variable returns an
//! [`EnvVarGuard`] that puts the previous value back when dropped; guards for
//! the same key unwind in LIFO order.
//!
//! Tests that read the environment after writing several variables should
//! hold the lock for the whole read, via [`scope_with`] or [`lock`], so that
//! another test cannot interleave its own writes.
//!
//! # Examples
//!
//! ```
//! use strata_config_test_helpers::env;
//!
//! let _scope = env::scope_with(|lock| {
//!     vec![lock.set_var("APP_DB__PORT", "5432"), lock.remove_var("APP_DEBUG")]
//! });
//! assert_eq!(std::env::var("APP_DB__PORT").as_deref(), Ok("5432"));
//! ```

use std::env;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::sync::LazyLock;

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};

static ENV_MUTEX: LazyLock<ReentrantMutex<()>> = LazyLock::new(ReentrantMutex::default);

/// Apply `value` to `key`, removing the variable when `value` is `None`.
///
/// # Safety
///
/// Callers must hold `ENV_MUTEX`.
unsafe fn write_var(key: &str, value: Option<&OsStr>) {
    match value {
        Some(value) => unsafe { env::set_var(key, value) },
        None => unsafe { env::remove_var(key) },
    }
}

fn replace_locked(
    key: String,
    value: Option<&OsStr>,
    _held: &ReentrantMutexGuard<'static, ()>,
) -> EnvVarGuard {
    let original = env::var_os(&key);
    // SAFETY: the caller holds `ENV_MUTEX`.
    unsafe { write_var(&key, value) };
    EnvVarGuard { key, original }
}

/// Restores one environment variable to its prior state on drop.
#[must_use = "dropping restores the prior value"]
pub struct EnvVarGuard {
    key: String,
    original: Option<OsString>,
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        let _held = ENV_MUTEX.lock();
        // SAFETY: `ENV_MUTEX` is held for the restoration.
        unsafe { write_var(&self.key, self.original.as_deref()) };
    }
}

impl fmt::Debug for EnvVarGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvVarGuard")
            .field("key", &self.key)
            .field("had_original", &self.original.is_some())
            .finish()
    }
}

/// Holds the environment lock; mutations made through it do not re-lock.
#[must_use = "dropping releases the environment lock"]
pub struct EnvVarLock {
    held: ReentrantMutexGuard<'static, ()>,
}

impl EnvVarLock {
    /// Set `key` to `value` while the lock is held.
    pub fn set_var(&self, key: impl Into<String>, value: impl AsRef<OsStr>) -> EnvVarGuard {
        replace_locked(key.into(), Some(value.as_ref()), &self.held)
    }

    /// Remove `key` while the lock is held.
    pub fn remove_var(&self, key: impl Into<String>) -> EnvVarGuard {
        replace_locked(key.into(), None, &self.held)
    }
}

/// Keeps the environment lock and a set of guards alive together.
///
/// The guards are restored before the lock is released.
#[must_use = "dropping releases the lock and restores the guards"]
pub struct EnvScope {
    guards: Vec<EnvVarGuard>,
    _lock: EnvVarLock,
}

impl Drop for EnvScope {
    fn drop(&mut self) {
        self.guards.drain(..).rev().for_each(drop);
    }
}

/// Set `key` to `value` until the returned guard is dropped.
///
/// ```
/// use strata_config_test_helpers::env;
///
/// let _g = env::set_var("STRATA_DOC_KEY", "value");
/// assert_eq!(std::env::var("STRATA_DOC_KEY").as_deref(), Ok("value"));
/// ```
pub fn set_var(key: impl Into<String>, value: impl AsRef<OsStr>) -> EnvVarGuard {
    lock().set_var(key, value)
}

/// Remove `key` until the returned guard is dropped.
pub fn remove_var(key: impl Into<String>) -> EnvVarGuard {
    lock().remove_var(key)
}

/// Acquire the environment lock for the lifetime of the returned value.
pub fn lock() -> EnvVarLock {
    EnvVarLock {
        held: ENV_MUTEX.lock(),
    }
}

/// Take the lock, run `builder` to create guards, and keep both alive.
pub fn scope_with<F>(builder: F) -> EnvScope
where
    F: FnOnce(&EnvVarLock) -> Vec<EnvVarGuard>,
{
    let held = lock();
    let guards = builder(&held);
    EnvScope {
        guards,
        _lock: held,
    }
}

#[cfg(test)]
mod tests;
