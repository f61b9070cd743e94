//! Process-global environment mutation helpers for tests.

use std::sync::{Mutex, OnceLock};

/// Return the global lock used to serialize environment mutations in tests.
pub fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

#[allow(unused_unsafe)]
fn write_var(key: &str, value: Option<&str>) {
    // SAFETY: callers hold `env_lock` while tests may run in parallel.
    unsafe {
        match value {
            Some(value) => std::env::set_var(key, value),
            None => std::env::remove_var(key),
        }
    }
}

/// Applies a batch of environment overrides and restores every touched
/// variable, in reverse order, when dropped.
#[derive(Default)]
pub struct ScopedEnv {
    saved: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key=value` for the lifetime of the scope.
    pub fn set(mut self, key: &str, value: &str) -> Self {
        self.saved.push((key.to_string(), std::env::var(key).ok()));
        write_var(key, Some(value));
        self
    }

    /// Unset `key` for the lifetime of the scope.
    pub fn remove(mut self, key: &str) -> Self {
        self.saved.push((key.to_string(), std::env::var(key).ok()));
        write_var(key, None);
        self
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        while let Some((key, previous)) = self.saved.pop() {
            write_var(key.as_str(), previous.as_deref());
        }
    }
}
