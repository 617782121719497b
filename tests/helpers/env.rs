// Environment guard for registry tests: masks every `PROVISIONER_*` variable
// inherited from the caller, applies the test's own, and restores all on drop.

use std::ffi::OsString;

const PREFIX: &str = "PROVISIONER_";

#[derive(Debug, Default)]
pub struct ScopedEnv {
    saved: Vec<(OsString, Option<OsString>)>,
}

impl ScopedEnv {
    /// A guard that starts from a registry-neutral environment.
    pub fn clean() -> Self {
        let mut g = Self::default();
        let inherited: Vec<OsString> = std::env::vars_os()
            .map(|(k, _)| k)
            .filter(|k| k.to_string_lossy().starts_with(PREFIX))
            .collect();
        for k in inherited {
            g.remember(&k);
            std::env::remove_var(&k);
        }
        g
    }

    /// Set `key` for the lifetime of the guard.
    pub fn var(mut self, key: &str, value: &str) -> Self {
        self.remember(key.as_ref());
        std::env::set_var(key, value);
        self
    }

    fn remember(&mut self, key: &std::ffi::OsStr) {
        if self.saved.iter().all(|(k, _)| k != key) {
            self.saved.push((key.to_os_string(), std::env::var_os(key)));
        }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, prev) in self.saved.drain(..).rev() {
            match prev {
                Some(v) => std::env::set_var(&k, v),
                None => std::env::remove_var(&k),
            }
        }
    }
}
