use std::env;

/// Restores the overridden environment variables when dropped.
struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in self.saved.drain(..) {
            match value {
                Some(value) => env::set_var(&key, value),
                None => env::remove_var(&key),
            }
        }
    }
}

/// Runs `f` with `vars` set, restoring the previous values even if `f` panics.
pub fn with_env<F: FnOnce()>(vars: Vec<(&str, &str)>, f: F) {
    let _guard = EnvGuard {
        saved: vars
            .iter()
            .map(|(key, _)| (key.to_string(), env::var(key).ok()))
            .collect(),
    };
    for (key, value) in vars {
        env::set_var(key, value);
    }
    f();
}
