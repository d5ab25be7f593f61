use std::fs;
use std::path::Path;

use chrono::Utc;
use tracing::{debug, warn};

/// Returns true when the last permitted pass started less than
/// `cooldown_secs` ago.
///
/// A permitted check overwrites the lock file with the current time, so the
/// next window is measured from the start of this pass, not its end. Any I/O
/// problem fails open.
pub fn should_wait(lock_path: &Path, cooldown_secs: f64) -> bool {
    should_wait_at(lock_path, cooldown_secs, now_secs())
}

pub fn should_wait_at(lock_path: &Path, cooldown_secs: f64, now: f64) -> bool {
    if let Some(last) = read_timestamp(lock_path) {
        if now - last < cooldown_secs {
            debug!(last, now, cooldown_secs, "cooldown still active");
            return true;
        }
    }

    if let Err(e) = fs::write(lock_path, now.to_string()) {
        warn!(path = %lock_path.display(), error = %e, "failed to update cooldown lock");
    }
    false
}

fn read_timestamp(lock_path: &Path) -> Option<f64> {
    let raw = fs::read_to_string(lock_path).ok()?;
    match raw.trim().parse::<f64>() {
        Ok(ts) if ts.is_finite() => Some(ts),
        _ => {
            debug!(path = %lock_path.display(), "ignoring corrupt cooldown lock");
            None
        }
    }
}

fn now_secs() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}
