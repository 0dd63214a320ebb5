use std::io::Write;
use std::sync::{Mutex, MutexGuard};

static BUFFER: Mutex<Option<Vec<String>>> = Mutex::new(None);

fn lock() -> MutexGuard<'static, Option<Vec<String>>> {
    // A panic while holding the lock leaves plain data behind; keep using it
    BUFFER.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Activate buffering. While active, log lines and `warn()` calls store
/// messages instead of printing to stderr.
pub fn activate() {
    *lock() = Some(Vec::new());
}

/// Deactivate buffering and return all collected messages.
pub fn drain() -> Vec<String> {
    lock().take().unwrap_or_default()
}

/// Write a warning message. If buffering is active the message is stored;
/// otherwise it is printed to stderr immediately.
pub fn warn(msg: String) {
    let mut guard = lock();
    if let Some(buf) = guard.as_mut() {
        buf.push(msg);
    } else {
        drop(guard);
        eprintln!("{}", msg);
    }
}

/// `io::Write` sink for the logger that routes each record through `warn()`.
struct BufferedStderr;

impl Write for BufferedStderr {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            warn(line.to_string());
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Install the global logger. `verbose` lowers the default level to debug;
/// `RUST_LOG` still takes precedence.
pub fn init_logging(verbose: bool) {
    let default_filter = if verbose { "warn,offer_bro=debug" } else { "warn" };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .target(env_logger::Target::Pipe(Box::new(BufferedStderr)))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test touches the global buffer so parallel tests can't interleave
    #[test]
    fn test_buffering_lifecycle() {
        activate();
        warn("first".to_string());
        warn(format!("second {}", 2));
        BufferedStderr.write_all(b"[WARN offer_bro] third\n\n").unwrap();

        let drained = drain();
        assert_eq!(drained, vec!["first", "second 2", "[WARN offer_bro] third"]);

        // Inactive buffer drains empty
        assert!(drain().is_empty());
    }
}
