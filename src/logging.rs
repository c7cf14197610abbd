// src/logging.rs
//
// `tlog!` writes a local-time stamped line to stderr and, once a log
// directory is configured, to a per-run file as well. `ttrace!` is the
// per-frame variant, silent unless frame tracing is on.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Per-run log file. `None` until `init_file_logging` succeeds.
pub static LOG_FILE: Mutex<Option<std::fs::File>> = Mutex::new(None);

pub static TRACE_FRAMES: AtomicBool = AtomicBool::new(false);

/// Symlink kept pointing at the newest log file
const LATEST_LINK: &str = "bridge.log";

pub fn set_trace_frames(enabled: bool) {
    TRACE_FRAMES.store(enabled, Ordering::Relaxed);
}

pub fn trace_frames_enabled() -> bool {
    TRACE_FRAMES.load(Ordering::Relaxed)
}

pub fn timestamp() -> String {
    chrono::Local::now().format("%H:%M:%S%.3f").to_string()
}

/// Emit one already-stamped line to stderr and the log file, if open.
pub fn write_line(line: &str) {
    eprintln!("{}", line);
    if let Ok(mut guard) = LOG_FILE.lock() {
        if let Some(file) = guard.as_mut() {
            let _ = writeln!(file, "{}", line);
        }
    }
}

/// Start copying log lines into `<log_dir>/<YYYYmmdd-HHMMSS>-bridge.log`.
///
/// On Unix `bridge.log` in the same directory is repointed at the new file.
/// Returns the path of the file that was opened.
pub fn init_file_logging(log_dir: &Path) -> Result<PathBuf, String> {
    std::fs::create_dir_all(log_dir)
        .map_err(|e| format!("cannot create log dir {}: {}", log_dir.display(), e))?;

    let file_name = chrono::Local::now()
        .format("%Y%m%d-%H%M%S-bridge.log")
        .to_string();
    let log_path = log_dir.join(&file_name);

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .map_err(|e| format!("cannot open log file {}: {}", log_path.display(), e))?;

    #[cfg(unix)]
    {
        let link = log_dir.join(LATEST_LINK);
        let _ = std::fs::remove_file(&link);
        if let Err(e) = std::os::unix::fs::symlink(&file_name, &link) {
            eprintln!("{} [logging] {} not updated: {}", timestamp(), LATEST_LINK, e);
        }
    }

    if let Ok(mut guard) = LOG_FILE.lock() {
        *guard = Some(file);
    }
    write_line(&format!(
        "{} [logging] Writing to {}",
        timestamp(),
        log_path.display()
    ));

    Ok(log_path)
}

/// Close the log file; later lines go to stderr only.
pub fn stop_file_logging() {
    let closed = match LOG_FILE.lock() {
        Ok(mut guard) => guard.take().is_some(),
        Err(_) => false,
    };
    if closed {
        eprintln!("{} [logging] File logging stopped", timestamp());
    }
}

#[macro_export]
macro_rules! tlog {
    ($($arg:tt)*) => {
        $crate::logging::write_line(&format!(
            "{} {}",
            $crate::logging::timestamp(),
            format_args!($($arg)*)
        ))
    };
}

#[macro_export]
macro_rules! ttrace {
    ($($arg:tt)*) => {{
        if $crate::logging::trace_frames_enabled() {
            $crate::tlog!($($arg)*);
        }
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_shape() {
        let stamp = timestamp();
        assert_eq!(stamp.len(), "00:00:00.000".len());
        assert_eq!(&stamp[2..3], ":");
        assert_eq!(&stamp[8..9], ".");
    }

    #[test]
    fn test_file_logging_writes_and_links() {
        let dir = tempfile::tempdir().unwrap();
        let path = init_file_logging(dir.path()).unwrap();

        tlog!("[test] marker line {}", 42);
        stop_file_logging();
        tlog!("[test] after stop");

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("[test] marker line 42"));
        assert!(!content.contains("[test] after stop"));

        #[cfg(unix)]
        {
            let target = std::fs::read_link(dir.path().join(LATEST_LINK)).unwrap();
            assert_eq!(Some(target.as_os_str()), path.file_name());
        }
    }
}
