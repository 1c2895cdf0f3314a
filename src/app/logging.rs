use crate::config::AppConfig;
use std::{
    env, fs,
    io::Write,
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex, OnceLock,
    },
    time::{SystemTime, UNIX_EPOCH},
};

const LOG_MAX_BYTES: u64 = 5 * 1024 * 1024;
static LOG_ENABLED: AtomicBool = AtomicBool::new(false);
static LOG_STATE: OnceLock<Mutex<LogState>> = OnceLock::new();

/// Path to the temp log file we rotate between runs.
pub fn log_file_path() -> PathBuf {
    env::var("SLOTCAP_LOG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir().join("slotcap.log"))
}

struct LogWriter {
    path: PathBuf,
    file: fs::File,
    max_bytes: u64,
    bytes_written: u64,
}

impl LogWriter {
    fn new(path: PathBuf, max_bytes: u64) -> Option<Self> {
        let mut bytes_written = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        if bytes_written > max_bytes {
            let _ = fs::remove_file(&path);
            bytes_written = 0;
        }
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .ok()?;
        Some(Self {
            path,
            file,
            max_bytes,
            bytes_written,
        })
    }

    fn rotate_if_needed(&mut self, next_len: usize) {
        if self.bytes_written.saturating_add(next_len as u64) <= self.max_bytes {
            return;
        }
        if let Ok(file) = fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)
        {
            self.file = file;
            self.bytes_written = 0;
        }
    }

    fn write_line(&mut self, line: &str) {
        self.rotate_if_needed(line.len());
        if self.file.write_all(line.as_bytes()).is_ok() {
            self.bytes_written = self.bytes_written.saturating_add(line.len() as u64);
        }
    }
}

#[derive(Default)]
struct LogState {
    writer: Option<LogWriter>,
}

fn log_state() -> &'static Mutex<LogState> {
    LOG_STATE.get_or_init(|| Mutex::new(LogState::default()))
}

fn set_writer(enabled: bool, path: PathBuf) {
    LOG_ENABLED.store(enabled, Ordering::Relaxed);
    let mut state = log_state()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    state.writer = if enabled {
        LogWriter::new(path, LOG_MAX_BYTES)
    } else {
        None
    };
}

/// Configure logging based on CLI flags or environment.
pub fn init_logging(config: &AppConfig) {
    set_writer(config.logging_enabled(), log_file_path());
}

/// Append a timestamped line to the debug log. Stream and device problems go
/// here so they never interleave with event output on stdout.
pub fn log_debug(msg: &str) {
    if !LOG_ENABLED.load(Ordering::Relaxed) {
        return;
    }
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let line = format!("[{timestamp}] {msg}\n");
    let mut state = log_state()
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(writer) = state.writer.as_mut() {
        writer.write_line(&line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writer_rotates_when_budget_exceeded() {
        let path = env::temp_dir().join(format!("slotcap_rotate_{}.log", std::process::id()));
        let _ = fs::remove_file(&path);
        let mut writer = LogWriter::new(path.clone(), 16).expect("open log");
        writer.write_line("0123456789\n");
        writer.write_line("abcdefghij\n");
        let contents = fs::read_to_string(&path).expect("read log");
        assert_eq!(contents, "abcdefghij\n");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn log_debug_writes_when_enabled() {
        let path = env::temp_dir().join(format!("slotcap_debug_{}.log", std::process::id()));
        let _ = fs::remove_file(&path);
        set_writer(true, path.clone());
        log_debug("stream opened");
        set_writer(false, path.clone());
        log_debug("ignored");
        let contents = fs::read_to_string(&path).expect("read log");
        assert!(contents.contains("stream opened"));
        assert!(!contents.contains("ignored"));
        let _ = fs::remove_file(&path);
    }
}
