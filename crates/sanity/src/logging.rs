#[cfg(feature = "native")]
pub use native::init_logging;

#[cfg(feature = "native")]
mod native {
    use std::fs::{self, File, OpenOptions};
    use std::io::{self, Read, Seek, SeekFrom, Write};
    use std::path::Path;
    use std::sync::{Arc, Mutex, MutexGuard};

    use tracing_subscriber::fmt::MakeWriter;
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    /// Log file name inside the data directory
    const LOG_FILE: &str = "sanity.log";
    /// Maximum log file size before rotation (5 MB)
    const MAX_LOG_SIZE: u64 = 5 * 1024 * 1024;
    /// Size to keep after rotation (1 MB of most recent logs)
    const KEEP_SIZE: u64 = 1024 * 1024;

    /// Rotate log file if it exceeds `max_size`, keeping the last `keep` bytes.
    pub(crate) fn rotate_log_if_needed(log_path: &Path, max_size: u64, keep: u64) -> io::Result<()> {
        if !log_path.exists() {
            return Ok(());
        }

        let metadata = fs::metadata(log_path)?;
        if metadata.len() <= max_size {
            return Ok(());
        }

        let mut file = File::open(log_path)?;
        let start_pos = metadata.len().saturating_sub(keep);
        file.seek(SeekFrom::Start(start_pos))?;
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;
        drop(file);

        // Skip to the first newline to avoid partial lines
        let skip = buffer
            .iter()
            .position(|&b| b == b'\n')
            .map(|i| i + 1)
            .unwrap_or(0);

        let mut file = File::create(log_path)?;
        file.write_all(b"--- Log rotated (older entries removed) ---\n")?;
        file.write_all(&buffer[skip..])?;
        Ok(())
    }

    /// A writer factory that produces writers for the shared log file
    #[derive(Clone)]
    struct LogWriterFactory {
        file: Arc<Mutex<File>>,
    }

    /// A writer that holds a reference to the shared file
    struct LogWriter {
        file: Arc<Mutex<File>>,
    }

    impl LogWriter {
        fn lock(&self) -> io::Result<MutexGuard<'_, File>> {
            self.file
                .lock()
                .map_err(|_| io::Error::other("log file lock poisoned"))
        }
    }

    impl Write for LogWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.lock()?.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            self.lock()?.flush()
        }
    }

    impl<'a> MakeWriter<'a> for LogWriterFactory {
        type Writer = LogWriter;

        fn make_writer(&'a self) -> Self::Writer {
            LogWriter {
                file: self.file.clone(),
            }
        }
    }

    /// Initialize logging to write to a file in the data directory.
    ///
    /// Logs are written to `{data_dir}/sanity.log` with size-based rotation.
    /// When the log exceeds 5MB, older entries are removed keeping only the last 1MB.
    /// The log level can be controlled via the `level` parameter or the `RUST_LOG` environment variable.
    pub fn init_logging(data_dir: &Path, level: &str) -> color_eyre::Result<()> {
        fs::create_dir_all(data_dir)?;

        let log_path = data_dir.join(LOG_FILE);
        if let Err(e) = rotate_log_if_needed(&log_path, MAX_LOG_SIZE, KEEP_SIZE) {
            eprintln!("Warning: Failed to rotate log file: {}", e);
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;
        let writer_factory = LogWriterFactory {
            file: Arc::new(Mutex::new(file)),
        };

        let default_filter = format!("sanity={level},sanity_core=warn");
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(writer_factory)
                    .with_ansi(false)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()?;

        tracing::info!(log_path = %log_path.display(), "Sanity logging initialized");
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_rotation_keeps_tail_on_line_boundary() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join(LOG_FILE);
            let content: String = (0..100).map(|i| format!("line {i:03}\n")).collect();
            fs::write(&path, &content).unwrap();

            rotate_log_if_needed(&path, 100, 50).unwrap();
            let rotated = fs::read_to_string(&path).unwrap();
            let mut lines = rotated.lines();
            assert_eq!(
                lines.next(),
                Some("--- Log rotated (older entries removed) ---")
            );
            assert!(lines.all(|l| l.starts_with("line ")));
            assert!(rotated.ends_with("line 099\n"));
            assert!(rotated.len() < content.len());
        }

        #[test]
        fn test_small_logs_are_untouched() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join(LOG_FILE);
            fs::write(&path, "short\n").unwrap();
            rotate_log_if_needed(&path, 100, 50).unwrap();
            assert_eq!(fs::read_to_string(&path).unwrap(), "short\n");

            rotate_log_if_needed(&dir.path().join("missing.log"), 100, 50).unwrap();
        }
    }
}

/// Initialize logging to the browser console.
#[cfg(feature = "web")]
pub fn init_logging_web() {
    let config = tracing_wasm::WASMLayerConfigBuilder::new()
        .set_max_level(tracing::Level::INFO)
        .build();
    tracing_wasm::set_as_global_default_with_config(config);
}
