//! Process logging: one stdout layer and one append-only file layer.
//!
//! The subscriber is installed for the lifetime of a [`LogContext`] instead
//! of globally, so tests can build their own and the binary controls
//! exactly when logging starts and stops.

use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

pub struct LogContext {
    path: PathBuf,
    _guard: DefaultGuard,
}

impl LogContext {
    /// Opens `log_file` for appending and installs the subscriber on this thread.
    ///
    /// `RUST_LOG` overrides the default `info` filter.
    pub fn init(log_file: &Path) -> io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_file)?;

        let subscriber = tracing_subscriber::registry()
            .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
            .with(fmt::layer().with_target(false))
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            );

        let guard = tracing::subscriber::set_default(subscriber);
        Ok(Self {
            path: log_file.to_path_buf(),
            _guard: guard,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Uninstalls the subscriber and closes the log file.
    pub fn shutdown(self) {
        info!(log_file = %self.path.display(), "Logging shut down");
    }
}
