pub mod commands;
pub mod error;
pub mod postprocessor;
pub mod program;

/// Installs the global tracing subscriber.
///
/// Logs go to a single never-rotated file in the OS data dir:
///   Linux    ~/.local/share/tangentcam/tangentcam.log
///   macOS    ~/Library/Application Support/tangentcam/tangentcam.log
///   Windows  %LOCALAPPDATA%\tangentcam\tangentcam.log
///
/// Level is taken from `RUST_LOG`, INFO when unset. The returned guard must
/// be held until the program exits or buffered lines are lost.
pub fn init_tracing() -> tracing_appender::non_blocking::WorkerGuard {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_default()
        .join("tangentcam");

    // rolling::never panics if it cannot open the file.
    let _ = std::fs::create_dir_all(&log_dir);

    let file_appender = tracing_appender::rolling::never(&log_dir, "tangentcam.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    guard
}
