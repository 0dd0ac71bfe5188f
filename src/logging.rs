use std::path::PathBuf;

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::infrastructure::environment;

/// Initializes tracing for the whole process. When `LOG_DIRECTORY` is set a
/// daily-rolled file layer is added; the returned guard must be held for
/// the process lifetime or buffered file output is lost.
pub fn init_logging() -> Option<WorkerGuard> {
    let env_file = load_env_file();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,vigilbot=info"));

    let guard = match std::env::var(environment::LOG_DIRECTORY).ok() {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(&directory, "vigilbot.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false),
                )
                .init();
            info!("Writing logs to {directory}");
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
            None
        }
    };

    info!("Starting vigilbot...");
    log_env_file_result(env_file);
    guard
}

fn load_env_file() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

fn log_env_file_result(env_file: Option<PathBuf>) {
    if let Some(path) = env_file {
        info!("Loaded environment variables from {}", path.display());
    } else {
        info!("No .env file found, proceeding with system environment variables.");
    }
}
