use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt as _, util::SubscriberInitExt as _};

/// Send `tracing` output to `path`; the terminal belongs to the UI.
///
/// `RUST_LOG` wins over `filter`. When the file cannot be opened nothing is
/// installed and log macros become no-ops.
pub fn init(path: &Path, filter: &str) {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false);

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .unwrap_or_else(|_| EnvFilter::new("cadenza=info"));

    let _ = tracing_subscriber::registry()
        .with(file_layer)
        .with(env_filter)
        .try_init();
}
