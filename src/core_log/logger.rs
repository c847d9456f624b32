use chrono::Local;
use env_logger::{Builder, Env};
use std::io::Write;

/// Installs the global logger. `RUST_LOG` wins over `default_filter`.
///
/// Lines look like `[2024-06-01 12:00:00] [INFO] message`.
pub fn init_logger(default_filter: &str) {
    Builder::from_env(Env::default().default_filter_or(default_filter))
        .format(|buf, record| {
            let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
            writeln!(buf, "[{}] [{}] {}", timestamp, record.level(), record.args())
        })
        .init();
}
