use std::io::Write;

use env_logger::{Env, WriteStyle};

/// Installs the process-wide logger. `RUST_LOG` overrides the default `info` level.
pub fn try_init() -> Result<(), log::SetLoggerError> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[RACE | {} | {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .write_style(WriteStyle::Auto)
        .try_init()
}
