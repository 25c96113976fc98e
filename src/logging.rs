//! Diagnostic logging setup

use crate::{Config, Result};
use anyhow::Context;
use env_logger::{Builder, Target};
use log::{LevelFilter, Record};
use std::fs::File;
use std::io::{self, Write};

/// Write one record as `<line> <LEVEL> - <message>`
fn write_record<W: Write + ?Sized>(buf: &mut W, record: &Record<'_>) -> io::Result<()> {
    writeln!(
        buf,
        "{} {} - {}",
        record.line().unwrap_or(0),
        record.level(),
        record.args()
    )
}

fn builder(level: LevelFilter) -> Builder {
    let mut builder = Builder::new();
    builder
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| write_record(buf, record));
    builder
}

/// Send diagnostics to `config.log_path`, truncating it.
///
/// `RUST_LOG` overrides `config.log_level`. When the log file cannot be
/// created, diagnostics go to stderr instead and a warning is printed.
pub fn init(config: &Config) -> Result<()> {
    let mut builder = builder(config.log_level);

    match File::create(&config.log_path) {
        Ok(file) => {
            builder.target(Target::Pipe(Box::new(file)));
        }
        Err(e) => {
            eprintln!(
                "warning: cannot create log file {:?} ({}), logging to stderr",
                config.log_path, e
            );
            builder.target(Target::Stderr);
        }
    }

    builder.try_init().context("failed to install logger")
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    #[test]
    fn test_record_format() {
        let mut buf = Vec::new();
        write_record(
            &mut buf,
            &Record::builder()
                .args(format_args!("Proxy worked"))
                .level(Level::Info)
                .line(Some(42))
                .build(),
        )
        .unwrap();

        assert_eq!(String::from_utf8(buf).unwrap(), "42 INFO - Proxy worked\n");
    }

    #[test]
    fn test_init_creates_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log");
        std::fs::write(&path, "old run\n").unwrap();

        let config = Config::new().with_log_path(&path);
        // Another test may already have installed a logger; the file is
        // created either way.
        let _ = init(&config);

        assert!(path.exists());
        assert!(!std::fs::read_to_string(&path).unwrap().contains("old run"));
    }
}
