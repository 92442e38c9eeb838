use std::{
    fs::{self, File, OpenOptions},
    io::Write,
    path::PathBuf,
    sync::Mutex,
};

use anyhow::Context;
use chrono::{DateTime, Local};
use env_logger::Env;
use log::{Level, LevelFilter, Log, Metadata, Record};

use crate::configuration::LoggingSettings;

struct RunLogger {
    console: env_logger::Logger,
    errors: Mutex<File>,
}

impl Log for RunLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Error || self.console.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if self.console.matches(record) {
            self.console.log(record);
        }

        if record.level() <= Level::Error {
            if let Ok(mut file) = self.errors.lock() {
                let _ = writeln!(
                    file,
                    "{} [{}] - {}",
                    Local::now().format("%Y-%m-%d %H:%M:%S"),
                    record.level(),
                    record.args()
                );
            }
        }
    }

    fn flush(&self) {
        self.console.flush();
        if let Ok(mut file) = self.errors.lock() {
            let _ = file.flush();
        }
    }
}

pub fn log_file_name(started_at: DateTime<Local>) -> String {
    format!("{}.log", started_at.format("%Y-%m-%d-%H:%M"))
}

pub fn init(settings: &LoggingSettings) -> anyhow::Result<PathBuf> {
    fs::create_dir_all(&settings.directory).with_context(|| {
        format!(
            "Failed to create log directory {}",
            settings.directory.display()
        )
    })?;
    let path = settings.directory.join(log_file_name(Local::now()));
    let errors = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    let console =
        env_logger::Builder::from_env(Env::default().default_filter_or(&settings.default_filter))
            .build();
    let max_level = console.filter().max(LevelFilter::Error);

    log::set_boxed_logger(Box::new(RunLogger {
        console,
        errors: Mutex::new(errors),
    }))
    .context("Logger already initialized")?;
    log::set_max_level(max_level);

    log::info!("Logger initialized, errors go to {}", path.display());
    Ok(path)
}
