//! log4rs set-up.

use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;

/// Config file read at start-up, relative to the working directory.
pub const LOG_CONFIG_FILE: &str = "log4rs.yml";
const CONSOLE_PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {h({l})} {t} - {m}{n}";

/// Initialise logging from [`LOG_CONFIG_FILE`], or a plain console logger
/// at info level when the file is missing or broken.
pub fn init() {
    if let Err(file_err) = log4rs::init_file(LOG_CONFIG_FILE, Default::default()) {
        let fallback = console_config(LevelFilter::Info)
            .map_err(|e| e.to_string())
            .and_then(|config| log4rs::init_config(config).map_err(|e| e.to_string()));
        match fallback {
            Ok(_) => log::debug!("{LOG_CONFIG_FILE} not used ({file_err}), logging to console"),
            Err(e) => eprintln!("Error initializing log4rs: {file_err}; fallback failed: {e}"),
        }
    }
}

/// Console-only configuration with noisy HTTP crates held at warn.
pub fn console_config(level: LevelFilter) -> Result<Config, log4rs::config::runtime::ConfigErrors> {
    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(CONSOLE_PATTERN)))
        .build();

    Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .logger(Logger::builder().build("reqwest", LevelFilter::Warn))
        .logger(Logger::builder().build("hyper", LevelFilter::Warn))
        .logger(Logger::builder().build("azure_core", LevelFilter::Warn))
        .build(Root::builder().appender("stdout").build(level))
}
