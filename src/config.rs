//! Configuration and CLI argument handling

use std::path::PathBuf;
use clap::Parser;

/// Application directory name under the platform config directory
pub const APP_DIR_NAME: &str = "simple-timer";

/// File holding the persisted preferences
pub const PREFERENCES_FILE_NAME: &str = "preferences.yml";

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "simple-timer")]
#[command(about = "A single countdown timer with sound alerts and a local control surface")]
#[command(version)]
pub struct Config {
    /// Port to bind the control server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Preference file location (defaults to the user config directory)
    #[arg(long)]
    pub prefs_file: Option<PathBuf>,

    /// Program used to play the notification sound
    #[arg(long, default_value = "paplay")]
    pub sound_command: String,

    /// Sound file passed to the sound command
    #[arg(long, default_value = "/usr/share/sounds/freedesktop/stereo/complete.oga")]
    pub sound_file: PathBuf,

    /// Do not draw the countdown in the terminal
    #[arg(long)]
    pub headless: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Resolve where the sound preference lives
    pub fn prefs_path(&self) -> PathBuf {
        if let Some(path) = &self.prefs_file {
            return path.clone();
        }

        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME).join(PREFERENCES_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(format!("{}-{}", APP_DIR_NAME, PREFERENCES_FILE_NAME)))
    }
}
