pub mod config;
pub mod history;
pub mod stats;
pub mod timer;

/// Result type shared by every subcommand handler.
pub type CmdResult = Result<(), Box<dyn std::error::Error>>;
