//! Command-line arguments and file-based configuration.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use delve_world::WorldConfig;

/// The level used when `--level` is not given.
pub const DEFAULT_LEVEL: &str = include_str!("../levels/depth1.txt");

#[derive(Debug, Clone, Parser)]
#[command(name = "delve", about = "A small turn-based dungeon crawl")]
pub struct Args {
    /// ASCII level file (`#` wall, `.` floor, `@ g ! / >` markers)
    #[arg(short, long)]
    pub level: Option<PathBuf>,

    /// Play these keys instead of reading stdin (e.g. "dddsx")
    #[arg(short, long)]
    pub script: Option<String>,

    /// Stop after this many turns (0 = no limit)
    #[arg(short, long, default_value_t = 0)]
    pub turns: u64,

    /// JSON file overriding world limits (see `WorldConfig`)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print a JSON run summary on exit
    #[arg(long)]
    pub json: bool,
}

impl Args {
    /// The level text: the `--level` file, or the built-in level.
    ///
    /// # Errors
    ///
    /// Fails if the level file cannot be read.
    pub fn level_text(&self) -> Result<String> {
        match &self.level {
            Some(path) => fs::read_to_string(path)
                .with_context(|| format!("reading level file {}", path.display())),
            None => Ok(DEFAULT_LEVEL.to_string()),
        }
    }

    /// The world configuration: the `--config` file, or the defaults.
    ///
    /// # Errors
    ///
    /// Fails if the config file cannot be read or is not valid JSON.
    pub fn world_config(&self) -> Result<WorldConfig> {
        let Some(path) = &self.config else {
            return Ok(WorldConfig::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        parse_world_config(&text).with_context(|| format!("parsing config file {}", path.display()))
    }
}

/// Parse a JSON world configuration. Missing fields keep their defaults.
pub fn parse_world_config(text: &str) -> Result<WorldConfig> {
    Ok(serde_json::from_str(text)?)
}
