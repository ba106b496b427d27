//! Configuration module for Story-Archiver
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file and merging command-line overrides into it.
//!
//! # Example
//!
//! ```no_run
//! use story_archiver::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("archiver.toml")).unwrap();
//! println!("Archiving into: {}", config.output.directory);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig, DEFAULT_ROOT_URL};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_with_hash, parse_config, ConfigOverrides,
};
pub use validation::validate;
