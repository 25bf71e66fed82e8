//! Configuration module for the manual indexer
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use manual_indexer::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("indexer.toml")).unwrap();
//! println!("Writing to index: {}", config.search.index);
//! ```

mod parser;
mod types;
mod validation;

pub use types::{Config, CrawlerConfig, SearchConfig, SelectorsConfig, UserAgentConfig};

pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
