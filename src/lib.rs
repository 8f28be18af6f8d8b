//! # depmap
//!
//! Static dependency mapping for Python projects.
//!
//! depmap parses every Python file of a project, resolves its imports
//! (absolute, relative, package re-exports and symbol usage) to concrete
//! files, and produces a file dependency graph with its reverse, a class
//! index with inheritance edges, and a ranked list of external libraries.
//!
//! ## Output Formats
//!
//! - **JSON**: full analysis report for programmatic consumption
//! - **DOT**: Graphviz file graph and class inheritance graph
//!
//! ```no_run
//! use depmap::config::Config;
//! use depmap::core::ProjectAnalyzer;
//!
//! let config = Config::new("./my_project", "./docs");
//! let result = ProjectAnalyzer::new(&config)?.analyze()?;
//! println!("{} files", result.files.len());
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod config;
pub mod core;
pub mod formatters;
pub mod parsers;
