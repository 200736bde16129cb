//! Specify templates - command template packaging for AI coding agents
//!
//! Resolves a template package from the official release, a replacement
//! repository, or an overlay (repository, directory, or ZIP), merges the
//! overlay over the base, expands command-template placeholders, and lays
//! the result out in the directory structure each agent expects.
//!
//! ```text
//! source::SourceLocator ─► overlay::merge ─► packager::package_merged ─► writer::write_tree
//!                                               │
//!                               template + substitute + agent
//! ```

pub mod agent;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod git;
pub mod logging;
pub mod overlay;
pub mod packager;
pub mod source;
pub mod substitute;
pub mod template;
pub mod tree;
pub mod ui;
pub mod writer;
