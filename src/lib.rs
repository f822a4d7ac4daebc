//! pipstale - Python dependency staleness checker library
//!
//! This library provides the core functionality for checking Python
//! dependencies against PyPI:
//! - requirements.txt, pyproject.toml and `pip list` input
//! - PEP 440 comparison of declared and latest versions
//! - Optional OSV.dev advisory lookup

pub mod check;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod orchestrator;
pub mod output;
pub mod progress;
pub mod registry;
pub mod security;
