//! Onboarding Template Engine Library
//!
//! This module exports the core components for testing and integration.

pub mod cli;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod format;
pub mod logging;
pub mod store;
pub mod types;
