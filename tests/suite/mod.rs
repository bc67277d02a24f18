//! Integration test modules.

mod cli;
mod config;
mod engine;
