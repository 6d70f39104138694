//! Shared library surface for the SafePath server and its tests.

pub mod api;
pub mod config;
pub mod detector;
pub mod pipeline;
pub mod state;
