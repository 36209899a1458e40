//! Modstrip
//!
//! HTTP service that joins remote product module images into one strip.
//! This library exposes modules for integration testing.

pub mod api;
pub mod error;
pub mod models;
pub mod rendering;
pub mod server;
pub mod services;
