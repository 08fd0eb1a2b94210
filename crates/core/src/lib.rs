//! Core business logic for bramble.

pub mod services;

pub use services::*;
