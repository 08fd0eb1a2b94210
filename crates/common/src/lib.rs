//! Common utilities and shared types for bramble.
//!
//! This crate provides foundational components used across all bramble crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Pagination**: Clamped page resolution via [`PageToken`] and [`Page`]
//! - **Slugs**: URL-safe slug derivation via [`slugify`]
//! - **Storage**: File storage backend for fetched images
//!
//! # Example
//!
//! ```no_run
//! use bramble_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let id = id_gen.generate();
//!     println!("Generated ID: {}", id);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod pagination;
pub mod slug;
pub mod storage;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use pagination::{Page, PageToken, resolve_page};
pub use slug::slugify;
pub use storage::{LocalStorage, StorageBackend, StoredFile, generate_storage_key};
