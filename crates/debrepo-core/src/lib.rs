//! Versioned APT repositories.
//!
//! New repository versions are staged with [`version::create_version`], which
//! drops derived metadata, resolves duplicate content and refuses versions
//! with colliding publication paths or two releases of one distribution.

use error::DebRepoError;

pub mod content;
pub mod copy;
pub mod database;
pub mod dedup;
pub mod error;
pub mod finalize;
pub mod href;
pub mod paths;
pub mod repository;
mod request;
pub mod signing;
pub mod sync;
pub mod version;

pub type DebRepoResult<T> = std::result::Result<T, DebRepoError>;
