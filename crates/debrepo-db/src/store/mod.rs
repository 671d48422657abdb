//! Repository-pattern query structs, one per table family:
//!
//! - [`SigningServiceStore`] - registered release signing services
//! - [`RepositoryStore`] - APT repositories
//! - [`OverrideStore`] - per-distribution signing service overrides
//! - [`ContentStore`] - content-addressed content units
//! - [`VersionStore`] - repository versions
//! - [`MembershipStore`] - which content belongs to which versions

pub mod content;
pub mod membership;
pub mod repository;
pub mod signing;
pub mod version;

pub use content::ContentStore;
pub use membership::MembershipStore;
pub use repository::RepositoryStore;
pub use signing::{OverrideStore, SigningServiceStore};
pub use version::VersionStore;
