pub mod content;
pub mod repository;
pub mod signing;
pub mod version;
