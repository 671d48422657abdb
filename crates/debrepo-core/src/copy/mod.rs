//! Copying content between repositories.
//!
//! A copy request is validated as a whole before anything is touched
//! ([`CopyRequest::validate`]); each of its entries then produces one new
//! version of its destination repository ([`copy_content`]).

mod execute;
mod schema;
mod validate;

pub use execute::copy_content;
pub use validate::{CopyEntry, CopyRequest, ValidatedCopyRequest};
