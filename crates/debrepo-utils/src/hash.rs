use std::path::Path;

use crate::error::{HashError, HashResult};

/// Computes the hex-encoded blake3 digest of an in-memory buffer.
///
/// Content units are identified by the digest of their canonical encoding, so two
/// units with identical defining fields always share one identity.
pub fn digest_bytes(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

/// Calculates the blake3 checksum of a file as a hex-encoded string.
///
/// # Errors
///
/// * [`HashError::ReadFailed`] if the file cannot be read.
pub fn calculate_checksum<P: AsRef<Path>>(file_path: P) -> HashResult<String> {
    let file_path = file_path.as_ref();
    let mut hasher = blake3::Hasher::new();
    hasher.update_mmap(file_path).map_err(|err| {
        HashError::ReadFailed {
            path: file_path.to_path_buf(),
            source: err,
        }
    })?;
    Ok(hasher.finalize().to_hex().to_string())
}
