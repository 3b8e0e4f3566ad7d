//! SHA-256 fingerprints for files and whole profile/backup trees.

use crate::core::error::{AipacaError, Result};
use crate::core::tree::list_all_files;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io;
use std::path::Path;

pub fn file_checksum(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(format!("sha256:{:x}", hasher.finalize()))
}

/// Combined digest over every file's relative path and content digest, in
/// listing order. Two trees with the same files and bytes share a digest.
pub fn dir_checksum(dir: &Path) -> Result<String> {
    let mut hasher = Sha256::new();
    for rel in list_all_files(dir)? {
        let abs = dir.join(&rel);
        let digest = file_checksum(&abs)
            .map_err(|e| AipacaError::io(format!("failed to hash {}", abs.display()), e))?;
        hasher.update(rel.as_bytes());
        hasher.update([0u8]);
        hasher.update(digest.as_bytes());
        hasher.update([b'\n']);
    }
    Ok(format!("sha256:{:x}", hasher.finalize()))
}
