use md5::{Digest, Md5};

/// Computes MD5 of `data` and returns the lowercase hex digest.
///
/// The digest depends on the bytes only, never on the file name.
pub fn checksum_bytes(data: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
