use crate::error::HeaderError;

/// Magic bytes at the start of every stream.
pub const MAGIC: [u8; 4] = *b"CGBF";

/// The only format version this crate decodes.
pub const VERSION: u32 = 1;

/// Header: magic (4) + version (4).
pub const HEADER_SIZE: usize = 8;

/// Size of the `u32` length in front of each window payload.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Check the first [`HEADER_SIZE`] bytes of a stream.
///
/// Bytes past the header are ignored.
pub fn validate_header(bytes: &[u8]) -> Result<(), HeaderError> {
    let Some(&[m0, m1, m2, m3, v0, v1, v2, v3]) = bytes.first_chunk::<HEADER_SIZE>() else {
        return Err(HeaderError::Truncated { len: bytes.len() });
    };

    let magic = [m0, m1, m2, m3];
    if magic != MAGIC {
        return Err(HeaderError::InvalidMagic { found: magic });
    }

    let version = u32::from_le_bytes([v0, v1, v2, v3]);
    if version != VERSION {
        return Err(HeaderError::UnsupportedVersion { found: version });
    }

    Ok(())
}
