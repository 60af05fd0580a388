//! Reversible payload obfuscation.
//!
//! A byte-wise XOR against a cyclically repeated key. Applying the transform
//! twice with the same key restores the input. This is NOT a security
//! control: it offers no confidentiality against a motivated reader and
//! exists only to deter casual byte-level tampering and signature scanning
//! of the configuration payload and the executable backup copy.

use crate::error::{InstallError, Result};
use crate::manifest::BACKUP_KEY_SALT;

/// A validated obfuscation key. Construction is the only failure point;
/// transforming is infallible afterwards.
#[derive(Debug, Clone)]
pub struct ObfuscationCodec {
    key: Vec<u8>,
}

impl ObfuscationCodec {
    pub fn new(key: impl Into<Vec<u8>>) -> Result<Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(InstallError::EmptyKey);
        }
        Ok(Self { key })
    }

    /// Codec for the sentinel backup copy: fixed salt concatenated with the
    /// host identifier. The salt guarantees a non-empty key even for an
    /// empty host string.
    pub fn for_backup(host: &str) -> Self {
        Self {
            key: format!("{BACKUP_KEY_SALT}{host}").into_bytes(),
        }
    }

    pub fn transform(&self, data: &[u8]) -> Vec<u8> {
        data.iter()
            .enumerate()
            .map(|(i, byte)| byte ^ self.key[i % self.key.len()])
            .collect()
    }
}

/// One-shot transform. Symmetric: `transform(transform(m, k), k) == m` for
/// every non-empty key `k`.
pub fn transform(data: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    Ok(ObfuscationCodec::new(key)?.transform(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_restores_input() {
        let message = b"the quick brown fox \x00\xff\x7f jumps";
        let key = b"host-1234";
        let once = transform(message, key).unwrap();
        assert_ne!(once.as_slice(), message.as_slice());
        let twice = transform(&once, key).unwrap();
        assert_eq!(twice.as_slice(), message.as_slice());
    }

    #[test]
    fn round_trip_holds_for_awkward_lengths() {
        // key longer than data, key of one byte, empty data
        for (data, key) in [
            (&b"ab"[..], &b"a-much-longer-key"[..]),
            (&b"abcdefgh"[..], &b"k"[..]),
            (&b""[..], &b"key"[..]),
        ] {
            let twice = transform(&transform(data, key).unwrap(), key).unwrap();
            assert_eq!(twice.as_slice(), data);
        }
    }

    #[test]
    fn key_repeats_cyclically() {
        let data = [0u8; 6];
        let out = transform(&data, &[1, 2, 3]).unwrap();
        assert_eq!(out, vec![1, 2, 3, 1, 2, 3]);
    }

    #[test]
    fn empty_key_is_rejected() {
        assert!(matches!(
            transform(b"data", b""),
            Err(InstallError::EmptyKey)
        ));
        assert!(ObfuscationCodec::new(Vec::new()).is_err());
    }

    #[test]
    fn backup_codec_tolerates_empty_host() {
        // salt keeps the key non-empty on hosts that report no name
        let codec = ObfuscationCodec::for_backup("");
        let data = b"payload";
        assert_eq!(codec.transform(&codec.transform(data)), data.to_vec());
    }
}
