//! Authenticated encryption for message bodies at rest.
//!
//! Each blob is self-describing: a fresh 64-byte salt and 16-byte nonce are
//! generated per call, a 256-bit key is derived from the process secret via
//! PBKDF2-HMAC-SHA512, and the body is sealed with AES-256-GCM bound to a
//! fixed associated-data tag. The frame is `salt || nonce || tag || body`,
//! hex-encoded for storage.
//!
//! The KDF is deliberately slow; callers should treat encrypt/decrypt as
//! CPU-bound work and avoid fanning out many concurrent calls on a
//! latency-critical path.

use aes_gcm::aead::generic_array::typenum::U16;
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{Aead, Payload};
use aes_gcm::aes::Aes256;
use aes_gcm::{AesGcm, KeyInit};
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha512;
use thiserror::Error;

/// AES-256-GCM parameterized with a 16-byte nonce.
type Aes256Gcm16 = AesGcm<Aes256, U16>;

const SALT_LEN: usize = 64;
const NONCE_LEN: usize = 16;
const TAG_LEN: usize = 16;
const KEY_LEN: usize = 32;
const PBKDF2_ITERATIONS: u32 = 100_000;

/// Binds blobs to this protocol context so they cannot be replayed into a
/// different AEAD use of the same secret.
const ASSOCIATED_DATA: &[u8] = b"message-encryption";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CipherError {
    #[error("malformed ciphertext blob: {0}")]
    Malformed(&'static str),

    #[error("authentication failed")]
    Authentication,
}

/// Stateless codec holding the process-wide secret.
#[derive(Clone)]
pub struct MessageCipher {
    secret: String,
}

impl MessageCipher {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    fn derive_key(&self, salt: &[u8]) -> [u8; KEY_LEN] {
        let mut key = [0u8; KEY_LEN];
        pbkdf2_hmac::<Sha512>(self.secret.as_bytes(), salt, PBKDF2_ITERATIONS, &mut key);
        key
    }

    /// Encrypt `plaintext` into a hex-encoded, self-describing blob.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        let mut salt = [0u8; SALT_LEN];
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut salt);
        OsRng.fill_bytes(&mut nonce);

        let key = self.derive_key(&salt);
        let cipher = Aes256Gcm16::new(GenericArray::from_slice(&key));

        // RustCrypto appends the 16-byte tag to the ciphertext; the stored
        // frame carries the tag ahead of the body instead.
        let sealed = cipher
            .encrypt(
                GenericArray::from_slice(&nonce),
                Payload {
                    msg: plaintext.as_bytes(),
                    aad: ASSOCIATED_DATA,
                },
            )
            .map_err(|_| CipherError::Authentication)?;
        let (body, tag) = sealed.split_at(sealed.len() - TAG_LEN);

        let mut frame = Vec::with_capacity(SALT_LEN + NONCE_LEN + TAG_LEN + body.len());
        frame.extend_from_slice(&salt);
        frame.extend_from_slice(&nonce);
        frame.extend_from_slice(tag);
        frame.extend_from_slice(body);

        Ok(hex::encode(frame))
    }

    /// Decrypt a blob produced by [`encrypt`](Self::encrypt). Fails with
    /// `CipherError` on framing errors or tag mismatch; callers performing
    /// batch reads substitute a placeholder per affected message rather than
    /// aborting the batch.
    pub fn decrypt(&self, blob: &str) -> Result<String, CipherError> {
        let frame = hex::decode(blob).map_err(|_| CipherError::Malformed("not hex"))?;
        if frame.len() < SALT_LEN + NONCE_LEN + TAG_LEN {
            return Err(CipherError::Malformed("frame too short"));
        }

        let (salt, rest) = frame.split_at(SALT_LEN);
        let (nonce, rest) = rest.split_at(NONCE_LEN);
        let (tag, body) = rest.split_at(TAG_LEN);

        let key = self.derive_key(salt);
        let cipher = Aes256Gcm16::new(GenericArray::from_slice(&key));

        let mut sealed = Vec::with_capacity(body.len() + TAG_LEN);
        sealed.extend_from_slice(body);
        sealed.extend_from_slice(tag);

        let plaintext = cipher
            .decrypt(
                GenericArray::from_slice(nonce),
                Payload {
                    msg: &sealed,
                    aad: ASSOCIATED_DATA,
                },
            )
            .map_err(|_| CipherError::Authentication)?;

        String::from_utf8(plaintext).map_err(|_| CipherError::Malformed("invalid utf8"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher() -> MessageCipher {
        MessageCipher::new("unit-test-secret")
    }

    #[test]
    fn round_trip() {
        let c = cipher();
        let blob = c.encrypt("Is this still available?").unwrap();
        assert_eq!(c.decrypt(&blob).unwrap(), "Is this still available?");
    }

    #[test]
    fn round_trip_empty_and_unicode() {
        let c = cipher();
        for msg in ["", "héllo wörld 你好", "multi\nline\nbody"] {
            let blob = c.encrypt(msg).unwrap();
            assert_eq!(c.decrypt(&blob).unwrap(), msg);
        }
    }

    #[test]
    fn blobs_are_unique_per_call() {
        let c = cipher();
        let a = c.encrypt("same plaintext").unwrap();
        let b = c.encrypt("same plaintext").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn tampering_any_section_is_detected() {
        let c = cipher();
        let blob = c.encrypt("do not touch").unwrap();
        let mut frame = hex::decode(&blob).unwrap();
        // Salt, nonce, tag and body offsets all live in one frame; flipping a
        // byte anywhere must fail authentication, never yield garbage.
        for idx in [0, SALT_LEN, SALT_LEN + NONCE_LEN, frame.len() - 1] {
            frame[idx] ^= 0x01;
            let tampered = hex::encode(&frame);
            assert_eq!(c.decrypt(&tampered), Err(CipherError::Authentication));
            frame[idx] ^= 0x01;
        }
    }

    #[test]
    fn wrong_secret_fails_authentication() {
        let blob = cipher().encrypt("secret message").unwrap();
        let other = MessageCipher::new("different-secret");
        assert_eq!(other.decrypt(&blob), Err(CipherError::Authentication));
    }

    #[test]
    fn malformed_frames_are_rejected() {
        let c = cipher();
        assert_eq!(
            c.decrypt("zz-not-hex"),
            Err(CipherError::Malformed("not hex"))
        );
        assert_eq!(
            c.decrypt(&hex::encode([0u8; 8])),
            Err(CipherError::Malformed("frame too short"))
        );
    }
}
