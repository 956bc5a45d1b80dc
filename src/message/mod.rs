//! Signed messages: a human-readable message signed with a private key and
//! exchanged as base64 text.
//!
//! The signature is one header byte (`27 + rec_id`, plus 4 for a compressed
//! key) followed by 32-byte r and s. The verifier recovers the public key
//! from it, so no key needs to travel with the message.
//!
//! # Examples
//! ```
//! use txsig::ecdsa::public_key;
//! use txsig::message::MessageSigner;
//! let signer = MessageSigner::default();
//! let key = [3; 32];
//! let sig = signer.sign_message("hello", &key, true).unwrap();
//! assert!(signer.verify_message("hello", &sig, &public_key(&key, true).unwrap()).unwrap());
//! ```

use crate::ecdsa::{self, EcdsaSignature, find_recovery_id, public_key, recover_from_signature};
use crate::util::{Error, Hash256, Result, sha256d, var_int, write_to_vec};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use std::io::Write;
use tracing::warn;

/// Magic prefix of the standard signed-message format.
pub const SIGNED_MESSAGE_PREFIX: &str = "Bitcoin Signed Message:\n";

const HEADER_BASE: u8 = 27;
const HEADER_COMPRESSED: u8 = 4;
const SIGNATURE_LEN: usize = 65;

/// Signs and verifies messages under a magic prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSigner {
    /// Prefix hashed in front of every message.
    pub prefix: String,
}

impl Default for MessageSigner {
    fn default() -> Self {
        MessageSigner {
            prefix: SIGNED_MESSAGE_PREFIX.to_string(),
        }
    }
}

impl MessageSigner {
    /// Creates a signer with a custom prefix.
    #[must_use]
    pub fn new(prefix: &str) -> Self {
        MessageSigner {
            prefix: prefix.to_string(),
        }
    }

    /// `varint(len(prefix)) ‖ prefix ‖ varint(len(message)) ‖ message`
    #[must_use]
    pub fn format_message_for_signing(&self, message: &str) -> Vec<u8> {
        let prefix = self.prefix.as_bytes();
        let message = message.as_bytes();
        let capacity =
            var_int::size(prefix.len() as u64) + prefix.len() + var_int::size(message.len() as u64) + message.len();
        write_to_vec(capacity, |v| {
            var_int::write(prefix.len() as u64, v)?;
            v.write_all(prefix)?;
            var_int::write(message.len() as u64, v)?;
            v.write_all(message)
        })
    }

    /// Double SHA-256 of the formatted message.
    #[must_use]
    pub fn message_hash(&self, message: &str) -> Hash256 {
        sha256d(&self.format_message_for_signing(message))
    }

    /// Signs a message and returns the base64 signature.
    ///
    /// # Errors
    /// `Error::OutOfRange` for an invalid private key.
    pub fn sign_message(&self, message: &str, private_key: &[u8; 32], compressed: bool) -> Result<String> {
        let hash = self.message_hash(message);
        let sig = ecdsa::sign(&hash, private_key)?;
        let public_key = public_key(private_key, compressed)?;
        let rec_id = find_recovery_id(&sig, &hash, &public_key).inspect_err(|e| {
            warn!("Own signature does not recover own key: {}", e);
        })?;
        let mut header = HEADER_BASE + rec_id;
        if compressed {
            header += HEADER_COMPRESSED;
        }
        let mut bytes = Vec::with_capacity(SIGNATURE_LEN);
        bytes.push(header);
        bytes.extend_from_slice(&sig.to_compact()?);
        Ok(STANDARD.encode(bytes))
    }

    /// Recovers the public key that signed `message`, serialized at the
    /// compression the header byte names.
    ///
    /// # Errors
    /// - `Error::FromBase64Error` if the signature is not base64.
    /// - `Error::BadEncoding` for a wrong length or a header byte outside 27 to 34.
    /// - `Error::RecoveryFailed` if no key can be recovered.
    pub fn signed_message_to_key(&self, message: &str, signature_base64: &str) -> Result<Vec<u8>> {
        let bytes = STANDARD.decode(signature_base64)?;
        if bytes.len() != SIGNATURE_LEN {
            let msg = format!("Signature is {} bytes, expected {}", bytes.len(), SIGNATURE_LEN);
            return Err(Error::BadEncoding(msg));
        }
        let header = bytes[0];
        if !(HEADER_BASE..HEADER_BASE + 2 * HEADER_COMPRESSED).contains(&header) {
            return Err(Error::BadEncoding(format!("Header byte out of range: {}", header)));
        }
        let compressed = header >= HEADER_BASE + HEADER_COMPRESSED;
        let rec_id = (header - HEADER_BASE) & 3;
        let sig = EcdsaSignature::from_compact(&bytes[1..])?;
        let hash = self.message_hash(message);
        recover_from_signature(rec_id, &sig, &hash, compressed)?
            .ok_or_else(|| Error::RecoveryFailed("Signature does not recover to a valid key".to_string()))
    }

    /// Whether `signature_base64` over `message` recovers `public_key`.
    ///
    /// # Errors
    /// As [`signed_message_to_key`](Self::signed_message_to_key).
    pub fn verify_message(&self, message: &str, signature_base64: &str, public_key: &[u8]) -> Result<bool> {
        let recovered = self.signed_message_to_key(message, signature_base64)?;
        Ok(recovered == public_key)
    }
}
