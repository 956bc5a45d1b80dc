//! Deterministic ECDSA signing, verification and public key recovery on secp256k1.
//!
//! Signing uses RFC6979 nonces, so the same digest and key always give the
//! same signature, and always returns the low-S form. Verification is total:
//! malformed keys, out-of-range components or library faults all come back
//! as `false`.
//!
//! # Examples
//! ```
//! use txsig::ecdsa::{public_key, sign, verify};
//! use txsig::util::sha256d;
//! let key = [7; 32];
//! let digest = sha256d(b"payload");
//! let sig = sign(&digest, &key).unwrap();
//! assert!(verify(&digest, &sig, &public_key(&key, true).unwrap()));
//! ```

use crate::util::{Error, Hash256, Result};
use num_bigint::BigUint;
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId, Signature};
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use tracing::debug;

mod signature;

pub use self::signature::EcdsaSignature;

const CURVE_ORDER: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe,
    0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b, 0xbf, 0xd2, 0x5e, 0x8c, 0xd0, 0x36, 0x41, 0x41,
];

const HALF_CURVE_ORDER: [u8; 32] = [
    0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0x5d, 0x57, 0x6e, 0x73, 0x57, 0xa4, 0x50, 0x1d, 0xdf, 0xe9, 0x2f, 0x46, 0x68, 0x1b, 0x20, 0xa0,
];

const FIELD_PRIME: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe, 0xff, 0xff, 0xfc, 0x2f,
];

/// Order n of the secp256k1 generator.
#[must_use]
pub fn curve_order() -> BigUint {
    BigUint::from_bytes_be(&CURVE_ORDER)
}

/// n / 2, the largest canonical S.
#[must_use]
pub fn half_curve_order() -> BigUint {
    BigUint::from_bytes_be(&HALF_CURVE_ORDER)
}

/// Prime p of the secp256k1 base field.
#[must_use]
pub fn field_prime() -> BigUint {
    BigUint::from_bytes_be(&FIELD_PRIME)
}

/// Serialized public key for a private key.
///
/// # Errors
/// `Error::OutOfRange` if the scalar is zero or not below the curve order.
pub fn public_key(private_key: &[u8; 32], compressed: bool) -> Result<Vec<u8>> {
    let secp = Secp256k1::signing_only();
    let secret_key = secret_key(private_key)?;
    let public_key = PublicKey::from_secret_key(&secp, &secret_key);
    Ok(serialize_public_key(&public_key, compressed))
}

/// Signs a 32-byte digest deterministically. The result is always low-S.
///
/// # Errors
/// `Error::OutOfRange` if the scalar is zero or not below the curve order.
pub fn sign(digest: &Hash256, private_key: &[u8; 32]) -> Result<EcdsaSignature> {
    let secp = Secp256k1::signing_only();
    let secret_key = secret_key(private_key)?;
    let message = Message::from_digest(digest.0);
    let mut signature = secp.sign_ecdsa(message, &secret_key);
    signature.normalize_s();
    EcdsaSignature::from_compact(&signature.serialize_compact())
}

/// Checks a signature against a digest and a serialized public key.
///
/// High-S signatures are accepted. Returns false for anything malformed.
#[must_use]
pub fn verify(digest: &Hash256, sig: &EcdsaSignature, public_key: &[u8]) -> bool {
    let public_key = match PublicKey::from_slice(public_key) {
        Ok(pk) => pk,
        Err(e) => {
            debug!("Bad public key: {}", e);
            return false;
        }
    };
    let compact = match sig.to_compact() {
        Ok(c) => c,
        Err(e) => {
            debug!("Signature component too large: {}", e);
            return false;
        }
    };
    let mut signature = match Signature::from_compact(&compact) {
        Ok(s) => s,
        Err(e) => {
            debug!("Signature rejected: {}", e);
            return false;
        }
    };
    // libsecp256k1 only verifies low-S
    signature.normalize_s();
    let secp = Secp256k1::verification_only();
    secp.verify_ecdsa(Message::from_digest(digest.0), &signature, &public_key).is_ok()
}

/// Checks a DER-encoded signature. Returns false if the bytes do not parse.
#[must_use]
pub fn verify_der(digest: &Hash256, der: &[u8], public_key: &[u8]) -> bool {
    match EcdsaSignature::decode_der(der) {
        Ok(sig) => verify(digest, &sig, public_key),
        Err(e) => {
            debug!("Undecodable DER signature: {}", e);
            false
        }
    }
}

/// Recovers the public key that produced `sig` over `digest`.
///
/// `rec_id` selects one of the four candidate points: bit 0 is the parity of
/// R's y coordinate and bit 1 says whether R's x coordinate is `r + n`.
/// Returns `None` when that candidate does not exist or yields no valid key.
///
/// # Errors
/// `Error::OutOfRange` if `rec_id > 3` or either component is not below the curve order.
pub fn recover_from_signature(
    rec_id: u8,
    sig: &EcdsaSignature,
    digest: &Hash256,
    compressed: bool,
) -> Result<Option<Vec<u8>>> {
    if rec_id > 3 {
        return Err(Error::OutOfRange(format!("Recovery id {}", rec_id)));
    }
    let n = curve_order();
    if sig.r >= n || sig.s >= n {
        return Err(Error::OutOfRange("Signature component not below curve order".to_string()));
    }
    let x = &sig.r + BigUint::from(rec_id / 2) * &n;
    if x >= field_prime() {
        debug!(rec_id, "Candidate x coordinate beyond field prime");
        return Ok(None);
    }
    let recovery_id = RecoveryId::try_from(i32::from(rec_id))?;
    let signature = match RecoverableSignature::from_compact(&sig.to_compact()?, recovery_id) {
        Ok(s) => s,
        Err(e) => {
            debug!(rec_id, "Unrecoverable signature: {}", e);
            return Ok(None);
        }
    };
    let secp = Secp256k1::verification_only();
    match secp.recover_ecdsa(Message::from_digest(digest.0), &signature) {
        Ok(public_key) => Ok(Some(serialize_public_key(&public_key, compressed))),
        Err(e) => {
            debug!(rec_id, "Recovery failed: {}", e);
            Ok(None)
        }
    }
}

/// Finds the recovery id under which `sig` recovers `public_key`.
///
/// The key's length decides the compression the candidates are compared at.
///
/// # Errors
/// `Error::RecoveryFailed` if no id recovers the key. Range errors from
/// [`recover_from_signature`] are passed through.
pub fn find_recovery_id(sig: &EcdsaSignature, digest: &Hash256, public_key: &[u8]) -> Result<u8> {
    let compressed = public_key.len() == 33;
    for rec_id in 0..4 {
        if let Some(k) = recover_from_signature(rec_id, sig, digest, compressed)? {
            if k == public_key {
                return Ok(rec_id);
            }
        }
    }
    Err(Error::RecoveryFailed("No recovery id matches the public key".to_string()))
}

/// Whether the bytes have the shape of a serialized public key:
/// 33 bytes starting 02 or 03, or 65 bytes starting 04.
#[must_use]
pub fn is_pubkey_canonical(public_key: &[u8]) -> bool {
    match public_key.len() {
        33 => public_key[0] == 0x02 || public_key[0] == 0x03,
        65 => public_key[0] == 0x04,
        _ => false,
    }
}

fn secret_key(private_key: &[u8; 32]) -> Result<SecretKey> {
    SecretKey::from_byte_array(*private_key)
        .map_err(|_| Error::OutOfRange("Private key not in [1, n)".to_string()))
}

fn serialize_public_key(public_key: &PublicKey, compressed: bool) -> Vec<u8> {
    if compressed {
        public_key.serialize().to_vec()
    } else {
        public_key.serialize_uncompressed().to_vec()
    }
}
