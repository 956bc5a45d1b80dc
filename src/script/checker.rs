//! Signature checking for a transaction input.
use crate::ecdsa::{self, is_pubkey_canonical};
use crate::messages::Tx;
use crate::transaction::TransactionSignature;
use crate::transaction::sighash::{SigHashCache, sighash};
use crate::transaction::signature::{has_fork_id, is_canonical_encoding, is_valid_hash_type};
use crate::util::{Error, Result};
use tracing::debug;

/// Lax checking: any DER the parser accepts, any flag byte.
pub const NO_FLAGS: u32 = 0x00;
/// Strict DER, a defined sighash type and a well-formed public key.
pub const VERIFY_STRICTENC: u32 = 1 << 1;
/// Reject signatures whose S is above half the curve order.
pub const VERIFY_LOW_S: u32 = 1 << 3;
/// Require the FORKID bit.
pub const VERIFY_SIGHASH_FORKID: u32 = 1 << 16;
/// Hash FORKID signatures with the replay-protected type word.
pub const VERIFY_REPLAY_PROTECTION: u32 = 1 << 17;

/// Checks signatures for one input of a transaction.
#[derive(Debug)]
pub struct TransactionChecker<'a> {
    /// The spending transaction.
    pub tx: &'a Tx,
    /// Sighash cache for `tx`.
    pub sig_hash_cache: &'a mut SigHashCache,
    /// Input index being checked.
    pub input: usize,
    /// Value of the output being spent.
    pub satoshis: i64,
    /// Verification flags.
    pub flags: u32,
}

impl<'a> TransactionChecker<'a> {
    /// Creates a new transaction checker.
    #[must_use]
    pub fn new(tx: &'a Tx, cache: &'a mut SigHashCache, input: usize, satoshis: i64, flags: u32) -> Self {
        Self {
            tx,
            sig_hash_cache: cache,
            input,
            satoshis,
            flags,
        }
    }

    /// Verifies `sig` (DER plus flag byte) by `pubkey` over this input.
    ///
    /// The flag byte picks the sighash scheme. A signature that is simply
    /// wrong, or a public key that does not decode, gives `Ok(false)`.
    ///
    /// # Errors
    /// `Error::BadEncoding` when the bytes break a rule the flags enforce.
    /// `Error::OutOfRange` if the input index is not in the transaction.
    pub fn check_sig(&mut self, sig: &[u8], pubkey: &[u8], script_code: &[u8]) -> Result<bool> {
        if sig.is_empty() {
            return Ok(false);
        }
        if self.flags & VERIFY_STRICTENC != 0 {
            if !is_canonical_encoding(sig) {
                return Err(Error::BadEncoding("Signature encoding is not canonical".to_string()));
            }
            if !is_valid_hash_type(sig) {
                return Err(Error::BadEncoding("Undefined sighash type".to_string()));
            }
            if !is_pubkey_canonical(pubkey) {
                return Err(Error::BadEncoding("Public key encoding is not canonical".to_string()));
            }
        }
        if self.flags & VERIFY_SIGHASH_FORKID != 0 && !has_fork_id(sig) {
            return Err(Error::BadEncoding("Missing SIGHASH_FORKID".to_string()));
        }

        let signature = match TransactionSignature::from_bytes(sig, false, false) {
            Ok(s) => s,
            Err(e) => {
                debug!("Undecodable signature: {}", e);
                return Ok(false);
            }
        };
        if self.flags & VERIFY_LOW_S != 0 && !signature.sig.is_canonical() {
            return Err(Error::BadEncoding("S-value is not canonical".to_string()));
        }

        let replay_protection = self.flags & VERIFY_REPLAY_PROTECTION != 0;
        let sig_hash = sighash(
            self.tx.view(),
            self.input,
            script_code,
            self.satoshis,
            signature.sighash_flags,
            replay_protection,
            self.sig_hash_cache,
        )?;
        Ok(ecdsa::verify(&sig_hash, &signature.sig, pubkey))
    }
}
