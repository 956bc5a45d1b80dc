//! Transaction signing.
//!
//! Computes the sighash for an input under either scheme and signs it.
//!
//! # Examples
//!
//! Sign a P2PKH input:
//! ```
//! use txsig::ecdsa::public_key;
//! use txsig::messages::{Tx, TxIn};
//! use txsig::transaction::p2pkh::{create_lock_script, create_unlock_script};
//! use txsig::transaction::sighash::{SigHashCache, SigHashMode};
//! use txsig::transaction::calculate_witness_signature;
//! use txsig::util::hash160;
//!
//! let mut tx = Tx {
//!     inputs: vec![TxIn { ..Default::default() }],
//!     ..Default::default()
//! };
//! let private_key = [1; 32];
//! let public_key = public_key(&private_key, true).unwrap();
//! let lock_script = create_lock_script(&hash160(&public_key));
//! let mut cache = SigHashCache::new();
//! let sig = calculate_witness_signature(
//!     tx.view(), 0, &private_key, &lock_script.0, 1000, SigHashMode::All, false, false, &mut cache,
//! ).unwrap();
//! tx.inputs[0].unlock_script = create_unlock_script(&sig.to_bytes(), &public_key);
//! ```
pub mod p2pkh;
pub mod sighash;
pub mod signature;

pub use self::signature::TransactionSignature;

use crate::ecdsa;
use crate::messages::TxView;
use crate::transaction::sighash::{SigHashCache, SigHashFlags, SigHashMode, legacy_sighash, witness_sighash_with_flags};
use crate::util::{Hash256, Result};

/// Signs a sighash and appends the flag byte, ready to push in an unlock script.
///
/// # Errors
/// `Error::OutOfRange` for an invalid private key.
pub fn generate_signature(private_key: &[u8; 32], sighash: &Hash256, sighash_type: u8) -> Result<Vec<u8>> {
    let sig = ecdsa::sign(sighash, private_key)?;
    Ok(TransactionSignature::from_raw(sig, sighash_type).to_bytes())
}

/// Signs input `n_input` under the legacy scheme.
///
/// # Errors
/// `Error::OutOfRange` for a bad input index or private key.
pub fn calculate_signature(
    view: TxView,
    n_input: usize,
    private_key: &[u8; 32],
    script_code: &[u8],
    mode: SigHashMode,
    anyone_can_pay: bool,
) -> Result<TransactionSignature> {
    let flags = SigHashFlags::new(mode, anyone_can_pay, false);
    let hash = legacy_sighash(view, n_input, script_code, flags)?.to_hash();
    let sig = ecdsa::sign(&hash, private_key)?;
    Ok(TransactionSignature::from_raw(sig, flags.0))
}

/// Signs input `n_input` under the witness (FORKID) scheme.
///
/// # Errors
/// `Error::OutOfRange` for a bad input index or private key.
#[allow(clippy::too_many_arguments)]
pub fn calculate_witness_signature(
    view: TxView,
    n_input: usize,
    private_key: &[u8; 32],
    script_code: &[u8],
    satoshis: i64,
    mode: SigHashMode,
    anyone_can_pay: bool,
    replay_protection: bool,
    cache: &mut SigHashCache,
) -> Result<TransactionSignature> {
    let flags = SigHashFlags::new(mode, anyone_can_pay, true);
    let hash = witness_sighash_with_flags(view, n_input, script_code, satoshis, flags, replay_protection, cache)?;
    let sig = ecdsa::sign(&hash, private_key)?;
    Ok(TransactionSignature::from_raw(sig, flags.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecdsa::public_key;
    use crate::messages::{OutPoint, Tx, TxIn, TxOut};
    use crate::script::Script;
    use crate::transaction::sighash::{SIGHASH_ALL, SIGHASH_FORKID, sighash};
    use crate::util::{Error, Serializable, hash160};
    use pretty_assertions::assert_eq;
    use std::io::Cursor;
    use std::thread;

    const SPEND_HEX: &str = "0100000001991b49337cdc0afc8a6decade79898c223f78b6661c2dcc004f6a5ee0646df5e000000006b\
        483045022100bee70efa51206a74996774a210f6f9d119f1beb749e1f0eb5da369c00c8802a902202cf1f8724130c9a9c97a17\
        21218f98228efa51937616b86e3c7cdee0c6fcca704121034f355bdcb7cc0af728ef3cceb9615d90684bb5b2ca5f859ab0f0b7\
        04075871aaffffffff0168bf0000000000001976a914fc7250a211deddc70ee5a2738de5f07817351cef88ac00000000";

    fn multi_input_tx(private_key: &[u8; 32]) -> (Tx, Script) {
        let lock_script = p2pkh::create_lock_script(&hash160(&public_key(private_key, true).unwrap()));
        let inputs = (0..4u8)
            .map(|i| TxIn {
                prev_output: OutPoint {
                    hash: Hash256([i; 32]),
                    index: i as u32,
                },
                unlock_script: Script::new(),
                sequence: 0xffffffff - i as u32,
            })
            .collect();
        let tx = Tx {
            version: 1,
            inputs,
            outputs: vec![TxOut {
                satoshis: 1234,
                lock_script: lock_script.clone(),
            }],
            lock_time: 0,
        };
        (tx, lock_script)
    }

    #[test]
    fn reproduces_known_spend() -> Result<()> {
        let spend = Tx::read(&mut Cursor::new(hex::decode(SPEND_HEX)?))?;
        let mut unsigned = spend.clone();
        unsigned.inputs[0].unlock_script = Script::new();
        let private_key = [0x11; 32];
        let lock_script = &spend.outputs[0].lock_script.0;
        let mut cache = SigHashCache::new();
        let sig = calculate_witness_signature(
            unsigned.view(),
            0,
            &private_key,
            lock_script,
            50000,
            SigHashMode::All,
            false,
            false,
            &mut cache,
        )?;
        let pubkey = public_key(&private_key, true)?;
        assert_eq!(p2pkh::create_unlock_script(&sig.to_bytes(), &pubkey), spend.inputs[0].unlock_script);
        Ok(())
    }

    #[test]
    fn generate_signature_appends_flags() -> Result<()> {
        let private_key = [5; 32];
        let (tx, lock_script) = multi_input_tx(&private_key);
        let mut cache = SigHashCache::new();
        let flags = SIGHASH_ALL | SIGHASH_FORKID;
        let h = sighash(tx.view(), 1, &lock_script.0, 1000, flags, false, &mut cache)?;
        let bytes = generate_signature(&private_key, &h, flags)?;
        assert_eq!(*bytes.last().unwrap(), flags);
        let parsed = TransactionSignature::from_bytes(&bytes, true, true)?;
        assert!(ecdsa::verify(&h, &parsed.sig, &public_key(&private_key, true)?));
        assert!(matches!(generate_signature(&[0; 32], &h, flags), Err(Error::OutOfRange(_))));
        Ok(())
    }

    #[test]
    fn legacy_signature() -> Result<()> {
        let private_key = [6; 32];
        let (tx, lock_script) = multi_input_tx(&private_key);
        let sig = calculate_signature(tx.view(), 2, &private_key, &lock_script.0, SigHashMode::None, true)?;
        assert_eq!(sig.sighash_flags, 0x82);
        let h = legacy_sighash(tx.view(), 2, &lock_script.0, sig.flags())?.to_hash();
        assert!(ecdsa::verify(&h, &sig.sig, &public_key(&private_key, true)?));
        assert!(calculate_signature(tx.view(), 4, &private_key, &lock_script.0, SigHashMode::All, false).is_err());
        Ok(())
    }

    #[test]
    fn concurrent_signing_matches_sequential() {
        let private_key = [7; 32];
        let (tx, lock_script) = multi_input_tx(&private_key);
        let before = tx.clone();
        let sign_input = |n: usize| {
            let mut cache = SigHashCache::new();
            let witness = calculate_witness_signature(
                tx.view(),
                n,
                &private_key,
                &lock_script.0,
                1000 + n as i64,
                SigHashMode::All,
                false,
                false,
                &mut cache,
            )
            .unwrap();
            let legacy = calculate_signature(tx.view(), n, &private_key, &lock_script.0, SigHashMode::Single, false)
                .unwrap();
            (witness, legacy)
        };
        let sequential: Vec<_> = (0..tx.inputs.len()).map(sign_input).collect();
        let concurrent: Vec<_> = thread::scope(|s| {
            let handles: Vec<_> = (0..tx.inputs.len()).map(|n| s.spawn(move || sign_input(n))).collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert_eq!(concurrent, sequential);
        assert_eq!(tx, before);
    }
}
