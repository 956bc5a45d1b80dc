//! Pay-to-Public-Key-Hash (P2PKH) scripts.
//!
//! The lock script is the standard script code for signing such an input.
use crate::script::op_codes::{OP_CHECKSIG, OP_DUP, OP_EQUALVERIFY, OP_HASH160};
use crate::script::{Script, next_op};
use crate::util::{Error, Hash160, Result};

/// Creates the lock script `DUP HASH160 <hash> EQUALVERIFY CHECKSIG`.
#[must_use]
pub fn create_lock_script(address: &Hash160) -> Script {
    let mut script = Script::new();
    script.append(OP_DUP);
    script.append(OP_HASH160);
    script.append_data(&address.0);
    script.append(OP_EQUALVERIFY);
    script.append(OP_CHECKSIG);
    script
}

/// Creates the unlock script `<sig> <pubkey>`.
#[must_use]
pub fn create_unlock_script(sig: &[u8], public_key: &[u8]) -> Script {
    let mut script = Script::new();
    script.append_data(sig);
    script.append_data(public_key);
    script
}

/// Checks if a script is a P2PKH lock script.
#[must_use]
pub fn check_lock_script(lock_script: &[u8]) -> bool {
    lock_script.len() == 25
        && lock_script[0] == OP_DUP
        && lock_script[1] == OP_HASH160
        && lock_script[2] == 20
        && lock_script[23] == OP_EQUALVERIFY
        && lock_script[24] == OP_CHECKSIG
}

/// Checks if a script is a P2PKH unlock script: a signature push of 9 to 73
/// bytes followed by a 33 or 65 byte public key push.
#[must_use]
pub fn check_unlock_script(unlock_script: &[u8]) -> bool {
    let Some(&sig_len) = unlock_script.first() else {
        return false;
    };
    if !(9..=73).contains(&sig_len) {
        return false;
    }
    let i = next_op(0, unlock_script);
    if i >= unlock_script.len() {
        return false;
    }
    let pk_len = unlock_script[i];
    if pk_len != 33 && pk_len != 65 {
        return false;
    }
    next_op(i, unlock_script) == unlock_script.len() && unlock_script.len() == i + 1 + pk_len as usize
}

/// Extracts the signature (DER plus flag byte) from a P2PKH unlock script.
///
/// # Errors
/// `Error::BadData` if the script is not a P2PKH unlock script.
pub fn extract_sig(unlock_script: &[u8]) -> Result<Vec<u8>> {
    if !check_unlock_script(unlock_script) {
        return Err(Error::BadData("Not P2PKH unlock".to_string()));
    }
    let i = next_op(0, unlock_script);
    Ok(unlock_script[1..i].to_vec())
}

/// Extracts the public key from a P2PKH unlock script.
///
/// # Errors
/// `Error::BadData` if the script is not a P2PKH unlock script.
pub fn extract_pubkey(unlock_script: &[u8]) -> Result<Vec<u8>> {
    if !check_unlock_script(unlock_script) {
        return Err(Error::BadData("Not P2PKH unlock".to_string()));
    }
    let i = next_op(0, unlock_script);
    Ok(unlock_script[i + 1..].to_vec())
}

/// Extracts the public key hash from a P2PKH lock script.
///
/// # Errors
/// `Error::BadData` if the script is not a P2PKH lock script.
pub fn extract_pubkeyhash(lock_script: &[u8]) -> Result<Hash160> {
    if !check_lock_script(lock_script) {
        return Err(Error::BadData("Not P2PKH lock".to_string()));
    }
    let mut hash160 = Hash160([0; 20]);
    hash160.0.copy_from_slice(&lock_script[3..23]);
    Ok(hash160)
}
