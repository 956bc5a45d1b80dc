//! Transaction signatures: an ECDSA signature plus its trailing sighash flag byte.

use crate::ecdsa::{EcdsaSignature, half_curve_order};
use crate::transaction::sighash::{
    SIGHASH_ALL, SIGHASH_ANYONECANPAY, SIGHASH_FORKID, SigHashFlags, SigHashMode,
};
use crate::util::{Error, Result};

/// Signature as it appears in a spending script: DER followed by one flag byte.
///
/// The flag byte is stored exactly as read, including undefined modes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransactionSignature {
    /// The ECDSA signature.
    pub sig: EcdsaSignature,
    /// Raw sighash flag byte.
    pub sighash_flags: u8,
}

impl TransactionSignature {
    /// Wraps a signature with flags built from a mode and modifiers.
    #[must_use]
    pub fn new(sig: EcdsaSignature, mode: SigHashMode, anyone_can_pay: bool, fork_id: bool) -> Self {
        TransactionSignature {
            sig,
            sighash_flags: SigHashFlags::new(mode, anyone_can_pay, fork_id).0,
        }
    }

    /// Wraps a signature with a raw flag byte.
    #[must_use]
    pub fn from_raw(sig: EcdsaSignature, sighash_flags: u8) -> Self {
        TransactionSignature { sig, sighash_flags }
    }

    /// Signature of the right size for fee estimation, before a key is available.
    #[must_use]
    pub fn dummy() -> Self {
        let half = half_curve_order();
        TransactionSignature {
            sig: EcdsaSignature::new(half.clone(), half),
            sighash_flags: SIGHASH_ALL,
        }
    }

    /// Effective mode. Undefined modes behave as ALL.
    #[must_use]
    pub fn mode(&self) -> SigHashMode {
        SigHashMode::from_flags(self.sighash_flags)
    }

    /// Whether ANYONECANPAY is set.
    #[must_use]
    pub fn anyone_can_pay(&self) -> bool {
        self.sighash_flags & SIGHASH_ANYONECANPAY != 0
    }

    /// Whether FORKID is set.
    #[must_use]
    pub fn uses_fork_id(&self) -> bool {
        self.sighash_flags & SIGHASH_FORKID != 0
    }

    /// Flags as a typed value.
    #[must_use]
    pub fn flags(&self) -> SigHashFlags {
        SigHashFlags(self.sighash_flags)
    }

    /// DER encoding followed by the flag byte.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = self.sig.encode_der();
        bytes.push(self.sighash_flags);
        bytes
    }

    /// Parses DER plus flag byte.
    ///
    /// # Errors
    /// `Error::BadEncoding` if the bytes do not parse, or break a strictness
    /// rule that was asked for.
    pub fn from_bytes(bytes: &[u8], require_canonical_encoding: bool, require_canonical_s: bool) -> Result<Self> {
        if require_canonical_encoding && !is_canonical_encoding(bytes) {
            return Err(Error::BadEncoding("Signature encoding is not canonical".to_string()));
        }
        let Some((&sighash_flags, der)) = bytes.split_last() else {
            return Err(Error::BadEncoding("Empty signature".to_string()));
        };
        let sig = EcdsaSignature::decode_der(der)?;
        if require_canonical_s && !sig.is_canonical() {
            return Err(Error::BadEncoding("S-value is not canonical".to_string()));
        }
        Ok(TransactionSignature { sig, sighash_flags })
    }
}

/// Strict DER shape check over signature bytes that include the flag byte.
///
/// Total length 9 to 73, a `30` sequence whose length covers everything but
/// the flag byte, and two positive minimally encoded integers.
#[must_use]
pub fn is_canonical_encoding(sig: &[u8]) -> bool {
    let len = sig.len();
    if !(9..=73).contains(&len) {
        return false;
    }
    if sig[0] != 0x30 || sig[1] as usize != len - 3 {
        return false;
    }
    let len_r = sig[3] as usize;
    if 5 + len_r >= len {
        return false;
    }
    let len_s = sig[5 + len_r] as usize;
    if len_r + len_s + 7 != len {
        return false;
    }

    // R
    if sig[2] != 0x02 || len_r == 0 || sig[4] & 0x80 != 0 {
        return false;
    }
    if len_r > 1 && sig[4] == 0 && sig[5] & 0x80 == 0 {
        return false;
    }

    // S
    if sig[len_r + 4] != 0x02 || len_s == 0 || sig[len_r + 6] & 0x80 != 0 {
        return false;
    }
    if len_s > 1 && sig[len_r + 6] == 0 && sig[len_r + 7] & 0x80 == 0 {
        return false;
    }
    true
}

/// Whether the trailing flag byte has FORKID set.
#[must_use]
pub fn has_fork_id(sig: &[u8]) -> bool {
    sig.last().is_some_and(|flags| flags & SIGHASH_FORKID != 0)
}

/// Whether the trailing flag byte names ALL, NONE or SINGLE once
/// ANYONECANPAY and FORKID are masked off.
#[must_use]
pub fn is_valid_hash_type(sig: &[u8]) -> bool {
    sig.last().is_some_and(|flags| SigHashFlags(*flags).is_defined())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecdsa::{curve_order, sign};
    use crate::transaction::sighash::{SIGHASH_NONE, SIGHASH_SINGLE};
    use crate::util::sha256d;
    use hex_literal::hex;
    use num_bigint::BigUint;
    use pretty_assertions::assert_eq;

    fn real_signature() -> TransactionSignature {
        let sig = sign(&sha256d(b"tx"), &[3; 32]).unwrap();
        TransactionSignature::new(sig, SigHashMode::All, false, true)
    }

    #[test]
    fn to_bytes() {
        let ts = real_signature();
        let bytes = ts.to_bytes();
        assert_eq!(*bytes.last().unwrap(), SIGHASH_ALL | SIGHASH_FORKID);
        assert!(is_canonical_encoding(&bytes));
        assert!(has_fork_id(&bytes));
        assert!(is_valid_hash_type(&bytes));
        assert_eq!(TransactionSignature::from_bytes(&bytes, true, true).unwrap(), ts);
    }

    #[test]
    fn every_flag_byte_round_trips() {
        let sig = real_signature().sig;
        for flags in 0..=255u8 {
            let ts = TransactionSignature::from_raw(sig.clone(), flags);
            let parsed = TransactionSignature::from_bytes(&ts.to_bytes(), false, false).unwrap();
            assert_eq!(parsed, ts);
            assert_eq!(parsed.sighash_flags, flags);
        }
    }

    #[test]
    fn modes() {
        let sig = real_signature().sig;
        let ts = TransactionSignature::new(sig.clone(), SigHashMode::Single, true, false);
        assert_eq!(ts.sighash_flags, SIGHASH_SINGLE | SIGHASH_ANYONECANPAY);
        assert_eq!(ts.mode(), SigHashMode::Single);
        assert!(ts.anyone_can_pay());
        assert!(!ts.uses_fork_id());
        assert_eq!(TransactionSignature::from_raw(sig.clone(), SIGHASH_NONE).mode(), SigHashMode::None);
        assert_eq!(TransactionSignature::from_raw(sig.clone(), 0x00).mode(), SigHashMode::All);
        assert_eq!(TransactionSignature::from_raw(sig, 0x1e).mode(), SigHashMode::All);
    }

    #[test]
    fn dummy() {
        let dummy = TransactionSignature::dummy();
        assert_eq!(dummy.to_bytes().len(), 71);
        assert!(is_canonical_encoding(&dummy.to_bytes()));
        assert_eq!(dummy.mode(), SigHashMode::All);
    }

    #[test]
    fn canonical_encoding_accepts() {
        assert!(is_canonical_encoding(&hex!("300602010102010101")));
        // Zero padding that clears the sign bit is required, not redundant
        assert!(is_canonical_encoding(&hex!("30070202008002010101")));
        assert!(is_canonical_encoding(&hex!("30070201010202008001")));
    }

    #[test]
    fn canonical_encoding_rejects() {
        let good = real_signature().to_bytes();

        let mut v = good.clone();
        v[0] = 0x31;
        assert!(!is_canonical_encoding(&v));

        let mut v = good.clone();
        v[1] += 1;
        assert!(!is_canonical_encoding(&v));

        let mut v = good.clone();
        v.push(0);
        assert!(!is_canonical_encoding(&v));

        assert!(!is_canonical_encoding(&good[..8]));
        assert!(!is_canonical_encoding(&[0x30; 74]));
        assert!(!is_canonical_encoding(&[]));

        // High bit set on R, then on S
        assert!(!is_canonical_encoding(&hex!("300602018002010101")));
        assert!(!is_canonical_encoding(&hex!("300602010102018101")));
        // Redundant zero padding on R, then on S
        assert!(!is_canonical_encoding(&hex!("30070202000102010101")));
        assert!(!is_canonical_encoding(&hex!("30070201010202000101")));
        // Wrong integer tags
        assert!(!is_canonical_encoding(&hex!("300603010102010101")));
        assert!(!is_canonical_encoding(&hex!("300602010103010101")));
        // Zero-length S
        assert!(!is_canonical_encoding(&hex!("300602020101020001")));
    }

    #[test]
    fn from_bytes_strictness() {
        let high_s = EcdsaSignature::new(BigUint::from(1u8), curve_order() - 1u8);
        let bytes = TransactionSignature::from_raw(high_s.clone(), SIGHASH_ALL).to_bytes();
        assert_eq!(
            TransactionSignature::from_bytes(&bytes, true, true).unwrap_err().to_string(),
            "Bad encoding: S-value is not canonical"
        );
        assert_eq!(TransactionSignature::from_bytes(&bytes, true, false).unwrap().sig, high_s);

        let padded = hex!("30070202000102010101");
        assert_eq!(
            TransactionSignature::from_bytes(&padded, true, false).unwrap_err().to_string(),
            "Bad encoding: Signature encoding is not canonical"
        );
        let lax = TransactionSignature::from_bytes(&padded, false, false).unwrap();
        assert_eq!(lax.sig.r, BigUint::from(1u8));

        assert!(matches!(TransactionSignature::from_bytes(&[], false, false), Err(Error::BadEncoding(_))));
        assert!(matches!(TransactionSignature::from_bytes(&[0x30, 0x01], false, false), Err(Error::BadEncoding(_))));
    }

    #[test]
    fn flag_inspection() {
        assert!(!has_fork_id(&[]));
        assert!(has_fork_id(&[0x30, 0x41]));
        assert!(!has_fork_id(&[0x30, 0x81]));
        assert!(!is_valid_hash_type(&[]));
        assert!(is_valid_hash_type(&[0xc3]));
        assert!(!is_valid_hash_type(&[0x00]));
        assert!(!is_valid_hash_type(&[0x04]));
        assert!(!is_valid_hash_type(&[0xa1]));
    }
}
