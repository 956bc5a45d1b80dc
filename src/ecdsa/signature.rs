//! ECDSA (r, s) pair with DER and compact encodings.

use crate::ecdsa::{curve_order, half_curve_order};
use crate::util::{Error, Result};
use num_bigint::BigUint;
use num_traits::Zero;
use secp256k1::ecdsa::Signature;

/// ECDSA signature over secp256k1.
///
/// Values are not range checked on construction. Decoding accepts whatever
/// the bytes say, and verification rejects values outside `[1, n)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EcdsaSignature {
    /// R component.
    pub r: BigUint,
    /// S component.
    pub s: BigUint,
}

impl EcdsaSignature {
    /// Creates a signature from its components.
    #[must_use]
    pub fn new(r: BigUint, s: BigUint) -> EcdsaSignature {
        EcdsaSignature { r, s }
    }

    /// Whether S is in the lower half of the curve order.
    #[must_use]
    pub fn is_canonical(&self) -> bool {
        self.s <= half_curve_order()
    }

    /// Returns the low-S form of this signature.
    #[must_use]
    pub fn to_canonical(self) -> EcdsaSignature {
        if self.is_canonical() {
            return self;
        }
        let s = curve_order() - &self.s;
        EcdsaSignature { r: self.r, s }
    }

    /// DER encoding: `30 len 02 lenR R 02 lenS S`.
    ///
    /// Components below the curve order go through libsecp256k1's encoder.
    /// Anything larger only comes from hand-built values and is encoded the
    /// same minimal way.
    #[must_use]
    pub fn encode_der(&self) -> Vec<u8> {
        match self.to_compact().ok().and_then(|c| Signature::from_compact(&c).ok()) {
            Some(sig) => sig.serialize_der().to_vec(),
            None => encode_der_unchecked(&self.r, &self.s),
        }
    }

    /// Parses a DER signature with libsecp256k1's lax parser, the one
    /// consensus applies when strict encoding is off.
    ///
    /// Long-form lengths, redundant zero padding, a wrong sequence length and
    /// trailing bytes are all tolerated. An empty integer reads as zero, and a
    /// component that overflows the curve order zeroes the whole signature.
    /// Strict shape checks live in
    /// [`is_canonical_encoding`](crate::transaction::signature::is_canonical_encoding).
    ///
    /// # Errors
    /// `Error::BadEncoding` if the bytes are not a sequence of two integers.
    pub fn decode_der(bytes: &[u8]) -> Result<EcdsaSignature> {
        let sig = Signature::from_der_lax(bytes)
            .map_err(|e| Error::BadEncoding(format!("Undecodable DER signature: {}", e)))?;
        EcdsaSignature::from_compact(&sig.serialize_compact())
    }

    /// 64-byte `r ‖ s` form, each big-endian and zero padded.
    ///
    /// # Errors
    /// `Error::OutOfRange` if either component does not fit in 32 bytes.
    pub fn to_compact(&self) -> Result<[u8; 64]> {
        let mut out = [0; 64];
        write_padded(&self.r, &mut out[..32])?;
        write_padded(&self.s, &mut out[32..])?;
        Ok(out)
    }

    /// Reads the 64-byte `r ‖ s` form.
    ///
    /// # Errors
    /// `Error::BadEncoding` if `bytes` is not 64 bytes long.
    pub fn from_compact(bytes: &[u8]) -> Result<EcdsaSignature> {
        if bytes.len() != 64 {
            return Err(Error::BadEncoding(format!("Compact signature length {}", bytes.len())));
        }
        Ok(EcdsaSignature {
            r: BigUint::from_bytes_be(&bytes[..32]),
            s: BigUint::from_bytes_be(&bytes[32..]),
        })
    }
}

fn encode_der_unchecked(r: &BigUint, s: &BigUint) -> Vec<u8> {
    let r = der_integer(r);
    let s = der_integer(s);
    let mut body = Vec::with_capacity(r.len() + s.len() + 8);
    for int in [r, s] {
        body.push(0x02);
        push_der_len(&mut body, int.len());
        body.extend_from_slice(&int);
    }
    let mut der = Vec::with_capacity(body.len() + 4);
    der.push(0x30);
    push_der_len(&mut der, body.len());
    der.extend_from_slice(&body);
    der
}

fn push_der_len(v: &mut Vec<u8>, len: usize) {
    if len < 0x80 {
        v.push(len as u8);
    } else if len <= 0xff {
        v.push(0x81);
        v.push(len as u8);
    } else {
        v.push(0x82);
        v.extend_from_slice(&(len as u16).to_be_bytes());
    }
}

fn der_integer(n: &BigUint) -> Vec<u8> {
    let mut bytes = if n.is_zero() { vec![0] } else { n.to_bytes_be() };
    if bytes[0] & 0x80 != 0 {
        bytes.insert(0, 0);
    }
    bytes
}

fn write_padded(n: &BigUint, out: &mut [u8]) -> Result<()> {
    let bytes = n.to_bytes_be();
    if bytes.len() > out.len() {
        return Err(Error::OutOfRange(format!("Component is {} bytes", bytes.len())));
    }
    let start = out.len() - bytes.len();
    if !n.is_zero() {
        out[start..].copy_from_slice(&bytes);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use pretty_assertions::assert_eq;

    fn sample() -> EcdsaSignature {
        EcdsaSignature::new(
            BigUint::from_bytes_be(&hex!("934b1ea10a4b3c1757e2b0c017d0b6143ce3c9a7e6a4a49860d7a6ab210ee3d8")),
            BigUint::from_bytes_be(&hex!("2442ce9d2b916064108014783e923ec36b49743e2ffa1c4496f01a512aafd9e5")),
        )
    }

    #[test]
    fn der() {
        let der = sample().encode_der();
        assert_eq!(
            hex::encode(&der),
            "3045022100934b1ea10a4b3c1757e2b0c017d0b6143ce3c9a7e6a4a49860d7a6ab210ee3d8\
             02202442ce9d2b916064108014783e923ec36b49743e2ffa1c4496f01a512aafd9e5"
        );
        assert_eq!(EcdsaSignature::decode_der(&der).unwrap(), sample());
    }

    #[test]
    fn der_small_values() {
        let sig = EcdsaSignature::new(BigUint::from(0u8), BigUint::from(0x80u8));
        assert_eq!(sig.encode_der(), vec![0x30, 0x07, 0x02, 0x01, 0x00, 0x02, 0x02, 0x00, 0x80]);
    }

    #[test]
    fn der_out_of_range() {
        // r = n cannot go through libsecp256k1
        let sig = EcdsaSignature::new(curve_order(), BigUint::from(1u8));
        let der = sig.encode_der();
        assert_eq!(hex::encode(&der), format!("3026022100{:x}020101", curve_order()));
        // Lax parsing zeroes an overflowing signature
        let zero = EcdsaSignature::new(BigUint::zero(), BigUint::zero());
        assert_eq!(EcdsaSignature::decode_der(&der).unwrap(), zero);

        let huge = EcdsaSignature::new(BigUint::from_bytes_be(&[0x7f; 200]), BigUint::from(1u8));
        let der = huge.encode_der();
        assert_eq!(&der[..6], &[0x30, 0x81, 0xce, 0x02, 0x81, 0xc8]);
        assert_eq!(der.len(), 3 + 0xce);
    }

    #[test]
    fn decode_der_lax() {
        // Padded R, long-form sequence length, trailing garbage
        let der = hex!("3081080203000001020105ff");
        let sig = EcdsaSignature::decode_der(&der).unwrap();
        assert_eq!(sig.r, BigUint::from(1u8));
        assert_eq!(sig.s, BigUint::from(5u8));

        // Sequence length is ignored
        let sig = EcdsaSignature::decode_der(&hex!("3008020101020102")).unwrap();
        assert_eq!(sig, EcdsaSignature::new(BigUint::from(1u8), BigUint::from(2u8)));

        // Empty R reads as zero
        let sig = EcdsaSignature::decode_der(&hex!("30050200020103")).unwrap();
        assert_eq!(sig, EcdsaSignature::new(BigUint::zero(), BigUint::from(3u8)));
    }

    #[test]
    fn decode_der_rejects() {
        assert!(matches!(EcdsaSignature::decode_der(&[]), Err(Error::BadEncoding(_))));
        assert!(EcdsaSignature::decode_der(&hex!("3106020101020101")).is_err());
        assert!(EcdsaSignature::decode_der(&hex!("300602010103010101")).is_err());
        assert!(EcdsaSignature::decode_der(&hex!("3006020101")).is_err());
    }

    #[test]
    fn canonical() {
        let sig = sample();
        assert!(sig.is_canonical());
        let high = EcdsaSignature::new(sig.r.clone(), curve_order() - &sig.s);
        assert!(!high.is_canonical());
        assert_eq!(high.to_canonical(), sig);
        let half = EcdsaSignature::new(BigUint::from(1u8), half_curve_order());
        assert!(half.is_canonical());
    }

    #[test]
    fn compact() {
        let sig = EcdsaSignature::new(BigUint::from(1u8), BigUint::from(2u8));
        let c = sig.to_compact().unwrap();
        assert_eq!(c[31], 1);
        assert_eq!(c[63], 2);
        assert_eq!(EcdsaSignature::from_compact(&c).unwrap(), sig);
        assert!(EcdsaSignature::from_compact(&c[1..]).is_err());
        let big = EcdsaSignature::new(BigUint::from_bytes_be(&[1; 33]), BigUint::from(2u8));
        assert!(matches!(big.to_compact(), Err(Error::OutOfRange(_))));
    }
}
