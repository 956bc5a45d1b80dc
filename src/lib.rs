#![deny(missing_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

/*! # txsig

Transaction signature hashing, ECDSA signing and verification, and signed-message
key recovery for Bitcoin SV style ledgers.

Covers both sighash schemes: the legacy transaction-copy algorithm and the
BIP143-style witness algorithm used with SIGHASH_FORKID, with optional replay
protection. Signatures are produced low-S and DER encoded, and are checked the
way CHECKSIG checks them.

## Usage
```
use txsig::ecdsa::{public_key, sign, verify};
use txsig::util::sha256d;
let key = [1; 32];
let digest = sha256d(b"payload");
let sig = sign(&digest, &key).unwrap();
assert!(verify(&digest, &sig, &public_key(&key, true).unwrap()));
```

## Logging
Diagnostics are emitted through `tracing`. Install a subscriber to see them.

## Concurrency
Sighash functions borrow the transaction immutably. A `SigHashCache` belongs to
one signing or checking pass, so give each thread its own.
*/

pub mod ecdsa;
pub mod message;
pub mod messages;
pub mod script;
pub mod transaction;
pub mod util;
