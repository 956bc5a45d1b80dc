//! Transaction wire format: out points, inputs, outputs and transactions.
//!
//! These types only carry data and serialize it. The signing code reads
//! them through [`TxView`] and never mutates them.

mod out_point;
mod tx;
mod tx_in;
mod tx_out;

pub use self::out_point::{COINBASE_OUTPOINT_HASH, COINBASE_OUTPOINT_INDEX, OutPoint};
pub use self::tx::{Tx, TxView};
pub use self::tx_in::TxIn;
pub use self::tx_out::TxOut;
