//! Transaction wire format and the read-only view the sighash builders consume.

use crate::messages::{TxIn, TxOut};
use crate::util::{Error, Hash256, Result, Serializable, sha256d, var_int, write_to_vec};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::fmt;
use std::io;
use std::io::{Read, Write};

/// Maximum number of inputs/outputs accepted when reading.
const MAX_INPUTS: u64 = 100_000_000;
const MAX_OUTPUTS: u64 = 100_000_000;
/// Entries reserved up front. Counts come from the input, so anything past
/// this grows as entries actually parse.
const PREALLOC_ENTRIES: u64 = 1024;

/// Bitcoin transaction.
#[derive(Default, PartialEq, Eq, Hash, Clone)]
pub struct Tx {
    /// Transaction version.
    pub version: u32,
    /// Transaction inputs.
    pub inputs: Vec<TxIn>,
    /// Transaction outputs.
    pub outputs: Vec<TxOut>,
    /// The block number or timestamp at which this transaction is unlocked.
    pub lock_time: u32,
}

impl Tx {
    /// Calculates the hash of the transaction (txid).
    #[must_use]
    pub fn hash(&self) -> Hash256 {
        sha256d(&self.to_bytes())
    }

    /// Returns the size of the serialized transaction in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.view().size()
    }

    /// Serializes the transaction into a fresh buffer.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        write_to_vec(self.size(), |b| self.write(b))
    }

    /// Borrows the transaction as an immutable view.
    #[must_use]
    #[inline]
    pub fn view(&self) -> TxView<'_> {
        TxView {
            version: self.version,
            inputs: &self.inputs,
            outputs: &self.outputs,
            lock_time: self.lock_time,
        }
    }
}

impl Serializable<Tx> for Tx {
    fn read(reader: &mut dyn Read) -> Result<Tx> {
        let version = reader.read_u32::<LittleEndian>()?;
        let n_inputs = var_int::read(reader)?;
        if n_inputs > MAX_INPUTS {
            return Err(Error::BadData(format!("Too many inputs: {}", n_inputs)));
        }
        let mut inputs = Vec::with_capacity(n_inputs.min(PREALLOC_ENTRIES) as usize);
        for _ in 0..n_inputs {
            inputs.push(TxIn::read(reader)?);
        }
        let n_outputs = var_int::read(reader)?;
        if n_outputs > MAX_OUTPUTS {
            return Err(Error::BadData(format!("Too many outputs: {}", n_outputs)));
        }
        let mut outputs = Vec::with_capacity(n_outputs.min(PREALLOC_ENTRIES) as usize);
        for _ in 0..n_outputs {
            outputs.push(TxOut::read(reader)?);
        }
        let lock_time = reader.read_u32::<LittleEndian>()?;
        Ok(Tx {
            version,
            inputs,
            outputs,
            lock_time,
        })
    }

    fn write(&self, writer: &mut dyn Write) -> io::Result<()> {
        self.view().write(writer)
    }
}

impl fmt::Debug for Tx {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let inputs_str = format!("[<{} inputs>]", self.inputs.len());
        let outputs_str = format!("[<{} outputs>]", self.outputs.len());
        f.debug_struct("Tx")
            .field("version", &self.version)
            .field("inputs", if self.inputs.len() <= 3 { &self.inputs } else { &inputs_str })
            .field("outputs", if self.outputs.len() <= 3 { &self.outputs } else { &outputs_str })
            .field("lock_time", &self.lock_time)
            .finish()
    }
}

/// Read-only snapshot of a transaction.
///
/// Sighash computation only ever reads through a view. Anything that has to
/// look "modified" is built as a new owned [`Tx`], so several threads can
/// sign different inputs of the same transaction at once.
#[derive(Debug, Clone, Copy)]
pub struct TxView<'a> {
    /// Transaction version.
    pub version: u32,
    /// All inputs, in order.
    pub inputs: &'a [TxIn],
    /// All outputs, in order.
    pub outputs: &'a [TxOut],
    /// Lock time.
    pub lock_time: u32,
}

impl<'a> TxView<'a> {
    /// Creates a view over borrowed parts.
    #[must_use]
    pub fn new(version: u32, inputs: &'a [TxIn], outputs: &'a [TxOut], lock_time: u32) -> Self {
        TxView {
            version,
            inputs,
            outputs,
            lock_time,
        }
    }

    /// Returns the serialized size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        8 + var_int::size(self.inputs.len() as u64)
            + self.inputs.iter().map(TxIn::size).sum::<usize>()
            + var_int::size(self.outputs.len() as u64)
            + self.outputs.iter().map(TxOut::size).sum::<usize>()
    }

    /// Writes the standard wire encoding.
    pub fn write(&self, writer: &mut dyn Write) -> io::Result<()> {
        writer.write_u32::<LittleEndian>(self.version)?;
        var_int::write(self.inputs.len() as u64, writer)?;
        for tx_in in self.inputs {
            tx_in.write(writer)?;
        }
        var_int::write(self.outputs.len() as u64, writer)?;
        for tx_out in self.outputs {
            tx_out.write(writer)?;
        }
        writer.write_u32::<LittleEndian>(self.lock_time)
    }
}

impl<'a> From<&'a Tx> for TxView<'a> {
    fn from(tx: &'a Tx) -> Self {
        tx.view()
    }
}
