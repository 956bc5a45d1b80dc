//! Transaction output.

use crate::script::Script;
use crate::util::{Error, Result, Serializable, var_int};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io;
use std::io::{Read, Write};

/// Maximum lock script length accepted when reading.
const MAX_LOCK_SCRIPT_LEN: usize = 10_000;

/// Transaction output.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct TxOut {
    /// Number of satoshis to spend. Signed, since the legacy sighash
    /// blanks outputs with -1.
    pub satoshis: i64,
    /// Public key script to claim the output.
    pub lock_script: Script,
}

impl TxOut {
    /// Returns the size of the transaction output in bytes.
    #[must_use]
    #[inline]
    pub fn size(&self) -> usize {
        8 + var_int::size(self.lock_script.0.len() as u64) + self.lock_script.0.len()
    }
}

impl Serializable<TxOut> for TxOut {
    fn read(reader: &mut dyn Read) -> Result<TxOut> {
        let satoshis = reader.read_i64::<LittleEndian>()?;
        let script_len = var_int::read(reader)? as usize;
        if script_len > MAX_LOCK_SCRIPT_LEN {
            return Err(Error::BadData(format!("Lock script too long: {}", script_len)));
        }
        let mut lock_script = vec![0; script_len];
        reader.read_exact(&mut lock_script)?;
        Ok(TxOut {
            satoshis,
            lock_script: Script(lock_script),
        })
    }

    fn write(&self, writer: &mut dyn Write) -> io::Result<()> {
        writer.write_i64::<LittleEndian>(self.satoshis)?;
        var_int::write(self.lock_script.0.len() as u64, writer)?;
        writer.write_all(&self.lock_script.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    #[test]
    fn write_read() {
        let mut v = Vec::new();
        let t = TxOut {
            satoshis: 4400044000,
            lock_script: Script(vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 100, 99, 98, 97, 96]),
        };
        t.write(&mut v).unwrap();
        assert_eq!(v.len(), t.size());
        assert_eq!(TxOut::read(&mut Cursor::new(&v)).unwrap(), t);
    }

    #[test]
    fn blanked_output() {
        let mut v = Vec::new();
        let t = TxOut {
            satoshis: -1,
            lock_script: Script(vec![]),
        };
        t.write(&mut v).unwrap();
        assert_eq!(hex::encode(&v), "ffffffffffffffff00");
    }

    #[test]
    fn read_invalid() {
        let b = hex::decode("00e1f50500000000fe11270000").unwrap();
        let result = TxOut::read(&mut Cursor::new(&b));
        assert_eq!(result.unwrap_err().to_string(), "Bad data: Lock script too long: 10001");
    }
}
