//! Transaction input.
use crate::messages::out_point::OutPoint;
use crate::script::Script;
use crate::util::{Error, Result, Serializable, var_int};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io;
use std::io::{Read, Write};

/// Maximum unlock script length accepted when reading.
const MAX_UNLOCK_SCRIPT_LEN: usize = 10_000;

/// Transaction input.
#[derive(Debug, Default, PartialEq, Eq, Hash, Clone)]
pub struct TxIn {
    /// The previous output transaction reference.
    pub prev_output: OutPoint,
    /// Script satisfying the previous output's lock script.
    pub unlock_script: Script,
    /// Sequence number, used for replacement and relative locktime.
    pub sequence: u32,
}

impl TxIn {
    /// Returns the size of the transaction input in bytes.
    #[must_use]
    #[inline]
    pub fn size(&self) -> usize {
        OutPoint::SIZE + var_int::size(self.unlock_script.0.len() as u64) + self.unlock_script.0.len() + 4
    }
}

impl Serializable<TxIn> for TxIn {
    fn read(reader: &mut dyn Read) -> Result<TxIn> {
        let prev_output = OutPoint::read(reader)?;
        let script_len = var_int::read(reader)? as usize;
        if script_len > MAX_UNLOCK_SCRIPT_LEN {
            return Err(Error::BadData(format!("Unlock script too long: {}", script_len)));
        }
        let mut unlock_script = vec![0; script_len];
        reader.read_exact(&mut unlock_script)?;
        let sequence = reader.read_u32::<LittleEndian>()?;
        Ok(TxIn {
            prev_output,
            unlock_script: Script(unlock_script),
            sequence,
        })
    }

    fn write(&self, writer: &mut dyn Write) -> io::Result<()> {
        self.prev_output.write(writer)?;
        var_int::write(self.unlock_script.0.len() as u64, writer)?;
        writer.write_all(&self.unlock_script.0)?;
        writer.write_u32::<LittleEndian>(self.sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::Hash256;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    #[test]
    fn write_read() {
        let mut v = Vec::new();
        let t = TxIn {
            prev_output: OutPoint {
                hash: Hash256([6; 32]),
                index: 8,
            },
            unlock_script: Script(vec![255; 254]),
            sequence: 100,
        };
        t.write(&mut v).unwrap();
        assert_eq!(v.len(), t.size());
        assert_eq!(TxIn::read(&mut Cursor::new(&v)).unwrap(), t);
    }

    #[test]
    fn too_long_unlock_script() {
        let mut v = vec![0; OutPoint::SIZE];
        var_int::write(MAX_UNLOCK_SCRIPT_LEN as u64 + 1, &mut v).unwrap();
        assert_eq!(
            TxIn::read(&mut Cursor::new(&v)).unwrap_err().to_string(),
            format!("Bad data: Unlock script too long: {}", MAX_UNLOCK_SCRIPT_LEN + 1)
        );
    }
}
