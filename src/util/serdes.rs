//! Binary serialization/deserialization trait for wire objects.
use crate::util::Result;
use std::io;
use std::io::{Read, Write};

/// An object that may be serialized and deserialized.
pub trait Serializable<T> {
    /// Reads the object from serialized form.
    ///
    /// # Errors
    /// Propagates IO errors or invalid data.
    fn read(reader: &mut dyn Read) -> Result<T>
    where
        Self: Sized;

    /// Writes the object to serialized form.
    ///
    /// # Errors
    /// IO errors.
    fn write(&self, writer: &mut dyn Write) -> io::Result<()>;
}

/// Runs `write` against a fresh buffer of the given capacity.
///
/// `io::Write` for `Vec<u8>` only fails when allocation fails, and that aborts first.
pub(crate) fn write_to_vec(capacity: usize, write: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> Vec<u8> {
    let mut v = Vec::with_capacity(capacity);
    write(&mut v).expect("Vec write");
    v
}
