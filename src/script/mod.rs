//! Script building and the opcode-walking helpers the sighash rules need.
//!
//! Full script evaluation is out of scope. What lives here is the byte-level
//! view of a script: appending pushes, stepping from one opcode to the next,
//! and stripping an opcode without touching push payloads.

use crate::script::op_codes::*;
use std::fmt;

mod checker;
pub mod op_codes;

pub use self::checker::{
    NO_FLAGS, TransactionChecker, VERIFY_LOW_S, VERIFY_REPLAY_PROTECTION, VERIFY_SIGHASH_FORKID,
    VERIFY_STRICTENC,
};

/// Transaction script.
#[derive(Default, Clone, PartialEq, Eq, Hash)]
pub struct Script(pub Vec<u8>);

impl Script {
    /// Creates a new empty script.
    #[must_use]
    pub fn new() -> Script {
        Script(vec![])
    }

    /// Appends a single opcode or data byte.
    pub fn append(&mut self, byte: u8) {
        self.0.push(byte);
    }

    /// Appends a slice of data verbatim.
    pub fn append_slice(&mut self, slice: &[u8]) {
        self.0.extend_from_slice(slice);
    }

    /// Appends the opcodes and provided data that push it onto the stack,
    /// using the shortest push form for its length.
    pub fn append_data(&mut self, data: &[u8]) {
        let len = data.len();
        match len {
            0 => self.0.push(OP_0),
            1..=75 => self.0.push(len as u8),
            76..=255 => {
                self.0.push(OP_PUSHDATA1);
                self.0.push(len as u8);
            }
            256..=65535 => {
                self.0.push(OP_PUSHDATA2);
                self.0.extend_from_slice(&(len as u16).to_le_bytes());
            }
            _ => {
                self.0.push(OP_PUSHDATA4);
                self.0.extend_from_slice(&(len as u32).to_le_bytes());
            }
        }
        self.0.extend_from_slice(data);
    }

    /// Returns the script bytes.
    #[must_use]
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Script {
    fn from(bytes: Vec<u8>) -> Self {
        Script(bytes)
    }
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let script = &self.0;
        let mut ret = String::new();
        let mut i = 0;
        while i < script.len() {
            if !ret.is_empty() {
                ret.push(' ');
            }
            let next = next_op(i, script);
            match script[i] {
                OP_0 => ret.push_str("OP_0"),
                1..=OP_PUSHDATA4 => {
                    let start = match script[i] {
                        OP_PUSHDATA1 => i + 2,
                        OP_PUSHDATA2 => i + 3,
                        OP_PUSHDATA4 => i + 5,
                        _ => i + 1,
                    };
                    let start = start.min(script.len());
                    ret.push_str(&format!("OP_PUSH+{} {}", next - start, hex::encode(&script[start..next])));
                }
                OP_1 => ret.push_str("OP_1"),
                OP_DUP => ret.push_str("OP_DUP"),
                OP_HASH160 => ret.push_str("OP_HASH160"),
                OP_EQUAL => ret.push_str("OP_EQUAL"),
                OP_EQUALVERIFY => ret.push_str("OP_EQUALVERIFY"),
                OP_CODESEPARATOR => ret.push_str("OP_CODESEPARATOR"),
                OP_CHECKSIG => ret.push_str("OP_CHECKSIG"),
                op => ret.push_str(&format!("{:#04x}", op)),
            }
            i = next;
        }
        f.write_str(&ret)
    }
}

/// Gets the index of the next operation in the script, or the script length
/// if at or past the end. Truncated pushes run to the end of the script.
#[must_use]
pub fn next_op(i: usize, script: &[u8]) -> usize {
    if i >= script.len() {
        return script.len();
    }
    let next = match script[i] {
        len @ 1..=75 => i + 1 + len as usize,
        OP_PUSHDATA1 => {
            if i + 2 > script.len() {
                return script.len();
            }
            i + 2 + script[i + 1] as usize
        }
        OP_PUSHDATA2 => {
            if i + 3 > script.len() {
                return script.len();
            }
            i + 3 + u16::from_le_bytes([script[i + 1], script[i + 2]]) as usize
        }
        OP_PUSHDATA4 => {
            if i + 5 > script.len() {
                return script.len();
            }
            let len = u32::from_le_bytes([script[i + 1], script[i + 2], script[i + 3], script[i + 4]]);
            (i + 5).saturating_add(len as usize)
        }
        _ => i + 1,
    };
    next.min(script.len())
}

/// Returns a copy of `script` with every occurrence of `opcode` removed.
///
/// Only bytes sitting at an opcode boundary are dropped. The same byte value
/// inside a push payload is data and stays.
#[must_use]
pub fn remove_opcode(script: &[u8], opcode: u8) -> Vec<u8> {
    let mut result = Vec::with_capacity(script.len());
    let mut i = 0;
    while i < script.len() {
        let next = next_op(i, script);
        if script[i] != opcode {
            result.extend_from_slice(&script[i..next]);
        }
        i = next;
    }
    result
}
