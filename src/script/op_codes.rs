//! Script opcodes used when building and inspecting signing scripts.
//!
//! # Examples
//! ```
//! use txsig::script::op_codes::*;
//! assert_eq!(OP_CODESEPARATOR, 171);
//! ```

// Pushdata and constants
/// Pushes an empty array (0/false) onto the stack.
pub const OP_0: u8 = 0;
/// Alias of [`OP_0`].
pub const OP_FALSE: u8 = 0;
/// Next byte is the push length (up to 255 bytes).
pub const OP_PUSHDATA1: u8 = 76;
/// Next two bytes are the push length (up to 65535 bytes).
pub const OP_PUSHDATA2: u8 = 77;
/// Next four bytes are the push length.
pub const OP_PUSHDATA4: u8 = 78;
/// Pushes -1 onto the stack.
pub const OP_1NEGATE: u8 = 79;
/// Pushes 1 (true) onto the stack.
pub const OP_1: u8 = 81;
/// Alias of [`OP_1`].
pub const OP_TRUE: u8 = 81;
/// Pushes 16 onto the stack.
pub const OP_16: u8 = 96;

// Flow control
/// Does nothing.
pub const OP_NOP: u8 = 97;
/// Fails if the top of the stack is false.
pub const OP_VERIFY: u8 = 105;
/// Marks the output as unspendable.
pub const OP_RETURN: u8 = 106;

// Stack and bitwise
/// Duplicates the top stack item.
pub const OP_DUP: u8 = 118;
/// Pushes 1 if the top two items are equal, 0 otherwise.
pub const OP_EQUAL: u8 = 135;
/// Same as OP_EQUAL, then OP_VERIFY.
pub const OP_EQUALVERIFY: u8 = 136;

// Crypto
/// Replaces the top item with its RIPEMD160(SHA256) hash.
pub const OP_HASH160: u8 = 169;
/// Replaces the top item with its double SHA256 hash.
pub const OP_HASH256: u8 = 170;
/// Marks the start of the script code that signatures commit to.
pub const OP_CODESEPARATOR: u8 = 171;
/// Checks a signature against a public key.
pub const OP_CHECKSIG: u8 = 172;
/// Same as OP_CHECKSIG, then OP_VERIFY.
pub const OP_CHECKSIGVERIFY: u8 = 173;
/// Checks m-of-n signatures.
pub const OP_CHECKMULTISIG: u8 = 174;
/// Same as OP_CHECKMULTISIG, then OP_VERIFY.
pub const OP_CHECKMULTISIGVERIFY: u8 = 175;
