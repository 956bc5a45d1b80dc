//! Transaction sighash computation.
//!
//! Two incompatible schemes are supported. The legacy scheme re-serializes a
//! rewritten copy of the whole transaction for every input. The witness
//! scheme (BIP-143 layout, selected by SIGHASH_FORKID) commits to the spent
//! value and reuses three rolling hashes across inputs through [`SigHashCache`].
//!
//! Neither scheme touches the caller's transaction: both read through a
//! [`TxView`] and any rewritten transaction is a fresh owned value.
use crate::messages::{OutPoint, Tx, TxIn, TxOut, TxView};
use crate::script::{Script, op_codes::OP_CODESEPARATOR, remove_opcode};
use crate::util::{Error, Hash256, Result, Serializable, sha256d, var_int};
use byteorder::{LittleEndian, WriteBytesExt};
use tracing::{debug, trace};

/// Signs all outputs.
pub const SIGHASH_ALL: u8 = 0x01;
/// Signs no outputs.
pub const SIGHASH_NONE: u8 = 0x02;
/// Signs only the output at the same index as the input.
pub const SIGHASH_SINGLE: u8 = 0x03;
/// Commits only to the input being signed.
pub const SIGHASH_ANYONECANPAY: u8 = 0x80;
/// Selects the witness (replay-protected) scheme.
pub const SIGHASH_FORKID: u8 = 0x40;

/// 24-bit fork identifier mixed into the replay-protected type word.
pub const FORK_ID: u32 = 0;

/// Which outputs a signature commits to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SigHashMode {
    /// All outputs.
    All = 1,
    /// No outputs.
    None = 2,
    /// The output with the same index as the signed input.
    Single = 3,
}

impl SigHashMode {
    /// Reads the mode out of a flag byte. Anything other than NONE or SINGLE
    /// in the low five bits behaves as ALL.
    #[must_use]
    pub fn from_flags(flags: u8) -> SigHashMode {
        match flags & 0x1f {
            SIGHASH_NONE => SigHashMode::None,
            SIGHASH_SINGLE => SigHashMode::Single,
            _ => SigHashMode::All,
        }
    }

    /// Returns the mode's base value.
    #[must_use]
    #[inline]
    pub fn value(self) -> u8 {
        self as u8
    }
}

/// Raw sighash flag byte.
///
/// The byte is kept verbatim so non-standard values round-trip exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SigHashFlags(pub u8);

impl SigHashFlags {
    /// Packs a mode and modifiers into a flag byte.
    #[must_use]
    pub fn new(mode: SigHashMode, anyone_can_pay: bool, fork_id: bool) -> SigHashFlags {
        let mut flags = mode.value();
        if anyone_can_pay {
            flags |= SIGHASH_ANYONECANPAY;
        }
        if fork_id {
            flags |= SIGHASH_FORKID;
        }
        SigHashFlags(flags)
    }

    /// Low five bits.
    #[must_use]
    #[inline]
    pub fn base_type(self) -> u8 {
        self.0 & 0x1f
    }

    /// Effective mode.
    #[must_use]
    #[inline]
    pub fn mode(self) -> SigHashMode {
        SigHashMode::from_flags(self.0)
    }

    /// Whether ANYONECANPAY is set.
    #[must_use]
    #[inline]
    pub fn anyone_can_pay(self) -> bool {
        self.0 & SIGHASH_ANYONECANPAY != 0
    }

    /// Whether FORKID is set.
    #[must_use]
    #[inline]
    pub fn has_fork_id(self) -> bool {
        self.0 & SIGHASH_FORKID != 0
    }

    /// Whether the byte, with ANYONECANPAY and FORKID masked off, is ALL, NONE or SINGLE.
    #[must_use]
    pub fn is_defined(self) -> bool {
        let base = self.0 & !(SIGHASH_ANYONECANPAY | SIGHASH_FORKID);
        (SIGHASH_ALL..=SIGHASH_SINGLE).contains(&base)
    }

    /// The 32-bit type word appended to a witness preimage.
    ///
    /// With replay protection the upper 24 bits carry `0xff0000 | (FORK_ID ^ 0xdead)`.
    #[must_use]
    pub fn sighash_type_word(self, replay_protection: bool) -> u32 {
        let mut word = self.0 as u32;
        if replay_protection {
            word |= (0xff0000 | (FORK_ID ^ 0xdead)) << 8;
        }
        word
    }
}

impl From<u8> for SigHashFlags {
    fn from(flags: u8) -> Self {
        SigHashFlags(flags)
    }
}

/// Result of the legacy sighash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacySigHash {
    /// Double SHA-256 of the rewritten transaction.
    Digest(Hash256),
    /// SIGHASH_SINGLE on an input with no matching output. Signatures commit
    /// to the constant `01 00 .. 00` instead of a hash.
    SingleSentinel,
}

impl LegacySigHash {
    /// The 32 bytes a signature commits to.
    #[must_use]
    pub fn to_hash(self) -> Hash256 {
        match self {
            LegacySigHash::Digest(h) => h,
            LegacySigHash::SingleSentinel => {
                let mut one = [0; 32];
                one[0] = 1;
                Hash256(one)
            }
        }
    }

    /// Whether this is the SIGHASH_SINGLE sentinel.
    #[must_use]
    pub fn is_sentinel(self) -> bool {
        matches!(self, LegacySigHash::SingleSentinel)
    }
}

/// Computes the sighash for an input, picking the scheme from the FORKID bit.
///
/// The legacy SINGLE sentinel is returned as its constant digest.
///
/// # Errors
/// `Error::OutOfRange` if `n_input` is not an input of `view`.
///
/// # Examples
/// ```
/// use txsig::messages::{Tx, TxIn};
/// use txsig::transaction::sighash::{sighash, SigHashCache, SIGHASH_ALL, SIGHASH_FORKID};
/// let tx = Tx { inputs: vec![TxIn::default()], ..Default::default() };
/// let mut cache = SigHashCache::new();
/// let h = sighash(tx.view(), 0, &[], 1000, SIGHASH_ALL | SIGHASH_FORKID, false, &mut cache).unwrap();
/// assert_ne!(h.0, [0; 32]);
/// ```
pub fn sighash(
    view: TxView,
    n_input: usize,
    script_code: &[u8],
    satoshis: i64,
    sighash_type: u8,
    replay_protection: bool,
    cache: &mut SigHashCache,
) -> Result<Hash256> {
    let flags = SigHashFlags(sighash_type);
    if flags.has_fork_id() {
        witness_sighash_with_flags(view, n_input, script_code, satoshis, flags, replay_protection, cache)
    } else {
        Ok(legacy_sighash(view, n_input, script_code, flags)?.to_hash())
    }
}

/// Cache for the witness scheme's rolling hashes.
///
/// Only valid for one transaction. Reuse it across the inputs of that
/// transaction and drop it afterwards.
#[derive(Default, Debug, Clone)]
pub struct SigHashCache {
    hash_prevouts: Option<Hash256>,
    hash_sequence: Option<Hash256>,
    hash_outputs: Option<Hash256>,
}

impl SigHashCache {
    /// Creates a new empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn hash_prevouts(&mut self, view: &TxView) -> Result<Hash256> {
        if let Some(h) = self.hash_prevouts {
            return Ok(h);
        }
        let mut prevouts = Vec::with_capacity(OutPoint::SIZE * view.inputs.len());
        for input in view.inputs {
            input.prev_output.write(&mut prevouts)?;
        }
        let h = sha256d(&prevouts);
        self.hash_prevouts = Some(h);
        Ok(h)
    }

    fn hash_sequence(&mut self, view: &TxView) -> Result<Hash256> {
        if let Some(h) = self.hash_sequence {
            return Ok(h);
        }
        let mut sequences = Vec::with_capacity(4 * view.inputs.len());
        for input in view.inputs {
            sequences.write_u32::<LittleEndian>(input.sequence)?;
        }
        let h = sha256d(&sequences);
        self.hash_sequence = Some(h);
        Ok(h)
    }

    fn hash_outputs(&mut self, view: &TxView) -> Result<Hash256> {
        if let Some(h) = self.hash_outputs {
            return Ok(h);
        }
        let mut outputs = Vec::with_capacity(view.outputs.iter().map(TxOut::size).sum());
        for output in view.outputs {
            output.write(&mut outputs)?;
        }
        let h = sha256d(&outputs);
        self.hash_outputs = Some(h);
        Ok(h)
    }
}

/// Witness sighash for a mode and modifiers. FORKID is always set.
///
/// # Errors
/// `Error::OutOfRange` if `n_input` is not an input of `view`.
#[allow(clippy::too_many_arguments)]
pub fn witness_sighash(
    view: TxView,
    n_input: usize,
    script_code: &[u8],
    satoshis: i64,
    mode: SigHashMode,
    anyone_can_pay: bool,
    replay_protection: bool,
    cache: &mut SigHashCache,
) -> Result<Hash256> {
    let flags = SigHashFlags::new(mode, anyone_can_pay, true);
    witness_sighash_with_flags(view, n_input, script_code, satoshis, flags, replay_protection, cache)
}

/// Witness sighash over a raw flag byte, as found at the end of a signature.
///
/// Layout: version | hashPrevouts | hashSequence | outpoint | scriptCode |
/// value | sequence | hashOutputs | lock_time | type word.
///
/// # Errors
/// `Error::OutOfRange` if `n_input` is not an input of `view`.
pub fn witness_sighash_with_flags(
    view: TxView,
    n_input: usize,
    script_code: &[u8],
    satoshis: i64,
    flags: SigHashFlags,
    replay_protection: bool,
    cache: &mut SigHashCache,
) -> Result<Hash256> {
    check_input_index(&view, n_input)?;
    trace!(n_input, flags = flags.0, replay_protection, "witness sighash");
    let mode = flags.mode();
    let anyone_can_pay = flags.anyone_can_pay();
    let zero = Hash256([0; 32]);

    let hash_prevouts = if anyone_can_pay { zero } else { cache.hash_prevouts(&view)? };
    let hash_sequence = if anyone_can_pay || mode != SigHashMode::All {
        zero
    } else {
        cache.hash_sequence(&view)?
    };
    let hash_outputs = match mode {
        SigHashMode::All => cache.hash_outputs(&view)?,
        SigHashMode::Single if n_input < view.outputs.len() => {
            let output = &view.outputs[n_input];
            let mut b = Vec::with_capacity(output.size());
            output.write(&mut b)?;
            sha256d(&b)
        }
        _ => zero,
    };

    let input = &view.inputs[n_input];
    let mut s = Vec::with_capacity(156 + script_code.len() + var_int::size(script_code.len() as u64));
    s.write_u32::<LittleEndian>(view.version)?;
    hash_prevouts.write(&mut s)?;
    hash_sequence.write(&mut s)?;
    input.prev_output.write(&mut s)?;
    var_int::write(script_code.len() as u64, &mut s)?;
    s.extend_from_slice(script_code);
    s.write_i64::<LittleEndian>(satoshis)?;
    s.write_u32::<LittleEndian>(input.sequence)?;
    hash_outputs.write(&mut s)?;
    s.write_u32::<LittleEndian>(view.lock_time)?;
    s.write_u32::<LittleEndian>(flags.sighash_type_word(replay_protection))?;
    Ok(sha256d(&s))
}

/// Legacy sighash.
///
/// # Errors
/// `Error::OutOfRange` if `n_input` is not an input of `view`.
pub fn legacy_sighash(view: TxView, n_input: usize, script_code: &[u8], flags: SigHashFlags) -> Result<LegacySigHash> {
    check_input_index(&view, n_input)?;
    if flags.mode() == SigHashMode::Single && n_input >= view.outputs.len() {
        debug!(n_input, outputs = view.outputs.len(), "SIGHASH_SINGLE without matching output");
        return Ok(LegacySigHash::SingleSentinel);
    }
    trace!(n_input, flags = flags.0, "legacy sighash");
    let tx_copy = legacy_tx_copy(view, n_input, script_code, flags)?;
    let mut s = Vec::with_capacity(tx_copy.size() + 4);
    tx_copy.write(&mut s)?;
    s.write_u32::<LittleEndian>(flags.0 as u32)?;
    Ok(LegacySigHash::Digest(sha256d(&s)))
}

/// Builds the rewritten transaction the legacy sighash serializes.
///
/// - OP_CODESEPARATOR is stripped from `script_code`, which then replaces
///   the signed input's script. Every other input gets an empty script.
/// - NONE drops all outputs. SINGLE keeps outputs up to `n_input` and blanks
///   those before it to (-1, empty). Both zero the other inputs' sequences.
/// - ANYONECANPAY keeps only the signed input.
///
/// # Errors
/// `Error::OutOfRange` if `n_input` is not an input of `view`, or if the mode
/// is SINGLE and there is no output at `n_input`.
pub fn legacy_tx_copy(view: TxView, n_input: usize, script_code: &[u8], flags: SigHashFlags) -> Result<Tx> {
    check_input_index(&view, n_input)?;
    let mode = flags.mode();
    let anyone_can_pay = flags.anyone_can_pay();
    let sub_script = Script(remove_opcode(script_code, OP_CODESEPARATOR));
    let zero_other_sequences = mode != SigHashMode::All;

    let inputs = view
        .inputs
        .iter()
        .enumerate()
        .filter(|(i, _)| !anyone_can_pay || *i == n_input)
        .map(|(i, input)| {
            if i == n_input {
                TxIn {
                    prev_output: input.prev_output.clone(),
                    unlock_script: sub_script.clone(),
                    sequence: input.sequence,
                }
            } else {
                TxIn {
                    prev_output: input.prev_output.clone(),
                    unlock_script: Script::new(),
                    sequence: if zero_other_sequences { 0 } else { input.sequence },
                }
            }
        })
        .collect();

    let outputs = match mode {
        SigHashMode::All => view.outputs.to_vec(),
        SigHashMode::None => Vec::new(),
        SigHashMode::Single => {
            let Some(signed) = view.outputs.get(n_input) else {
                return Err(Error::OutOfRange(format!("No output {} for SIGHASH_SINGLE", n_input)));
            };
            let blank = TxOut {
                satoshis: -1,
                lock_script: Script::new(),
            };
            let mut outputs = vec![blank; n_input];
            outputs.push(signed.clone());
            outputs
        }
    };

    Ok(Tx {
        version: view.version,
        inputs,
        outputs,
        lock_time: view.lock_time,
    })
}

fn check_input_index(view: &TxView, n_input: usize) -> Result<()> {
    if n_input >= view.inputs.len() {
        let msg = format!("Input {} of {}", n_input, view.inputs.len());
        return Err(Error::OutOfRange(msg));
    }
    Ok(())
}
