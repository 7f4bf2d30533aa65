//! The native engine's view of a stack frame, and raw register values.
//!
//! The frame being unwound is owned by the native engine; the bridge only ever holds a
//! non-owning handle to it behind the [`StackFrame`] trait for the duration of one sniff
//! attempt. Register contents cross the boundary as [`RegisterValue`] — plain
//! little-endian byte buffers — because typed value representation is the engine's
//! concern, not the bridge's.

use crate::Result;

/// A stack frame under negotiation, as exposed by the native unwinding engine.
///
/// The engine guarantees the frame outlives the sniff attempt it is handed to; the
/// bridge enforces the other direction by invalidating its [`crate::PendingFrame`]
/// handle the moment the attempt returns.
pub trait StackFrame: Send + Sync {
    /// Reads a register of this frame (the frame being unwound, not its caller).
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnreadableRegister`] (or an engine-specific failure)
    /// when the register's value cannot currently be computed. A failed read must
    /// surface as an error, never as a default value.
    fn register(&self, number: u16) -> Result<RegisterValue>;

    /// The frame's stack pointer, used for diagnostics.
    ///
    /// # Errors
    ///
    /// May fail for frames whose stack pointer cannot currently be computed.
    fn stack_pointer(&self) -> Result<u64>;

    /// The frame's program counter, used for diagnostics.
    ///
    /// # Errors
    ///
    /// May fail for frames whose program counter cannot currently be computed.
    fn program_counter(&self) -> Result<u64>;
}

/// A raw register value: an owned byte buffer in little-endian order.
///
/// Values flow in two directions. Scripted logic receives them from
/// [`crate::PendingFrame::read_register`] and supplies them to
/// [`crate::UnwindInfo::add_saved_register`] and to frame-identity descriptors; the
/// bridge validates widths against the architecture at each insertion point.
///
/// # Examples
///
/// ```rust
/// use unwindscope::RegisterValue;
///
/// let value = RegisterValue::from_u64(0x4010, 8);
/// assert_eq!(value.len(), 8);
/// assert_eq!(value.as_u64(), Some(0x4010));
/// assert_eq!(value.as_pointer(8), Some(0x4010));
/// assert_eq!(value.as_pointer(4), None); // wrong width for a 4-byte pointer
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterValue {
    bytes: Vec<u8>,
}

impl RegisterValue {
    /// Creates a value from raw little-endian bytes.
    #[must_use]
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        RegisterValue {
            bytes: bytes.into(),
        }
    }

    /// Creates a value of `width` bytes holding `value`, zero-extended.
    ///
    /// Widths larger than 8 are padded with zero bytes; widths smaller than 8
    /// truncate to the low-order bytes.
    #[must_use]
    pub fn from_u64(value: u64, width: usize) -> Self {
        let le = value.to_le_bytes();
        let mut bytes = vec![0u8; width];
        let take = width.min(le.len());
        bytes[..take].copy_from_slice(&le[..take]);
        RegisterValue { bytes }
    }

    /// The raw little-endian bytes of this value.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Byte width of this value.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if this value holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Re-renders this value as an unsigned integer.
    ///
    /// Defined for widths of 1 through 8 bytes; anything else returns `None`.
    /// Diagnostic rendering uses this and falls back to a sentinel on `None`.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        if self.bytes.is_empty() || self.bytes.len() > 8 {
            return None;
        }
        let mut le = [0u8; 8];
        le[..self.bytes.len()].copy_from_slice(&self.bytes);
        Some(u64::from_le_bytes(le))
    }

    /// Converts this value to a pointer, requiring an exact width match.
    ///
    /// Frame-identity fields must be pointer-sized; a value of any other width is
    /// not a pointer, even when it would fit numerically.
    #[must_use]
    pub fn as_pointer(&self, pointer_size: usize) -> Option<u64> {
        if self.bytes.len() != pointer_size {
            return None;
        }
        self.as_u64()
    }
}

impl From<Vec<u8>> for RegisterValue {
    fn from(bytes: Vec<u8>) -> Self {
        RegisterValue { bytes }
    }
}

impl From<&[u8]> for RegisterValue {
    fn from(bytes: &[u8]) -> Self {
        RegisterValue {
            bytes: bytes.to_vec(),
        }
    }
}
