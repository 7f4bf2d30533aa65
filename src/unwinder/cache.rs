//! The frozen per-frame record the native engine queries in steady state.
//!
//! After a successful sniff the dispatcher freezes the scripted logic's
//! [`crate::UnwindInfo`] into a [`CachedFrameRecord`]: the frame's identity plus a
//! dense array of `(register number, raw bytes)` entries. The record is immutable for
//! its entire lifetime and exclusively owned by the engine's per-frame cache slot —
//! the bridge never retains or mutates it after handing it over. Dropping the record
//! releases every entry's byte buffer.
//!
//! Two query adapters serve the engine's callbacks for the rest of the frame cache's
//! lifetime: [`CachedFrameRecord::identity`] ("what is this frame") and
//! [`CachedFrameRecord::previous_register`] ("what was register R in the caller's
//! frame").

use std::fmt;

use tracing::{debug, trace};

use crate::arch::ArchRef;
use crate::unwinder::identity::FrameIdentity;
use crate::unwinder::info::UnwindInfo;
use crate::{Error, Result};

/// One frozen register entry: register number and its fixed-width byte buffer.
#[derive(Debug, Clone)]
pub struct CachedRegister {
    number: u16,
    data: Box<[u8]>,
}

impl CachedRegister {
    /// The register number this entry holds a value for.
    #[must_use]
    pub fn number(&self) -> u16 {
        self.number
    }

    /// The stored bytes, exactly the architecture's width for this register.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Answer to a previous-register query against a [`CachedFrameRecord`].
///
/// `Unavailable` is explicitly distinct from both zero and error: it tells the native
/// engine this unwinder has no opinion on that register, deferring to further
/// unwinding logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrevRegister<'a> {
    /// The register's caller-frame value is known, from the cache.
    Known(&'a [u8]),
    /// This unwinder recorded nothing for the register.
    Unavailable,
}

/// Immutable snapshot of one successful sniff: architecture, frame identity and the
/// dense saved-register array.
pub struct CachedFrameRecord {
    /// The frame's architecture.
    arch: ArchRef,
    /// The frame's identity.
    identity: FrameIdentity,
    /// One entry per distinct register overridden by the scripted unwinder.
    registers: Vec<CachedRegister>,
}

impl CachedFrameRecord {
    /// Freezes a validated [`UnwindInfo`] into a record, copying every override's
    /// bytes and re-checking widths defensively.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RegisterSizeMismatch`] or [`Error::BadRegister`] if the
    /// accumulated state no longer validates; insertion-time checks make this
    /// unreachable in practice, and the dispatcher downgrades it to "no cache
    /// produced" rather than panicking.
    pub(crate) fn freeze(info: &UnwindInfo, arch: &ArchRef) -> Result<Self> {
        let mut registers = Vec::with_capacity(info.saved_registers().len());
        for reg in info.saved_registers() {
            let expected = arch
                .register_size(reg.number())
                .ok_or_else(|| Error::BadRegister(reg.number().to_string()))?;
            if reg.value().len() != expected {
                return Err(Error::RegisterSizeMismatch {
                    regnum: reg.number(),
                    expected,
                    actual: reg.value().len(),
                });
            }
            registers.push(CachedRegister {
                number: reg.number(),
                data: reg.value().bytes().to_vec().into_boxed_slice(),
            });
        }
        Ok(CachedFrameRecord {
            arch: std::sync::Arc::clone(arch),
            identity: info.identity(),
            registers,
        })
    }

    /// The architecture this record was frozen for.
    #[must_use]
    pub fn architecture(&self) -> ArchRef {
        std::sync::Arc::clone(&self.arch)
    }

    /// Identity query: the stored frame identity, verbatim. No failure path.
    #[must_use]
    pub fn identity(&self) -> FrameIdentity {
        debug!(identity = %self.identity, "frame identity query");
        self.identity
    }

    /// Number of distinct registers this record holds values for.
    #[must_use]
    pub fn register_count(&self) -> usize {
        self.registers.len()
    }

    /// The frozen register entries, in the order the overrides were first written.
    #[must_use]
    pub fn registers(&self) -> &[CachedRegister] {
        &self.registers
    }

    /// Previous-register query: what register `number` held in the caller's frame.
    ///
    /// Linear scan of the dense array; records are small enough that anything
    /// cleverer would not pay for itself.
    #[must_use]
    pub fn previous_register(&self, number: u16) -> PrevRegister<'_> {
        for reg in &self.registers {
            if reg.number == number {
                trace!(regnum = number, "previous register known from cache");
                return PrevRegister::Known(&reg.data);
            }
        }
        trace!(regnum = number, "previous register not cached");
        PrevRegister::Unavailable
    }
}

impl fmt::Debug for CachedFrameRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedFrameRecord")
            .field("arch", &self.arch.name())
            .field("identity", &self.identity)
            .field("register_count", &self.registers.len())
            .finish()
    }
}
