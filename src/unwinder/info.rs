//! The result accumulator scripted logic fills in during a sniff attempt.
//!
//! An [`UnwindInfo`] holds the frame's resolved identity plus the set of caller-frame
//! register values the scripted unwinder recovered. Register overrides are keyed by
//! register number with last-write-wins semantics, and every inserted value is
//! validated against the architecture's declared register width at insertion time —
//! a mismatch never survives to freeze time.

use std::fmt;
use std::sync::Arc;

use crate::arch::{resolve_register, RegisterId};
use crate::unwinder::identity::FrameIdentity;
use crate::unwinder::pending::PendingFrame;
use crate::{Error, RegisterValue, Result};

/// One recovered caller-frame register: its number and validated value.
#[derive(Debug, Clone)]
pub struct SavedRegister {
    number: u16,
    value: RegisterValue,
}

impl SavedRegister {
    /// The register number this override applies to.
    #[must_use]
    pub fn number(&self) -> u16 {
        self.number
    }

    /// The recovered value, already width-validated.
    #[must_use]
    pub fn value(&self) -> &RegisterValue {
        &self.value
    }
}

/// Accumulator for one sniff attempt's result: frame identity plus saved registers.
///
/// Created through [`PendingFrame::create_unwind_info`] once the scripted logic has
/// recognized the frame; mutated only through [`UnwindInfo::add_saved_register`];
/// consumed exactly once by the dispatcher when it freezes the attempt into a
/// [`crate::CachedFrameRecord`].
///
/// The accumulator keeps a reference-counted back-reference to the [`PendingFrame`]
/// that created it, so overrides attempted after the negotiation window closes are
/// rejected as stale even though the accumulator itself is still alive.
pub struct UnwindInfo {
    /// The pending frame this info was negotiated through.
    pending: Arc<PendingFrame>,
    /// The frame's identity.
    identity: FrameIdentity,
    /// Saved registers, one entry per distinct register number.
    saved: Vec<SavedRegister>,
}

impl UnwindInfo {
    pub(crate) fn new(pending: Arc<PendingFrame>, identity: FrameIdentity) -> Self {
        UnwindInfo {
            pending,
            identity,
            saved: Vec::new(),
        }
    }

    /// The identity this unwind info was built with.
    #[must_use]
    pub fn identity(&self) -> FrameIdentity {
        self.identity
    }

    /// The saved registers accumulated so far, one entry per distinct register.
    #[must_use]
    pub fn saved_registers(&self) -> &[SavedRegister] {
        &self.saved
    }

    pub(crate) fn pending(&self) -> &Arc<PendingFrame> {
        &self.pending
    }

    /// Records the value register `id` held in the caller's frame.
    ///
    /// Inserts or overwrites: a later write to the same register number replaces the
    /// earlier value. On any failure the accumulated set is left unchanged.
    ///
    /// # Errors
    ///
    /// - [`Error::StalePendingFrame`] if the owning [`PendingFrame`] has been
    ///   invalidated — overrides must not be attempted after the negotiation window
    ///   closes.
    /// - [`Error::BadRegister`] when the id does not resolve.
    /// - [`Error::RegisterSizeMismatch`] when the value's byte width differs from the
    ///   architecture's declared width for that register; carries both widths.
    pub fn add_saved_register<'a>(
        &mut self,
        id: impl Into<RegisterId<'a>>,
        value: RegisterValue,
    ) -> Result<()> {
        if !self.pending.is_valid() {
            return Err(Error::StalePendingFrame);
        }
        let arch = self.pending.architecture();
        let number = resolve_register(arch.as_ref(), id.into())?;
        let expected = arch
            .register_size(number)
            .ok_or_else(|| Error::BadRegister(number.to_string()))?;
        if value.len() != expected {
            return Err(Error::RegisterSizeMismatch {
                regnum: number,
                expected,
                actual: value.len(),
            });
        }

        if let Some(existing) = self.saved.iter_mut().find(|reg| reg.number == number) {
            existing.value = value;
        } else {
            self.saved.push(SavedRegister { number, value });
        }
        Ok(())
    }
}

impl fmt::Display for UnwindInfo {
    /// Renders the identity and the ordered saved-register list. A value that cannot
    /// be re-rendered as an integer is shown as `<BAD>`; diagnostic rendering never
    /// fails.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame ID: {}", self.identity)?;
        write!(f, "\nSaved registers: (")?;
        let mut sep = "";
        for reg in &self.saved {
            match reg.value.as_u64() {
                Some(value) => write!(f, "{sep}({}, 0x{value:x})", reg.number)?,
                None => write!(f, "{sep}({}, <BAD>)", reg.number)?,
            }
            sep = ", ";
        }
        f.write_str(")")
    }
}

impl fmt::Debug for UnwindInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnwindInfo")
            .field("identity", &self.identity)
            .field("saved_registers", &self.saved.len())
            .finish()
    }
}
