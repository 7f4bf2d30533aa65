//! The per-frame negotiation handle handed to scripted unwind logic.
//!
//! A [`PendingFrame`] wraps the native frame under test together with its architecture
//! and a validity flag. Scripted logic inspects the frame through it
//! ([`PendingFrame::read_register`]) and, once it has recognized the frame, starts the
//! result accumulator through it ([`PendingFrame::create_unwind_info`]).
//!
//! The handle is only valid during the single sniff attempt that created it. The
//! dispatcher clears the validity flag unconditionally when that attempt returns —
//! success or failure — and every operation afterwards fails with
//! [`Error::StalePendingFrame`]. Validity is per-instance, so a nested sniff attempt
//! (scripted logic re-entering the engine and triggering another unwind) owns an
//! independent handle that does not interfere with the outer one.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::trace;

use crate::arch::{resolve_register, ArchRef, RegisterId};
use crate::frame::StackFrame;
use crate::unwinder::identity::FrameIdDescriptor;
use crate::unwinder::info::UnwindInfo;
use crate::{Error, RegisterValue, Result};

/// Negotiation handle for one frame, for one sniff attempt.
///
/// Created by the dispatcher, shared with the scripting host, and referenced by any
/// [`UnwindInfo`] built from it. The reference count keeps the handle itself alive
/// past the attempt, but the validity flag makes every late use fail explicitly
/// instead of touching a frame the engine may already have discarded.
///
/// # Examples
///
/// A minimal scripted unwinder body:
///
/// ```rust,ignore
/// use unwindscope::{FrameIdDescriptor, PendingFrame, Resolution, UnwindInfo};
///
/// fn unwind(pending: &std::sync::Arc<PendingFrame>) -> unwindscope::Result<Resolution> {
///     let sp = pending.read_register("sp")?;
///     let mut info = pending.create_unwind_info(
///         FrameIdDescriptor::new().with_sp(sp),
///     )?;
///     info.add_saved_register("pc", pending.read_register("lr")?)?;
///     Ok(Resolution::Unwind(info))
/// }
/// ```
pub struct PendingFrame {
    /// Frame we are unwinding; owned by the native engine.
    frame: Arc<dyn StackFrame>,
    /// Its architecture, passed by the sniffer caller.
    arch: ArchRef,
    valid: AtomicBool,
}

impl PendingFrame {
    pub(crate) fn new(frame: Arc<dyn StackFrame>, arch: ArchRef) -> Arc<Self> {
        Arc::new(PendingFrame {
            frame,
            arch,
            valid: AtomicBool::new(true),
        })
    }

    /// The architecture of the frame under negotiation.
    #[must_use]
    pub fn architecture(&self) -> ArchRef {
        Arc::clone(&self.arch)
    }

    /// Returns `true` while the owning sniff attempt is still in progress.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid.load(Ordering::Acquire)
    }

    /// Closes the negotiation window. Called by the dispatcher, exactly once,
    /// regardless of the attempt's outcome.
    pub(crate) fn invalidate(&self) {
        self.valid.store(false, Ordering::Release);
    }

    fn ensure_valid(&self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(Error::StalePendingFrame)
        }
    }

    /// Reads a register of the frame under negotiation.
    ///
    /// The value observed is the one that holds in the frame being unwound — this is
    /// how scripted logic inspects the current frame to decide what the caller's
    /// registers were.
    ///
    /// # Errors
    ///
    /// - [`Error::StalePendingFrame`] once the negotiation window has closed.
    /// - [`Error::BadRegister`] when the id does not resolve against the architecture.
    /// - A propagated frame failure (such as [`Error::UnreadableRegister`]) when the
    ///   underlying frame cannot currently produce the value.
    pub fn read_register<'a>(&self, id: impl Into<RegisterId<'a>>) -> Result<RegisterValue> {
        self.ensure_valid()?;
        let number = resolve_register(self.arch.as_ref(), id.into())?;
        let value = self.frame.register(number)?;
        trace!(regnum = number, width = value.len(), "read register");
        Ok(value)
    }

    /// Builds the [`UnwindInfo`] accumulator for this frame from an identity
    /// descriptor.
    ///
    /// The descriptor's fields select the identity variant through the fixed
    /// precedence table documented in [`crate::unwinder::identity`].
    ///
    /// # Errors
    ///
    /// - [`Error::StalePendingFrame`] once the negotiation window has closed.
    /// - [`Error::MissingIdentityField`] when the mandatory `sp` field is absent.
    /// - [`Error::BadPointerValue`] when a present field is not pointer-sized.
    pub fn create_unwind_info(
        self: &Arc<Self>,
        descriptor: FrameIdDescriptor,
    ) -> Result<UnwindInfo> {
        self.ensure_valid()?;
        let identity = descriptor.resolve(self.arch.pointer_size())?;
        trace!(%identity, "created unwind info");
        Ok(UnwindInfo::new(Arc::clone(self), identity))
    }
}

impl fmt::Display for PendingFrame {
    /// Renders `SP=0x..,PC=0x..`, or a stale marker once invalidated. Diagnostic
    /// rendering never fails; an unreadable field shows `<unavailable>`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_valid() {
            return f.write_str("Stale PendingFrame instance");
        }
        match self.frame.stack_pointer() {
            Ok(sp) => write!(f, "SP=0x{sp:x}")?,
            Err(_) => f.write_str("SP=<unavailable>")?,
        }
        match self.frame.program_counter() {
            Ok(pc) => write!(f, ",PC=0x{pc:x}"),
            Err(_) => f.write_str(",PC=<unavailable>"),
        }
    }
}

impl fmt::Debug for PendingFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingFrame")
            .field("arch", &self.arch.name())
            .field("valid", &self.is_valid())
            .finish()
    }
}
