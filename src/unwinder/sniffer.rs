//! The sniffer dispatcher: one sniff attempt per unresolved frame.
//!
//! The native engine offers each frame its built-in unwinders cannot identify to the
//! [`SnifferDispatcher`], which runs the negotiation protocol end to end:
//!
//! ```text
//! Start ──► Invoking ──► Matched    cache produced
//!                    ├─► NoMatch    no cache; other sniffers get a chance
//!                    ├─► Cancelled  operator interrupt, re-raised to the caller
//!                    └─► Failed     scripted bug, logged and absorbed
//! ```
//!
//! The dispatcher constructs the [`PendingFrame`], hands it to the scripting host's
//! single resolution entry point, invalidates the handle the moment that call
//! returns — regardless of outcome — and then interprets the result. Only a
//! cancellation escapes; every other failure degrades to "this sniffer found
//! nothing" so a buggy scripted unwinder cannot take the debugger down.

use std::sync::Arc;

use tracing::{debug, error, trace, warn};

use crate::arch::ArchRef;
use crate::frame::StackFrame;
use crate::unwinder::cache::CachedFrameRecord;
use crate::unwinder::info::UnwindInfo;
use crate::unwinder::pending::PendingFrame;
use crate::{Error, Result};

/// Successful outcome of the scripting host's unwinder resolution.
///
/// The host owns iterating whatever scripted unwinders are registered and returning
/// the first match; the bridge only distinguishes "someone matched" from "nobody
/// did". Failures travel through the `Err` channel of [`UnwinderHost::resolve`].
pub enum Resolution {
    /// No registered scripted unwinder recognized the frame. A legitimate
    /// non-error outcome.
    NoMatch,
    /// A scripted unwinder recognized the frame and filled in this info.
    Unwind(UnwindInfo),
}

/// The scripting host's single entry point, as seen by the dispatcher.
///
/// # Contract
///
/// - Return `Ok(Resolution::Unwind(info))` with an info negotiated through the
///   `pending` handle passed in — and no other handle.
/// - Return `Ok(Resolution::NoMatch)` when no scripted unwinder matches.
/// - Return `Err(Error::Cancelled)` for an operator interrupt; the dispatcher
///   re-raises it instead of absorbing it.
/// - Return any other error (conventionally [`Error::HostFailure`]) for script
///   failures; the dispatcher logs and absorbs those.
pub trait UnwinderHost: Send + Sync {
    /// Runs the registered scripted unwinders for `pending`'s architecture and
    /// returns the first match, if any.
    ///
    /// # Errors
    ///
    /// See the trait-level contract; errors other than [`Error::Cancelled`] are
    /// treated as script failures.
    fn resolve(&self, pending: &Arc<PendingFrame>) -> Result<Resolution>;
}

/// Orchestrates one sniff attempt per unresolved frame for a single architecture.
///
/// Bound to its architecture at construction (registration installs one dispatcher
/// per architecture, at the front of that architecture's sniffer chain).
///
/// # Examples
///
/// ```rust,ignore
/// use unwindscope::{PrevRegister, SnifferDispatcher};
///
/// let dispatcher = SnifferDispatcher::new(host, arch);
/// if let Some(record) = dispatcher.sniff(frame)? {
///     // Steady state: the engine stores the record and queries it per lookup.
///     let id = record.identity();
///     let pc = record.previous_register(16);
/// }
/// ```
pub struct SnifferDispatcher {
    host: Arc<dyn UnwinderHost>,
    arch: ArchRef,
}

impl SnifferDispatcher {
    /// Creates a dispatcher for one architecture, resolving through `host`.
    #[must_use]
    pub fn new(host: Arc<dyn UnwinderHost>, arch: ArchRef) -> Self {
        SnifferDispatcher { host, arch }
    }

    /// The architecture this dispatcher is bound to.
    #[must_use]
    pub fn architecture(&self) -> ArchRef {
        Arc::clone(&self.arch)
    }

    /// Runs one sniff attempt for `frame`.
    ///
    /// Returns `Ok(Some(record))` when a scripted unwinder matched and its result
    /// validated ("cache produced"), `Ok(None)` when no unwinder matched or the
    /// attempt failed in a way that degrades gracefully.
    ///
    /// The [`PendingFrame`] created for the attempt is invalidated before this
    /// method returns, in every case.
    ///
    /// # Errors
    ///
    /// Only [`Error::Cancelled`]: an operator interrupt raised inside the host is
    /// re-raised so the enclosing operation unwinds instead of being swallowed.
    pub fn sniff(&self, frame: Arc<dyn StackFrame>) -> Result<Option<CachedFrameRecord>> {
        let pending = PendingFrame::new(frame, Arc::clone(&self.arch));
        trace!(frame = %pending, arch = self.arch.name(), "sniffing frame");

        let resolution = self.host.resolve(&pending);

        // The negotiation window closes here, before the outcome is interpreted.
        pending.invalidate();

        match resolution {
            Err(Error::Cancelled) => {
                debug!("sniff cancelled by operator interrupt, propagating");
                Err(Error::Cancelled)
            }
            Err(err) => {
                warn!(%err, "scripted unwinder failed, no cache produced");
                Ok(None)
            }
            Ok(Resolution::NoMatch) => {
                trace!("no scripted unwinder matched");
                Ok(None)
            }
            Ok(Resolution::Unwind(info)) => {
                if !Arc::ptr_eq(info.pending(), &pending) {
                    let err = Error::ProtocolViolation(
                        "UnwindInfo was negotiated through a different PendingFrame".to_string(),
                    );
                    error!(%err, "no cache produced");
                    return Ok(None);
                }
                match CachedFrameRecord::freeze(&info, &self.arch) {
                    Ok(record) => {
                        debug!(
                            identity = %info.identity(),
                            registers = record.register_count(),
                            "cache produced"
                        );
                        Ok(Some(record))
                    }
                    Err(err) => {
                        error!(%err, "unwind info failed freeze validation, no cache produced");
                        Ok(None)
                    }
                }
            }
        }
    }
}

impl std::fmt::Debug for SnifferDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnifferDispatcher")
            .field("arch", &self.arch.name())
            .finish()
    }
}
