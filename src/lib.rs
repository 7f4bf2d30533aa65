#![doc(html_no_source)]
#![deny(missing_docs)]

//! # unwindscope
//!
//! A bridge that lets externally supplied ("scripted") unwind logic participate in a
//! native stack-frame-unwinding pipeline. When the engine's built-in unwinders cannot
//! identify a frame, a scripted unwinder inspects it and reports the frame's canonical
//! identity and the register values that held in the caller's frame; `unwindscope`
//! turns that one exchange into a validated, cached protocol.
//!
//! ## What the bridge provides
//!
//! - **🤝 Per-frame negotiation** - A [`PendingFrame`] handle scripted logic reads
//!   registers through, valid for exactly one sniff attempt
//! - **🧾 Validated accumulation** - An [`UnwindInfo`] that checks every supplied
//!   register value against the architecture's declared widths at insertion time
//! - **🧊 Frozen steady state** - A compact, immutable [`CachedFrameRecord`] serving
//!   the engine's identity and previous-register queries until the frame cache dies
//! - **🚦 Strict failure policy** - Scripted bugs degrade to "this sniffer found
//!   nothing"; only an operator interrupt propagates
//! - **🧩 First refusal** - One-time-per-architecture installation at the front of
//!   the engine's sniffer chain
//!
//! ## Quick Start
//!
//! The embedding engine implements [`StackFrame`] and [`Architecture`]; the scripting
//! host implements [`UnwinderHost`]. One sniff attempt then looks like:
//!
//! ```rust,ignore
//! use unwindscope::prelude::*;
//!
//! let dispatcher = SnifferDispatcher::new(host, arch);
//! match dispatcher.sniff(frame)? {
//!     Some(record) => {
//!         // Steady state: store the record in the frame cache slot and serve
//!         // identity / previous-register queries from it.
//!         println!("identified {}", record.identity());
//!     }
//!     None => {
//!         // No scripted unwinder matched; other sniffers get a chance.
//!     }
//! }
//! # Ok::<(), unwindscope::Error>(())
//! ```
//!
//! And a scripted unwinder, on the host side of the [`UnwinderHost`] boundary:
//!
//! ```rust,ignore
//! use unwindscope::prelude::*;
//!
//! fn resolve(pending: &std::sync::Arc<PendingFrame>) -> Result<Resolution> {
//!     let sp = pending.read_register("sp")?;
//!     let lr = pending.read_register("lr")?;
//!
//!     let mut info = pending.create_unwind_info(
//!         FrameIdDescriptor::new().with_sp(sp),
//!     )?;
//!     info.add_saved_register("pc", lr)?;
//!     Ok(Resolution::Unwind(info))
//! }
//! ```
//!
//! ## Architecture
//!
//! `unwindscope` is organized into a few focused modules:
//!
//! - [`prelude`] - Convenient re-exports of commonly used types and traits
//! - [`arch`] - Register resolution against the target [`Architecture`]
//! - [`frame`] - The engine's [`StackFrame`] interface and raw [`RegisterValue`]s
//! - [`unwinder`] - The negotiation protocol: pending frame, unwind info, cached
//!   record, dispatcher and registration
//! - [`Error`] and [`Result`] - Comprehensive error handling
//!
//! ## Lifecycle and Ownership
//!
//! A [`PendingFrame`] is created per sniff attempt and invalidated unconditionally
//! when the attempt returns; any later use fails with
//! [`Error::StalePendingFrame`], including through an [`UnwindInfo`] that outlives
//! the attempt structurally. A [`CachedFrameRecord`], once returned, is exclusively
//! owned by the engine's frame cache slot; dropping it releases the register
//! buffers. The bridge retains nothing.
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`](Result). Validation failures are
//! reported to the scripted logic that caused them; host failures are absorbed at
//! the dispatcher and downgraded to "no cache produced"; cancellation is re-raised.
//! See [`Error`] for the full propagation policy.
//!
//! ## Diagnostics
//!
//! The bridge logs every dispatcher transition and steady-state query through
//! [`tracing`] (`trace!`/`debug!` for transitions and queries, `warn!`/`error!` for
//! absorbed failures). Logging is purely observational: no outcome depends on the
//! subscriber or its level filter.
//!
//! ## Thread Model
//!
//! The protocol is single-threaded and cooperative: the dispatcher, the host call
//! and the engine run on one control thread, and a host call may re-enter the
//! engine (nested sniff attempts own independent pending frames). The `Send + Sync`
//! bounds and atomics exist so handles can be shared soundly, not for parallelism.

pub(crate) mod error;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use unwindscope::prelude::*;
///
/// let value = RegisterValue::from_u64(0x7000, 8);
/// let descriptor = FrameIdDescriptor::new().with_sp(value);
/// ```
pub mod prelude;

/// Architecture abstraction: register name/number resolution and declared widths.
pub mod arch;

/// The native engine's frame interface and raw register values.
pub mod frame;

/// The scripted-unwinder negotiation protocol: pending frames, unwind info,
/// cached records, the sniffer dispatcher and per-architecture registration.
pub mod unwinder;

/// `unwindscope` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always
/// [`Error`]. This is used consistently throughout the crate for all fallible
/// operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `unwindscope` Error type
///
/// The main error type for all operations in this crate, covering the full failure
/// taxonomy of the negotiation protocol together with its propagation policy.
pub use error::Error;

/// Architecture seam: trait plus register id/resolution helpers.
pub use arch::{resolve_register, ArchRef, Architecture, RegisterId};

/// Engine frame seam and raw register values.
pub use frame::{RegisterValue, StackFrame};

/// The negotiation protocol surface.
pub use unwinder::{
    CachedFrameRecord, CachedRegister, FrameIdDescriptor, FrameIdentity, PendingFrame,
    PrevRegister, Resolution, SavedRegister, SnifferChain, SnifferDispatcher, UnwindInfo,
    UnwinderHost, UnwinderRegistry,
};
