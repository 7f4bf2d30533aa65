//! The scripted-unwinder negotiation protocol.
//!
//! This module implements the complete per-frame protocol between the native
//! unwinding engine and scripted unwind logic:
//!
//! - [`PendingFrame`] — the negotiation handle scripted logic inspects a frame
//!   through; invalid the instant its sniff attempt returns.
//! - [`FrameIdentity`] / [`FrameIdDescriptor`] — canonical frame identity and the
//!   optional triple it is built from.
//! - [`UnwindInfo`] — the validated accumulator of identity plus saved registers.
//! - [`CachedFrameRecord`] / [`PrevRegister`] — the frozen record the engine queries
//!   in steady state.
//! - [`SnifferDispatcher`] / [`UnwinderHost`] / [`Resolution`] — the per-attempt
//!   state machine and the host boundary it drives.
//! - [`UnwinderRegistry`] / [`SnifferChain`] — one-time-per-architecture
//!   installation at the front of the engine's sniffer chain.
//!
//! # Protocol Flow
//!
//! ```text
//! engine hits unknown frame
//!         │
//!         ▼
//! SnifferDispatcher::sniff ──► PendingFrame ──► host resolves scripted unwinders
//!         │                                          │
//!         │              reads registers, builds UnwindInfo via the handle
//!         │                                          │
//!         ▼                                          ▼
//! PendingFrame invalidated ◄────── host call returns (any outcome)
//!         │
//!         ▼
//! UnwindInfo frozen ──► CachedFrameRecord ──► engine queries identity /
//!                                             previous registers until the
//!                                             frame cache is torn down
//! ```

pub(crate) mod cache;
pub(crate) mod identity;
pub(crate) mod info;
pub(crate) mod pending;
pub(crate) mod registry;
pub(crate) mod sniffer;

pub use cache::{CachedFrameRecord, CachedRegister, PrevRegister};
pub use identity::{FrameIdDescriptor, FrameIdentity};
pub use info::{SavedRegister, UnwindInfo};
pub use pending::PendingFrame;
pub use registry::{SnifferChain, UnwinderRegistry};
pub use sniffer::{Resolution, SnifferDispatcher, UnwinderHost};
