//! # unwindscope Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and
//! traits from the unwindscope library. Import this module to get quick access to
//! everything a scripted unwinder or an embedding engine needs.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all unwindscope operations
pub use crate::Error;

/// The result type used throughout unwindscope
pub use crate::Result;

// ================================================================================================
// Engine-Side Interfaces
// ================================================================================================

/// Architecture abstraction: register resolution and widths
pub use crate::arch::{resolve_register, ArchRef, Architecture, RegisterId};

/// The native engine's frame interface and raw register values
pub use crate::frame::{RegisterValue, StackFrame};

// ================================================================================================
// Negotiation Protocol
// ================================================================================================

/// Frame identity and its construction descriptor
pub use crate::unwinder::{FrameIdDescriptor, FrameIdentity};

/// The per-frame negotiation handle and result accumulator
pub use crate::unwinder::{PendingFrame, SavedRegister, UnwindInfo};

/// The frozen per-frame record and its query answers
pub use crate::unwinder::{CachedFrameRecord, CachedRegister, PrevRegister};

// ================================================================================================
// Dispatch and Registration
// ================================================================================================

/// The sniff state machine and the scripting-host boundary
pub use crate::unwinder::{Resolution, SnifferDispatcher, UnwinderHost};

/// One-time-per-architecture installation
pub use crate::unwinder::{SnifferChain, UnwinderRegistry};
