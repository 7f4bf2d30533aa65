//! Canonical frame identity and the descriptor scripted logic builds it from.
//!
//! A frame identity is the key the native engine uses to recognize a specific stack
//! activation across queries. It always carries a stack pointer; a program counter and
//! an extra discriminator are optional, and their presence selects the identity
//! variant through a fixed precedence table:
//!
//! | has `sp`? | has `pc`? | has `special`? | resulting identity            |
//! |-----------|-----------|----------------|-------------------------------|
//! | yes       | no        | (ignored)      | [`FrameIdentity::Wild`]       |
//! | yes       | yes       | no             | [`FrameIdentity::Exact`]      |
//! | yes       | yes       | yes            | [`FrameIdentity::Special`]    |
//! | no        | *         | *              | error — `sp` is mandatory     |
//!
//! Scripted logic supplies the fields through a [`FrameIdDescriptor`], an explicit
//! optional triple. Each present field must hold a pointer-sized value; a field that
//! is present but the wrong width is rejected as a bad pointer, which is distinct
//! from the field being absent.

use std::fmt;

use crate::{Error, RegisterValue, Result};

/// Canonical identity of a stack frame.
///
/// Immutable once constructed; built exclusively through
/// [`crate::PendingFrame::create_unwind_info`] so the precedence table above is the
/// only construction path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameIdentity {
    /// Identified by stack pointer alone.
    Wild {
        /// The frame's stack pointer.
        sp: u64,
    },
    /// Identified by stack pointer and program counter.
    Exact {
        /// The frame's stack pointer.
        sp: u64,
        /// The frame's program counter.
        pc: u64,
    },
    /// Identified by stack pointer, program counter and an extra discriminator.
    Special {
        /// The frame's stack pointer.
        sp: u64,
        /// The frame's program counter.
        pc: u64,
        /// Extra discriminator for frames that share `sp` and `pc`.
        special: u64,
    },
}

impl FrameIdentity {
    /// The stack pointer, present in every variant.
    #[must_use]
    pub fn sp(&self) -> u64 {
        match *self {
            FrameIdentity::Wild { sp }
            | FrameIdentity::Exact { sp, .. }
            | FrameIdentity::Special { sp, .. } => sp,
        }
    }

    /// The program counter, if this identity carries one.
    #[must_use]
    pub fn pc(&self) -> Option<u64> {
        match *self {
            FrameIdentity::Wild { .. } => None,
            FrameIdentity::Exact { pc, .. } | FrameIdentity::Special { pc, .. } => Some(pc),
        }
    }

    /// The extra discriminator, if this identity carries one.
    #[must_use]
    pub fn special(&self) -> Option<u64> {
        match *self {
            FrameIdentity::Special { special, .. } => Some(special),
            _ => None,
        }
    }
}

impl fmt::Display for FrameIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            FrameIdentity::Wild { sp } => write!(f, "{{stack=0x{sp:x}}}"),
            FrameIdentity::Exact { sp, pc } => write!(f, "{{stack=0x{sp:x},code=0x{pc:x}}}"),
            FrameIdentity::Special { sp, pc, special } => {
                write!(f, "{{stack=0x{sp:x},code=0x{pc:x},special=0x{special:x}}}")
            }
        }
    }
}

/// The optional triple scripted logic fills in to describe a frame's identity.
///
/// Replaces attribute probing on a host object with an explicit shape: `sp` is
/// required, `pc` and `special` are optional and drive the variant selection
/// documented at the module level.
///
/// # Examples
///
/// ```rust
/// use unwindscope::{FrameIdDescriptor, RegisterValue};
///
/// let descriptor = FrameIdDescriptor::new()
///     .with_sp(RegisterValue::from_u64(0x7000, 8))
///     .with_pc(RegisterValue::from_u64(0x4010, 8));
/// ```
#[derive(Debug, Clone, Default)]
pub struct FrameIdDescriptor {
    sp: Option<RegisterValue>,
    pc: Option<RegisterValue>,
    special: Option<RegisterValue>,
}

impl FrameIdDescriptor {
    /// Creates an empty descriptor.
    #[must_use]
    pub fn new() -> Self {
        FrameIdDescriptor::default()
    }

    /// Sets the stack pointer field.
    #[must_use]
    pub fn with_sp(mut self, sp: RegisterValue) -> Self {
        self.sp = Some(sp);
        self
    }

    /// Sets the program counter field.
    #[must_use]
    pub fn with_pc(mut self, pc: RegisterValue) -> Self {
        self.pc = Some(pc);
        self
    }

    /// Sets the extra discriminator field.
    #[must_use]
    pub fn with_special(mut self, special: RegisterValue) -> Self {
        self.special = Some(special);
        self
    }

    /// Resolves this descriptor into a [`FrameIdentity`] per the precedence table.
    ///
    /// Note that an absent `pc` selects [`FrameIdentity::Wild`] without ever
    /// examining `special`, mirroring the precedence table exactly.
    pub(crate) fn resolve(&self, pointer_size: usize) -> Result<FrameIdentity> {
        let sp = match &self.sp {
            None => return Err(Error::MissingIdentityField("sp")),
            Some(value) => value
                .as_pointer(pointer_size)
                .ok_or(Error::BadPointerValue { field: "sp" })?,
        };

        let pc = match &self.pc {
            None => return Ok(FrameIdentity::Wild { sp }),
            Some(value) => value
                .as_pointer(pointer_size)
                .ok_or(Error::BadPointerValue { field: "pc" })?,
        };

        match &self.special {
            None => Ok(FrameIdentity::Exact { sp, pc }),
            Some(value) => {
                let special = value
                    .as_pointer(pointer_size)
                    .ok_or(Error::BadPointerValue { field: "special" })?;
                Ok(FrameIdentity::Special { sp, pc, special })
            }
        }
    }
}
