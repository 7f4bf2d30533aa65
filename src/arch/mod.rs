//! Architecture abstraction for register resolution and width validation.
//!
//! The bridge never owns register tables itself; the native engine supplies them behind
//! the [`Architecture`] trait. What the bridge needs is small: map register names to
//! numbers and back, and know the declared storage width of each register so that values
//! supplied by scripted logic can be validated at insertion time.
//!
//! Scripted logic refers to registers either by number or by name; [`RegisterId`]
//! captures both spellings, and [`resolve_register`] normalizes them to a validated
//! register number.

use std::sync::Arc;

use crate::{Error, Result};

/// The target architecture of a frame under negotiation.
///
/// Implemented by the native engine (or by test fixtures); the bridge only consumes it.
/// An implementation provides the canonical register name/number mapping and the
/// declared storage width for each register.
///
/// All methods operating on a register number return `None` for numbers the
/// architecture does not define; the bridge turns that into [`Error::BadRegister`].
///
/// # Examples
///
/// ```rust,ignore
/// use unwindscope::Architecture;
///
/// struct X64;
///
/// impl Architecture for X64 {
///     fn name(&self) -> &str { "x86-64" }
///     fn pointer_size(&self) -> usize { 8 }
///     fn register_number(&self, name: &str) -> Option<u16> {
///         match name { "rsp" => Some(7), "rip" => Some(16), _ => None }
///     }
///     fn register_name(&self, number: u16) -> Option<&str> {
///         match number { 7 => Some("rsp"), 16 => Some("rip"), _ => None }
///     }
///     fn register_size(&self, number: u16) -> Option<usize> {
///         self.register_name(number).map(|_| 8)
///     }
/// }
/// ```
pub trait Architecture: Send + Sync {
    /// Canonical architecture name, used as the registration key and in diagnostics.
    fn name(&self) -> &str;

    /// Width of a pointer on this architecture, in bytes.
    fn pointer_size(&self) -> usize;

    /// Resolves a register name to its number, or `None` if the name is unknown.
    fn register_number(&self, name: &str) -> Option<u16>;

    /// Resolves a register number to its canonical name, or `None` if the number is
    /// not defined for this architecture.
    fn register_name(&self, number: u16) -> Option<&str>;

    /// Declared storage width of a register, in bytes, or `None` if the number is
    /// not defined for this architecture.
    fn register_size(&self, number: u16) -> Option<usize>;
}

/// A register reference as supplied by scripted logic: either a raw number or a name.
///
/// Conversions exist from `u16` and `&str`, so bridge operations accept both
/// spellings directly:
///
/// ```rust,ignore
/// pending.read_register("sp")?;
/// pending.read_register(7u16)?;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterId<'a> {
    /// A register referenced by its architecture-assigned number.
    Number(u16),
    /// A register referenced by name, to be resolved against the architecture.
    Name(&'a str),
}

impl From<u16> for RegisterId<'static> {
    fn from(number: u16) -> Self {
        RegisterId::Number(number)
    }
}

impl<'a> From<&'a str> for RegisterId<'a> {
    fn from(name: &'a str) -> Self {
        RegisterId::Name(name)
    }
}

impl std::fmt::Display for RegisterId<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegisterId::Number(number) => write!(f, "{number}"),
            RegisterId::Name(name) => f.write_str(name),
        }
    }
}

/// Resolves a register id to a validated register number.
///
/// A name must map to a number, and a number must map back to a name — an id that
/// fails either direction does not denote a register of this architecture.
///
/// # Errors
///
/// Returns [`Error::BadRegister`] carrying the offending id when resolution fails.
pub fn resolve_register(arch: &dyn Architecture, id: RegisterId<'_>) -> Result<u16> {
    match id {
        RegisterId::Number(number) => {
            if arch.register_name(number).is_some() {
                Ok(number)
            } else {
                Err(Error::BadRegister(number.to_string()))
            }
        }
        RegisterId::Name(name) => arch
            .register_number(name)
            .ok_or_else(|| Error::BadRegister(name.to_string())),
    }
}

/// Shared handle to an [`Architecture`] as passed around by the bridge.
pub type ArchRef = Arc<dyn Architecture>;
