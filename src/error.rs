use thiserror::Error;

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// This enum covers every failure mode of the scripted-unwinder protocol: stale negotiation
/// handles, register resolution, frame-identity construction, register-value validation and
/// the dispatcher/host boundary. Each variant provides specific context about the failure
/// mode to enable appropriate error handling.
///
/// # Propagation Policy
///
/// Not every variant travels the same way:
///
/// - [`Error::StalePendingFrame`], [`Error::BadRegister`], [`Error::MissingIdentityField`],
///   [`Error::BadPointerValue`], [`Error::RegisterSizeMismatch`] and
///   [`Error::UnreadableRegister`] are reported to the caller of the operation that detected
///   them — typically the scripted logic itself, via the host.
/// - [`Error::HostFailure`] and [`Error::ProtocolViolation`] are absorbed at the dispatcher
///   boundary and downgraded to "no cache produced"; the detail surfaces only through
///   diagnostics.
/// - [`Error::Cancelled`] is the sole variant that must propagate past the dispatcher, so
///   that an operator interrupt unwinds the whole operation instead of being swallowed.
///
/// # Examples
///
/// ```rust,ignore
/// use unwindscope::{Error, Resolution, UnwinderHost};
///
/// match dispatcher.sniff(frame) {
///     Ok(Some(record)) => println!("cache produced: {}", record.identity()),
///     Ok(None) => println!("this sniffer found nothing"),
///     Err(Error::Cancelled) => return Err(Error::Cancelled),
///     Err(e) => unreachable!("sniff only surfaces cancellation: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// A negotiation handle was used after its validity window closed.
    ///
    /// A [`crate::PendingFrame`] is only valid for the duration of the single sniff attempt
    /// that created it. The dispatcher clears the validity flag unconditionally when that
    /// attempt returns; every later operation on the handle, or on an
    /// [`crate::UnwindInfo`] still referring to it, fails with this error.
    #[error("Attempting to use a stale PendingFrame")]
    StalePendingFrame,

    /// A register id could not be resolved against the frame's architecture.
    ///
    /// Raised when a register name is unknown to the architecture, or a register number
    /// has no name mapping. The payload is the offending id, rendered for diagnostics.
    #[error("Bad register - {0}")]
    BadRegister(String),

    /// A required frame-identity field was absent.
    ///
    /// A stack pointer is mandatory for every frame identity; its absence is an input
    /// error, never a variant choice. The payload names the missing field.
    #[error("A frame identity requires the '{0}' field")]
    MissingIdentityField(&'static str),

    /// A frame-identity field was present but did not hold a pointer-sized value.
    ///
    /// Distinct from [`Error::MissingIdentityField`]: the field was supplied, but its
    /// byte width differs from the architecture's pointer size.
    #[error("The value of the '{field}' field is not a pointer")]
    BadPointerValue {
        /// Name of the offending identity field (`sp`, `pc` or `special`).
        field: &'static str,
    },

    /// A saved register value's byte width differs from the architecture's declared
    /// storage width for that register.
    ///
    /// Detected at insertion time in [`crate::UnwindInfo::add_saved_register`], never
    /// deferred to freeze time. Carries both widths for diagnostics.
    #[error(
        "The value for register {regnum} has unexpected size: {actual} instead of {expected}"
    )]
    RegisterSizeMismatch {
        /// The register number the value was destined for.
        regnum: u16,
        /// The architecture's declared storage width, in bytes.
        expected: usize,
        /// The width of the rejected value, in bytes.
        actual: usize,
    },

    /// The underlying frame could not produce a value for the requested register.
    ///
    /// Reads through [`crate::PendingFrame::read_register`] propagate this rather than
    /// synthesizing a default.
    #[error("Cannot read register {regnum} from frame")]
    UnreadableRegister {
        /// The register number that could not be read.
        regnum: u16,
    },

    /// The scripting host violated the sniff protocol.
    ///
    /// For example by returning an [`crate::UnwindInfo`] negotiated through a different
    /// [`crate::PendingFrame`] than the one it was handed. The dispatcher reports this
    /// loudly through diagnostics and produces no cache; it does not crash the caller.
    #[error("Scripted unwinder protocol violation - {0}")]
    ProtocolViolation(String),

    /// The scripted logic itself failed.
    ///
    /// Host implementations wrap script-level exceptions in this variant. The dispatcher
    /// absorbs it, logs the detail and reports "no cache produced" so a buggy scripted
    /// unwinder degrades gracefully instead of taking the debugger down.
    #[error("Scripted unwinder failed - {0}")]
    HostFailure(String),

    /// An operator interrupt was raised while the scripting host was running.
    ///
    /// Never conflated with [`Error::HostFailure`]: the dispatcher re-raises it so the
    /// enclosing operation unwinds instead of treating the interrupt as "no match".
    #[error("Unwinding cancelled by operator interrupt")]
    Cancelled,
}
