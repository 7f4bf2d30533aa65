//! One-time-per-architecture installation of the sniffer dispatcher.
//!
//! The native engine keeps a prioritized sniffer chain per architecture. On the first
//! observation of an architecture, the registry prepends a [`SnifferDispatcher`] to
//! that chain — scripted unwinders get first refusal before built-in heuristics — and
//! records the installation in a side table keyed by architecture name. Re-observing
//! the same architecture is a no-op: the flag is written once and thereafter only
//! read.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, trace};

use crate::arch::ArchRef;
use crate::unwinder::sniffer::{SnifferDispatcher, UnwinderHost};

/// The native engine's per-architecture sniffer chain, as seen by the registry.
pub trait SnifferChain {
    /// Inserts a sniffer at the front of the chain (highest priority).
    fn prepend(&mut self, sniffer: Arc<SnifferDispatcher>);
}

/// Guarded side table that installs the scripted-unwinder bridge once per
/// architecture.
///
/// # Examples
///
/// ```rust,ignore
/// use unwindscope::UnwinderRegistry;
///
/// let registry = UnwinderRegistry::new(host);
///
/// // Called by the engine whenever it observes an architecture; only the first
/// // observation per architecture installs anything.
/// registry.observe_architecture(&arch, &mut chain);
/// registry.observe_architecture(&arch, &mut chain); // no-op
/// ```
pub struct UnwinderRegistry {
    host: Arc<dyn UnwinderHost>,
    /// Architectures the bridge has been prepended for, keyed by name.
    installed: DashMap<String, Arc<SnifferDispatcher>>,
}

impl UnwinderRegistry {
    /// Creates a registry that installs dispatchers resolving through `host`.
    #[must_use]
    pub fn new(host: Arc<dyn UnwinderHost>) -> Self {
        UnwinderRegistry {
            host,
            installed: DashMap::new(),
        }
    }

    /// Installs the bridge for `arch` at the front of `chain`, once.
    ///
    /// Idempotent per architecture: later observations of an already-installed
    /// architecture leave the chain untouched.
    pub fn observe_architecture(&self, arch: &ArchRef, chain: &mut dyn SnifferChain) {
        match self.installed.entry(arch.name().to_string()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                trace!(arch = arch.name(), "bridge already installed");
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                let dispatcher = Arc::new(SnifferDispatcher::new(
                    Arc::clone(&self.host),
                    Arc::clone(arch),
                ));
                chain.prepend(Arc::clone(&dispatcher));
                slot.insert(dispatcher);
                debug!(arch = arch.name(), "installed scripted unwinder bridge");
            }
        }
    }

    /// Returns `true` if the bridge has been installed for the named architecture.
    #[must_use]
    pub fn is_installed(&self, arch_name: &str) -> bool {
        self.installed.contains_key(arch_name)
    }

    /// Number of architectures the bridge has been installed for.
    #[must_use]
    pub fn len(&self) -> usize {
        self.installed.len()
    }

    /// Returns `true` if no architecture has been observed yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.installed.is_empty()
    }
}

impl std::fmt::Debug for UnwinderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnwinderRegistry")
            .field("installed", &self.installed.len())
            .finish()
    }
}
