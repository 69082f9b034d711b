//! Sources of real hypervisor capability data.

mod host;
#[cfg(feature = "qemu")]
mod qemu;

pub use host::HostPassthrough;
#[cfg(feature = "qemu")]
pub use qemu::{MachineType, QemuCaps, QemuCapsDir, QemuCapsError};

use domcaps_core::{Arch, DomainCapabilities, Result};

/// Locates and parses introspection data for an emulator.
pub trait Prober {
    /// Loads the capability data identified by `name` for `arch`.
    ///
    /// Fails with [`Error::Probe`](domcaps_core::Error::Probe) if the data
    /// cannot be found or parsed.
    fn load(&self, name: &str, arch: Arch) -> Result<Box<dyn ProbeSource>>;
}

/// Parsed introspection data for one emulator binary.
pub trait ProbeSource {
    /// Maps a machine type name or alias to its canonical name.
    fn canonical_machine(&self, name: &str) -> Option<&str>;

    /// Machine type used when the caller asked for none.
    fn default_machine(&self) -> Option<&str>;

    /// Fills every capability block from the emulator's declared features.
    ///
    /// `loaders` lists candidate firmware images; only those present on the
    /// host are recorded.
    fn fill_domain_caps(&self, caps: &mut DomainCapabilities, loaders: &[String]) -> Result<()>;
}
