//! Hypervisor domain capabilities.
//!
//! Describes which boot loaders, disk buses and host device passthrough modes
//! a hypervisor supports for one emulator, machine type, architecture and
//! virtualization type, and renders that description as a
//! `<domainCapabilities>` XML document.
//!
//! A description goes through three steps: it is created with its identity,
//! populated by a [`CapabilityBuilder`], then rendered with [`format_xml`].
//!
//! ```rust,no_run
//! use domcaps::{Arch, CapabilityBuilder, ProbedHypervisor, QemuCapsDir, VirtType, format_xml};
//!
//! # fn example() -> domcaps::Result<()> {
//! let builder: CapabilityBuilder =
//!     ProbedHypervisor::new("caps_1.6.50-1", QemuCapsDir::new("./qemucapabilitiesdata")).into();
//! let caps = builder.build(
//!     "/usr/bin/qemu-system-x86_64",
//!     None,
//!     Arch::X86_64,
//!     VirtType::Kvm,
//! )?;
//! print!("{}", format_xml(&caps));
//! # Ok(())
//! # }
//! ```

mod builder;
mod config;
mod format;
pub mod probe;

pub use builder::{
    ALL_SUPPORTED_LOADERS, ALL_SUPPORTED_MAX_VCPUS, CapabilityBuilder, DEFAULT_LOADER_VALUES,
    DEFAULT_PCI_BACKENDS, ProbedHypervisor,
};
pub use config::{DriverConfig, Firmware};
pub use format::format_xml;
pub use probe::{HostPassthrough, ProbeSource, Prober};
#[cfg(feature = "qemu")]
pub use probe::{QemuCaps, QemuCapsDir};

// Capability model
pub use domcaps_core::{
    CapsEnum, DiskCapabilities, DomainCapabilities, EnumSet, HostdevCapabilities,
    LoaderCapabilities, OsCapabilities, StringValues,
};

// Enumerated dimensions
pub use domcaps_core::{
    Arch, DiskBus, DiskDevice, HostdevCapsType, HostdevMode, HostdevSubsysType, LoaderType,
    PciBackend, StartupPolicy, TristateBool, VirtType,
};

// Errors
pub use domcaps_core::{Error, Result};
