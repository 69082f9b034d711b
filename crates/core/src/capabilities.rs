use crate::enum_set::EnumSet;
use crate::types::{
    Arch, DiskBus, DiskDevice, HostdevCapsType, HostdevMode, HostdevSubsysType, LoaderType,
    PciBackend, StartupPolicy, TristateBool, VirtType,
};
use crate::values::StringValues;
use serde::Serialize;

/// Firmware loaders the guest can boot from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoaderCapabilities {
    pub supported: bool,
    /// Firmware image paths available on the host.
    pub values: StringValues,
    #[serde(rename = "type")]
    pub types: EnumSet<LoaderType>,
    pub readonly: EnumSet<TristateBool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OsCapabilities {
    pub supported: bool,
    pub loader: LoaderCapabilities,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiskCapabilities {
    pub supported: bool,
    pub disk_device: EnumSet<DiskDevice>,
    pub bus: EnumSet<DiskBus>,
}

/// Host device assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HostdevCapabilities {
    pub supported: bool,
    pub mode: EnumSet<HostdevMode>,
    pub startup_policy: EnumSet<StartupPolicy>,
    pub subsys_type: EnumSet<HostdevSubsysType>,
    pub caps_type: EnumSet<HostdevCapsType>,
    pub pci_backend: EnumSet<PciBackend>,
}

/// What a hypervisor supports for one emulator, machine type, architecture
/// and virtualization type.
///
/// A freshly created description marks every block as unsupported. Blocks
/// whose `supported` flag is false are rendered without any of their
/// children, whatever those children contain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainCapabilities {
    pub path: String,
    /// Canonical machine type, once resolved.
    pub machine: Option<String>,
    pub arch: Arch,
    pub virt_type: VirtType,
    pub max_vcpus: u32,
    pub os: OsCapabilities,
    pub disk: DiskCapabilities,
    pub hostdev: HostdevCapabilities,
}

impl DomainCapabilities {
    pub fn new(
        path: impl Into<String>,
        machine: Option<String>,
        arch: Arch,
        virt_type: VirtType,
    ) -> Self {
        Self {
            path: path.into(),
            machine,
            arch,
            virt_type,
            max_vcpus: 0,
            os: OsCapabilities::default(),
            disk: DiskCapabilities::default(),
            hostdev: HostdevCapabilities::default(),
        }
    }
}
