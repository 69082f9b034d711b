use super::{HostPassthrough, ProbeSource, Prober};
use domcaps_core::{
    Arch, DiskBus, DiskCapabilities, DiskDevice, DomainCapabilities, Error, HostdevCapabilities,
    HostdevMode, HostdevSubsysType, LoaderType, OsCapabilities, PciBackend, Result, TristateBool,
};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

const FLAG_DRIVE: &str = "drive";
const FLAG_DRIVE_READONLY: &str = "drive-readonly";
const FLAG_USB_STORAGE: &str = "usb-storage";
const FLAG_SCSI_GENERIC: &str = "scsi-generic";
const FLAG_PCI_DEVICE: &str = "pci-device";
const FLAG_NODEFCONFIG: &str = "nodefconfig";
const FLAG_VFIO_PCI: &str = "vfio-pci";

/// Errors found while parsing a QEMU capabilities document.
#[derive(Debug, thiserror::Error)]
pub enum QemuCapsError {
    #[error("malformed XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("unexpected root element <{0}>, expected <qemuCaps>")]
    UnexpectedRoot(String),

    #[error("<{element}> is missing the '{attribute}' attribute")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("invalid value '{value}' in <{element}>")]
    InvalidValue { element: &'static str, value: String },

    #[error("missing <arch> element")]
    MissingArch,
}

/// A machine type the emulator can instantiate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineType {
    pub name: String,
    pub alias: Option<String>,
    /// Zero when the emulator did not report a limit.
    pub max_cpus: u32,
}

/// Capabilities of one QEMU binary, as recorded in a `<qemuCaps>` cache
/// document.
///
/// The first machine type listed is the emulator's default.
#[derive(Debug, Clone)]
pub struct QemuCaps {
    version: u64,
    kvm_version: u64,
    arch: Arch,
    flags: BTreeSet<String>,
    machines: Vec<MachineType>,
    host: HostPassthrough,
}

impl QemuCaps {
    pub fn parse(xml: &str) -> std::result::Result<Self, QemuCapsError> {
        let doc = roxmltree::Document::parse(xml)?;
        let root = doc.root_element();
        if !root.has_tag_name("qemuCaps") {
            return Err(QemuCapsError::UnexpectedRoot(
                root.tag_name().name().to_string(),
            ));
        }

        let mut version = 0;
        let mut kvm_version = 0;
        let mut arch = None;
        let mut flags = BTreeSet::new();
        let mut machines = Vec::new();

        for node in root.children().filter(|n| n.is_element()) {
            match node.tag_name().name() {
                "flag" => {
                    flags.insert(required_attr(node, "flag", "name")?.to_string());
                }
                "version" => version = parse_number(node, "version")?,
                "kvmVersion" => kvm_version = parse_number(node, "kvmVersion")?,
                "arch" => {
                    let text = node.text().unwrap_or_default().trim();
                    let parsed: Arch = text.parse().map_err(|_| QemuCapsError::InvalidValue {
                        element: "arch",
                        value: text.to_string(),
                    })?;
                    arch = Some(parsed);
                }
                "machine" => {
                    let name = required_attr(node, "machine", "name")?.to_string();
                    let max_cpus: u32 = match node.attribute("maxCpus") {
                        Some(value) => value.parse().map_err(|_| QemuCapsError::InvalidValue {
                            element: "machine",
                            value: value.to_string(),
                        })?,
                        None => 0,
                    };
                    machines.push(MachineType {
                        name,
                        alias: node.attribute("alias").map(str::to_string),
                        max_cpus,
                    });
                }
                _ => {}
            }
        }

        Ok(Self {
            version,
            kvm_version,
            arch: arch.ok_or(QemuCapsError::MissingArch)?,
            flags,
            machines,
            host: HostPassthrough::default(),
        })
    }

    /// Sets which passthrough mechanisms the host offers.
    pub fn with_host(mut self, host: HostPassthrough) -> Self {
        self.host = host;
        self
    }

    pub fn arch(&self) -> Arch {
        self.arch
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn kvm_version(&self) -> u64 {
        self.kvm_version
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    pub fn machines(&self) -> &[MachineType] {
        &self.machines
    }

    fn find_machine(&self, name: &str) -> Option<&MachineType> {
        self.machines
            .iter()
            .find(|m| m.name == name || m.alias.as_deref() == Some(name))
    }

    pub fn machine_max_cpus(&self, name: &str) -> u32 {
        self.find_machine(name).map_or(0, |m| m.max_cpus)
    }

    fn fill_os(&self, os: &mut OsCapabilities, loaders: &[String]) -> Result<()> {
        os.supported = true;

        let loader = &mut os.loader;
        loader.supported = true;
        for path in loaders {
            if Path::new(path).exists() {
                loader.values.append([path])?;
            } else {
                tracing::debug!("firmware {} not present on host, skipping", path);
            }
        }

        loader.types.set(LoaderType::Rom);
        if self.has_flag(FLAG_DRIVE) {
            loader.types.set(LoaderType::Pflash);
            if self.has_flag(FLAG_DRIVE_READONLY) {
                loader.readonly.extend([TristateBool::Yes, TristateBool::No]);
            }
        }
        Ok(())
    }

    fn fill_disk(&self, disk: &mut DiskCapabilities, machine: Option<&str>) {
        disk.supported = true;

        // pseries guests have no floppy controller
        let pseries = self.arch.is_ppc64() && machine.is_some_and(|m| m.starts_with("pseries"));

        disk.disk_device
            .extend([DiskDevice::Disk, DiskDevice::Cdrom, DiskDevice::Lun]);
        disk.bus
            .extend([DiskBus::Ide, DiskBus::Scsi, DiskBus::Virtio]);
        if !pseries {
            disk.disk_device.set(DiskDevice::Floppy);
            disk.bus.set(DiskBus::Fdc);
        }
        if self.has_flag(FLAG_USB_STORAGE) {
            disk.bus.set(DiskBus::Usb);
        }
    }

    fn fill_hostdev(&self, hostdev: &mut HostdevCapabilities) {
        hostdev.supported = true;

        // capabilities mode only applies to containers
        hostdev.mode.set(HostdevMode::Subsystem);
        hostdev.startup_policy.set_all();
        hostdev
            .subsys_type
            .extend([HostdevSubsysType::Usb, HostdevSubsysType::Pci]);
        if self.has_flag(FLAG_SCSI_GENERIC) {
            hostdev.subsys_type.set(HostdevSubsysType::Scsi);
        }

        if self.host.kvm && self.has_flag(FLAG_PCI_DEVICE) && self.has_flag(FLAG_NODEFCONFIG) {
            hostdev
                .pci_backend
                .extend([PciBackend::Default, PciBackend::Kvm]);
        }
        if self.host.vfio && self.has_flag(FLAG_VFIO_PCI) {
            hostdev
                .pci_backend
                .extend([PciBackend::Default, PciBackend::Vfio]);
        }
    }
}

impl ProbeSource for QemuCaps {
    fn canonical_machine(&self, name: &str) -> Option<&str> {
        self.find_machine(name).map(|m| m.name.as_str())
    }

    fn default_machine(&self) -> Option<&str> {
        self.machines.first().map(|m| m.name.as_str())
    }

    fn fill_domain_caps(&self, caps: &mut DomainCapabilities, loaders: &[String]) -> Result<()> {
        caps.max_vcpus = caps
            .machine
            .as_deref()
            .map_or(0, |machine| self.machine_max_cpus(machine));

        self.fill_os(&mut caps.os, loaders)?;
        self.fill_disk(&mut caps.disk, caps.machine.as_deref());
        self.fill_hostdev(&mut caps.hostdev);
        Ok(())
    }
}

/// Directory of QEMU capability documents named `<name>.<arch>.xml`.
#[derive(Debug, Clone)]
pub struct QemuCapsDir {
    root: PathBuf,
    host: HostPassthrough,
}

impl QemuCapsDir {
    /// Creates a prober over `root`, detecting passthrough support on the
    /// running host.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            host: HostPassthrough::detect(),
        }
    }

    pub fn with_host(mut self, host: HostPassthrough) -> Self {
        self.host = host;
        self
    }

    pub fn path_for(&self, name: &str, arch: Arch) -> PathBuf {
        self.root.join(format!("{name}.{arch}.xml"))
    }
}

impl Prober for QemuCapsDir {
    fn load(&self, name: &str, arch: Arch) -> Result<Box<dyn ProbeSource>> {
        let path = self.path_for(name, arch);
        let probe_error = |reason: String| Error::Probe {
            name: name.to_string(),
            arch,
            reason,
        };

        let xml = fs::read_to_string(&path)
            .map_err(|e| probe_error(format!("{}: {e}", path.display())))?;
        let caps =
            QemuCaps::parse(&xml).map_err(|e| probe_error(format!("{}: {e}", path.display())))?;
        if caps.arch != arch {
            return Err(probe_error(format!(
                "{} describes {}",
                path.display(),
                caps.arch
            )));
        }

        tracing::debug!(
            "loaded {} (version {}, {} machine types)",
            path.display(),
            caps.version,
            caps.machines.len()
        );
        Ok(Box::new(caps.with_host(self.host)))
    }
}

fn required_attr<'a>(
    node: roxmltree::Node<'a, '_>,
    element: &'static str,
    attribute: &'static str,
) -> std::result::Result<&'a str, QemuCapsError> {
    node.attribute(attribute)
        .ok_or(QemuCapsError::MissingAttribute { element, attribute })
}

fn parse_number(
    node: roxmltree::Node<'_, '_>,
    element: &'static str,
) -> std::result::Result<u64, QemuCapsError> {
    let text = node.text().unwrap_or_default().trim();
    text.parse().map_err(|_| QemuCapsError::InvalidValue {
        element,
        value: text.to_string(),
    })
}
