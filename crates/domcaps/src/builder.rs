use crate::config::DriverConfig;
use crate::probe::Prober;
use domcaps_core::{Arch, DomainCapabilities, EnumSet, Error, PciBackend, Result, VirtType};

/// vCPU ceiling reported by [`CapabilityBuilder::AllSupported`].
pub const ALL_SUPPORTED_MAX_VCPUS: u32 = 255;

/// Loader paths reported by [`CapabilityBuilder::AllSupported`].
pub const ALL_SUPPORTED_LOADERS: [&str; 2] = ["/foo/bar", "/tmp/my_path"];

/// Firmware images known to be present, replacing whatever the probe found.
pub const DEFAULT_LOADER_VALUES: [&str; 2] = [
    "/usr/share/AAVMF/AAVMF_CODE.fd",
    "/usr/share/OVMF/OVMF_CODE.fd",
];

/// PCI passthrough backends asserted for probed hosts. Passthrough support
/// is a property of the host, which the probe data cannot describe.
pub const DEFAULT_PCI_BACKENDS: [PciBackend; 3] =
    [PciBackend::Default, PciBackend::Kvm, PciBackend::Vfio];

/// Populates a [`DomainCapabilities`] from one source of capability data.
pub enum CapabilityBuilder {
    /// Leaves every block unsupported.
    Empty,
    /// Marks every block supported with every enum member set.
    AllSupported,
    /// Merges real emulator capability data.
    Probed(ProbedHypervisor),
}

impl CapabilityBuilder {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::AllSupported => "all-supported",
            Self::Probed(_) => "probed",
        }
    }

    /// Populates `caps` in place.
    ///
    /// On error `caps` may be partially populated and must be discarded.
    pub fn populate(&self, caps: &mut DomainCapabilities) -> Result<()> {
        tracing::debug!(
            "populating {} capabilities for {} ({}, {})",
            self.name(),
            caps.path,
            caps.arch,
            caps.virt_type
        );
        match self {
            Self::Empty => Ok(()),
            Self::AllSupported => fill_all_supported(caps),
            Self::Probed(probed) => probed.populate(caps),
        }
    }

    /// Creates a description for the given identity and populates it.
    ///
    /// Only a fully populated description is ever returned.
    pub fn build(
        &self,
        path: impl Into<String>,
        machine: Option<String>,
        arch: Arch,
        virt_type: VirtType,
    ) -> Result<DomainCapabilities> {
        let mut caps = DomainCapabilities::new(path, machine, arch, virt_type);
        self.populate(&mut caps)?;
        Ok(caps)
    }
}

impl From<ProbedHypervisor> for CapabilityBuilder {
    fn from(probed: ProbedHypervisor) -> Self {
        Self::Probed(probed)
    }
}

fn fill_all_supported(caps: &mut DomainCapabilities) -> Result<()> {
    caps.max_vcpus = ALL_SUPPORTED_MAX_VCPUS;

    let os = &mut caps.os;
    os.supported = true;
    os.loader.supported = true;
    os.loader.types.set_all();
    os.loader.readonly.set_all();
    os.loader.values.append(ALL_SUPPORTED_LOADERS)?;

    let disk = &mut caps.disk;
    disk.supported = true;
    disk.disk_device.set_all();
    disk.bus.set_all();

    let hostdev = &mut caps.hostdev;
    hostdev.supported = true;
    hostdev.mode.set_all();
    hostdev.startup_policy.set_all();
    hostdev.subsys_type.set_all();
    hostdev.caps_type.set_all();
    hostdev.pci_backend.set_all();
    Ok(())
}

/// Capability data probed from a real emulator, with host-specific facts
/// layered on top.
///
/// Populating runs these steps in order:
///
/// 1. load the probe data named `caps_name` for the description's arch,
/// 2. resolve the requested machine type, or pick the probe's default,
/// 3. let the probe fill every block,
/// 4. assert the PCI passthrough backends,
/// 5. replace the loader values with the known-present firmware images.
pub struct ProbedHypervisor {
    caps_name: String,
    prober: Box<dyn Prober>,
    config: DriverConfig,
    pci_backends: EnumSet<PciBackend>,
    loader_values: Vec<String>,
}

impl ProbedHypervisor {
    pub fn new(caps_name: impl Into<String>, prober: impl Prober + 'static) -> Self {
        Self {
            caps_name: caps_name.into(),
            prober: Box::new(prober),
            config: DriverConfig::default(),
            pci_backends: DEFAULT_PCI_BACKENDS.into_iter().collect(),
            loader_values: DEFAULT_LOADER_VALUES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Uses the firmware list of `config` for the probe's generic fill.
    pub fn with_config(mut self, config: DriverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_pci_backends(mut self, backends: impl IntoIterator<Item = PciBackend>) -> Self {
        self.pci_backends = backends.into_iter().collect();
        self
    }

    pub fn with_loader_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.loader_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn caps_name(&self) -> &str {
        &self.caps_name
    }

    fn populate(&self, caps: &mut DomainCapabilities) -> Result<()> {
        let loaders = self.config.loaders()?;
        let source = self.prober.load(&self.caps_name, caps.arch)?;

        let machine = match caps.machine.as_deref() {
            Some(requested) => source
                .canonical_machine(requested)
                .ok_or_else(|| Error::Resolution {
                    machine: requested.to_string(),
                    emulator: caps.path.clone(),
                    arch: caps.arch,
                })?,
            None => source.default_machine().ok_or_else(|| Error::Probe {
                name: self.caps_name.clone(),
                arch: caps.arch,
                reason: "no machine types declared".to_string(),
            })?,
        };
        tracing::debug!("resolved machine type {:?} to {}", caps.machine, machine);
        caps.machine = Some(machine.to_string());

        source.fill_domain_caps(caps, &loaders)?;

        caps.hostdev.pci_backend = self.pci_backends;

        let values = &mut caps.os.loader.values;
        if values.as_slice() != self.loader_values.as_slice() {
            tracing::trace!(
                "replacing probed loader values {:?} with {:?}",
                values.as_slice(),
                self.loader_values
            );
        }
        values.clear();
        values.append(&self.loader_values)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::ProbeSource;
    use domcaps_core::{CapsEnum, DiskBus, HostdevCapsType, LoaderType};
    use std::cell::Cell;
    use std::rc::Rc;

    /// In-memory probe data with a single aliased machine.
    struct FakeSource {
        fill_calls: Rc<Cell<usize>>,
    }

    impl ProbeSource for FakeSource {
        fn canonical_machine(&self, name: &str) -> Option<&str> {
            match name {
                "pc" | "pc-i440fx-2.0" => Some("pc-i440fx-2.0"),
                _ => None,
            }
        }

        fn default_machine(&self) -> Option<&str> {
            Some("pc-i440fx-2.0")
        }

        fn fill_domain_caps(
            &self,
            caps: &mut DomainCapabilities,
            loaders: &[String],
        ) -> Result<()> {
            self.fill_calls.set(self.fill_calls.get() + 1);
            caps.max_vcpus = 128;
            caps.os.supported = true;
            caps.os.loader.supported = true;
            caps.os.loader.values.append(loaders)?;
            caps.os.loader.values.append(["/usr/share/OVMF/OVMF_CODE.fd"])?;
            caps.hostdev.supported = true;
            caps.hostdev.pci_backend.set(PciBackend::Xen);
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeProber {
        missing: bool,
        fill_calls: Rc<Cell<usize>>,
    }

    impl Prober for FakeProber {
        fn load(&self, name: &str, arch: Arch) -> Result<Box<dyn ProbeSource>> {
            if self.missing {
                return Err(Error::Probe {
                    name: name.to_string(),
                    arch,
                    reason: "not found".to_string(),
                });
            }
            Ok(Box::new(FakeSource {
                fill_calls: Rc::clone(&self.fill_calls),
            }))
        }
    }

    fn identity(machine: Option<&str>) -> DomainCapabilities {
        DomainCapabilities::new(
            "/usr/bin/qemu-system-x86_64",
            machine.map(str::to_string),
            Arch::X86_64,
            VirtType::Kvm,
        )
    }

    mod empty {
        use super::*;

        #[test]
        fn leaves_description_untouched() {
            let mut caps = identity(Some("my-machine-type"));
            CapabilityBuilder::Empty.populate(&mut caps).unwrap();
            assert_eq!(caps, identity(Some("my-machine-type")));
        }
    }

    mod all_supported {
        use super::*;

        fn build() -> DomainCapabilities {
            CapabilityBuilder::AllSupported
                .build(
                    "/bin/emulatorbin",
                    Some("my-machine-type".to_string()),
                    Arch::X86_64,
                    VirtType::Kvm,
                )
                .unwrap()
        }

        #[test]
        fn marks_everything_supported() {
            let caps = build();
            assert_eq!(caps.max_vcpus, ALL_SUPPORTED_MAX_VCPUS);
            assert!(caps.os.supported);
            assert!(caps.os.loader.supported);
            assert!(caps.disk.supported);
            assert!(caps.hostdev.supported);
        }

        #[test]
        fn sets_every_enum_member() {
            let caps = build();
            assert_eq!(caps.os.loader.types.len(), LoaderType::ALL.len());
            assert_eq!(caps.disk.bus.len(), DiskBus::ALL.len());
            assert_eq!(caps.hostdev.caps_type.len(), HostdevCapsType::ALL.len());
            assert_eq!(caps.hostdev.pci_backend.len(), PciBackend::ALL.len());
        }

        #[test]
        fn lists_illustrative_loaders() {
            let caps = build();
            assert_eq!(caps.os.loader.values.as_slice(), ALL_SUPPORTED_LOADERS);
        }

        #[test]
        fn keeps_requested_machine() {
            assert_eq!(build().machine.as_deref(), Some("my-machine-type"));
        }
    }

    mod probed {
        use super::*;

        fn builder(prober: FakeProber) -> CapabilityBuilder {
            ProbedHypervisor::new("fake", prober).into()
        }

        #[test]
        fn defaults_to_probe_machine() {
            let caps = builder(FakeProber::default())
                .build("/usr/bin/qemu-system-x86_64", None, Arch::X86_64, VirtType::Kvm)
                .unwrap();
            assert_eq!(caps.machine.as_deref(), Some("pc-i440fx-2.0"));
            assert_eq!(caps.max_vcpus, 128);
        }

        #[test]
        fn canonicalizes_alias() {
            let mut caps = identity(Some("pc"));
            builder(FakeProber::default()).populate(&mut caps).unwrap();
            assert_eq!(caps.machine.as_deref(), Some("pc-i440fx-2.0"));
        }

        #[test]
        fn unknown_machine_is_resolution_error() {
            let prober = FakeProber::default();
            let fill_calls = Rc::clone(&prober.fill_calls);
            let mut caps = identity(Some("my-machine-type"));

            let err = builder(prober).populate(&mut caps).unwrap_err();

            assert!(matches!(
                err,
                Error::Resolution { ref machine, arch: Arch::X86_64, .. } if machine == "my-machine-type"
            ));
            assert_eq!(fill_calls.get(), 0);
            assert!(!caps.os.supported);
        }

        #[test]
        fn build_returns_nothing_on_resolution_error() {
            let result = builder(FakeProber::default()).build(
                "/usr/bin/qemu-system-x86_64",
                Some("my-machine-type".to_string()),
                Arch::X86_64,
                VirtType::Kvm,
            );
            assert!(matches!(result, Err(Error::Resolution { .. })));
        }

        #[test]
        fn missing_probe_data_is_probe_error() {
            let prober = FakeProber {
                missing: true,
                ..FakeProber::default()
            };
            let mut caps = identity(None);
            let err = builder(prober).populate(&mut caps).unwrap_err();
            assert!(matches!(err, Error::Probe { .. }));
            assert!(caps.machine.is_none());
        }

        #[test]
        fn pci_backends_are_replaced() {
            let mut caps = identity(None);
            builder(FakeProber::default()).populate(&mut caps).unwrap();
            assert_eq!(caps.hostdev.pci_backend.to_vec(), DEFAULT_PCI_BACKENDS);
        }

        #[test]
        fn loader_values_are_replaced_not_appended() {
            let mut caps = identity(None);
            builder(FakeProber::default()).populate(&mut caps).unwrap();
            assert_eq!(caps.os.loader.values.as_slice(), DEFAULT_LOADER_VALUES);
        }

        #[test]
        fn config_loaders_reach_probe() {
            let prober = FakeProber::default();
            let fill_calls = Rc::clone(&prober.fill_calls);
            let config = DriverConfig::from_toml(r#"nvram = ["/fw/CODE.fd:/fw/VARS.fd"]"#).unwrap();
            let builder: CapabilityBuilder = ProbedHypervisor::new("fake", prober)
                .with_config(config)
                .with_loader_values(["/fw/CODE.fd"])
                .into();

            let mut caps = identity(None);
            builder.populate(&mut caps).unwrap();

            assert_eq!(fill_calls.get(), 1);
            assert_eq!(caps.os.loader.values.as_slice(), ["/fw/CODE.fd"]);
        }

        #[test]
        fn custom_pci_backends() {
            let builder: CapabilityBuilder = ProbedHypervisor::new("fake", FakeProber::default())
                .with_pci_backends([PciBackend::Vfio])
                .into();
            let mut caps = identity(None);
            builder.populate(&mut caps).unwrap();
            assert_eq!(caps.hostdev.pci_backend.to_vec(), [PciBackend::Vfio]);
        }

        #[test]
        fn names_variant() {
            assert_eq!(builder(FakeProber::default()).name(), "probed");
            assert_eq!(CapabilityBuilder::Empty.name(), "empty");
            assert_eq!(CapabilityBuilder::AllSupported.name(), "all-supported");
        }
    }
}
