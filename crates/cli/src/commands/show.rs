//! The `show` command - builds and prints a domain capabilities document.

use anyhow::{Context, bail};
use clap::{Args, ValueEnum};
use domcaps::{
    Arch, CapabilityBuilder, DomainCapabilities, DriverConfig, ProbedHypervisor, QemuCapsDir,
    VirtType, format_xml,
};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Nothing supported
    Empty,
    /// Everything supported, for exercising consumers
    All,
    /// Probed from QEMU capability data
    Probed,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Path to the emulator binary
    #[arg(long)]
    emulator: String,

    /// Guest architecture
    #[arg(long, default_value = "x86_64")]
    arch: Arch,

    /// Domain virtualization type
    #[arg(long, default_value = "kvm")]
    virt_type: VirtType,

    /// Machine type or alias (defaults to the emulator's default machine)
    #[arg(long)]
    machine: Option<String>,

    /// Where capability data comes from
    #[arg(long, value_enum, default_value_t = SourceKind::Probed)]
    source: SourceKind,

    /// Name of the QEMU capability document, without the `.<arch>.xml` suffix
    #[arg(long)]
    caps_name: Option<String>,

    /// Directory holding QEMU capability documents
    #[arg(long)]
    caps_dir: Option<PathBuf>,

    /// Path to a TOML driver configuration file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long)]
    json: bool,
}

pub fn run(args: ShowArgs) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => DriverConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => DriverConfig::default(),
    };

    let builder = builder_for(&args, config)?;
    let caps = builder
        .build(
            args.emulator.clone(),
            args.machine.clone(),
            args.arch,
            args.virt_type,
        )
        .with_context(|| {
            format!(
                "failed to build domain capabilities for {} (machine {}, {}, {})",
                args.emulator,
                args.machine.as_deref().unwrap_or("default"),
                args.arch,
                args.virt_type
            )
        })?;

    if args.json {
        let json = serde_json::to_string_pretty(&supported_only(&caps))
            .context("failed to format domain capabilities")?;
        println!("{json}");
    } else {
        print!("{}", format_xml(&caps));
    }
    Ok(())
}

fn builder_for(args: &ShowArgs, config: DriverConfig) -> anyhow::Result<CapabilityBuilder> {
    let builder = match args.source {
        SourceKind::Empty => CapabilityBuilder::Empty,
        SourceKind::All => CapabilityBuilder::AllSupported,
        SourceKind::Probed => {
            let Some(caps_name) = &args.caps_name else {
                bail!("--caps-name is required for probed capabilities");
            };
            let Some(caps_dir) = args.caps_dir.clone().or_else(|| config.capabilities_dir.clone())
            else {
                bail!("--caps-dir or capabilities_dir in the config is required for probed capabilities");
            };
            tracing::debug!("probing {} in {}", caps_name, caps_dir.display());
            ProbedHypervisor::new(caps_name.clone(), QemuCapsDir::new(caps_dir))
                .with_config(config)
                .into()
        }
    };
    Ok(builder)
}

/// Copy of `caps` with the children of unsupported blocks emptied, matching
/// what the XML rendering shows.
fn supported_only(caps: &DomainCapabilities) -> DomainCapabilities {
    let mut caps = caps.clone();
    if !caps.os.supported {
        caps.os = Default::default();
    }
    if !caps.os.loader.supported {
        caps.os.loader = Default::default();
    }
    if !caps.disk.supported {
        caps.disk = Default::default();
    }
    if !caps.hostdev.supported {
        caps.hostdev = Default::default();
    }
    caps
}

#[cfg(test)]
mod tests {
    use super::*;
    use domcaps::PciBackend;

    fn args(source: SourceKind) -> ShowArgs {
        ShowArgs {
            emulator: "/bin/emulatorbin".to_string(),
            arch: Arch::X86_64,
            virt_type: VirtType::Kvm,
            machine: None,
            source,
            caps_name: None,
            caps_dir: None,
            config: None,
            json: false,
        }
    }

    #[test]
    fn probed_requires_caps_name() {
        let err = builder_for(&args(SourceKind::Probed), DriverConfig::default())
            .err()
            .unwrap();
        assert!(err.to_string().contains("--caps-name"));
    }

    #[test]
    fn probed_requires_caps_dir() {
        let mut args = args(SourceKind::Probed);
        args.caps_name = Some("caps_1.6.50-1".to_string());
        let err = builder_for(&args, DriverConfig::default()).err().unwrap();
        assert!(err.to_string().contains("--caps-dir"));
    }

    #[test]
    fn probed_uses_config_dir() {
        let mut args = args(SourceKind::Probed);
        args.caps_name = Some("caps_1.6.50-1".to_string());
        let config = DriverConfig {
            capabilities_dir: Some(PathBuf::from("/var/cache/domcaps")),
            ..DriverConfig::default()
        };
        let builder = builder_for(&args, config).unwrap();
        assert_eq!(builder.name(), "probed");
    }

    #[test]
    fn static_sources() {
        let builder = builder_for(&args(SourceKind::All), DriverConfig::default()).unwrap();
        assert_eq!(builder.name(), "all-supported");
        let builder = builder_for(&args(SourceKind::Empty), DriverConfig::default()).unwrap();
        assert_eq!(builder.name(), "empty");
    }

    #[test]
    fn supported_only_drops_stale_children() {
        let mut caps = CapabilityBuilder::Empty
            .build("/bin/emulatorbin", None, Arch::X86_64, VirtType::Kvm)
            .unwrap();
        caps.hostdev.pci_backend.set(PciBackend::Vfio);
        caps.disk.supported = true;
        caps.disk.bus.set_all();

        let gated = supported_only(&caps);
        assert!(gated.hostdev.pci_backend.is_empty());
        assert_eq!(gated.disk.bus, caps.disk.bus);
    }
}
