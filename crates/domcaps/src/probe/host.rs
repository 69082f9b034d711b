use std::fs;
use std::path::Path;

const KVM_DEVICE: &str = "/dev/kvm";
const IOMMU_GROUPS_DIR: &str = "/sys/kernel/iommu_groups";

/// PCI passthrough mechanisms the host can provide.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostPassthrough {
    /// Legacy KVM device assignment.
    pub kvm: bool,
    /// VFIO, which needs at least one IOMMU group.
    pub vfio: bool,
}

impl HostPassthrough {
    pub fn detect() -> Self {
        Self::detect_at(Path::new(KVM_DEVICE), Path::new(IOMMU_GROUPS_DIR))
    }

    fn detect_at(kvm_device: &Path, iommu_groups: &Path) -> Self {
        let kvm = kvm_device.exists();
        let vfio = fs::read_dir(iommu_groups)
            .map(|mut entries| entries.next().is_some())
            .unwrap_or(false);
        tracing::debug!("host passthrough support: kvm={} vfio={}", kvm, vfio);
        Self { kvm, vfio }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn nothing_present() {
        let dir = TempDir::new().unwrap();
        let host = HostPassthrough::detect_at(&dir.path().join("kvm"), &dir.path().join("groups"));
        assert_eq!(host, HostPassthrough::default());
    }

    #[test]
    fn kvm_device_present() {
        let dir = TempDir::new().unwrap();
        let kvm = dir.path().join("kvm");
        fs::write(&kvm, b"").unwrap();
        let host = HostPassthrough::detect_at(&kvm, &dir.path().join("groups"));
        assert!(host.kvm);
        assert!(!host.vfio);
    }

    #[test]
    fn empty_iommu_groups_mean_no_vfio() {
        let dir = TempDir::new().unwrap();
        let groups = dir.path().join("groups");
        fs::create_dir(&groups).unwrap();
        let host = HostPassthrough::detect_at(&dir.path().join("kvm"), &groups);
        assert!(!host.vfio);
    }

    #[test]
    fn populated_iommu_groups_mean_vfio() {
        let dir = TempDir::new().unwrap();
        let groups = dir.path().join("groups");
        fs::create_dir_all(groups.join("0")).unwrap();
        let host = HostPassthrough::detect_at(&dir.path().join("kvm"), &groups);
        assert!(host.vfio);
    }
}
