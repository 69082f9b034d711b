mod device;

pub use device::{
    DiskBus, DiskDevice, HostdevCapsType, HostdevMode, HostdevSubsysType, LoaderType, PciBackend,
    StartupPolicy, TristateBool,
};

use crate::enum_set::caps_enum;

caps_enum! {
    /// Host or guest CPU architecture.
    pub enum Arch {
        I686 => "i686",
        X86_64 => "x86_64",
        Armv6l => "armv6l",
        Armv7l => "armv7l",
        Aarch64 => "aarch64",
        Mips => "mips",
        Mipsel => "mipsel",
        Mips64 => "mips64",
        Mips64el => "mips64el",
        Ppc => "ppc",
        Ppc64 => "ppc64",
        Ppc64le => "ppc64le",
        S390 => "s390",
        S390x => "s390x",
        Sparc => "sparc",
        Sparc64 => "sparc64",
    }
}

impl Arch {
    pub fn is_ppc64(self) -> bool {
        matches!(self, Self::Ppc64 | Self::Ppc64le)
    }
}

caps_enum! {
    /// Domain virtualization type, i.e. which driver runs the guest.
    pub enum VirtType {
        Qemu => "qemu",
        Kqemu => "kqemu",
        Kvm => "kvm",
        Xen => "xen",
        Lxc => "lxc",
        Uml => "uml",
        OpenVz => "openvz",
        Test => "test",
        Vmware => "vmware",
        Hyperv => "hyperv",
        Vbox => "vbox",
        Phyp => "phyp",
        Parallels => "parallels",
        Bhyve => "bhyve",
    }
}
