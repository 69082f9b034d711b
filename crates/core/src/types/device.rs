//! Enumerated dimensions of the capability blocks.
//!
//! Declaration order is significant: it is the order in which members are
//! rendered.

use crate::enum_set::caps_enum;

caps_enum! {
    /// How the firmware image is mapped into the guest.
    pub enum LoaderType {
        Rom => "rom",
        Pflash => "pflash",
    }
}

caps_enum! {
    /// Boolean that can also be left unspecified.
    pub enum TristateBool {
        Absent => "default",
        Yes => "yes",
        No => "no",
    }
}

caps_enum! {
    /// Device a disk is presented to the guest as.
    pub enum DiskDevice {
        Disk => "disk",
        Cdrom => "cdrom",
        Floppy => "floppy",
        Lun => "lun",
    }
}

caps_enum! {
    /// Bus a disk is attached to.
    pub enum DiskBus {
        Ide => "ide",
        Fdc => "fdc",
        Scsi => "scsi",
        Virtio => "virtio",
        Xen => "xen",
        Usb => "usb",
        Uml => "uml",
        Sata => "sata",
        Sd => "sd",
    }
}

caps_enum! {
    pub enum HostdevMode {
        Subsystem => "subsystem",
        Capabilities => "capabilities",
    }
}

caps_enum! {
    /// What to do when an assigned host device is missing at startup.
    pub enum StartupPolicy {
        Default => "default",
        Mandatory => "mandatory",
        Requisite => "requisite",
        Optional => "optional",
    }
}

caps_enum! {
    pub enum HostdevSubsysType {
        Usb => "usb",
        Pci => "pci",
        Scsi => "scsi",
    }
}

caps_enum! {
    /// Host resources that can be handed to container guests.
    pub enum HostdevCapsType {
        Storage => "storage",
        Misc => "misc",
        Net => "net",
    }
}

caps_enum! {
    /// Host mechanism used to pass a PCI device through to the guest.
    pub enum PciBackend {
        Default => "default",
        Kvm => "kvm",
        Vfio => "vfio",
        Xen => "xen",
    }
}
