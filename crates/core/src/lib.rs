pub mod capabilities;
pub mod enum_set;
pub mod error;
pub mod types;
pub mod values;

pub use capabilities::{
    DiskCapabilities, DomainCapabilities, HostdevCapabilities, LoaderCapabilities, OsCapabilities,
};
pub use enum_set::{CapsEnum, EnumSet};
pub use error::{Error, Result};
pub use types::{
    Arch, DiskBus, DiskDevice, HostdevCapsType, HostdevMode, HostdevSubsysType, LoaderType,
    PciBackend, StartupPolicy, TristateBool, VirtType,
};
pub use values::StringValues;
