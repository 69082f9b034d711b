//! The `version` command - shows version information.

use clap::Args;

#[derive(Args)]
pub struct VersionArgs {}

pub fn run(_args: VersionArgs) {
    println!("domcaps {}", env!("CARGO_PKG_VERSION"));
}
