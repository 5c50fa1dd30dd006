use std::process::Command;

use anyhow::{Context, Result};

/// Workspace members that must build on their own, without features pulled
/// in by siblings through workspace unification.
const PACKAGES: &[&str] = &["duebell-domain", "duebell-core", "duebell-infra", "duebell-daemon"];

/// Run `cargo check -p <package>` for each workspace crate in isolation.
pub fn check_packages() -> Result<()> {
    println!("Checking {} duebell packages in isolation...", PACKAGES.len());

    for (index, package) in PACKAGES.iter().enumerate() {
        println!("\n[{}/{}] cargo check -p {package} --all-targets", index + 1, PACKAGES.len());

        let status = Command::new("cargo")
            .args(["check", "-p", package, "--all-targets"])
            .status()
            .with_context(|| format!("Failed to run cargo check for '{package}'"))?;

        if !status.success() {
            anyhow::bail!("Package '{package}' failed to compile on its own");
        }

        println!("✅ {package} compiled successfully");
    }

    println!("\n✅ All {} packages compile in isolation!", PACKAGES.len());

    Ok(())
}
