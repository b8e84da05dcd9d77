// Licensed under the Apache-2.0 license

use anyhow::{bail, Context, Result};
use std::process::Command;
use std::str::FromStr;

use crate::FIRMWARE_BIN;

fn bloat_command(release: bool, target: &str) -> Command {
    let mut cmd = Command::new("cargo");
    cmd.arg("bloat");
    if release {
        cmd.arg("--release");
    }
    cmd.args(["--target", target]);
    cmd.args(["--bin", FIRMWARE_BIN, "--features", "firmware"]);
    cmd
}

/// Run cargo bloat on the firmware image and print the result.
pub fn analyze_bloat(release: bool, target: &str, format: BloatFormat) -> Result<()> {
    println!("Running binary size analysis...");

    let mut cmd = bloat_command(release, target);
    if format == BloatFormat::Json {
        cmd.arg("--message-format=json");
    }

    let output = cmd.output().context(
        "Failed to run cargo bloat - make sure it's installed with 'cargo install cargo-bloat'",
    )?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("cargo bloat failed: {}", stderr);
    }

    print!("{}", String::from_utf8_lossy(&output.stdout));
    Ok(())
}

/// Write per-function, per-crate and driver-only views to `output_dir`.
pub fn generate_report(release: bool, target: &str, output_dir: &str) -> Result<()> {
    println!("Generating binary size report...");

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory: {}", output_dir))?;

    let reports: [(&str, &[&str]); 3] = [
        ("functions", &["-n", "40"]),
        ("crates", &["--crates"]),
        ("drivers", &["--filter", "mbsoc_ddk", "-n", "0"]),
    ];

    let mut failed = Vec::new();
    for (name, flags) in reports {
        let output_file = format!("{}/bloat_{}.txt", output_dir, name);

        let output = bloat_command(release, target)
            .args(flags)
            .output()
            .with_context(|| format!("Failed to generate {} report", name))?;

        if output.status.success() {
            std::fs::write(&output_file, &output.stdout)
                .with_context(|| format!("Failed to write report to {}", output_file))?;
            println!("Generated {}", output_file);
        } else {
            failed.push(name);
        }
    }

    if !failed.is_empty() {
        bail!("cargo bloat failed for: {}", failed.join(", "));
    }
    println!("Binary size report generated in {}", output_dir);
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BloatFormat {
    Table,
    Json,
}

impl FromStr for BloatFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            other => bail!("unknown bloat format '{other}' (expected table or json)"),
        }
    }
}
