// Licensed under the Apache-2.0 license

use anyhow::{bail, Context, Result};
use std::env;
use std::path::{Path, PathBuf};
use std::process::Command;

mod bloat;

use bloat::BloatFormat;

/// Firmware target of the soft SoC.
pub const TARGET: &str = "thumbv6m-none-eabi";
pub const FIRMWARE_BIN: &str = "mbsoc-fw";

fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let cmd = args.next();
    let rest: Vec<String> = args.collect();
    let release = rest.iter().any(|a| a == "--release");

    match cmd.as_deref() {
        Some("build") => build(release, rest.iter().any(|a| a == "--functional")),
        Some("test") => test(),
        Some("bloat") => {
            let format = match flag_value(&rest, "--format") {
                Some(f) => f.parse()?,
                None => BloatFormat::Table,
            };
            bloat::analyze_bloat(release, TARGET, format)
        }
        Some("bloat-report") => {
            let out = flag_value(&rest, "--out").unwrap_or("target/bloat");
            bloat::generate_report(release, TARGET, out)
        }
        _ => usage(),
    }
}

fn usage() -> Result<()> {
    println!("Usage:");
    println!("  cargo xtask build [--release] [--functional]");
    println!("  cargo xtask test");
    println!("  cargo xtask bloat [--release] [--format table|json]");
    println!("  cargo xtask bloat-report [--release] [--out <dir>]");
    bail!("unknown xtask command")
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn repo_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn cargo(args: &[&str]) -> Result<()> {
    println!("cargo {}", args.join(" "));
    let status = Command::new(env::var("CARGO").unwrap_or_else(|_| "cargo".into()))
        .current_dir(repo_root())
        .args(args)
        .status()
        .context("failed to spawn cargo")?;
    if !status.success() {
        bail!("cargo {} failed with {status}", args.join(" "));
    }
    Ok(())
}

/// Build the firmware image; `functional` adds the on-target test suites.
fn build(release: bool, functional: bool) -> Result<()> {
    let features = if functional {
        "firmware,test-timer"
    } else {
        "firmware"
    };
    let mut args = vec![
        "build",
        "--bin",
        FIRMWARE_BIN,
        "--target",
        TARGET,
        "--features",
        features,
    ];
    if release {
        args.push("--release");
    }
    cargo(&args)
}

/// Host unit tests of the driver library.
fn test() -> Result<()> {
    cargo(&["test", "--package", "mbsoc-ddk", "--lib"])
}
