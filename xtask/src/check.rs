use anyhow::{Context, Result};
use colored::Colorize;
use std::process::Command;
use std::time::Instant;

pub fn run() -> Result<()> {
    println!();
    println!("{}", "🔍 Checking workspace...".cyan().bold());
    println!();

    let total_start = Instant::now();

    // Check 1: Full workspace, default features
    println!("{}", "  Checking workspace (host)...".cyan());
    let ws_start = Instant::now();

    let ws_output = Command::new("cargo")
        .args(["check", "--workspace", "--all-targets"])
        .output()
        .context("Failed to check workspace")?;

    if !ws_output.status.success() {
        eprintln!("{}", "  ✗ Workspace check failed".red().bold());
        eprintln!();
        eprintln!("{}", String::from_utf8_lossy(&ws_output.stderr));
        anyhow::bail!("Workspace check failed");
    }

    println!(
        "{}",
        format!(
            "  ✓ Workspace check passed in {:.2}s",
            ws_start.elapsed().as_secs_f64()
        )
        .green()
    );
    println!();

    // Check 2: Library crates without default features — the configuration
    // an embedded integrator actually builds (no_std, no test shims).
    println!("{}", "  Checking no_std configuration...".cyan());
    let nostd_start = Instant::now();

    let nostd_output = Command::new("cargo")
        .args([
            "check",
            "-p",
            "cache-sync",
            "-p",
            "soc-caps",
            "--no-default-features",
        ])
        .output()
        .context("Failed to check no_std configuration")?;

    if !nostd_output.status.success() {
        eprintln!("{}", "  ✗ no_std check failed".red().bold());
        eprintln!();
        eprintln!("{}", String::from_utf8_lossy(&nostd_output.stderr));
        anyhow::bail!("no_std check failed");
    }

    println!(
        "{}",
        format!(
            "  ✓ no_std check passed in {:.2}s",
            nostd_start.elapsed().as_secs_f64()
        )
        .green()
    );
    println!();

    // Check 3: defmt feature wiring (derives compile, trace points resolve)
    println!("{}", "  Checking defmt feature...".cyan());
    let defmt_start = Instant::now();

    let defmt_output = Command::new("cargo")
        .args(["check", "-p", "cache-sync", "--features", "defmt"])
        .output()
        .context("Failed to check defmt feature")?;

    if !defmt_output.status.success() {
        eprintln!("{}", "  ✗ defmt feature check failed".red().bold());
        eprintln!();
        eprintln!("{}", String::from_utf8_lossy(&defmt_output.stderr));
        anyhow::bail!("defmt feature check failed");
    }

    println!(
        "{}",
        format!(
            "  ✓ defmt feature check passed in {:.2}s",
            defmt_start.elapsed().as_secs_f64()
        )
        .green()
    );
    println!();

    // Check 4: Clippy lints
    println!("{}", "  Running clippy lints...".cyan());
    let clippy_start = Instant::now();

    let clippy_output = Command::new("cargo")
        .args(["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"])
        .output()
        .context("Failed to run clippy")?;

    if !clippy_output.status.success() {
        eprintln!("{}", "  ⚠ Clippy warnings found".yellow().bold());
        eprintln!();
        eprintln!("{}", String::from_utf8_lossy(&clippy_output.stderr));
        // Don't fail on clippy warnings, just show them
    } else {
        println!(
            "{}",
            format!(
                "  ✓ Clippy passed in {:.2}s",
                clippy_start.elapsed().as_secs_f64()
            )
            .green()
        );
    }
    println!();

    // Check 5: Format check
    println!("{}", "  Checking code formatting...".cyan());

    let fmt_output = Command::new("cargo")
        .args(["fmt", "--all", "--check"])
        .output()
        .context("Failed to run cargo fmt")?;

    if !fmt_output.status.success() {
        eprintln!("{}", "  ⚠ Formatting issues found".yellow().bold());
        eprintln!("     Run 'cargo fmt --all' to fix");
        // Don't fail on format issues
    } else {
        println!("{}", "  ✓ Formatting check passed".green());
    }
    println!();

    println!(
        "{}",
        format!(
            "✓ All checks completed in {:.2}s",
            total_start.elapsed().as_secs_f64()
        )
        .green()
        .bold()
    );
    println!();

    Ok(())
}
