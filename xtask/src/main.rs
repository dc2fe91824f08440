//! xtask for bulkhash - build automation and tooling
//!
//! This binary provides development tasks like man page generation.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use std::fs;
use std::path::Path;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "xtask", about = "Build automation for bulkhash")]
enum Task {
    /// Generate man pages from clap definitions
    GenerateManPages {
        /// Output directory for man pages (default: ./man)
        #[arg(short, long, default_value = "man")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let task = Task::parse();

    match task {
        Task::GenerateManPages { output } => generate_man_pages(&output)?,
    }

    Ok(())
}

fn render(cmd: clap::Command, path: &Path) -> Result<()> {
    let file = fs::File::create(path)
        .with_context(|| format!("Failed to create man page: {}", path.display()))?;
    clap_mangen::Man::new(cmd).render(&mut std::io::BufWriter::new(file))?;
    println!("✓ Generated: {}", path.display());
    Ok(())
}

fn generate_man_pages(output_dir: &Path) -> Result<()> {
    println!("Generating man pages...");

    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

    let cmd = bulkhasher::cli::Cli::command();
    render(cmd.clone(), &output_dir.join("bulkhash.1"))?;

    // One page per subcommand, skipping shell completion
    for subcmd in cmd.get_subcommands().filter(|s| s.get_name() != "completion") {
        let name = format!("bulkhash-{}", subcmd.get_name());
        render(subcmd.clone(), &output_dir.join(format!("{name}.1")))?;
    }

    println!(
        "\nMan pages successfully generated in: {}",
        output_dir.display()
    );
    println!("\nTo view the man pages:");
    println!("  man {}/bulkhash.1", output_dir.display());

    Ok(())
}
