use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use recovery_dtgen::{assemble, open_image, Config, DeviceTree, TreeManifest, Unpacker};

/// Generate a recovery device tree from a boot or recovery image.
#[derive(Parser, Debug)]
#[command(name = "recovery-dtgen", version, about)]
struct Cli {
    /// Image file, or a directory already unpacked by Android Image Kitchen
    image: PathBuf,

    /// Output root; the tree lands in <OUTPUT>/<manufacturer>/<codename>
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Commit the generated tree to a git repository
    #[arg(long)]
    git: bool,

    /// Android Image Kitchen checkout used to unpack image files
    #[arg(long, value_name = "DIR")]
    aik: Option<PathBuf>,

    /// Config file (default: ~/.config/recovery-dtgen/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    let config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    let output = cli.output.clone().unwrap_or_else(|| config.output_dir.clone());
    let aik_dir = cli.aik.clone().or_else(|| config.aik_dir.clone());

    let unpacker = open_image(&cli.image, aik_dir.as_deref())
        .with_context(|| format!("opening '{}'", cli.image.display()))?;

    let result = generate(&cli, &config, &output, unpacker.as_ref());
    if let Err(e) = unpacker.cleanup() {
        warn!("Cleanup failed: {e}");
    }
    let path = result?;

    println!("{}", path.display());
    Ok(())
}

fn generate(cli: &Cli, config: &Config, output: &Path, unpacker: &dyn Unpacker) -> Result<PathBuf> {
    let info = unpacker
        .unpack(&cli.image)
        .with_context(|| format!("unpacking '{}'", cli.image.display()))?;
    let tree = DeviceTree::new(&cli.image, info).context("reading device information")?;

    let recorder = (cli.git || config.snapshot).then(|| config.recorder());
    let path = assemble(&tree, output, recorder.as_ref())
        .with_context(|| format!("assembling device tree in '{}'", output.display()))?;

    let manifest = TreeManifest::scan(&path).context("hashing generated tree")?;
    info!(
        "Done: {} files, tree digest {}",
        manifest.len(),
        manifest.digest
    );
    Ok(path)
}
