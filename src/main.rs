//! `fsctl`: drive the filesystem adapter from the command line

use anyhow::Result;
use clap::Parser;
use fslib::cli::{execute, Args, OutputConfig};
use fslib::NativeFs;
use tracing_subscriber::EnvFilter;

fn init_logging(output: &OutputConfig) {
    let level = output.level();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "fsctl={level},fslib={level},compio_fs_callback={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[compio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    args.validate()?;
    init_logging(&args.output);

    let fs = NativeFs::new();
    let mut stdout = std::io::stdout().lock();
    execute(&fs, &args, &mut stdout).await
}
