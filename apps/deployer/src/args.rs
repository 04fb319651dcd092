//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, PartialEq, Eq, Parser)]
#[command(name = "staticship")]
#[command(about = "Deploy local files to the static hosting platform")]
#[command(version)]
pub struct Args {
    /// Files or directories to deploy
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Label attached to the deployment (repeatable)
    #[arg(long = "label", value_name = "NAME")]
    pub labels: Vec<String>,

    /// Keep the common parent directory instead of flattening it
    #[arg(long)]
    pub preserve_dirs: bool,

    /// Skip SPA detection
    #[arg(long)]
    pub no_spa: bool,
}
