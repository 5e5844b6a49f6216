use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use pkuport::showdown::ShowdownImporter;

use crate::app_paths::get_app_paths;
use crate::session::{drive, load_dex, write_output};

#[derive(Debug, Args)]
pub struct Opts {
    #[arg(short, long)]
    pub text: PathBuf,
    #[arg(short, long)]
    pub dex: PathBuf,
    #[arg(short, long)]
    pub out: Option<PathBuf>,
    #[arg(long)]
    pub config_dir: Option<PathBuf>,
}

pub fn run(opts: Opts) -> anyhow::Result<()> {
    let settings = get_app_paths(opts.config_dir.as_deref())?.load_settings()?;
    let text = std::fs::read_to_string(&opts.text)
        .with_context(|| format!("could not read {}", opts.text.display()))?;
    let dex = load_dex(&opts.dex)?;

    let pku = drive(ShowdownImporter::port(&text, dex, settings)?, &[], &[])?;
    let mut json = pku.to_json_pretty()?;
    json.push('\n');
    write_output(opts.out.as_deref(), json.as_bytes())
}
