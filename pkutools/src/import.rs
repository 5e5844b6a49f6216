use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use pkuport::gen3::Pk3Importer;

use crate::app_paths::get_app_paths;
use crate::session::{drive, load_dex, write_output};

#[derive(Debug, Args)]
pub struct Opts {
    #[arg(long)]
    pub pk3: PathBuf,
    #[arg(short, long)]
    pub dex: PathBuf,
    #[arg(short, long)]
    pub out: Option<PathBuf>,
    #[arg(long)]
    pub config_dir: Option<PathBuf>,
}

pub fn run(opts: Opts) -> anyhow::Result<()> {
    let settings = get_app_paths(opts.config_dir.as_deref())?.load_settings()?;
    let raw = std::fs::read(&opts.pk3).with_context(|| format!("could not read {}", opts.pk3.display()))?;
    let dex = load_dex(&opts.dex)?;

    let pku = drive(Pk3Importer::port(&raw, dex, settings)?, &[], &[])?;
    let mut json = pku.to_json_pretty()?;
    json.push('\n');
    write_output(opts.out.as_deref(), json.as_bytes())
}
