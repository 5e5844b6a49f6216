use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, ValueEnum};
use pkuport::gen3::Pk3Exporter;
use pkuport::showdown::ShowdownExporter;
use pkuport::Pku;

use crate::app_paths::get_app_paths;
use crate::session::{drive, load_dex, parse_choice, parse_text_entry, write_output};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Pk3,
    Showdown,
}

#[derive(Debug, Args)]
pub struct Opts {
    #[arg(short, long)]
    pub pku: PathBuf,
    #[arg(short, long)]
    pub dex: PathBuf,
    #[arg(short, long, value_enum)]
    pub format: Format,
    /// Write the 100 byte party layout of a pk3
    #[arg(long)]
    pub party: bool,
    /// Answer a choice by option number, e.g. `--choice PID=1`
    #[arg(long = "choice", value_parser = parse_choice)]
    pub choices: Vec<(String, usize)>,
    /// Answer a choice with a typed value, e.g. `--text PID=0x1234abcd`
    #[arg(long = "text", value_parser = parse_text_entry)]
    pub texts: Vec<(String, String)>,
    #[arg(short, long)]
    pub out: Option<PathBuf>,
    #[arg(long)]
    pub config_dir: Option<PathBuf>,
}

pub fn run(opts: Opts) -> anyhow::Result<()> {
    let paths = get_app_paths(opts.config_dir.as_deref())?;
    let mut settings = paths.load_settings()?;
    if opts.party {
        settings.pk3_party_format = true;
    }

    let file = File::open(&opts.pku).with_context(|| format!("could not open {}", opts.pku.display()))?;
    let pku = Pku::from_reader(BufReader::new(file))
        .with_context(|| format!("{} is not a pku", opts.pku.display()))?;
    let dex = load_dex(&opts.dex)?;
    log::info!("Exporting {} to {:?}", opts.pku.display(), opts.format);

    let output = match opts.format {
        Format::Pk3 => drive(Pk3Exporter::port(&pku, dex, settings)?, &opts.choices, &opts.texts)?,
        Format::Showdown => drive(ShowdownExporter::port(&pku, dex, settings)?, &opts.choices, &opts.texts)?.into_bytes(),
    };
    write_output(opts.out.as_deref(), &output)
}
