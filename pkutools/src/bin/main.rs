use clap::{Parser, Subcommand};
use pkutools::{export, import, import_showdown, inspect};

#[derive(Parser)]
struct Opts {
    #[command(subcommand)]
    tool: ToolOpts,
}

#[derive(Subcommand)]
enum ToolOpts {
    Export(export::Opts),
    Import(import::Opts),
    ImportShowdown(import_showdown::Opts),
    Inspect(inspect::Opts),
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let opts = Opts::parse();
    match opts.tool {
        ToolOpts::Export(opts) => export::run(opts),
        ToolOpts::Import(opts) => import::run(opts),
        ToolOpts::ImportShowdown(opts) => import_showdown::run(opts),
        ToolOpts::Inspect(opts) => inspect::run(opts),
    }
}
