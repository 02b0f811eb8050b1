use clap::Parser;

use cryptarch_installer::{cli, logging, pipeline, preflight};

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    logging::init();

    match &cli.command {
        cli::Command::Preflight => preflight::run()?,
        cli::Command::Plan(args) => {
            let cfg = args.to_config()?;
            let plan = pipeline::build_plan(&cfg);
            print!("{plan}");
        }
        cli::Command::Install(args) => {
            let cfg = args.to_config()?;
            pipeline::run(&cfg, cli.dry_run, args.yes_i_know)?;
        }
    }
    Ok(())
}
