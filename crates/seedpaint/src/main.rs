mod cli;
mod headless;
mod orchestrator;
mod paths;
mod run;

use anyhow::{Context, Result};
use cli::{Command, ConfigArgs};
use paths::AppPaths;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    match cli.command {
        Some(Command::Config(args)) => print_config(args),
        Some(Command::Paths) => print_paths(),
        None => run::run(cli.run),
    }
}

fn print_config(args: ConfigArgs) -> Result<()> {
    let paths = AppPaths::discover()?;
    let settings = run::load_settings(&paths, args.config.as_deref())?;
    let builder = run::config_builder(&settings, args.palettes.as_deref(), false)?;
    let config = builder.build(args.seed.as_deref());
    let json =
        serde_json::to_string_pretty(&config).context("failed to serialise configuration")?;
    println!("{json}");
    Ok(())
}

fn print_paths() -> Result<()> {
    let paths = AppPaths::discover()?;
    println!("Seedpaint directories:");
    println!("  config:     {}", paths.config_dir().display());
    println!("  settings:   {}", paths.settings_file().display());
    println!("  data:       {}", paths.data_dir().display());
    println!("  images:     {}", paths.image_root().display());
    Ok(())
}
