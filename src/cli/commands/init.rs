//! `taller init` command - Create a new shop

use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::core::settings::Settings;
use crate::core::shop::Shop;

const DEFAULT_CONFIG: &str = "\
# Taller shop configuration
#
# author: Juan Perez        # pre-selected as technician in `repair new -i`
technicians:
  - David Williams
  - Juan Perez
  - Maria Rodriguez
workflow:
  # forward_only: status may only move one step forward
  # override: staff may set any status
  status_policy: forward_only
  conflict_retries: 3
";

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Directory to initialize (default: current directory)
    pub path: Option<PathBuf>,

    /// Re-create the layout and config even if a shop exists
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    let root = match args.path {
        Some(path) => path,
        None => std::env::current_dir().into_diagnostic()?,
    };
    std::fs::create_dir_all(&root).into_diagnostic()?;

    let shop = Shop::init(&root, DEFAULT_CONFIG, args.force).map_err(|e| miette::miette!("{}", e))?;

    let settings = Settings::new(shop.settings_dir());
    let styles = settings.status_styles().map_err(|e| miette::miette!("{}", e))?;
    settings
        .save_status_styles(&styles)
        .map_err(|e| miette::miette!("{}", e))?;
    settings
        .device_catalog()
        .map_err(|e| miette::miette!("{}", e))?;

    println!(
        "{} Initialized taller shop in {}",
        style("✓").green(),
        style(shop.root().display()).cyan()
    );
    println!();
    println!("  {}/     work orders", Shop::REPAIRS_DIR);
    println!("  {}/   customer records", Shop::CUSTOMERS_DIR);
    println!("  {}/    status styles and device catalog", Shop::SETTINGS_DIR);
    println!();
    println!(
        "Register a repair with: {}",
        style("taller repair new -i").yellow()
    );
    Ok(())
}
