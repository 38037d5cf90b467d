//! `taller settings` command - Status styles, device catalog, common problems

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::context::ShopContext;
use crate::cli::output::{effective_format, print_document, Rows};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::settings::{BadgeVariant, COMMON_PROBLEMS};
use crate::entities::repair::{DeviceType, RepairStatus};

#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Show or change status badge styles
    Styles(StylesArgs),

    /// Show the device catalog
    Devices(DevicesArgs),

    /// List common problems offered at intake
    Problems,
}

#[derive(clap::Args, Debug)]
pub struct StylesArgs {
    /// Changes such as "Reparado=destructive"
    #[arg(value_name = "STATUS=VARIANT")]
    pub set: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct DevicesArgs {
    /// Only this device type
    #[arg(long = "type", short = 't')]
    pub device_type: Option<DeviceType>,

    /// Only this brand
    #[arg(long, short = 'b')]
    pub brand: Option<String>,
}

pub fn run(cmd: SettingsCommands, global: &GlobalOpts) -> Result<()> {
    let ctx = ShopContext::open(global)?;
    match cmd {
        SettingsCommands::Styles(args) => run_styles(&ctx, args, global),
        SettingsCommands::Devices(args) => run_devices(&ctx, args, global),
        SettingsCommands::Problems => run_problems(global),
    }
}

fn run_styles(ctx: &ShopContext, args: StylesArgs, global: &GlobalOpts) -> Result<()> {
    let settings = ctx.settings();
    let mut styles = settings
        .status_styles()
        .map_err(|e| miette::miette!("{}", e))?;

    if !args.set.is_empty() {
        for change in &args.set {
            let (status, variant) = change
                .split_once('=')
                .ok_or_else(|| miette::miette!("Expected STATUS=VARIANT, got '{}'", change))?;
            let status: RepairStatus = status.parse().map_err(|e: String| miette::miette!("{}", e))?;
            let variant: BadgeVariant = variant.parse().map_err(|e: String| miette::miette!("{}", e))?;
            styles.set(status, variant);
        }
        settings
            .save_status_styles(&styles)
            .map_err(|e| miette::miette!("{}", e))?;
        println!("{} Status styles updated", style("✓").green());
    }

    let format = effective_format(global.output, true);
    if matches!(format, OutputFormat::Json | OutputFormat::Yaml) {
        return print_document(&styles, format);
    }
    let mut rows = Rows::new(&["status", "variant"]);
    for (status, variant) in styles.iter() {
        rows.push(vec![status.to_string(), variant.to_string()]);
    }
    rows.print(format)
}

fn run_devices(ctx: &ShopContext, args: DevicesArgs, global: &GlobalOpts) -> Result<()> {
    let catalog = ctx
        .settings()
        .device_catalog()
        .map_err(|e| miette::miette!("{}", e))?;

    let format = effective_format(global.output, true);
    if matches!(format, OutputFormat::Json | OutputFormat::Yaml) && args.device_type.is_none() {
        return print_document(&catalog, format);
    }

    let types: Vec<DeviceType> = match args.device_type {
        Some(t) => vec![t],
        None => DeviceType::ALL.to_vec(),
    };
    let mut rows = Rows::new(&["type", "brand", "model"]);
    for device_type in types {
        for brand in catalog.brands(device_type) {
            if let Some(ref wanted) = args.brand {
                if !brand.name.eq_ignore_ascii_case(wanted) {
                    continue;
                }
            }
            for model in &brand.models {
                rows.push(vec![device_type.to_string(), brand.name.clone(), model.clone()]);
            }
        }
    }
    rows.print(format)
}

fn run_problems(global: &GlobalOpts) -> Result<()> {
    match global.output {
        OutputFormat::Json | OutputFormat::Yaml => print_document(COMMON_PROBLEMS, global.output),
        _ => {
            for problem in COMMON_PROBLEMS {
                println!("{}", problem);
            }
            Ok(())
        }
    }
}
