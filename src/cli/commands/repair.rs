//! `taller repair` command - Repair work orders

use clap::Subcommand;
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, MultiSelect, Password, Select};
use miette::{IntoDiagnostic, Result};

use crate::cli::context::ShopContext;
use crate::cli::filters::StatusFilter;
use crate::cli::helpers::{format_money, styled_status, truncate_str};
use crate::cli::output::{effective_format, print_document, Rows};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::directory::Directory;
use crate::core::entity::Entity;
use crate::core::settings::COMMON_PROBLEMS;
use crate::core::workflow::{FieldUpdate, RepairFilter, RepairIntake};
use crate::entities::functionality::{FunctionalityTest, TestItem, TestResult};
use crate::entities::repair::{DeviceType, Repair};

#[derive(Subcommand, Debug)]
pub enum RepairCommands {
    /// Register a new repair (intake)
    New(NewArgs),

    /// List repairs with filtering
    List(ListArgs),

    /// Show a repair's details
    Show(ShowArgs),

    /// Set one or more fields: FIELD=VALUE
    Set(SetArgs),

    /// Move a repair to its next status
    Advance(IdArgs),

    /// Add a note to the evaluation log
    Note(NoteArgs),

    /// Record functionality test results: ITEM=ok|fail|na
    Test(TestArgs),

    /// Add a part to the quote
    Part(PartArgs),

    /// Remove a part from the quote
    Unpart(UnpartArgs),

    /// Set the labor charge of the quote
    Labor(LaborArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Customer name
    #[arg(long, short = 'c')]
    pub customer: Option<String>,

    /// Device type (Celular, Tablet, Reloj, Laptop)
    #[arg(long = "type", short = 't', default_value = "Celular")]
    pub device_type: DeviceType,

    /// Device model, e.g. "Apple iPhone 15"
    #[arg(long, short = 'd')]
    pub device: Option<String>,

    /// Problem description (at least 10 characters)
    #[arg(long, short = 'p')]
    pub problem: Option<String>,

    /// IMEI or serial number
    #[arg(long)]
    pub imei: Option<String>,

    /// Device unlock code
    #[arg(long)]
    pub password: Option<String>,

    /// Assigned technician
    #[arg(long)]
    pub technician: Option<String>,

    /// Use interactive wizard to fill in fields
    #[arg(long, short = 'i')]
    pub interactive: bool,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by status
    #[arg(long, short = 's', default_value = "all")]
    pub status: StatusFilter,

    /// Filter by technician (exact name, "No Asignado" for unassigned)
    #[arg(long)]
    pub technician: Option<String>,

    /// Search all columns (case-insensitive substring)
    #[arg(long)]
    pub search: Option<String>,

    /// Newest first
    #[arg(long, short = 'r')]
    pub reverse: bool,

    /// Limit output to N items
    #[arg(long, short = 'n')]
    pub limit: Option<usize>,

    /// Show count only, not the items
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Repair ID or short ID (REP@1, @1)
    pub id: String,

    /// Show the device password instead of masking it
    #[arg(long)]
    pub reveal: bool,
}

#[derive(clap::Args, Debug)]
pub struct IdArgs {
    /// Repair ID or short ID (REP@1, @1)
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Repair ID or short ID
    pub id: String,

    /// Assignments such as technician="Juan Perez" or status=Confirmado
    #[arg(required = true, value_name = "FIELD=VALUE")]
    pub assignments: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct NoteArgs {
    /// Repair ID or short ID
    pub id: String,

    /// Note text
    pub message: String,

    /// Author (default: the assigned technician)
    #[arg(long)]
    pub author: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct TestArgs {
    /// Repair ID or short ID
    pub id: String,

    /// Results such as screen=fail wifi=ok (no args: show current results)
    #[arg(value_name = "ITEM=RESULT")]
    pub checks: Vec<String>,

    /// Free-text observations
    #[arg(long)]
    pub other: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct PartArgs {
    /// Repair ID or short ID
    pub id: String,

    /// Part name
    pub name: String,

    /// Part price
    pub price: f64,
}

#[derive(clap::Args, Debug)]
pub struct UnpartArgs {
    /// Repair ID or short ID
    pub id: String,

    /// Part ID, or its 1-based position in the quote
    pub part: String,
}

#[derive(clap::Args, Debug)]
pub struct LaborArgs {
    /// Repair ID or short ID
    pub id: String,

    /// Labor charge
    pub amount: f64,
}

pub fn run(cmd: RepairCommands, global: &GlobalOpts) -> Result<()> {
    let mut ctx = ShopContext::open(global)?;
    match cmd {
        RepairCommands::New(args) => run_new(&mut ctx, args, global),
        RepairCommands::List(args) => run_list(&mut ctx, args, global),
        RepairCommands::Show(args) => run_show(&mut ctx, args, global),
        RepairCommands::Set(args) => run_set(&mut ctx, args, global),
        RepairCommands::Advance(args) => run_advance(&mut ctx, args, global),
        RepairCommands::Note(args) => run_note(&mut ctx, args, global),
        RepairCommands::Test(args) => run_test(&mut ctx, args, global),
        RepairCommands::Part(args) => run_part(&mut ctx, args, global),
        RepairCommands::Unpart(args) => run_unpart(&mut ctx, args, global),
        RepairCommands::Labor(args) => run_labor(&mut ctx, args, global),
    }
}

fn run_new(ctx: &mut ShopContext, args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let intake = if args.interactive {
        intake_wizard(ctx)?
    } else {
        let missing = |flag: &str| {
            miette::miette!("Missing --{}. Pass it or use the interactive wizard (-i)", flag)
        };
        RepairIntake {
            customer: args.customer.ok_or_else(|| missing("customer"))?,
            device_type: args.device_type,
            device: args.device.ok_or_else(|| missing("device"))?,
            problem_description: args.problem.ok_or_else(|| missing("problem"))?,
            imei_or_sn: args.imei,
            password: args.password,
            technician: args.technician,
            functionality_test: None,
        }
    };

    let repair = ctx
        .engine()
        .create_repair(intake)
        .map_err(|e| miette::miette!("{}", e))?;
    let alias = ctx.alias(&repair.id);
    ctx.save_short_ids();

    match global.output {
        OutputFormat::Id => println!("{}", repair.id),
        OutputFormat::ShortId => println!("{}", alias),
        OutputFormat::Json | OutputFormat::Yaml => print_document(&repair, global.output)?,
        _ => {
            println!(
                "{} Registered repair {} {}",
                style("✓").green(),
                style(&alias).cyan(),
                style(&repair.id).dim()
            );
            println!(
                "   {} | {}",
                repair.label(),
                styled_status(repair.status, &load_styles(ctx))
            );
        }
    }
    Ok(())
}

fn intake_wizard(ctx: &ShopContext) -> Result<RepairIntake> {
    let theme = ColorfulTheme::default();
    let directory = ctx.directory();
    let catalog = ctx
        .settings()
        .device_catalog()
        .map_err(|e| miette::miette!("{}", e))?;

    // Customer: pick a known one or type a name
    let customers = directory.customers().map_err(|e| miette::miette!("{}", e))?;
    let mut customer_items: Vec<String> = customers.iter().map(|c| c.name.clone()).collect();
    customer_items.push("Otro (escribir nombre)".to_string());
    let choice = Select::with_theme(&theme)
        .with_prompt("Cliente")
        .items(&customer_items)
        .default(0)
        .interact()
        .into_diagnostic()?;
    let customer = match customers.get(choice) {
        Some(c) => c.name.clone(),
        None => Input::with_theme(&theme)
            .with_prompt("Nombre del cliente")
            .validate_with(|s: &String| {
                if s.trim().chars().count() >= 2 {
                    Ok(())
                } else {
                    Err("Al menos 2 caracteres")
                }
            })
            .interact_text()
            .into_diagnostic()?,
    };

    let type_items: Vec<&str> = DeviceType::ALL.iter().map(|t| t.as_str()).collect();
    let type_idx = Select::with_theme(&theme)
        .with_prompt("Tipo de dispositivo")
        .items(&type_items)
        .default(0)
        .interact()
        .into_diagnostic()?;
    let device_type = DeviceType::ALL[type_idx];

    let device = pick_device(&theme, &catalog, device_type)?;

    let imei: String = Input::with_theme(&theme)
        .with_prompt("IMEI / Número de serie (opcional)")
        .allow_empty(true)
        .interact_text()
        .into_diagnostic()?;
    let password = Password::with_theme(&theme)
        .with_prompt("Contraseña del dispositivo (opcional)")
        .allow_empty_password(true)
        .interact()
        .into_diagnostic()?;

    let picked = MultiSelect::with_theme(&theme)
        .with_prompt("Problemas comunes (espacio para marcar)")
        .items(COMMON_PROBLEMS)
        .interact()
        .into_diagnostic()?;
    let details: String = Input::with_theme(&theme)
        .with_prompt("Descripción del problema")
        .allow_empty(!picked.is_empty())
        .interact_text()
        .into_diagnostic()?;
    let mut problem: Vec<String> = picked.iter().map(|&i| COMMON_PROBLEMS[i].to_string()).collect();
    if !details.trim().is_empty() {
        problem.push(details.trim().to_string());
    }

    // Staff who are technicians themselves get pre-selected
    let technicians = directory.technicians();
    let me = ctx.config.author();
    let tech_default = technicians.iter().position(|t| *t == me).unwrap_or(0);
    let tech_idx = Select::with_theme(&theme)
        .with_prompt("Técnico asignado")
        .items(&technicians)
        .default(tech_default)
        .interact()
        .into_diagnostic()?;

    let functionality_test = if Confirm::with_theme(&theme)
        .with_prompt("¿Registrar prueba de funcionalidad ahora?")
        .default(false)
        .interact()
        .into_diagnostic()?
    {
        let results = [TestResult::Na, TestResult::Ok, TestResult::Fail];
        let labels: Vec<&str> = results.iter().map(|r| r.label()).collect();
        let mut test = FunctionalityTest::default();
        for item in TestItem::ALL {
            let idx = Select::with_theme(&theme)
                .with_prompt(item.label())
                .items(&labels)
                .default(0)
                .interact()
                .into_diagnostic()?;
            test.set(item, results[idx]);
        }
        test.other = Input::with_theme(&theme)
            .with_prompt("Otras observaciones")
            .allow_empty(true)
            .interact_text()
            .into_diagnostic()?;
        Some(test)
    } else {
        None
    };

    Ok(RepairIntake {
        customer,
        device_type,
        device,
        problem_description: problem.join(". "),
        imei_or_sn: Some(imei),
        password: Some(password),
        technician: technicians.get(tech_idx).cloned(),
        functionality_test,
    })
}

fn pick_device(
    theme: &ColorfulTheme,
    catalog: &crate::core::DeviceCatalog,
    device_type: DeviceType,
) -> Result<String> {
    let other = "Otro".to_string();
    let free_text = |prompt: &str| -> Result<String> {
        Input::with_theme(theme)
            .with_prompt(prompt)
            .interact_text()
            .into_diagnostic()
    };

    let brands = catalog.brands(device_type);
    let mut brand_items: Vec<String> = brands.iter().map(|b| b.name.clone()).collect();
    brand_items.push(other.clone());
    let brand_idx = Select::with_theme(theme)
        .with_prompt("Marca")
        .items(&brand_items)
        .default(0)
        .interact()
        .into_diagnostic()?;
    let Some(brand) = brands.get(brand_idx) else {
        return free_text("Dispositivo (marca y modelo)");
    };

    let mut model_items = brand.models.clone();
    model_items.push(other);
    let model_idx = Select::with_theme(theme)
        .with_prompt("Modelo")
        .items(&model_items)
        .default(0)
        .interact()
        .into_diagnostic()?;
    let model = match brand.models.get(model_idx) {
        Some(m) => m.clone(),
        None => free_text("Modelo")?,
    };
    Ok(format!("{} {}", brand.name, model))
}

fn run_list(ctx: &mut ShopContext, args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let filter = RepairFilter {
        status: args.status.status(),
        technician: args.technician,
        search: args.search,
    };
    let mut repairs: Vec<Repair> = ctx
        .engine()
        .list_repairs(&filter)
        .map_err(|e| miette::miette!("{}", e))?
        .into_iter()
        .filter(|r| args.status.matches(r.status))
        .collect();

    if args.reverse {
        repairs.reverse();
    }
    if let Some(limit) = args.limit {
        repairs.truncate(limit);
    }

    if args.count {
        println!("{}", repairs.len());
        return Ok(());
    }

    ctx.short_ids.record_listing(repairs.iter().map(|r| &r.id));
    ctx.save_short_ids();

    let format = effective_format(global.output, true);
    match format {
        OutputFormat::Json | OutputFormat::Yaml => return print_document(&repairs, format),
        OutputFormat::Id => {
            for r in &repairs {
                println!("{}", r.id);
            }
            return Ok(());
        }
        OutputFormat::ShortId => {
            for r in &repairs {
                println!("{}", ctx.short_ids.display(&r.id));
            }
            return Ok(());
        }
        _ => {}
    }

    if repairs.is_empty() {
        println!("No repairs found.");
        println!();
        println!(
            "Register one with: {}",
            style("taller repair new -i").yellow()
        );
        return Ok(());
    }

    let mut rows = Rows::new(&[
        "id", "customer", "device", "status", "technician", "entry", "total",
    ]);
    for r in &repairs {
        rows.push(vec![
            ctx.short_ids.display(&r.id),
            truncate_str(&r.customer, 24),
            truncate_str(&r.device, 28),
            r.status.to_string(),
            r.technician.clone(),
            r.entry_date.format("%Y-%m-%d").to_string(),
            r.quote
                .as_ref()
                .map(|q| format_money(q.total))
                .unwrap_or_else(|| "-".to_string()),
        ]);
    }
    rows.print(format)
}

fn run_show(ctx: &mut ShopContext, args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let id = ctx.resolve(&args.id);
    let repair = ctx
        .engine()
        .get_repair(&id)
        .map_err(|e| miette::miette!("{}", e))?;

    match global.output {
        OutputFormat::Json | OutputFormat::Yaml => return print_document(&repair, global.output),
        OutputFormat::Id => {
            println!("{}", repair.id);
            return Ok(());
        }
        OutputFormat::ShortId => {
            println!("{}", ctx.alias(&repair.id));
            ctx.save_short_ids();
            return Ok(());
        }
        _ => {}
    }

    let alias = ctx.alias(&repair.id);
    ctx.save_short_ids();
    let styles = load_styles(ctx);

    println!("{}", style("─".repeat(60)).dim());
    println!(
        "{}: {} {}",
        style("ID").bold(),
        style(&alias).cyan(),
        style(&repair.id).dim()
    );
    println!("{}: {}", style("Customer").bold(), style(&repair.customer).yellow());
    println!(
        "{}: {} ({})",
        style("Device").bold(),
        repair.device,
        repair.device_type
    );
    if let Some(ref imei) = repair.imei_or_sn {
        println!("{}: {}", style("IMEI/SN").bold(), imei);
    }
    if let Some(ref password) = repair.password {
        let shown = if args.reveal {
            password.clone()
        } else {
            "*".repeat(password.chars().count().max(4))
        };
        println!("{}: {}", style("Password").bold(), shown);
    }
    println!("{}: {}", style("Technician").bold(), repair.technician);
    println!(
        "{}: {}",
        style("Status").bold(),
        styled_status(repair.status, &styles)
    );
    println!("{}", style("─".repeat(60)).dim());
    println!();
    println!("{}", repair.problem_description);
    println!();

    if !repair.evaluation.is_empty() {
        println!("{}", style("Evaluation:").bold());
        for entry in &repair.evaluation {
            println!(
                "  {} {}: {}",
                style(entry.date.format("%Y-%m-%d %H:%M")).dim(),
                style(&entry.author).cyan(),
                entry.note
            );
        }
        println!();
    }

    if let Some(ref test) = repair.functionality_test {
        print_functionality_test(test);
        println!();
    }

    if let Some(ref quote) = repair.quote {
        println!("{}", style("Quote:").bold());
        for (i, part) in quote.parts.iter().enumerate() {
            println!(
                "  {}. {:<32} {:>10}  {}",
                i + 1,
                truncate_str(&part.name, 32),
                format_money(part.price),
                style(&part.id).dim()
            );
        }
        println!("  {:<35} {:>10}", "Labor", format_money(quote.labor));
        println!(
            "  {:<35} {:>10}",
            style("Total").bold(),
            style(format_money(quote.total)).green().bold()
        );
        println!();
    }

    println!("{}", style("─".repeat(60)).dim());
    print!(
        "{}: {} | {}: {}",
        style("Entered").dim(),
        repair.entry_date.format("%Y-%m-%d %H:%M"),
        style("Revision").dim(),
        repair.revision
    );
    match repair.status.advance_label() {
        Some(label) => println!(
            " | {}: {} ({})",
            style("Next").dim(),
            label,
            style(format!("taller repair advance {}", alias)).yellow()
        ),
        None => println!(),
    }
    Ok(())
}

fn print_functionality_test(test: &FunctionalityTest) {
    println!("{}", style("Functionality test:").bold());
    for (item, result) in test.results() {
        let badge = match result {
            TestResult::Ok => style(result.label()).green(),
            TestResult::Fail => style(result.label()).red().bold(),
            TestResult::Na => style(result.label()).dim(),
        };
        println!("  {:<30} {}", item.label(), badge);
    }
    if !test.other.is_empty() {
        println!("  {}: {}", style("Otros").dim(), test.other);
    }
}

fn run_set(ctx: &mut ShopContext, args: SetArgs, global: &GlobalOpts) -> Result<()> {
    let id = ctx.resolve(&args.id);
    let updates = args
        .assignments
        .iter()
        .map(|assignment| {
            let (field, value) = assignment.split_once('=').ok_or_else(|| {
                miette::miette!("Expected FIELD=VALUE, got '{}'", assignment)
            })?;
            FieldUpdate::parse(field, value).map_err(|e| miette::miette!("{}", e))
        })
        .collect::<Result<Vec<_>>>()?;
    let fields: Vec<&str> = updates.iter().map(|u| u.field().key()).collect();
    let fields = fields.join(", ");

    let repair = ctx
        .engine()
        .update_fields(&id, updates)
        .map_err(|e| miette::miette!("{}", e))?;
    report(ctx, &repair, global, &format!("updated {}", fields))
}

fn run_advance(ctx: &mut ShopContext, args: IdArgs, global: &GlobalOpts) -> Result<()> {
    let id = ctx.resolve(&args.id);
    let engine = ctx.engine();
    let before = engine
        .get_repair(&id)
        .map_err(|e| miette::miette!("{}", e))?;
    let repair = engine
        .advance_status(&id)
        .map_err(|e| miette::miette!("{}", e))?;

    let message = if repair.status == before.status {
        format!("already {}; nothing to advance", repair.status)
    } else {
        format!("{} → {}", before.status, repair.status)
    };
    report(ctx, &repair, global, &message)
}

fn run_note(ctx: &mut ShopContext, args: NoteArgs, global: &GlobalOpts) -> Result<()> {
    let id = ctx.resolve(&args.id);
    let engine = ctx.engine();
    let author = match args.author {
        Some(author) => author,
        None => {
            engine
                .get_repair(&id)
                .map_err(|e| miette::miette!("{}", e))?
                .technician
        }
    };
    let repair = engine
        .append_evaluation_note(&id, &args.message, &author)
        .map_err(|e| miette::miette!("{}", e))?;
    let message = format!("note added ({} in log)", repair.evaluation.len());
    report(ctx, &repair, global, &message)
}

fn run_test(ctx: &mut ShopContext, args: TestArgs, global: &GlobalOpts) -> Result<()> {
    let id = ctx.resolve(&args.id);
    let engine = ctx.engine();

    if args.checks.is_empty() && args.other.is_none() {
        let repair = engine
            .get_repair(&id)
            .map_err(|e| miette::miette!("{}", e))?;
        let test = repair.functionality_test.unwrap_or_default();
        return match global.output {
            OutputFormat::Json | OutputFormat::Yaml => print_document(&test, global.output),
            _ => {
                print_functionality_test(&test);
                Ok(())
            }
        };
    }

    let checks = args
        .checks
        .iter()
        .map(|check| {
            let (item, result) = check
                .split_once('=')
                .ok_or_else(|| miette::miette!("Expected ITEM=RESULT, got '{}'", check))?;
            let item: TestItem = item.parse().map_err(|e: String| miette::miette!("{}", e))?;
            let result: TestResult = result.parse().map_err(|e: String| miette::miette!("{}", e))?;
            Ok((item, result))
        })
        .collect::<Result<Vec<_>>>()?;

    let repair = engine
        .set_functionality_checks(&id, &checks, args.other.as_deref())
        .map_err(|e| miette::miette!("{}", e))?;

    let failures = repair
        .functionality_test
        .as_ref()
        .map(|t| t.failures().len())
        .unwrap_or_default();
    report(
        ctx,
        &repair,
        global,
        &format!("functionality test recorded ({} failing)", failures),
    )
}

fn run_part(ctx: &mut ShopContext, args: PartArgs, global: &GlobalOpts) -> Result<()> {
    let id = ctx.resolve(&args.id);
    let repair = ctx
        .engine()
        .add_quote_part(&id, &args.name, args.price)
        .map_err(|e| miette::miette!("{}", e))?;
    let total = repair.quote.as_ref().map(|q| q.total).unwrap_or_default();
    report(
        ctx,
        &repair,
        global,
        &format!("added {} ({}), total {}", args.name, format_money(args.price), format_money(total)),
    )
}

fn run_unpart(ctx: &mut ShopContext, args: UnpartArgs, global: &GlobalOpts) -> Result<()> {
    let id = ctx.resolve(&args.id);
    let engine = ctx.engine();

    // A small number is a position in the quote
    let part_id = match args.part.parse::<usize>() {
        Ok(position) => {
            let repair = engine
                .get_repair(&id)
                .map_err(|e| miette::miette!("{}", e))?;
            repair
                .quote
                .as_ref()
                .and_then(|q| position.checked_sub(1).and_then(|i| q.parts.get(i)))
                .map(|p| p.id.to_string())
                .ok_or_else(|| miette::miette!("Quote has no part #{}", position))?
        }
        Err(_) => args.part.clone(),
    };

    let repair = engine
        .remove_quote_part(&id, &part_id)
        .map_err(|e| miette::miette!("{}", e))?;
    let total = repair.quote.as_ref().map(|q| q.total).unwrap_or_default();
    report(
        ctx,
        &repair,
        global,
        &format!("removed part, total {}", format_money(total)),
    )
}

fn run_labor(ctx: &mut ShopContext, args: LaborArgs, global: &GlobalOpts) -> Result<()> {
    let id = ctx.resolve(&args.id);
    let repair = ctx
        .engine()
        .set_labor(&id, args.amount)
        .map_err(|e| miette::miette!("{}", e))?;
    let total = repair.quote.as_ref().map(|q| q.total).unwrap_or_default();
    report(
        ctx,
        &repair,
        global,
        &format!("labor {}, total {}", format_money(args.amount), format_money(total)),
    )
}

/// Print the outcome of a write in the requested format
fn report(ctx: &mut ShopContext, repair: &Repair, global: &GlobalOpts, message: &str) -> Result<()> {
    let alias = ctx.alias(&repair.id);
    ctx.save_short_ids();
    match global.output {
        OutputFormat::Json | OutputFormat::Yaml => print_document(repair, global.output),
        OutputFormat::Id => {
            println!("{}", repair.id);
            Ok(())
        }
        OutputFormat::ShortId => {
            println!("{}", alias);
            Ok(())
        }
        _ => {
            println!("{} {}: {}", style("✓").green(), style(&alias).cyan(), message);
            Ok(())
        }
    }
}

fn load_styles(ctx: &ShopContext) -> crate::core::StatusStyles {
    ctx.settings().status_styles().unwrap_or_default()
}
