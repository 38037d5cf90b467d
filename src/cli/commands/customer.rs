//! `taller customer` command - Customer records

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::context::ShopContext;
use crate::cli::helpers::truncate_str;
use crate::cli::output::{effective_format, print_document, Rows};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::directory::Directory;
use crate::entities::customer::Customer;

#[derive(Subcommand, Debug)]
pub enum CustomerCommands {
    /// Add a customer
    New(NewArgs),

    /// List customers
    List(ListArgs),

    /// Show a customer and their repairs
    Show(ShowArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Full name
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub phone: String,

    #[arg(long)]
    pub email: Option<String>,

    /// National id number (cédula)
    #[arg(long)]
    pub id_number: Option<String>,

    /// Tax id (RNC)
    #[arg(long)]
    pub tax_id: Option<String>,

    #[arg(long)]
    pub company: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Search name, phone, email and company (case-insensitive)
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Customer ID or short ID (CUST@1, @1)
    pub id: String,
}

pub fn run(cmd: CustomerCommands, global: &GlobalOpts) -> Result<()> {
    let mut ctx = ShopContext::open(global)?;
    match cmd {
        CustomerCommands::New(args) => run_new(&mut ctx, args, global),
        CustomerCommands::List(args) => run_list(&mut ctx, args, global),
        CustomerCommands::Show(args) => run_show(&mut ctx, args, global),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn run_new(ctx: &mut ShopContext, args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut customer = Customer::new(args.name.trim(), args.phone.trim());
    customer.email = non_empty(args.email);
    customer.id_number = non_empty(args.id_number);
    customer.tax_id = non_empty(args.tax_id);
    customer.company = non_empty(args.company);

    let path = ctx
        .directory()
        .add_customer(&customer)
        .map_err(|e| miette::miette!("{}", e))?;
    let alias = ctx.alias(&customer.id);
    ctx.save_short_ids();

    match global.output {
        OutputFormat::Id => println!("{}", customer.id),
        OutputFormat::ShortId => println!("{}", alias),
        OutputFormat::Json | OutputFormat::Yaml => print_document(&customer, global.output)?,
        _ => {
            println!(
                "{} Added customer {} {}",
                style("✓").green(),
                style(&alias).cyan(),
                style(&customer.name).yellow()
            );
            println!("   {}", style(path.display()).dim());
        }
    }
    Ok(())
}

fn matches_search(customer: &Customer, term: &str) -> bool {
    let term = term.to_lowercase();
    [
        Some(&customer.name),
        Some(&customer.phone),
        customer.email.as_ref(),
        customer.company.as_ref(),
        customer.id_number.as_ref(),
        customer.tax_id.as_ref(),
    ]
    .into_iter()
    .flatten()
    .any(|v| v.to_lowercase().contains(&term))
}

fn run_list(ctx: &mut ShopContext, args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let customers: Vec<Customer> = ctx
        .directory()
        .customers()
        .map_err(|e| miette::miette!("{}", e))?
        .into_iter()
        .filter(|c| args.search.as_ref().map_or(true, |t| matches_search(c, t)))
        .collect();

    ctx.short_ids.record_listing(customers.iter().map(|c| &c.id));
    ctx.save_short_ids();

    let format = effective_format(global.output, true);
    match format {
        OutputFormat::Json | OutputFormat::Yaml => return print_document(&customers, format),
        OutputFormat::Id | OutputFormat::ShortId => {
            for c in &customers {
                if format == OutputFormat::Id {
                    println!("{}", c.id);
                } else {
                    println!("{}", ctx.short_ids.display(&c.id));
                }
            }
            return Ok(());
        }
        _ => {}
    }

    if customers.is_empty() {
        println!("No customers found.");
        return Ok(());
    }

    let mut rows = Rows::new(&["id", "name", "phone", "email", "company", "since"]);
    for c in &customers {
        rows.push(vec![
            ctx.short_ids.display(&c.id),
            truncate_str(&c.name, 28),
            c.phone.clone(),
            c.email.clone().unwrap_or_default(),
            c.company.clone().unwrap_or_default(),
            c.signed_up.to_string(),
        ]);
    }
    rows.print(format)
}

fn run_show(ctx: &mut ShopContext, args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let id = ctx.resolve(&args.id);
    let customer = ctx
        .directory()
        .customer(&id)
        .map_err(|e| miette::miette!("{}", e))?;

    if matches!(global.output, OutputFormat::Json | OutputFormat::Yaml) {
        return print_document(&customer, global.output);
    }

    let alias = ctx.alias(&customer.id);
    ctx.save_short_ids();

    println!("{}", style("─".repeat(60)).dim());
    println!("{}: {} {}", style("ID").bold(), style(&alias).cyan(), style(&customer.id).dim());
    println!("{}: {}", style("Name").bold(), style(&customer.name).yellow());
    println!("{}: {}", style("Phone").bold(), customer.phone);
    let optional = [
        ("Email", &customer.email),
        ("Cédula", &customer.id_number),
        ("RNC", &customer.tax_id),
        ("Company", &customer.company),
    ];
    for (label, value) in optional {
        if let Some(value) = value {
            println!("{}: {}", style(label).bold(), value);
        }
    }
    println!("{}: {}", style("Customer since").bold(), customer.signed_up);
    println!("{}", style("─".repeat(60)).dim());

    // Repairs reference customers by display name
    let repairs = ctx
        .engine()
        .list_repairs(&Default::default())
        .map_err(|e| miette::miette!("{}", e))?;
    let theirs: Vec<_> = repairs
        .iter()
        .filter(|r| r.customer.eq_ignore_ascii_case(&customer.name))
        .collect();
    if theirs.is_empty() {
        println!("No repairs on record.");
    } else {
        println!("{}", style("Repairs:").bold());
        for r in theirs {
            println!(
                "  {:<8} {:<28} {}",
                ctx.short_ids.display(&r.id),
                truncate_str(&r.device, 28),
                r.status
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_search_optional_fields() {
        let mut customer = Customer::new("Jane Smith", "809-555-0100");
        customer.company = Some("Acme SRL".to_string());

        assert!(matches_search(&customer, "acme"));
        assert!(matches_search(&customer, "555"));
        assert!(!matches_search(&customer, "gmail"));
    }
}
