use clap::Parser;
use miette::Result;
use taller::cli::{commands, Cli, Commands};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "taller=info",
        _ => "taller=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    match cli.command {
        Commands::Init(args) => commands::init::run(args),
        Commands::Repair(cmd) => commands::repair::run(cmd, &cli.global),
        Commands::Customer(cmd) => commands::customer::run(cmd, &cli.global),
        Commands::Settings(cmd) => commands::settings::run(cmd, &cli.global),
        Commands::Validate(args) => commands::validate::run(args, &cli.global),
        Commands::Completions(args) => commands::completions::run(args),
    }
}
