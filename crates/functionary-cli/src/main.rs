use clap::{Parser, Subcommand};
use functionary_yaml::{commands::generate, logger, GlobalOpts};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "functionary-yaml")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Generate functionary package manifests",
    long_about = "functionary-yaml reads a JavaScript package's functions.js and writes the package.yaml manifest functionary registers its functions from."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate package.yaml for one or more package directories
    Generate(generate::GenerateCommand),
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| logger::verbosity_to_filter().into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logger::init_with_verbosity(cli.global.verbosity_level(), cli.global.quiet) {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }
    init_tracing();

    match cli.command {
        Commands::Generate(cmd) => {
            if let Err(e) = generate::handle_generate(cmd, cli.global) {
                logger::error(&format!("Generate failed: {:#}", e));
                logger::show_log_path();
                std::process::exit(1);
            }
        }
    }
}
