use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "focusdeck", version, about = "Focusdeck task manager CLI")]
struct Cli {
    /// Log state transitions to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Task management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Project management
    Project {
        #[command(subcommand)]
        action: commands::project::ProjectAction,
    },
    /// Critical / Focus / Inbox zones
    Zone {
        #[command(subcommand)]
        action: commands::zone::ZoneAction,
    },
    /// Focus mode
    Focus {
        #[command(subcommand)]
        action: commands::focus::FocusAction,
    },
    /// Archived tasks and projects
    Archive {
        #[command(subcommand)]
        action: commands::archive::ArchiveAction,
    },
    /// Notes
    Note {
        #[command(subcommand)]
        action: commands::note::NoteAction,
    },
    /// What needs attention tomorrow
    Digest,
    /// Board statistics
    Stats,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Stored snapshots of earlier states
    Backup {
        #[command(subcommand)]
        action: commands::backup::BackupAction,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "focusdeck_core=debug,focusdeck=debug,warn"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_env("FOCUSDECK_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Task { action } => commands::task::run(action),
        Commands::Project { action } => commands::project::run(action),
        Commands::Zone { action } => commands::zone::run(action),
        Commands::Focus { action } => commands::focus::run(action),
        Commands::Archive { action } => commands::archive::run(action),
        Commands::Note { action } => commands::note::run(action),
        Commands::Digest => commands::digest::run(),
        Commands::Stats => commands::stats::run(),
        Commands::Config { action } => commands::config::run(action),
        Commands::Backup { action } => commands::backup::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
