use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use gh_switch::{
    commands::{self, AddArgs},
    paths::Paths,
    system::ProcessSystem,
    ui::{ColorMode, Ui},
};

#[derive(Parser)]
#[command(name = "gh-switch")]
#[command(about = "GitHub account switcher - manage multiple git identities and SSH keys on one machine")]
#[command(version)]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// When to use colors: always, auto, never
    #[arg(long, global = true, value_name = "WHEN", default_value = "auto")]
    color: ColorMode,

    /// Print debug logs to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize gh-switch and add your first account
    Init(AddArgs),

    /// Add a new GitHub account profile
    Add(AddArgs),

    /// List all configured profiles
    #[command(alias = "ls")]
    List,

    /// Switch the global git identity to a profile
    Use {
        /// Profile to activate (prompted for when omitted)
        profile: Option<String>,
    },

    /// Show the active profile and the global git identity
    Current,

    /// Clone a repository using a profile's SSH key
    Clone {
        /// Repository URL (https, git@ or git:// form)
        url: String,

        /// Profile to clone with (defaults to the active one)
        profile: Option<String>,

        /// Destination directory
        dest: Option<PathBuf>,
    },

    /// Test the SSH connection to GitHub for one or all profiles
    Verify {
        /// Profile to verify (all when omitted)
        profile: Option<String>,
    },

    /// Remove a profile and its SSH config entry (the key file is kept)
    #[command(alias = "rm")]
    Remove {
        /// Profile to remove (prompted for when omitted)
        profile: Option<String>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show the configuration, or open it in $EDITOR
    Config {
        /// Open the configuration file in an editor
        #[arg(long)]
        edit: bool,
    },

    /// Run diagnostics on the gh-switch setup
    Doctor,

    /// Print shell completions to stdout
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "gh-switch", &mut std::io::stdout());
        return Ok(());
    }

    let paths = Paths::new()?;
    let ui = Ui::new(cli.color, cli.no_color);
    let system = ProcessSystem;
    tracing::debug!(home = %paths.home.display(), "resolved paths");

    match cli.command {
        Commands::Init(args) => commands::init(&paths, &system, &ui, args),
        Commands::Add(args) => commands::add(&paths, &system, &ui, args),
        Commands::List => commands::list(&paths, &ui),
        Commands::Use { profile } => commands::use_profile(&paths, &system, profile.as_deref(), &ui),
        Commands::Current => commands::current(&paths, &system, &ui),
        Commands::Clone { url, profile, dest } => commands::clone(
            &paths,
            &system,
            &url,
            profile.as_deref(),
            dest.as_deref(),
            &ui,
        ),
        Commands::Verify { profile } => commands::verify(&paths, &system, profile.as_deref(), &ui),
        Commands::Remove { profile, yes } => commands::remove(&paths, profile.as_deref(), yes, &ui),
        Commands::Config { edit } => commands::config(&paths, edit, &ui),
        Commands::Doctor => commands::doctor(&paths, &system, &ui),
        Commands::Completions { .. } => Ok(()),
    }
}
