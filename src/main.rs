use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use packsmith::{PackField, SearchIndex};
use std::path::PathBuf;

mod commands;

/// packsmith - Minecraft modpack project manager
#[derive(Parser)]
#[command(name = "packsmith")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Project file (defaults to project.default_filename from the config)
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    /// Print debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Accept every prompt, picking the newest version each time
    #[arg(short, long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new modpack project
    New {
        /// Pack title
        #[arg(long)]
        title: String,

        /// Pack description
        #[arg(long, default_value = "")]
        description: String,

        /// Minecraft version (e.g., 1.20.1)
        #[arg(long)]
        mc_version: String,

        /// Mod loader (e.g., fabric, forge, quilt)
        #[arg(long)]
        loader: String,

        /// Build version (default: 1.0.0)
        #[arg(long)]
        build_version: Option<String>,

        /// Overwrite an existing project file
        #[arg(long)]
        force: bool,
    },

    /// Show the project and its mods
    Info,

    /// Add mods by slug or project id, with their required dependencies
    Add {
        /// Slugs or project ids (e.g., sodium lithium)
        #[arg(required = true)]
        mods: Vec<String>,
    },

    /// Search the registry for mods matching the pack
    Search {
        /// Search query
        query: Option<String>,

        /// Sort order
        #[arg(long, value_enum, default_value_t = SearchIndex::Relevance)]
        index: SearchIndex,

        /// Maximum number of results
        #[arg(long, default_value_t = 10)]
        limit: u32,

        /// Number of results to skip
        #[arg(long, default_value_t = 0)]
        offset: u32,

        /// Do not restrict results to the pack's loader and Minecraft version
        #[arg(long)]
        all: bool,

        /// Add the results at these positions (e.g., --add 1,3)
        #[arg(long, value_delimiter = ',')]
        add: Vec<usize>,
    },

    /// Remove mods by position (as shown by `packsmith info`)
    Remove {
        #[arg(required = true)]
        positions: Vec<usize>,
    },

    /// Update mods to their newest compatible version
    Update {
        /// Positions to update (default: all mods)
        positions: Vec<usize>,
    },

    /// Edit a pack field
    Set {
        #[arg(value_enum)]
        field: PackField,
        value: String,
    },

    /// Turn a pack flag on or off (e.g., allow_alpha_beta true)
    Flag {
        name: String,
        #[arg(action = clap::ArgAction::Set)]
        value: bool,
    },

    /// Check the pack for duplicate and mismatched mods
    Check,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., resolver.max_workers)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    let result = match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "packsmith", &mut std::io::stdout());
            Ok(())
        }
        Commands::Config { action } => commands::config::run(&action),
        command => commands::Context::load(cli.file, cli.yes).and_then(|ctx| match command {
            Commands::New {
                title,
                description,
                mc_version,
                loader,
                build_version,
                force,
            } => commands::new::run(
                &ctx,
                packsmith::NewProject {
                    title,
                    description,
                    mc_version,
                    mod_loader: loader,
                    build_version,
                },
                force,
            ),
            Commands::Info => commands::info::run(&ctx),
            Commands::Add { mods } => commands::add::run(&ctx, mods),
            Commands::Search {
                query,
                index,
                limit,
                offset,
                all,
                add,
            } => commands::search::run(&ctx, query, index, limit, offset, all, add),
            Commands::Remove { positions } => commands::remove::run(&ctx, positions),
            Commands::Update { positions } => commands::update::run(&ctx, positions),
            Commands::Set { field, value } => commands::set::run(&ctx, field, value),
            Commands::Flag { name, value } => commands::flag::run(&ctx, name, value),
            Commands::Check => commands::check::run(&ctx),
            Commands::Config { .. } | Commands::Completions { .. } => Ok(()),
        }),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
