//! storekit CLI - NetStorage and Pulp from the command line

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod error;
mod exit_codes;

use commands::config::ConfigCommand;
use commands::{NsArgs, PulpArgs};

#[derive(Parser)]
#[command(name = "storekit")]
#[command(author = "storekit Contributors")]
#[command(version)]
#[command(about = "Command-line client for NetStorage and Pulp repositories", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Profile file (default: ~/.config/storekit/config.yaml)
    #[arg(long, global = true, env = "STOREKIT_CONFIG")]
    config: Option<PathBuf>,

    /// Log requests at info level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Akamai NetStorage operations
    Ns {
        #[command(flatten)]
        args: NsArgs,

        #[command(subcommand)]
        command: NsCommand,
    },

    /// Pulp repository operations
    Pulp {
        #[command(flatten)]
        args: PulpArgs,

        #[command(subcommand)]
        command: PulpCommand,
    },

    /// Write connection settings to the profile file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand)]
enum NsCommand {
    /// List a directory
    Dir {
        #[arg(default_value = "/")]
        path: String,
    },

    /// Show disk usage below a directory
    Du {
        #[arg(default_value = "/")]
        path: String,
    },

    /// Show a single entry
    Stat { path: String },

    /// Create a directory
    Mkdir { path: String },

    /// Remove an empty directory
    Rmdir { path: String },

    /// Delete a file or symlink
    Delete { path: String },

    /// Delete a directory tree (requires --confirm imreallyreallysure)
    QuickDelete {
        path: String,

        /// Confirmation token
        #[arg(long, default_value = "")]
        confirm: String,
    },

    /// Rename a file
    Rename { path: String, destination: String },

    /// Create a symlink at PATH pointing to TARGET
    Symlink { path: String, target: String },

    /// Set the modification time (unix seconds)
    Mtime { path: String, mtime: i64 },

    /// Upload a local file
    Upload {
        /// Local file
        file: PathBuf,

        /// Destination path
        path: String,

        #[command(flatten)]
        options: UploadArgs,
    },

    /// Download a file
    Download {
        path: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct UploadArgs {
    /// Modification time to record (default: the local file's)
    #[arg(long)]
    mtime: Option<i64>,

    /// Do not send size and checksums
    #[arg(long)]
    no_checksums: bool,

    /// Index the uploaded zip for serving
    #[arg(long)]
    index_zip: bool,
}

#[derive(Subcommand)]
enum PulpCommand {
    /// Log in and show the issued session certificate
    Login,

    /// List repositories
    Repos {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one repository
    Repo {
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a repository
    CreateRepo {
        id: String,

        #[arg(long)]
        display_name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Note in KEY=VALUE form (repeatable)
        #[arg(long = "note")]
        notes: Vec<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List open upload requests
    Uploads,

    /// Open an upload request
    CreateUpload,

    /// Discard an upload request
    DeleteUpload { upload_id: String },
}

#[tokio::main]
async fn main() {
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_logging(cli.verbose, cli.debug);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> error::Result<()> {
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Ns { args, command } => {
            let profile = commands::load_profile(config)?;
            let client = commands::netstorage::connect(&args, profile.netstorage.as_ref())?;
            run_ns(&client, command).await
        }
        Commands::Pulp { args, command } => {
            let profile = commands::load_profile(config)?;
            let client = commands::pulp::connect(&args, profile.pulp.as_ref())?;
            if args.session && !matches!(command, PulpCommand::Login) {
                client.login().await?;
            }
            run_pulp(&client, command).await
        }
        Commands::Config { command } => commands::config::run(config, command),
    }
}

async fn run_ns(
    client: &storekit_netstorage::NetStorageClient,
    command: NsCommand,
) -> error::Result<()> {
    use commands::netstorage as ns;

    match command {
        NsCommand::Dir { path } => ns::dir(client, &path).await,
        NsCommand::Du { path } => ns::du(client, &path).await,
        NsCommand::Stat { path } => ns::stat(client, &path).await,
        NsCommand::Mkdir { path } => ns::mkdir(client, &path).await,
        NsCommand::Rmdir { path } => ns::rmdir(client, &path).await,
        NsCommand::Delete { path } => ns::delete(client, &path).await,
        NsCommand::QuickDelete { path, confirm } => ns::quick_delete(client, &path, &confirm).await,
        NsCommand::Rename { path, destination } => ns::rename(client, &path, &destination).await,
        NsCommand::Symlink { path, target } => ns::symlink(client, &path, &target).await,
        NsCommand::Mtime { path, mtime } => ns::mtime(client, &path, mtime).await,
        NsCommand::Upload {
            file,
            path,
            options,
        } => {
            ns::upload(
                client,
                &file,
                &path,
                options.mtime,
                !options.no_checksums,
                options.index_zip,
            )
            .await
        }
        NsCommand::Download { path, output } => {
            ns::download(client, &path, output.as_deref()).await
        }
    }
}

async fn run_pulp(client: &storekit_pulp::PulpClient, command: PulpCommand) -> error::Result<()> {
    use commands::pulp;

    match command {
        PulpCommand::Login => pulp::login(client).await,
        PulpCommand::Repos { json } => pulp::list_repositories(client, json).await,
        PulpCommand::Repo { id, json } => pulp::show_repository(client, &id, json).await,
        PulpCommand::CreateRepo {
            id,
            display_name,
            description,
            notes,
            json,
        } => {
            pulp::create_repository(
                client,
                &id,
                display_name.as_deref(),
                description.as_deref(),
                &notes,
                json,
            )
            .await
        }
        PulpCommand::Uploads => pulp::list_uploads(client).await,
        PulpCommand::CreateUpload => pulp::create_upload(client).await,
        PulpCommand::DeleteUpload { upload_id } => pulp::delete_upload(client, &upload_id).await,
    }
}

/// Initialize logging based on verbosity flags
fn init_logging(verbose: bool, debug: bool) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let default_level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
