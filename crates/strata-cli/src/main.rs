mod commands;

use clap::{Args, Parser, Subcommand};
use commands::{EXIT_CONFLICT, EXIT_FAILURE, EXIT_NOT_FOUND, EXIT_STORE_ERROR};
use std::path::PathBuf;
use std::process::ExitCode;
use strata_core::{Engine, StrataConfig};
use strata_schema::{RequestContext, SessionState};

#[derive(Debug, Parser)]
#[command(
    name = "strata",
    version,
    about = "Versioned environment topologies with session-based deployment"
)]
struct Cli {
    /// Path to the Strata store directory.
    #[arg(long, global = true)]
    store: Option<String>,

    /// Configuration file (default: ~/.config/strata/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Seal description payloads in the secret vault.
    #[arg(long, global = true, conflicts_with = "no_encrypt_data")]
    encrypt_data: bool,

    /// Store description payloads as plaintext.
    #[arg(long, global = true)]
    no_encrypt_data: bool,

    /// User acting on the store (default: $USER).
    #[arg(long, global = true)]
    user: Option<String>,

    /// Tenant owning the environments.
    #[arg(long, global = true, default_value = "default")]
    tenant: String,

    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create, inspect, and decommission environments.
    #[command(subcommand)]
    Env(EnvCommand),
    /// Open, edit, and deploy editing sessions.
    #[command(subcommand)]
    Session(SessionCommand),
    /// Inspect and complete queued deployment tasks.
    #[command(subcommand)]
    Tasks(TasksCommand),
}

#[derive(Debug, Subcommand)]
enum EnvCommand {
    /// Create an environment.
    Create { name: String },
    /// List environments of the current tenant.
    List {
        /// Include every tenant.
        #[arg(long, default_value_t = false)]
        all_tenants: bool,
    },
    /// Show an environment record.
    Show { env: String },
    /// Show the status derived from the environment's sessions.
    Status { env: String },
    /// Print the environment's description, or a session's view of it.
    Describe(DescribeArgs),
    /// Rename an environment.
    Rename { env: String, new_name: String },
    /// Decommission an environment through a deletion session.
    Delete { env: String },
}

#[derive(Debug, Args)]
struct DescribeArgs {
    env: String,
    /// Session whose draft to show while it is still deployable.
    #[arg(long)]
    session: Option<String>,
    /// Print the whole document instead of the `Objects` subtree.
    #[arg(long, default_value_t = false)]
    outer: bool,
}

#[derive(Debug, Subcommand)]
enum SessionCommand {
    /// Open a session on an environment.
    Open { env: String },
    /// List sessions of an environment, most recent first.
    List {
        env: String,
        /// Only sessions in this state.
        #[arg(long)]
        state: Option<SessionState>,
    },
    /// Show a session and its draft.
    Show { session: String },
    /// Replace a session's draft with JSON read from FILE ("-" for stdin).
    Edit {
        session: String,
        file: PathBuf,
        /// FILE holds only the `Objects` subtree.
        #[arg(long, default_value_t = false)]
        objects: bool,
    },
    /// Deploy a session's draft.
    Deploy { session: String },
    /// Delete a session that is not deploying or deleting.
    Delete { session: String },
}

#[derive(Debug, Subcommand)]
enum TasksCommand {
    /// List pending deployment tasks.
    List,
    /// Report the outcome of a task and remove it from the queue.
    Complete {
        task_id: String,
        /// Report failure instead of success.
        #[arg(long, default_value_t = false)]
        failed: bool,
    },
}

fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe")
            || msg.contains("broken pipe")
            || msg.contains("os error 32")
            || msg.contains("failed printing to stdout")
        {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("STRATA_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            ExitCode::from(exit_code_for(&msg))
        }
    }
}

fn run(cli: Cli) -> Result<u8, String> {
    let mut config = match &cli.config {
        Some(path) => StrataConfig::load(path),
        None => StrataConfig::load_default(),
    }
    .map_err(|e| e.to_string())?;
    if cli.encrypt_data {
        config.encrypt_data = true;
    } else if cli.no_encrypt_data {
        config.encrypt_data = false;
    }

    let store_path = match (&cli.store, &config.store_path) {
        (Some(store), _) => expand_tilde(store),
        (None, Some(path)) => path.clone(),
        (None, None) => expand_tilde("~/.local/share/strata"),
    };
    tracing::debug!("using store at {}", store_path.display());
    let engine = Engine::open(&store_path, &config).map_err(|e| e.to_string())?;

    let user = cli
        .user
        .clone()
        .or_else(|| std::env::var("USER").ok())
        .unwrap_or_else(|| "anonymous".to_owned());
    let ctx = RequestContext::new(user, cli.tenant.as_str());
    let json = cli.json;

    match cli.command {
        Commands::Env(cmd) => match cmd {
            EnvCommand::Create { name } => commands::create::run(&engine, &ctx, &name, json),
            EnvCommand::List { all_tenants } => {
                commands::list::run(&engine, &ctx, all_tenants, json)
            }
            EnvCommand::Show { env } => commands::show::run(&engine, &ctx, &env, json),
            EnvCommand::Status { env } => commands::status::run(&engine, &ctx, &env, json),
            EnvCommand::Describe(args) => commands::describe::run(
                &engine,
                &ctx,
                &args.env,
                args.session.as_deref(),
                args.outer,
            ),
            EnvCommand::Rename { env, new_name } => {
                commands::rename::run(&engine, &ctx, &env, &new_name)
            }
            EnvCommand::Delete { env } => commands::decommission::run(&engine, &ctx, &env, json),
        },
        Commands::Session(cmd) => match cmd {
            SessionCommand::Open { env } => commands::open::run(&engine, &ctx, &env, json),
            SessionCommand::List { env, state } => {
                commands::sessions::run(&engine, &ctx, &env, state, json)
            }
            SessionCommand::Show { session } => {
                commands::inspect::run(&engine, &ctx, &session, json)
            }
            SessionCommand::Edit {
                session,
                file,
                objects,
            } => commands::edit::run(&engine, &ctx, &session, &file, objects, json),
            SessionCommand::Deploy { session } => {
                commands::deploy::run(&engine, &ctx, &session, json)
            }
            SessionCommand::Delete { session } => commands::discard::run(&engine, &session),
        },
        Commands::Tasks(cmd) => match cmd {
            TasksCommand::List => commands::tasks::list(&engine, json),
            TasksCommand::Complete { task_id, failed } => {
                commands::tasks::complete(&engine, &task_id, failed, json)
            }
        },
    }
}

fn exit_code_for(msg: &str) -> u8 {
    if msg.starts_with("concurrency conflict:") {
        EXIT_CONFLICT
    } else if msg.starts_with("environment not found")
        || msg.starts_with("session not found")
        || msg.starts_with("task not found")
        || msg.starts_with("no environment matching")
    {
        EXIT_NOT_FOUND
    } else if msg.starts_with("store ") {
        EXIT_STORE_ERROR
    } else {
        EXIT_FAILURE
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(stripped);
        }
    }
    PathBuf::from(path)
}
