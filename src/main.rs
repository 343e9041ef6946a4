use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use vcfa_supervisor_ns::config::Config;
use vcfa_supervisor_ns::supervisor_namespace::{SupervisorNamespaceResource, SupervisorNamespaceState};
use vcfa_supervisor_ns::vcfa::VcfaClient;

/// Manage VCF Automation Supervisor Namespaces
#[derive(Parser, Debug)]
#[command(name = "vcfa-ns", version, about, long_about = None)]
struct Args {
    #[command(flatten)]
    connection: ConnectionArgs,

    /// Output format for the resulting state
    #[arg(long, value_enum, global = true, default_value = "yaml")]
    output: OutputFormat,

    /// Log level for debugging
    #[arg(long, value_enum, global = true, default_value = "off")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct ConnectionArgs {
    /// VCFA endpoint (overrides VCFA_URL and the config file)
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// API token (overrides VCFA_TOKEN and the config file)
    #[arg(long, global = true)]
    token: Option<String>,

    /// Wait timeout in seconds for create and delete
    #[arg(long, global = true)]
    timeout: Option<u64>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a Supervisor Namespace and wait until it is CREATED
    Create {
        /// Declared configuration (YAML or JSON)
        #[arg(short, long)]
        config: PathBuf,
        /// Where to write the resulting state
        #[arg(short, long, default_value = "supervisor-namespace.state.json")]
        state: PathBuf,
    },
    /// Refresh a state file from the backend
    Read {
        #[arg(short, long, default_value = "supervisor-namespace.state.json")]
        state: PathBuf,
    },
    /// Apply a changed configuration (always rejected)
    Update {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long, default_value = "supervisor-namespace.state.json")]
        state: PathBuf,
    },
    /// Delete a Supervisor Namespace and wait until it is gone
    Delete {
        #[arg(short, long, default_value = "supervisor-namespace.state.json")]
        state: PathBuf,
    },
    /// Persist --endpoint, --token and the options below to the config file
    Configure {
        /// Default Project for new Supervisor Namespaces
        #[arg(long)]
        project: Option<String>,
        /// Seconds between status polls
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        poll_interval: Option<u64>,
    },
    /// Import an existing Supervisor Namespace: <project_name>.<name>
    Import {
        id: String,
        #[arg(short, long, default_value = "supervisor-namespace.state.json")]
        state: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("vcfa-ns started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("vcfa-ns").join("vcfa-ns.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".vcfa-ns").join("vcfa-ns.log");
    }
    PathBuf::from("vcfa-ns.log")
}

/// Read a declared configuration; YAML is a superset of JSON so both parse
fn load_declared(path: &Path, config: &Config) -> Result<SupervisorNamespaceState> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let mut declared: SupervisorNamespaceState = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    if declared.project_name.is_empty() {
        if let Some(project) = config.effective_project() {
            declared.project_name = project;
        }
    }
    Ok(declared)
}

fn load_state(path: &Path) -> Result<SupervisorNamespaceState> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read state {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse state {}", path.display()))
}

fn save_state(path: &Path, state: &SupervisorNamespaceState) -> Result<()> {
    let content = serde_json::to_string_pretty(state)?;
    std::fs::write(path, content).with_context(|| format!("Failed to write state {}", path.display()))
}

fn print_state(state: &SupervisorNamespaceState, format: OutputFormat) -> Result<()> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(state)?,
        OutputFormat::Yaml => serde_yaml::to_string(state)?,
    };
    println!("{}", rendered.trim_end());
    Ok(())
}

/// Build the lifecycle manager from the effective endpoint, token and timeouts
fn connect(config: &Config, args: &ConnectionArgs) -> Result<SupervisorNamespaceResource> {
    let Some(endpoint) = config.effective_endpoint(args.endpoint.as_deref()) else {
        bail!("No VCFA endpoint configured. Set VCFA_URL or use --endpoint");
    };
    let token = config.effective_token(args.token.as_deref());
    if token.is_none() {
        tracing::warn!("No API token configured, requests are sent unauthenticated");
    }

    tracing::info!("Using endpoint: {}", endpoint);

    let client = VcfaClient::new(&endpoint, token).context("Failed to create HTTP client")?;
    Ok(SupervisorNamespaceResource::new(client)
        .with_policy(config.wait_policy())
        .with_timeouts(config.timeouts(args.timeout.map(Duration::from_secs))))
}

/// Cancel `token` on Ctrl-C so pending waits stop promptly
fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling");
            token.cancel();
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level)?;

    let mut config = Config::load();
    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());

    match args.command {
        Command::Configure { project, poll_interval } => {
            let ConnectionArgs {
                endpoint,
                token,
                timeout,
            } = args.connection;
            if let Some(endpoint) = endpoint {
                config.endpoint = Some(endpoint);
            }
            if let Some(token) = token {
                config.token = Some(token);
            }
            if let Some(project) = project {
                config.project_name = Some(project);
            }
            if let Some(secs) = poll_interval {
                config.poll_interval_secs = secs;
            }
            if let Some(secs) = timeout {
                config.timeouts.create_secs = Some(secs);
                config.timeouts.delete_secs = secs;
            }
            config.save()?;
            if let Some(path) = Config::config_path() {
                println!("Saved {}", path.display());
            }
        }
        Command::Create { config: path, state } => {
            let resource = connect(&config, &args.connection)?;
            let declared = load_declared(&path, &config)?;
            let created = match resource.create(&declared, &cancel).await {
                Ok(created) => created,
                Err(err) => {
                    if let Some(partial) = err.created_state() {
                        save_state(&state, partial)?;
                        tracing::warn!("Saved identity of created object to {}", state.display());
                    }
                    return Err(err.into());
                }
            };
            save_state(&state, &created)?;
            print_state(&created, args.output)?;
        }
        Command::Read { state } => {
            let resource = connect(&config, &args.connection)?;
            let current = load_state(&state)?;
            let refreshed = resource.read(&current, &cancel).await?;
            save_state(&state, &refreshed)?;
            print_state(&refreshed, args.output)?;
        }
        Command::Update { config: path, state } => {
            let resource = connect(&config, &args.connection)?;
            let prior = load_state(&state)?;
            let planned = load_declared(&path, &config)?;
            resource.update(&prior, &planned)?;
        }
        Command::Delete { state } => {
            let resource = connect(&config, &args.connection)?;
            let current = load_state(&state)?;
            let deleted = resource.delete(&current, &cancel).await?;
            save_state(&state, &deleted)?;
            print_state(&deleted, args.output)?;
        }
        Command::Import { id, state } => {
            if state.exists() {
                bail!("State file {} already exists", state.display());
            }
            let resource = connect(&config, &args.connection)?;
            let imported = resource.import(&id, &cancel).await?;
            save_state(&state, &imported)?;
            print_state(&imported, args.output)?;
        }
    }

    Ok(())
}
