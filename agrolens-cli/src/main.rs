//! Agrolens CLI - drive the session lifecycle from a terminal
//!
//! Stands in for the mobile presentation layer: runs the splash sequence,
//! adopts and hydrates credentials, and logs out against the configured backend.

use agrolens_core::{
    default_config_path, init_logging, log_operation_error, log_operation_start,
    log_operation_success, AgroConfig, AuthToken, Notice, NoticeKind, Notifier, UserId,
};
use agrolens_navigation::{NavigationRuntime, Topology};
use agrolens_session::{
    BootOutcome, BootSequencer, FileSessionStore, HttpSessionGateway, SessionController,
};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "agrolens")]
#[command(about = "Session lifecycle client for the agrolens backend")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the splash sequence and print where it lands
    Boot,

    /// Print the navigation topology
    Routes,

    /// Store credentials issued by the backend and resolve the user
    Login {
        /// Bearer token
        #[arg(long)]
        token: String,

        /// User identifier
        #[arg(long)]
        user_id: String,
    },

    /// Hydrate the stored session and greet the user
    Whoami,

    /// End the stored session on the server and locally
    Logout,

    /// Show or initialize configuration
    Config {
        /// Write the default configuration to the config path
        #[arg(long)]
        init: bool,
    },
}

/// Prints notices the way the app would show an alert
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        match notice.kind {
            NoticeKind::Info => println!("{}: {}", notice.title, notice.message),
            NoticeKind::Error => eprintln!("{}: {}", notice.title, notice.message),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(default_config_path);

    let config = AgroConfig::load_or_default(&config_path)
        .with_context(|| format!("Failed to load configuration from {:?}", config_path))?;

    let mut logging_config = config.logging.clone();
    if cli.verbose {
        logging_config.level = "debug".to_string();
    }
    init_logging(&logging_config).map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    info!("Starting agrolens CLI v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Boot => handle_boot(&config).await?,
        Commands::Routes => print!("{}", Topology::global().outline()),
        Commands::Login { token, user_id } => handle_login(&config, token, user_id).await?,
        Commands::Whoami => handle_whoami(&config).await?,
        Commands::Logout => handle_logout(&config).await?,
        Commands::Config { init } => handle_config(&config, &config_path, init)?,
    }

    Ok(())
}

fn controller(
    config: &AgroConfig,
    navigator: Arc<NavigationRuntime>,
) -> Result<SessionController> {
    let store = Arc::new(FileSessionStore::new(config.storage.session_path()));
    let gateway = Arc::new(HttpSessionGateway::new(&config.backend)?);
    let controller = SessionController::new(
        store,
        gateway,
        navigator.clone(),
        Arc::new(ConsoleNotifier),
    );
    navigator.attach_gate(Arc::new(controller.subscribe()))?;
    Ok(controller)
}

fn runtime() -> Arc<NavigationRuntime> {
    Arc::new(NavigationRuntime::new(Topology::global()))
}

async fn handle_boot(config: &AgroConfig) -> Result<()> {
    let runtime = runtime();
    let sequencer = BootSequencer::from_config(&config.boot);
    println!("Splash for {} ms", sequencer.delay().as_millis());

    let guard = sequencer.start(runtime.clone())?;
    let outcome = tokio::select! {
        outcome = guard.wait() => outcome?,
        _ = tokio::signal::ctrl_c() => BootOutcome::Cancelled,
    };

    match outcome {
        BootOutcome::Navigated => println!("Landed on {}", runtime.current()?.name),
        BootOutcome::Cancelled => println!("Boot cancelled"),
        BootOutcome::Failed(message) => return Err(anyhow!("Boot failed: {}", message)),
    }
    Ok(())
}

async fn handle_login(config: &AgroConfig, token: String, user_id: String) -> Result<()> {
    let token = AuthToken::new(token).ok_or_else(|| anyhow!("Token must not be empty"))?;
    let user_id = UserId::new(user_id).ok_or_else(|| anyhow!("User ID must not be empty"))?;

    log_operation_start!("login", user_id = %user_id);
    let mut controller = controller(config, runtime())?;
    let state = controller.adopt(token, user_id).await.map_err(|e| {
        log_operation_error!("login", e);
        e
    })?;
    log_operation_success!("login", state = %state);

    println!("{}", controller.session().greeting());
    Ok(())
}

async fn handle_whoami(config: &AgroConfig) -> Result<()> {
    let mut controller = controller(config, runtime())?;
    let state = controller.hydrate().await?;
    if state.is_authenticated() {
        println!("{}", controller.session().greeting());
    } else {
        println!("Not logged in");
    }
    Ok(())
}

async fn handle_logout(config: &AgroConfig) -> Result<()> {
    let runtime = runtime();
    let mut controller = controller(config, runtime.clone())?;
    if !controller.hydrate().await?.is_authenticated() {
        println!("Not logged in");
        return Ok(());
    }
    controller.logout().await?;
    println!("Now on {}", runtime.current()?.name);
    Ok(())
}

fn handle_config(config: &AgroConfig, path: &Path, init: bool) -> Result<()> {
    if init {
        let defaults = AgroConfig::default();
        defaults.save_to_file(path)?;
        println!("Configuration initialized at: {:?}", path);
        return Ok(());
    }

    config.validate()?;
    println!("# {:?}", path);
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
