//! Core application

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api::ApiServer;
use crate::core::banner;
use crate::core::cli::{self, CliConfig, Commands};
use crate::core::config::AppConfig;
use crate::core::constants::{DEBUG_LOG_FILTER, DEFAULT_LOG_FILTER, ENV_LOG};
use crate::core::shutdown::ShutdownService;
use crate::data::{ConnectionService, QueryConnection};
use crate::domain::query::OperationRegistry;

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
    pub database: Arc<ConnectionService>,
    pub operations: Arc<OperationRegistry>,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();

        let (cli_config, command) = cli::parse();
        Self::init_logging(cli_config.debug);

        tracing::debug!("Application starting");
        tracing::trace!(command = ?command, "Parsed command");

        let app = Self::init(&cli_config).await?;
        match command {
            Some(Commands::Check) => app.check().await,
            Some(Commands::Start) | None => Self::start_server(app).await,
        }
    }

    async fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;

        let operations = Arc::new(
            OperationRegistry::from_config(&config.operations)
                .context("Invalid operation configuration")?,
        );

        let database = Arc::new(
            ConnectionService::init(&config.database)
                .await
                .with_context(|| {
                    format!(
                        "Failed to connect to {} database",
                        config.database.backend
                    )
                })?,
        );
        tracing::debug!(backend = %database.backend(), "Database initialized");

        let shutdown = ShutdownService::new(database.clone());

        Ok(Self {
            shutdown,
            config,
            database,
            operations,
        })
    }

    fn init_logging(debug: bool) {
        let default_filter = if debug {
            DEBUG_LOG_FILTER
        } else {
            DEFAULT_LOG_FILTER
        };

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or_else(|_| default_filter.to_string());

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    /// Validate configuration and connectivity, then exit
    async fn check(self) -> Result<()> {
        self.database
            .ping()
            .await
            .context("Database connectivity check failed")?;

        println!(
            "Database: {} ({})",
            self.config.database.backend,
            banner::redact_url(&self.config.database.url)
        );
        println!("Operations: {}", self.operations.len());
        for op in self.operations.iter() {
            let filtering = if op.builtin_filtering {
                format!(" filter=[{}]", op.filtering_columns.join(", "))
            } else {
                String::new()
            };
            println!("  {:<10} {}{}", op.kind.as_str(), op.name, filtering);
        }

        self.shutdown.shutdown().await;
        Ok(())
    }

    async fn start_server(app: Self) -> Result<()> {
        // Install signal handlers before serving
        app.shutdown.install_signal_handlers();

        banner::print_banner(
            &app.config.server.host,
            app.config.server.port,
            app.config.database.backend,
            app.operations.len(),
        );

        let server = ApiServer::new(app);
        let app = server.start().await?;
        app.shutdown.shutdown().await;

        Ok(())
    }
}
