//! CLI commands

use anyhow::{Context, Result, bail};
use campus_core::ClientConfig;
use campus_frontend_common::{
    AuthConfig, Guard, GuardView, MemoryNavigator, ProtectedRouteRequest, RefreshOutcome,
    SessionContext, create_client, create_session_context, create_store,
};
use campus_http::types::{LoginRequest, SignupRequest};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use crate::cookies::PersistentJar;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Sign in with email and password
    Login {
        /// Account email
        email: String,

        /// Account password
        #[arg(long, env = "CAMPUS_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Register a new account from a JSON registration form
    Signup {
        /// Path to the registration form
        form: PathBuf,
    },

    /// Show the signed-in user, refreshing the session first
    Whoami {
        /// Require the admin role
        #[arg(long)]
        admin: bool,
    },

    /// Exchange the stored long-lived credential for a new session
    Refresh,

    /// Sign out and forget the session
    Logout,
}

/// Session context wired to the persisted cookie jar
struct Connection {
    session: SessionContext,
    navigator: Arc<MemoryNavigator>,
    cookies: PersistentJar,
}

impl Connection {
    fn open(config: &ClientConfig) -> Result<Self> {
        let cookies = PersistentJar::open(&config.data_dir, &config.base_url)?;
        let store = create_store(config);
        let client = create_client(config, store, Some(cookies.jar()))
            .context("Failed to create API client")?;
        let navigator = Arc::new(MemoryNavigator::new());
        let session = create_session_context(config, client, navigator.clone());

        Ok(Self {
            session,
            navigator,
            cookies,
        })
    }

    fn close(self) -> Result<()> {
        self.cookies.save()
    }

    fn redirected_to_login(&self) -> bool {
        self.navigator.current().as_ref() == Some(self.session.login_route())
    }
}

impl Commands {
    pub async fn execute(self, config: ClientConfig) -> Result<()> {
        let connection = Connection::open(&config)?;
        let signs_in = matches!(self, Commands::Login { .. } | Commands::Signup { .. });
        let result = self.run(&connection).await;
        let signed_out = !signs_in && connection.redirected_to_login();
        let closed = connection.close();

        let result = if signed_out {
            result.context("Session ended; run `campus login` to sign in again")
        } else {
            result
        };
        finish(result, closed)
    }

    async fn run(self, connection: &Connection) -> Result<()> {
        let session = &connection.session;

        match self {
            Commands::Login { email, password } => {
                let credentials = session.login(&LoginRequest::new(email, password)).await?;
                println!("Signed in as {} ({})", credentials.user_id, credentials.role);
                Ok(())
            }
            Commands::Signup { form } => {
                let content = std::fs::read_to_string(&form)
                    .with_context(|| format!("Failed to read {}", form.display()))?;
                let request: SignupRequest = serde_json::from_str(&content)
                    .with_context(|| format!("Invalid registration form {}", form.display()))?;
                let credentials = session.signup(&request).await?;
                println!("Registered as {} ({})", credentials.user_id, credentials.role);
                Ok(())
            }
            Commands::Whoami { admin } => whoami(connection, admin).await,
            Commands::Refresh => match session.refresh().await {
                RefreshOutcome::Success(credentials) => {
                    println!("Session refreshed for {}", credentials.user_id);
                    Ok(())
                }
                RefreshOutcome::Failure(reason) => bail!("Not signed in: {reason}"),
                RefreshOutcome::Pending => bail!("Refresh did not settle"),
            },
            Commands::Logout => {
                session.logout().await;
                println!("Signed out");
                Ok(())
            }
        }
    }
}

async fn whoami(connection: &Connection, admin: bool) -> Result<()> {
    let request = if admin {
        ProtectedRouteRequest::admin(AuthConfig::ADMIN_ROUTE)
    } else {
        ProtectedRouteRequest::new(AuthConfig::PROFILE_ROUTE)
    };

    let guard = Guard::new(connection.session.clone());
    match guard.enter(&request).await {
        GuardView::Render { credentials, .. } => {
            info!(user_id = %credentials.user_id, "Session valid");
            let profile = connection.session.profile().await?;
            println!("{}", serde_json::to_string_pretty(&profile.user)?);
            println!("role: {}", credentials.role);
            Ok(())
        }
        GuardView::Redirect(route) => bail!("Not signed in (redirected to {route})"),
        GuardView::Forbidden(route) => bail!("Admin role required (redirected to {route})"),
        GuardView::Loading => bail!("Session did not settle"),
    }
}

/// Outcome of a command after saving cookies; the command's own error wins
fn finish(result: Result<()>, closed: Result<()>) -> Result<()> {
    match (result, closed) {
        (Err(e), Err(close)) => {
            warn!("Failed to save cookies: {close:#}");
            Err(e)
        }
        (Ok(()), closed) => closed,
        (result, Ok(())) => result,
    }
}
