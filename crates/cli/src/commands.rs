//! CLI commands

use anyhow::{Context, Result, bail};
use clap::{Subcommand, ValueEnum};
use orvio_client::types::{CreateApiKeyRequest, CreditMode, ServiceSendOtpRequest};
use orvio_client::validation::validate_phone_number;
use orvio_client::{
    AuthenticatedOrvioClient, ClientError, OrvioClientBuilder, PublicOrvioClient, SessionStore,
};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;

use crate::config;
use crate::session_file::FileSessionStore;

// Resend policy matching the platform's sign-in widget.
const INITIAL_RESEND_COOLDOWN: Duration = Duration::from_secs(30);
const RESEND_COOLDOWN_INCREMENT: Duration = Duration::from_secs(30);
const MAX_RESEND_ATTEMPTS: u32 = 3;

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in with a phone number and one-time passcode
    Login {
        /// Phone number in +<country code><number> form
        #[arg(long)]
        phone: String,
    },

    /// Forget the saved session
    Logout,

    /// Show account, device and credit statistics
    Stats,

    /// API key operations
    Keys {
        #[command(subcommand)]
        command: KeyCommands,
    },

    /// Send a test message through the delivery service
    Send {
        /// Recipient phone number in +<country code><number> form
        #[arg(long)]
        phone: String,

        /// Webhook URL for delivery-report events
        #[arg(long)]
        webhook: Option<String>,

        /// Shared secret for signing webhook deliveries (requires --webhook)
        #[arg(long)]
        secret: Option<String>,

        /// Organization name shown to the recipient
        #[arg(long)]
        org_name: Option<String>,
    },

    /// Change how credits are charged
    CreditMode {
        /// Charging mode
        mode: CreditModeArg,
    },

    /// Configuration file operations
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum KeyCommands {
    /// List all API keys on the account
    List,

    /// Create a new API key
    Create {
        /// Display name for the key
        #[arg(long)]
        name: String,

        /// Organization name to associate with the key
        #[arg(long)]
        org_name: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Generate a default configuration file
    Init {
        /// Output file path (defaults to <data dir>/config.json)
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CreditModeArg {
    Direct,
    Moderate,
    Strict,
}

impl From<CreditModeArg> for CreditMode {
    fn from(mode: CreditModeArg) -> Self {
        match mode {
            CreditModeArg::Direct => Self::Direct,
            CreditModeArg::Moderate => Self::Moderate,
            CreditModeArg::Strict => Self::Strict,
        }
    }
}

/// Default data directory: `ORVIO_STATE_DIR`, else the system data dir
pub fn default_data_dir() -> PathBuf {
    if let Ok(state_dir) = std::env::var("ORVIO_STATE_DIR") {
        PathBuf::from(state_dir)
    } else {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("orvio")
    }
}

impl Commands {
    pub async fn execute(self, data_dir: Option<PathBuf>) -> Result<()> {
        let data_dir = data_dir.unwrap_or_else(default_data_dir);

        match self {
            Commands::Login { phone } => login(phone, data_dir).await,
            Commands::Logout => logout(data_dir),
            Commands::Stats => show_stats(data_dir).await,
            Commands::Keys { command } => command.execute(data_dir).await,
            Commands::Send {
                phone,
                webhook,
                secret,
                org_name,
            } => send_test_message(phone, webhook, secret, org_name, data_dir).await,
            Commands::CreditMode { mode } => set_credit_mode(mode.into(), data_dir).await,
            Commands::Config { command } => command.execute(data_dir),
        }
    }
}

impl KeyCommands {
    pub async fn execute(self, data_dir: PathBuf) -> Result<()> {
        match self {
            KeyCommands::List => list_keys(data_dir).await,
            KeyCommands::Create { name, org_name } => create_key(name, org_name, data_dir).await,
        }
    }
}

impl ConfigCommands {
    pub fn execute(self, data_dir: PathBuf) -> Result<()> {
        match self {
            ConfigCommands::Init { output } => {
                let config_path = if let Some(path) = output {
                    path
                } else {
                    data_dir.join("config.json")
                };

                if let Some(parent) = config_path.parent() {
                    std::fs::create_dir_all(parent)?;
                }

                config::generate_default_config(&config_path)?;
                println!("Generated configuration at: {}", config_path.display());
                Ok(())
            }
        }
    }
}

fn public_client(data_dir: &std::path::Path) -> Result<PublicOrvioClient> {
    let config = config::load_config(data_dir)?;
    let client = OrvioClientBuilder::new()
        .base_url(config.api_base_url)
        .build_public()?;
    Ok(client)
}

/// Load the saved session into an authenticated client
///
/// Callers save the client's session back through the store once done, so an
/// access token rotated by a transparent refresh outlives the command.
fn open_session(data_dir: &std::path::Path) -> Result<(FileSessionStore, AuthenticatedOrvioClient)> {
    let store = FileSessionStore::new(data_dir);
    let session = store
        .load()?
        .context("not signed in; run 'orvio login' first")?;

    let config = config::load_config(data_dir)?;
    let client = OrvioClientBuilder::new()
        .base_url(config.api_base_url)
        .build_authenticated(session)?;
    Ok((store, client))
}

fn prompt(message: &str) -> Result<String> {
    use std::io::Write;

    print!("{message}");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

async fn login(phone: String, data_dir: PathBuf) -> Result<()> {
    validate_phone_number(&phone)?;

    let client = public_client(&data_dir)?;
    let mut transaction = client.send_otp(&phone).await.context("failed to send code")?;
    info!(transaction_id = %transaction.transaction_id, "verification code sent");
    println!("Verification code sent to {phone}");

    let mut resend_attempts = 0u32;
    let mut last_sent = Instant::now();

    loop {
        let input = prompt("Enter the 6-digit code (or 'resend'): ")?;

        if input == "resend" {
            if resend_attempts >= MAX_RESEND_ATTEMPTS {
                println!("Maximum resend attempts reached; verify the code you have or start over.");
                continue;
            }
            let cooldown = INITIAL_RESEND_COOLDOWN + RESEND_COOLDOWN_INCREMENT * resend_attempts;
            let elapsed = last_sent.elapsed();
            if elapsed < cooldown {
                println!("Please wait {}s before resending.", (cooldown - elapsed).as_secs());
                continue;
            }

            transaction = client
                .resend_otp(&transaction.transaction_id)
                .await
                .context("failed to resend code")?;
            resend_attempts += 1;
            last_sent = Instant::now();
            println!(
                "Code resent ({} attempt{} left)",
                MAX_RESEND_ATTEMPTS - resend_attempts,
                if MAX_RESEND_ATTEMPTS - resend_attempts == 1 { "" } else { "s" }
            );
            continue;
        }

        if input.len() != 6 || !input.bytes().all(|b| b.is_ascii_digit()) {
            println!("Please enter all 6 digits.");
            continue;
        }

        match client.verify_otp(&transaction.transaction_id, &input).await {
            Ok(session) => {
                let store = FileSessionStore::new(&data_dir);
                store.save(&session)?;
                println!("Signed in.");
                return Ok(());
            }
            Err(e @ (ClientError::AuthenticationFailed(_) | ClientError::BadRequest(_))) => {
                println!("Code rejected: {e}. Try again or type 'resend'.");
            }
            Err(e) => return Err(e).context("failed to verify code"),
        }
    }
}

fn logout(data_dir: PathBuf) -> Result<()> {
    FileSessionStore::new(&data_dir).clear()?;
    println!("Signed out.");
    Ok(())
}

async fn show_stats(data_dir: PathBuf) -> Result<()> {
    let (store, client) = open_session(&data_dir)?;
    let stats = client.stats().await.context("failed to fetch stats")?;
    store.save(&client.session())?;

    let devices = &stats.provider.all_devices;
    let aggregate = &stats.consumer.aggregate;

    println!("Credits: {} ({} mode)", stats.credits.balance, stats.credits.mode);
    println!();
    println!("Devices");
    println!("  Active devices:         {}", devices.active_devices);
    println!("  Total devices:          {}", devices.total_devices);
    println!("  Messages sent:          {}", devices.total_messages_sent);
    println!("  Delivered & verified:   {}", devices.sent_ack_verified);
    println!("  Delivered, unverified:  {}", devices.sent_ack_not_verified);
    println!("  Failed sends:           {}", devices.failed_to_send_ack);
    println!();
    println!("API keys: {} ({} active)", aggregate.total_keys, aggregate.active_keys);
    for key in &stats.consumer.keys {
        let last_used = key
            .last_used
            .map_or_else(|| "never".to_string(), |t| t.format("%Y-%m-%d").to_string());
        println!(
            "  - {}  created {}  last used {}",
            key.name,
            key.created_at.format("%Y-%m-%d"),
            last_used
        );
    }

    Ok(())
}

async fn list_keys(data_dir: PathBuf) -> Result<()> {
    let (store, client) = open_session(&data_dir)?;
    let keys = client.list_api_keys().await.context("failed to list API keys")?;
    store.save(&client.session())?;

    if keys.is_empty() {
        println!("No API keys. Create one with 'orvio keys create --name <name>'.");
        return Ok(());
    }

    for key in keys {
        let last_used = key
            .last_used
            .map_or_else(|| "never".to_string(), |t| t.format("%Y-%m-%d").to_string());
        println!("{}  ({})", key.name, key.id);
        println!("  created:   {}", key.created_at.format("%Y-%m-%d"));
        println!("  last used: {last_used}");
        println!("  key token: {}", key.session.refresh_token);
    }

    Ok(())
}

async fn create_key(name: String, org_name: Option<String>, data_dir: PathBuf) -> Result<()> {
    if name.trim().is_empty() {
        bail!("API key name cannot be empty");
    }

    let (store, client) = open_session(&data_dir)?;
    client
        .create_api_key(CreateApiKeyRequest {
            name: name.trim().to_string(),
            org_name: org_name.map(|o| o.trim().to_string()).filter(|o| !o.is_empty()),
        })
        .await
        .context("failed to create API key")?;
    store.save(&client.session())?;

    println!("API key created.");
    Ok(())
}

async fn send_test_message(
    phone: String,
    webhook: Option<String>,
    secret: Option<String>,
    org_name: Option<String>,
    data_dir: PathBuf,
) -> Result<()> {
    let (store, client) = open_session(&data_dir)?;
    let response = client
        .send_service_otp(ServiceSendOtpRequest {
            phone_number: phone,
            reporting_webhook: webhook,
            reporting_secret: secret,
            org_name: org_name.map(|o| o.trim().to_string()).filter(|o| !o.is_empty()),
        })
        .await
        .context("failed to send test message")?;
    store.save(&client.session())?;

    if response.success {
        println!("Test message sent (transaction {})", response.transaction_id);
    } else {
        println!("Delivery not confirmed: {}", response.message);
    }

    Ok(())
}

async fn set_credit_mode(mode: CreditMode, data_dir: PathBuf) -> Result<()> {
    let (store, client) = open_session(&data_dir)?;
    client
        .set_credit_mode(mode)
        .await
        .context("failed to update credit mode")?;
    store.save(&client.session())?;

    println!("Credit mode set to {mode}.");
    Ok(())
}
