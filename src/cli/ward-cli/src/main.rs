//! Ward CLI - Command line interface.

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ward_crypto::random::generate_token;
use ward_service::{CryptService, FieldConfig, ServiceConfig};

// ============================================================================
// CLI Structure
// ============================================================================

#[derive(Parser)]
#[command(name = "ward")]
#[command(about = "Nubster Ward CLI - Encrypt, index and hash personal data")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    crypt: CryptArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct CryptArgs {
    /// Master key (hex, at least 16 bytes)
    #[arg(long, env = "WARD_MASTER_KEY", hide_env_values = true, global = true)]
    master_key: Option<String>,

    /// Key derivation salt (hex, at least 1 byte)
    #[arg(long, env = "WARD_DERIVE_KEY", hide_env_values = true, global = true)]
    derive_key: Option<String>,

    /// PII purpose secret (hex, at least 8 bytes)
    #[arg(long, env = "WARD_PII_SECRET", hide_env_values = true, global = true)]
    pii_secret: Option<String>,

    /// Lookup index purpose secret (hex, at least 8 bytes)
    #[arg(long, env = "WARD_HMAC_SECRET", hide_env_values = true, global = true)]
    hmac_secret: Option<String>,

    /// Active PII key version (1-255)
    #[arg(long, default_value = "1", env = "WARD_PII_KEY_VERSION", global = true)]
    pii_key_version: u32,

    /// Password hashing work factor (10-20)
    #[arg(long, default_value = "15", env = "WARD_PASSWORD_WORK_FACTOR", global = true)]
    password_work_factor: u32,
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a value into a base64 envelope
    Encrypt {
        /// Plaintext (read from stdin if not provided)
        value: Option<String>,
    },
    /// Decrypt a base64 envelope
    Decrypt {
        /// Envelope (read from stdin if not provided)
        envelope: Option<String>,
    },
    /// Compute the lookup index of a value
    Index {
        /// Plaintext (read from stdin if not provided)
        value: Option<String>,
    },
    /// Re-encrypt an envelope under the active key version
    Rewrap {
        /// Envelope (read from stdin if not provided)
        envelope: Option<String>,
    },
    /// Show the key version of an envelope
    Inspect {
        /// Envelope (read from stdin if not provided)
        envelope: Option<String>,
    },
    /// Hash a password
    HashPassword {
        /// Password (read from stdin if not provided)
        password: Option<String>,
    },
    /// Verify a password against a stored hash
    VerifyPassword {
        /// Stored hash
        hash: String,
        /// Password (read from stdin if not provided)
        password: Option<String>,
    },
    /// Generate random hex secrets
    GenSecret {
        /// Number of random bytes
        #[arg(long, default_value = "32")]
        bytes: usize,
        /// Print a complete set of WARD_* variables
        #[arg(long)]
        env: bool,
    },
}

impl CryptArgs {
    fn service_config(&self) -> Result<ServiceConfig> {
        let field = FieldConfig {
            master_key: required(&self.master_key, "--master-key", "WARD_MASTER_KEY")?.to_string(),
            derive_key: required(&self.derive_key, "--derive-key", "WARD_DERIVE_KEY")?.to_string(),
            pii_secret: required(&self.pii_secret, "--pii-secret", "WARD_PII_SECRET")?.to_string(),
            hmac_secret: required(&self.hmac_secret, "--hmac-secret", "WARD_HMAC_SECRET")?
                .to_string(),
            pii_key_version: self.pii_key_version,
        };

        Ok(ServiceConfig {
            field,
            password_work_factor: self.password_work_factor,
        })
    }

    fn service(&self) -> Result<CryptService> {
        let config = self.service_config()?;
        CryptService::new(&config).context("Failed to initialize crypt service")
    }
}

fn required<'a>(value: &'a Option<String>, flag: &str, env: &str) -> Result<&'a str> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => bail!("Missing {} (or {})", flag, env),
    }
}

/// Returns `value`, or reads one line from stdin without its line ending.
fn read_value(value: Option<String>, prompt: &str) -> Result<String> {
    let value = match value {
        Some(v) => v,
        None => {
            eprint!("{}: ", prompt);
            io::stderr().flush()?;
            let stdin = io::stdin();
            let mut line = String::new();
            stdin.lock().read_line(&mut line)?;
            line.trim_end_matches(['\r', '\n']).to_string()
        },
    };

    if value.is_empty() {
        bail!("{} cannot be empty", prompt);
    }

    Ok(value)
}

// ============================================================================
// Command Handlers
// ============================================================================

fn cmd_encrypt(service: &CryptService, value: Option<String>) -> Result<()> {
    let value = read_value(value, "Value")?;
    println!("{}", service.encrypt_field(&value)?);
    Ok(())
}

fn cmd_decrypt(service: &CryptService, envelope: Option<String>) -> Result<()> {
    let envelope = read_value(envelope, "Envelope")?;
    println!("{}", service.decrypt_field(&envelope)?);
    Ok(())
}

fn cmd_index(service: &CryptService, value: Option<String>) -> Result<()> {
    let value = read_value(value, "Value")?;
    println!("{}", service.lookup_index(&value)?);
    Ok(())
}

fn cmd_rewrap(service: &CryptService, envelope: Option<String>) -> Result<()> {
    let envelope = read_value(envelope, "Envelope")?;
    println!("{}", service.rewrap_field(&envelope)?);
    Ok(())
}

fn cmd_inspect(service: &CryptService, envelope: Option<String>) -> Result<()> {
    let envelope = read_value(envelope, "Envelope")?;
    let fields = service.fields();

    let version = fields
        .envelope_version(&envelope)
        .context("Not a valid envelope")?;

    let info = serde_json::json!({
        "version": version.as_u8(),
        "active_version": fields.active_version().as_u8(),
        "needs_rewrap": version != fields.active_version(),
    });
    println!("{}", serde_json::to_string_pretty(&info)?);

    Ok(())
}

async fn cmd_hash_password(service: &CryptService, password: Option<String>) -> Result<()> {
    let password = read_value(password, "Password")?;
    println!("{}", service.hash_password(&password).await?);
    Ok(())
}

async fn cmd_verify_password(
    service: &CryptService,
    hash: &str,
    password: Option<String>,
) -> Result<()> {
    let password = read_value(password, "Password")?;

    if service.verify_password(&password, hash).await? {
        println!("Password matches");
        Ok(())
    } else {
        bail!("Password does not match")
    }
}

fn cmd_gen_secret(bytes: usize, env: bool) -> Result<()> {
    if bytes == 0 {
        bail!("Byte count must be greater than 0");
    }

    if env {
        println!("WARD_MASTER_KEY={}", generate_token(bytes.max(32)));
        println!("WARD_DERIVE_KEY={}", generate_token(16));
        println!("WARD_PII_SECRET={}", generate_token(bytes.max(16)));
        println!("WARD_HMAC_SECRET={}", generate_token(bytes.max(16)));
        println!("WARD_PII_KEY_VERSION=1");
    } else {
        println!("{}", generate_token(bytes));
    }

    Ok(())
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Commands::GenSecret { bytes, env } = cli.command {
        return cmd_gen_secret(bytes, env);
    }

    let service = cli.crypt.service()?;
    tracing::debug!(
        active_version = %service.fields().active_version(),
        "Crypt service configured"
    );

    match cli.command {
        Commands::Encrypt { value } => cmd_encrypt(&service, value),
        Commands::Decrypt { envelope } => cmd_decrypt(&service, envelope),
        Commands::Index { value } => cmd_index(&service, value),
        Commands::Rewrap { envelope } => cmd_rewrap(&service, envelope),
        Commands::Inspect { envelope } => cmd_inspect(&service, envelope),
        Commands::HashPassword { password } => cmd_hash_password(&service, password).await,
        Commands::VerifyPassword { hash, password } => {
            cmd_verify_password(&service, &hash, password).await
        },
        Commands::GenSecret { bytes, env } => cmd_gen_secret(bytes, env),
    }
}
