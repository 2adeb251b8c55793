//! chunkseal: parallel chunked encryption CLI
//!
//! Commands:
//!   demo                 - single-shot encrypt/decrypt of a fixed message
//!   selftest             - chunked round-trip of a random buffer, with throughput
//!   derive-key           - HKDF-SHA256 key derivation, hex output
//!   config show          - display the effective configuration

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rand::RngCore;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chunkseal_core::config::ChunkSealConfig;
use chunkseal_crypto::{kdf, Cipher, SecretKey, NONCE_SIZE};

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "chunkseal",
    version,
    about = "Parallel chunked XChaCha20-Poly1305 encryption"
)]
struct Cli {
    /// Path to chunkseal.toml configuration file
    #[arg(long, short = 'c', env = "CHUNKSEAL_CONFIG", default_value = "chunkseal.toml")]
    config: PathBuf,

    /// Log level or filter directive (overrides config)
    #[arg(long, env = "CHUNKSEAL_LOG")]
    log: Option<String>,

    /// Log format (overrides config)
    #[arg(long, env = "CHUNKSEAL_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Debug, ValueEnum)]
enum LogFormat {
    Json,
    Text,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encrypt and decrypt a fixed message with a random key and nonce
    Demo,

    /// Chunk-encrypt a random buffer, decrypt it, and verify the result
    Selftest {
        /// Buffer size in bytes
        #[arg(long, short = 's', default_value_t = 10 * 1024 * 1024)]
        size: usize,
        /// Number of round-trips to run
        #[arg(long, short = 'n', default_value_t = 1)]
        iterations: u32,
    },

    /// Derive key material with HKDF-SHA256
    #[command(name = "derive-key")]
    DeriveKey {
        /// Input key material (hex)
        #[arg(long)]
        ikm: String,
        /// Salt (hex); omitted means 32 zero bytes
        #[arg(long)]
        salt: Option<String>,
        /// Context/application info string
        #[arg(long, default_value = "")]
        info: String,
        /// Output length in bytes (max 8160)
        #[arg(long, short = 'l', default_value_t = 32)]
        length: usize,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the active configuration (merged defaults + config file)
    Show,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ChunkSealConfig::load(&cli.config)
        .with_context(|| format!("loading config {}", cli.config.display()))?;

    let level = cli.log.as_deref().unwrap_or(&config.log.level);
    let format = cli.log_format.unwrap_or(match config.log.format.as_str() {
        "json" => LogFormat::Json,
        _ => LogFormat::Text,
    });
    init_logging(level, &format);

    match cli.command {
        Commands::Demo => cmd_demo(),
        Commands::Selftest { size, iterations } => cmd_selftest(&config, size, iterations),
        Commands::DeriveKey {
            ikm,
            salt,
            info,
            length,
        } => cmd_derive_key(&ikm, salt.as_deref(), &info, length),
        Commands::Config {
            action: ConfigAction::Show,
        } => cmd_config_show(&config, &cli.config),
    }
}

fn init_logging(level: &str, format: &LogFormat) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

// ── `chunkseal demo` ──────────────────────────────────────────────────────────

fn cmd_demo() -> Result<()> {
    let key = SecretKey::generate();
    let mut nonce = [0u8; NONCE_SIZE];
    rand::thread_rng().fill_bytes(&mut nonce);

    let plaintext = b"This is a secret message that will be encrypted.";
    let cipher = Cipher::from_key(&key);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext, b"")
        .context("encrypting demo message")?;
    println!("Ciphertext: {}", hex::encode(&ciphertext));

    let decrypted = cipher
        .decrypt(&nonce, &ciphertext, b"")
        .context("decrypting demo message")?;
    println!("Decrypted Text: {}", String::from_utf8_lossy(&decrypted));
    Ok(())
}

// ── `chunkseal selftest` ──────────────────────────────────────────────────────

fn cmd_selftest(config: &ChunkSealConfig, size: usize, iterations: u32) -> Result<()> {
    let key = SecretKey::generate();
    let cipher = Cipher::with_options(key.as_bytes(), config.chunking)
        .context("building cipher from config")?;

    let mut plaintext = vec![0u8; size];
    rand::thread_rng().fill_bytes(&mut plaintext);

    tracing::info!(
        size,
        iterations,
        chunk_size = config.chunking.chunk_size,
        workers = cipher.worker_count(),
        "starting self-test"
    );

    for iteration in 1..=iterations {
        let started = Instant::now();
        let chunks = cipher
            .encrypt_chunks(&plaintext)
            .with_context(|| format!("encrypt_chunks (iteration {iteration})"))?;
        let encrypt_secs = started.elapsed().as_secs_f64();

        let started = Instant::now();
        let decrypted = cipher
            .decrypt_chunks(&chunks)
            .with_context(|| format!("decrypt_chunks (iteration {iteration})"))?;
        let decrypt_secs = started.elapsed().as_secs_f64();

        if decrypted != plaintext {
            anyhow::bail!("round-trip mismatch on iteration {iteration}");
        }

        let wire_bytes: usize = chunks.iter().map(|c| c.len()).sum();
        println!(
            "iteration {iteration}: {} chunks, {} -> {} | encrypt {} | decrypt {}",
            chunks.len(),
            fmt_bytes(size as u64),
            fmt_bytes(wire_bytes as u64),
            fmt_rate(size, encrypt_secs),
            fmt_rate(size, decrypt_secs),
        );
    }

    println!("Self-test passed.");
    Ok(())
}

// ── `chunkseal derive-key` ────────────────────────────────────────────────────

fn cmd_derive_key(ikm_hex: &str, salt_hex: Option<&str>, info: &str, length: usize) -> Result<()> {
    let ikm = hex::decode(ikm_hex).context("--ikm is not valid hex")?;
    let salt = salt_hex
        .map(hex::decode)
        .transpose()
        .context("--salt is not valid hex")?;

    let okm = kdf::derive_key(salt.as_deref(), &ikm, info.as_bytes(), length)
        .context("deriving key")?;
    println!("{}", hex::encode(okm));
    Ok(())
}

// ── `chunkseal config show` ───────────────────────────────────────────────────

fn cmd_config_show(config: &ChunkSealConfig, config_path: &Path) -> Result<()> {
    if config_path.exists() {
        println!("# Configuration from: {}", config_path.display());
    } else {
        println!("# Configuration: defaults (no file at {})", config_path.display());
    }
    println!();
    let rendered = config
        .to_toml_string()
        .context("serializing config to TOML")?;
    print!("{rendered}");
    Ok(())
}

// ── Formatting helpers ────────────────────────────────────────────────────────

fn fmt_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    const GIB: f64 = MIB * 1024.0;
    let b = bytes as f64;
    if b >= GIB {
        format!("{:.2} GiB", b / GIB)
    } else if b >= MIB {
        format!("{:.2} MiB", b / MIB)
    } else if b >= KIB {
        format!("{:.2} KiB", b / KIB)
    } else {
        format!("{bytes} B")
    }
}

fn fmt_rate(bytes: usize, secs: f64) -> String {
    if secs <= 0.0 {
        return "n/a".into();
    }
    format!("{}/s", fmt_bytes((bytes as f64 / secs) as u64))
}
