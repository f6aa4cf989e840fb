//! RDAP Bootstrap - resolve RDAP queries to their authoritative server
//!
//! Loads the IANA bootstrap registries and prints where a query should be
//! redirected, or keeps the registries refreshed until interrupted.

use anyhow::Context;
use rdap_bootstrap::{
    AddressBlock, Blocklist, BootstrapConfig, RegistryKind, RegistryLoader, RegistrySet, Resolver,
};
use std::env;
use std::process;
use std::sync::Arc;

const EXIT_OK: i32 = 0;
const EXIT_BAD_REQUEST: i32 = 1;
const EXIT_NOT_FOUND: i32 = 2;
const EXIT_BLOCKED: i32 = 3;

#[tokio::main]
async fn main() {
    // Initialize the library
    if let Err(e) = rdap_bootstrap::init() {
        eprintln!("❌ Failed to initialize: {}", e);
        process::exit(1);
    }

    let args: Vec<String> = env::args().skip(1).collect();

    if args.is_empty() || args[0] == "--help" || args[0] == "-h" {
        print_help();
        return;
    }

    let config = match BootstrapConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            process::exit(1);
        }
    };

    setup_logging(&config);

    let code = match run(&config, &args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            1
        }
    };

    process::exit(code);
}

async fn run(config: &BootstrapConfig, args: &[String]) -> anyhow::Result<i32> {
    match args {
        [command] if command == "serve-check" => serve_check(config).await,
        [object_type, object] => resolve_once(config, object_type, object).await,
        _ => {
            print_help();
            Ok(EXIT_BAD_REQUEST)
        }
    }
}

/// Sets up the tracing subscriber; logs go to stderr so stdout carries only results
fn setup_logging(config: &BootstrapConfig) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load the registries once and print the redirect target for one query
async fn resolve_once(config: &BootstrapConfig, object_type: &str, object: &str) -> anyhow::Result<i32> {
    let blocklist = Blocklist::from_config(config).context("invalid IP_BLOCK_LIST")?;
    if let Ok(peer) = env::var("RDAP_CLIENT_IP") {
        let peer: AddressBlock = peer.trim().parse().context("invalid RDAP_CLIENT_IP")?;
        if blocklist.is_blocked(&peer) {
            eprintln!("⛔ Client {} is blocked", peer);
            return Ok(EXIT_BLOCKED);
        }
    }

    let registries = RegistrySet::initialize(RegistryLoader::from_config(config))
        .await
        .context("failed to load bootstrap registries")?;
    let resolver = Resolver::new(Arc::new(registries));

    match resolver.resolve(object_type, object) {
        Ok(resolution) => {
            println!("{}", resolution.redirect_target);
            Ok(EXIT_OK)
        }
        Err(e) if e.status_code() == 404 => {
            eprintln!("🔍 {}", e.user_message());
            Ok(EXIT_NOT_FOUND)
        }
        Err(e) => {
            eprintln!("❌ {}", e.user_message());
            Ok(EXIT_BAD_REQUEST)
        }
    }
}

/// Load the registries, report them, and keep refreshing until Ctrl-C
async fn serve_check(config: &BootstrapConfig) -> anyhow::Result<i32> {
    let registries = Arc::new(
        RegistrySet::initialize(RegistryLoader::from_config(config))
            .await
            .context("failed to load bootstrap registries")?,
    );

    let snapshot = registries.current();
    println!("📚 Bootstrap registries loaded at {}", snapshot.loaded_at.to_rfc3339());
    for (kind, count) in snapshot.entry_counts() {
        println!("   {:<12} {:>6} entries", kind.to_string(), count);
    }
    for category in &snapshot.missing {
        println!("   ⚠️  {} document unavailable", category);
    }
    if snapshot.entry_count(RegistryKind::Dns) == 0 {
        println!("   ⚠️  no DNS entries, domain queries will not resolve");
    }

    println!(
        "🔄 Refreshing every {}s, press Ctrl-C to stop",
        config.refresh_interval.as_secs()
    );
    let refresh = Arc::clone(&registries).spawn_refresh(config.refresh_interval);

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;
    refresh.abort();

    println!("👋 Stopped after {} refreshes", registries.refresh_count());
    Ok(EXIT_OK)
}

/// Print help information
fn print_help() {
    println!("🧭 RDAP Bootstrap - find the authoritative RDAP server");
    println!("═══════════════════════════════════════════════════════");
    println!();
    println!("USAGE:");
    println!("    rdap-bootstrap <TYPE> <OBJECT>");
    println!("    rdap-bootstrap serve-check");
    println!();
    println!("TYPES:");
    println!("    domain    example.com");
    println!("    ip        192.0.2.1 or 2001:db8::/32");
    println!("    autnum    1701 or AS1701");
    println!("    entity    ABC123-ARIN");
    println!();
    println!("EXIT CODES:");
    println!("    0  resolved, redirect target printed on stdout");
    println!("    1  bad request or registries unavailable");
    println!("    2  no RDAP server known for the object");
    println!("    3  client address is blocked");
    println!();
    println!("ENVIRONMENT VARIABLES:");
    println!("    RDAP_BOOTSTRAP_URL          Bootstrap base URL (default: https://data.iana.org/rdap)");
    println!("    RDAP_DATA_DIR               Read <category>.json from this directory instead");
    println!("    RDAP_FETCH_TIMEOUT_SECS     Per-document timeout (default: 30)");
    println!("    RDAP_REFRESH_INTERVAL_SECS  Refresh interval (default: 21600)");
    println!("    RDAP_USER_AGENT             HTTP user agent");
    println!("    RDAP_LOG_LEVEL              Log filter when RUST_LOG is unset (default: info)");
    println!("    IP_BLOCK_LIST               Comma-separated blocked addresses or CIDR blocks");
    println!("    RDAP_CLIENT_IP              Client address checked against IP_BLOCK_LIST");
}
