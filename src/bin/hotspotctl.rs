//! hotspotctl - Wi-Fi Hotspot Control CLI
//!
//! Shares this machine's internet connection over a Wi-Fi access point.
//!
//! # Usage
//!
//! ```bash
//! # Configure and start the hotspot
//! hotspotctl toggle --ssid Home --passphrase abcdefgh --band 5
//!
//! # Turn it off
//! hotspotctl toggle --disable
//!
//! # Show status and connected devices
//! hotspotctl status
//! hotspotctl clients --json
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use libhotspotctl::config::HotspotctlConfig;
use libhotspotctl::status::{self, ClientSummary, HotspotStatus, Style};
use libhotspotctl::{
    ConfigUpdate, HotspotController, HotspotResult, NmcliPlatform, ToggleOptions, WifiBand,
};
use std::path::PathBuf;
use std::process;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};

/// Wi-Fi Hotspot Control
#[derive(Parser, Debug)]
#[command(name = "hotspotctl")]
#[command(version)]
#[command(about = "Wi-Fi Hotspot Control - share this machine's internet connection", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (default: /etc/hotspotctl/config.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    /// Use colors in output
    #[arg(long, value_enum, default_value = "auto", global = true)]
    color: ColorMode,
}

#[derive(Clone, Debug, ValueEnum)]
enum ColorMode {
    Yes,
    No,
    Auto,
}

impl ColorMode {
    fn enabled(&self) -> bool {
        match self {
            ColorMode::Yes => true,
            ColorMode::No => false,
            ColorMode::Auto => atty::is(atty::Stream::Stdout),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Configure the hotspot and switch it on or off
    Toggle(ToggleArgs),

    /// Show hotspot status
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List connected devices
    Clients {
        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Show IPv4 addresses only
        #[arg(long, conflicts_with = "ipv6")]
        ipv4: bool,

        /// Show IPv6 addresses only
        #[arg(long)]
        ipv6: bool,
    },

    /// Show the effective configuration
    Config {
        /// Write the default configuration to PATH instead
        #[arg(long, value_name = "PATH")]
        write_default: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct ToggleArgs {
    /// Turn the hotspot off
    #[arg(short = 'D', long)]
    disable: bool,

    /// SSID of the hotspot
    #[arg(short, long)]
    ssid: Option<String>,

    /// Passphrase of the hotspot
    #[arg(short, long)]
    passphrase: Option<String>,

    /// Band of the hotspot (auto, 2.4, 5)
    #[arg(short, long)]
    band: Option<WifiBand>,

    /// Restart the hotspot if it is already running
    #[arg(short, long)]
    restart: bool,

    /// Automatically disable the hotspot when no devices are connected
    /// (not supported by NetworkManager, which rejects it)
    #[arg(short = 'A', long)]
    auto_disable: bool,

    /// Print the QR code payload for joining the hotspot
    #[arg(short = 'Q', long)]
    qr_code: bool,
}

/// Initialize logging based on command-line arguments
fn init_logging(cli: &Cli) {
    let log_level = if cli.verbose {
        "debug"
    } else {
        cli.log_level.as_str()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("hotspotctl={},libhotspotctl={}", log_level, log_level))
    });

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> HotspotResult<()> {
    let config = HotspotctlConfig::load_or_default(cli.config.as_deref())?;
    let style = Style {
        colors: cli.color.enabled(),
    };

    match cli.command {
        Commands::Config { write_default } => handle_config(&config, write_default),
        Commands::Toggle(args) => {
            let mut hotspot = connect(&config).await?;
            handle_toggle(&mut hotspot, args, style).await
        }
        Commands::Status { json } => {
            let hotspot = connect(&config).await?;
            handle_status(&hotspot, json, style).await
        }
        Commands::Clients { json, ipv4, ipv6 } => {
            let hotspot = connect(&config).await?;
            handle_clients(&hotspot, json, ipv4, ipv6).await
        }
    }
}

async fn connect(config: &HotspotctlConfig) -> HotspotResult<HotspotController> {
    let platform = NmcliPlatform::new(config.networkmanager.clone());
    HotspotController::new(&platform).await
}

// ============================================================================
// COMMAND HANDLERS
// ============================================================================

async fn handle_toggle(
    hotspot: &mut HotspotController,
    args: ToggleArgs,
    style: Style,
) -> HotspotResult<()> {
    hotspot
        .toggle(ToggleOptions {
            update: ConfigUpdate {
                ssid: args.ssid,
                passphrase: args.passphrase,
                band: args.band,
            },
            auto_stop: args.auto_disable,
            disable: args.disable,
            restart: args.restart,
        })
        .await?;

    let status = HotspotStatus::collect(hotspot).await?;
    print!("{}", status::render_status(&status, style));

    if args.qr_code {
        match status.qr_payload() {
            Some(payload) => {
                if !status.running {
                    println!(
                        "{}",
                        style.dim("The hotspot is not running, you may be unable to connect.")
                    );
                }
                println!("{}", payload);
            }
            None => debug!("No configuration to encode as QR payload"),
        }
    }

    Ok(())
}

async fn handle_status(hotspot: &HotspotController, json: bool, style: Style) -> HotspotResult<()> {
    let status = HotspotStatus::collect(hotspot).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        print!("{}", status::render_status(&status, style));
    }

    Ok(())
}

async fn handle_clients(
    hotspot: &HotspotController,
    json: bool,
    ipv4: bool,
    ipv6: bool,
) -> HotspotResult<()> {
    // No flag means both families
    let (want_v4, want_v6) = (ipv4 || !ipv6, ipv6 || !ipv4);

    let mut clients = Vec::new();
    for client in hotspot.connected_clients().await? {
        clients.push(ClientSummary {
            name: client.display_name().map(str::to_string),
            mac_address: client.mac_address().to_string(),
            ip_address: client.ip_address(want_v4, want_v6)?.map(str::to_string),
        });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&clients)?);
    } else if clients.is_empty() {
        println!("No connected clients.");
    } else {
        for (n, client) in clients.iter().enumerate() {
            println!("{}", status::client_line(n + 1, client));
        }
    }

    Ok(())
}

fn handle_config(config: &HotspotctlConfig, write_default: Option<PathBuf>) -> HotspotResult<()> {
    match write_default {
        Some(path) => {
            HotspotctlConfig::default().save(&path)?;
            println!("Wrote default configuration to {}", path.display());
        }
        None => print!("{}", config.to_toml()?),
    }
    Ok(())
}
