//! CLDAP ping command-line tool
//!
//! Run with: cargo run --bin cldap-ping -- --ip-address 192.0.2.10 --dns-name corp.example.com

use std::net::{IpAddr, SocketAddr};
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tracing::{debug, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cldap::{CldapClientBuilder, CLDAP_PORT};

#[derive(Parser)]
#[command(name = "cldap-ping")]
#[command(about = "Send a CLDAP ping to a domain controller and print its NETLOGON response")]
struct Args {
    /// DNS name of the domain to query (empty when omitted)
    #[arg(short, long)]
    dns_name: Option<String>,

    /// Domain controller address
    #[arg(short = 'a', long)]
    ip_address: IpAddr,

    /// CLDAP port
    #[arg(short, long, default_value_t = CLDAP_PORT)]
    port: u16,

    /// Seconds to wait for the response
    #[arg(short, long, default_value_t = 10)]
    timeout: u64,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG wins over --verbose when set
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let level = if verbose { Level::DEBUG } else { Level::WARN };
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }
    Ok(())
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    init_logging(args.verbose)?;

    let addr = SocketAddr::new(args.ip_address, args.port);
    debug!("Pinging {} for {:?}", addr, args.dns_name);

    let mut client = CldapClientBuilder::new(addr)
        .timeout(Duration::from_secs(args.timeout))
        .build()
        .await?;
    let response = client.ping(args.dns_name.as_deref()).await?;

    print!("{}", response);
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Fatal error: {}", e);
            ExitCode::FAILURE
        }
    }
}
