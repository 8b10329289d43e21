use std::process::exit;

use clap::Parser;
use log::{error, info};

use kvlite::{DatagramTransport, KvServer, Protocol, Result, StreamTransport, Transport};

#[derive(Parser)]
#[command(name = "kvlite-server", version, about = "A networked key-value store server")]
struct Cli {
    /// Port to listen on (1024-65535)
    #[arg(value_parser = clap::value_parser!(u16).range(1024..))]
    port: u16,

    /// Wire protocol: TCP or UDP
    protocol: Protocol,
}

fn main() {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        error!("{}", e);
        exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    info!("kvlite-server {}", env!("CARGO_PKG_VERSION"));

    let addr = ("0.0.0.0", cli.port);
    match cli.protocol {
        Protocol::Tcp => serve(StreamTransport::server(addr)?),
        Protocol::Udp => serve(DatagramTransport::server(addr)?),
    }
}

fn serve<T: Transport>(transport: T) -> Result<()> {
    KvServer::new(transport).run()
}
