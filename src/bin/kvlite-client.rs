use std::io::{self, BufRead, Write};
use std::process::exit;

use clap::Parser;
use log::error;

use kvlite::{DatagramTransport, KvClient, Protocol, Reply, Result, StreamTransport, Transport};

#[derive(Parser)]
#[command(name = "kvlite-client", version, about = "A networked key-value store client")]
struct Cli {
    /// Server hostname or IP address
    host: String,

    /// Server port (1024-65535)
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
    let addr = format!("{}:{}", cli.host, cli.port);
    match cli.protocol {
        Protocol::Tcp => interact(KvClient::new(StreamTransport::client(addr))),
        Protocol::Udp => interact(KvClient::new(DatagramTransport::client(addr.as_str())?)),
    }
}

fn interact<T: Transport>(mut client: KvClient<T>) -> Result<()> {
    client.start()?;

    println!("Key-Value Store started. Usage: PUT key value | GET key | DELETE key. Enter \"exit\" to stop.");
    let stdin = io::stdin();
    loop {
        print!("Enter text: ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let text = line.trim();
        if text.is_empty() {
            continue;
        }
        if text.eq_ignore_ascii_case("exit") {
            break;
        }

        match client.request(text)? {
            Reply::Answer(result) => println!("{result}"),
            Reply::Unsolicited => println!("(unsolicited response discarded)"),
            Reply::TimedOut => println!("(no response before the deadline)"),
        }
    }
    client.close()
}
