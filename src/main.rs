use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

use penguins_game_client::client::{
    load_config, load_default_config, ClientConfig, ClientError, ClientHandler, GameClient,
    GreedyLogic, RandomLogic, TcpTransport,
};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Logic {
    Random,
    Greedy,
}

#[derive(Parser)]
#[command(name = "penguins-client", about = "Penguins game client")]
struct Cli {
    /// Server host
    #[arg(long, env = "PENGUINS_HOST")]
    host: Option<String>,

    /// Server port
    #[arg(short, long, env = "PENGUINS_PORT")]
    port: Option<u16>,

    /// Reservation code; wins over --room
    #[arg(short, long, env = "PENGUINS_RESERVATION")]
    reservation: Option<String>,

    /// Room to join
    #[arg(long, env = "PENGUINS_ROOM")]
    room: Option<String>,

    /// Reconnect after the server leaves
    #[arg(long)]
    auto_reconnect: bool,

    /// Keep running after the server leaves
    #[arg(long)]
    survive: bool,

    /// Path to penguins_client.toml (default: auto-discover)
    #[arg(long, env = "PENGUINS_CONFIG")]
    config: Option<PathBuf>,

    /// Decision logic
    #[arg(long, value_enum, default_value = "random")]
    logic: Logic,

    /// Seed for the random logic
    #[arg(long)]
    seed: Option<u64>,

    /// Default log directive when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Cli {
    /// Flags given on the command line win over the config file.
    fn apply(&self, config: &mut ClientConfig) {
        if let Some(ref host) = self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if self.reservation.is_some() {
            config.reservation = self.reservation.clone();
        }
        if self.room.is_some() {
            config.room_id = self.room.clone();
        }
        config.auto_reconnect |= self.auto_reconnect;
        config.survive |= self.survive;
    }
}

fn run<H: ClientHandler>(config: ClientConfig, handler: H) -> Result<(), ClientError> {
    let transport = TcpTransport::new(&config.host, config.port, config.read_timeout());
    let mut client = GameClient::new(transport, handler, config);
    client.start()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let directive: Directive = cli.log_level.parse()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive))
        .init();

    let mut config = match cli.config {
        Some(ref path) => load_config(path)?,
        None => load_default_config(),
    };
    cli.apply(&mut config);
    tracing::info!(
        host = %config.host,
        port = config.port,
        join = ?config.join_mode(),
        logic = ?cli.logic,
        "starting client"
    );

    let result = match cli.logic {
        Logic::Random => {
            let logic = match cli.seed {
                Some(seed) => RandomLogic::with_seed(seed),
                None => RandomLogic::new(),
            };
            run(config, logic)
        }
        Logic::Greedy => run(config, GreedyLogic::new()),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "client stopped with an error");
    }
    result?;
    Ok(())
}
