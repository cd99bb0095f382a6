use clap::Parser;
use log::info;
use server::grid::GridMap;
use server::network::Server;
use std::time::Duration;

/// Authoritative RTS game server.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Server IP address to bind to
    #[clap(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to listen on
    #[clap(short, long, default_value = "8080")]
    port: u16,

    /// Tick period in milliseconds
    #[clap(short, long, default_value = "100")]
    tick_ms: u64,

    /// Maximum number of connected players
    #[clap(short, long, default_value = "16")]
    max_players: usize,

    /// Map width in chunks (ignored when --map is given)
    #[clap(long, default_value = "16")]
    width: u32,

    /// Map height in chunks (ignored when --map is given)
    #[clap(long, default_value = "16")]
    height: u32,

    /// Path to a terrain file: rows of '.' (passable) and '@' (blocked)
    #[clap(long)]
    map: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = Args::parse();

    let map = match &args.map {
        Some(path) => {
            let rows = std::fs::read_to_string(path)?;
            let map = GridMap::from_rows(&rows);
            info!("Loaded {}x{} map from {}", map.width(), map.height(), path);
            map
        }
        None => GridMap::open(args.width, args.height),
    };

    let addr = format!("{}:{}", args.host, args.port);
    let mut server = Server::new(
        &addr,
        Duration::from_millis(args.tick_ms),
        args.max_players,
        map,
    )
    .await?;

    server.run().await
}
