use clap::{Args, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

pub mod get;
pub mod serve;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a cache node
    Serve(ServeArgs),

    /// Fetch one key from a running node
    Get(GetArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// JSON configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// This node's peer URL, e.g. http://127.0.0.1:8001
    #[arg(long, value_name = "URL")]
    pub addr: Option<String>,

    /// Other peer URLs
    #[arg(long, value_name = "URL", value_delimiter = ',')]
    pub peers: Vec<String>,

    /// Also serve GET /api?key= on this address
    #[arg(long, value_name = "ADDR")]
    pub api: Option<SocketAddr>,

    /// Byte budget of the group cache (0 = unlimited)
    #[arg(long, value_name = "BYTES")]
    pub cache_bytes: Option<u64>,

    /// Group to serve
    #[arg(long)]
    pub group: Option<String>,

    /// JSON object to serve instead of the sample table
    #[arg(long, value_name = "FILE")]
    pub data: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Peer URL of the node to ask
    #[arg(long, value_name = "URL")]
    pub node: String,

    #[arg(long, default_value = "scores")]
    pub group: String,

    /// Peer endpoint prefix
    #[arg(long, default_value = peercache_transport::DEFAULT_BASE_PATH)]
    pub base_path: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    pub key: String,
}

impl Commands {
    pub async fn execute(self) -> eyre::Result<()> {
        match self {
            Commands::Serve(args) => serve::execute(args).await,
            Commands::Get(args) => get::execute(args).await,
        }
    }
}
