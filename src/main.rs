use anyhow::Result;
use calc_rpc::logger;
use calc_rpc::server::{self, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    logger::init_logger("calc_rpc=info,tower_http=info");

    server::run(ServerConfig::default()).await?;
    Ok(())
}
