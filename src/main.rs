use bind_stats::{
    init_errors,
    init_logging,
    App,
    Args,
    Config,
};
use clap::Parser;
use color_eyre::Result;
use eyre::Context as _;

#[tokio::main]
async fn main() -> Result<()> {
    init_errors()?;
    let config = Config::new(Args::parse()).wrap_err("Failed to load configuration")?;
    init_logging(config.verbose)?;
    App::new(config)?.run().await
}
