use std::error::Error;

use clap::Parser;
use log::LevelFilter;

use hid_relay::cli::{main_cli, Args};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let env = env_logger::Env::default().filter_or("LOG_LEVEL", "info");
    let mut logger = env_logger::Builder::from_env(env);
    if args.debug {
        logger.filter_level(LevelFilter::Debug);
    }
    logger.init();

    main_cli(args).await
}
