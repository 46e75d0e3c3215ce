use std::sync::Arc;

use clap::Parser;
use dotenv::dotenv;

use crate::application::{logging::init_logger, run};
use crate::args::Args;

mod application;
mod args;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenv().ok();

    let args = Arc::new(Args::parse());
    init_logger(&args.log);

    run(args).await
}
