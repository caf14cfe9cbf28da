//! WX CLI - fetch a city forecast and print day summaries, hourly series
//! or the current conditions.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "wx-cli",
    version,
    about = "Weather forecast day summaries, hourly interpolation and current conditions"
)]
struct Cli {
    #[command(subcommand)]
    command: wx_cmd::Command,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    wx_cmd::run(cli.command).await
}
