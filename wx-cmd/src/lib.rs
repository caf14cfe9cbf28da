//! Command implementations for the WX CLI.
//!
//! `fetch` downloads a forecast payload; `days` and `hourly` read a saved
//! payload and print the day summary or one day's hourly series.
//! `current` prints the conditions right now, straight from the provider.

use clap::Subcommand;
use output::OutputFormat;
use wx_data::day_aggregation::DAYS_IN_SUMMARY;
use wx_owm::client::DEFAULT_API_BASE;

pub mod current;
pub mod fetch;
pub mod forecast;
pub mod output;

#[derive(Subcommand)]
pub enum Command {
    /// Download the 5 day / 3 hour forecast for a city
    Fetch {
        /// City name, e.g. "Peoria" or "Pune,IN"
        #[arg(short, long)]
        city: String,

        /// Where to write the forecast JSON
        #[arg(short, long)]
        output: String,

        /// OpenWeatherMap API key
        #[arg(long, env = "OWM_API_KEY", hide_env_values = true)]
        api_key: String,

        /// API host, for pointing at a mock
        #[arg(long, default_value = DEFAULT_API_BASE)]
        api_base: String,
    },

    /// Show the current conditions for a city
    Current {
        /// City name, e.g. "Peoria" or "Pune,IN"
        #[arg(short, long)]
        city: String,

        /// OpenWeatherMap API key
        #[arg(long, env = "OWM_API_KEY", hide_env_values = true)]
        api_key: String,

        /// API host, for pointing at a mock
        #[arg(long, default_value = DEFAULT_API_BASE)]
        api_base: String,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Summarise a saved forecast day by day
    Days {
        /// Forecast JSON written by `fetch`
        #[arg(short, long)]
        input: String,

        /// Number of days to show
        #[arg(short, long, default_value_t = DAYS_IN_SUMMARY)]
        days: usize,

        /// Split days on the city's local midnight instead of UTC
        #[arg(long)]
        local_days: bool,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Hourly series and rain windows for one day of a saved forecast
    Hourly {
        /// Forecast JSON written by `fetch`
        #[arg(short, long)]
        input: String,

        /// Day to expand (YYYY-MM-DD); defaults to the first day
        #[arg(long)]
        date: Option<String>,

        /// Split days on the city's local midnight instead of UTC
        #[arg(long)]
        local_days: bool,

        /// Spread hourly points over the real gap between samples
        #[arg(long)]
        elapsed_time: bool,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
}

pub async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Fetch {
            city,
            output,
            api_key,
            api_base,
        } => fetch::run_fetch(&city, &output, &api_key, &api_base).await,
        Command::Current {
            city,
            api_key,
            api_base,
            format,
        } => current::run_current(&city, &api_key, &api_base, format).await,
        Command::Days {
            input,
            days,
            local_days,
            format,
        } => forecast::run_days(&input, days, local_days, format),
        Command::Hourly {
            input,
            date,
            local_days,
            elapsed_time,
            format,
        } => forecast::run_hourly(&input, date.as_deref(), local_days, elapsed_time, format),
    }
}
