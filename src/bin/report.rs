use std::{path::PathBuf, process::ExitCode, time::Duration};

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use waltrack::{
    AnalyticsConfig, DEFAULT_MONTHS_BACK, DEFAULT_TIMEOUT, DatePolicy, Dispatcher, Error,
    WalletStats, average_expense, category_shares, load_transactions, top_categories,
};

/// Prints the monthly income/expense series and category breakdown for a
/// saved list of transactions.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the JSON list of transactions.
    #[arg(long)]
    transactions: PathBuf,

    /// The number of months in the series, ending with the current month.
    #[arg(short, long, default_value_t = DEFAULT_MONTHS_BACK)]
    months_back: u32,

    /// Seconds to wait for the analytics worker before computing inline.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    timeout_secs: u64,

    /// Canonical timezone name, e.g. "Asia/Jakarta". Defaults to the system
    /// timezone.
    #[arg(long)]
    timezone: Option<String>,

    /// Fail instead of skipping transactions with unparseable dates.
    #[arg(long)]
    strict_dates: bool,

    /// Log the largest spending categories.
    #[arg(long)]
    top: Option<usize>,
}

#[tokio::main]
async fn main() -> ExitCode {
    setup_logging();

    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!("report unavailable: {error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<(), Error> {
    let date_policy = if args.strict_dates {
        DatePolicy::Reject
    } else {
        DatePolicy::Skip
    };

    let config = AnalyticsConfig::default()
        .months_back(args.months_back)
        .timeout(Duration::from_secs(args.timeout_secs))
        .timezone(args.timezone)
        .date_policy(date_policy);

    let offset = config.utc_offset()?;
    let transactions = load_transactions(&args.transactions, offset, date_policy)?;

    let stats = WalletStats::from_transactions(&transactions);
    tracing::info!(
        "{} transactions, income {}, expenses {}, balance {}",
        stats.transaction_count,
        stats.total_income,
        stats.total_expense,
        stats.balance
    );
    if let Some(average) = average_expense(&transactions) {
        tracing::info!("average expense {average}");
    }

    let report = Dispatcher::new(config).analyze(&transactions).await?;

    if let Some(limit) = args.top {
        let shares = category_shares(&report.categories_breakdown);

        for item in top_categories(&report.categories_breakdown, limit) {
            let percentage = shares
                .iter()
                .find(|share| share.category == item.category)
                .and_then(|share| share.percentage);

            match percentage {
                Some(percentage) => {
                    tracing::info!("{}: {} ({percentage:.1}%)", item.category, item.total)
                }
                None => tracing::info!("{}: {}", item.category, item.total),
            }
        }
    }

    let json = serde_json::to_string_pretty(&report)
        .map_err(|error| Error::JSONSerializationError(error.to_string()))?;
    println!("{json}");

    Ok(())
}

fn setup_logging() {
    let stderr_log = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(stderr_log)
        .init();
}
