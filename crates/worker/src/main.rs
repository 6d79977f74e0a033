use analyst_core::notify::resend::ResendClient;
use analyst_core::pipeline::{DateFormat, NormalizeOptions};
use analyst_core::time::window::LookbackWindow;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod digest;

#[derive(Debug, Parser)]
#[command(name = "analyst_worker")]
struct Args {
    /// Lookback window in hours.
    #[arg(long, default_value_t = 24)]
    window_hours: i64,

    /// Comma-separated tickers. Overrides SYMBOLS.
    #[arg(long)]
    symbols: Option<String>,

    /// strftime pattern for the Date column. Defaults to minute or day granularity by window.
    #[arg(long)]
    date_format: Option<String>,

    /// Render the digest to stdout instead of sending it.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = analyst_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let symbols = match args.symbols.as_deref() {
        Some(raw) => analyst_core::config::parse_symbols(raw),
        None => settings.symbols.clone(),
    };
    anyhow::ensure!(!symbols.is_empty(), "no symbols configured");

    let window = LookbackWindow::from_hours(args.window_hours)?;
    let date_format = match args.date_format.as_deref() {
        Some(pattern) => DateFormat::custom(pattern)?,
        None => window.date_format(),
    };
    let options = NormalizeOptions::new(date_format);

    let yahoo = analyst_core::ingest::yahoo::YahooClient::from_settings(&settings)?;
    let now = chrono::Utc::now();

    let digest = digest::build_digest(&yahoo, &symbols, window, &options, now).await?;

    tracing::info!(
        symbols = symbols.len(),
        actions = digest.report.table.len(),
        failures = digest.report.failures.len(),
        dry_run = args.dry_run,
        "digest built"
    );

    if args.dry_run {
        println!("Subject: {}\n\n{}", digest.subject, digest.html);
        return Ok(());
    }

    let from = settings.require_email_from()?;
    let to = settings.require_email_to()?;
    let mailer = ResendClient::from_settings(&settings)?;

    match mailer.send(&digest.into_message(from, to)).await {
        Ok(id) => {
            tracing::info!(%id, "digest email sent");
            Ok(())
        }
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(error = %format!("{err:#}"), "digest email send failed");
            Err(err)
        }
    }
}

fn init_sentry(settings: &analyst_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
