pub mod collect;
pub mod domain;
pub mod error;
pub mod ingest;
pub mod notify;
pub mod pipeline;
pub mod render;
pub mod time;

pub mod config {
    use anyhow::Context;

    const DEFAULT_SYMBOLS: &str = "AAPL";
    const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 30;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub symbols: Vec<String>,
        pub finnhub_api_key: Option<String>,
        pub finnhub_base_url: Option<String>,
        pub yahoo_base_url: Option<String>,
        pub yahoo_crumb: Option<String>,
        pub yahoo_cookie: Option<String>,
        pub resend_api_key: Option<String>,
        pub resend_base_url: Option<String>,
        pub email_to: Option<String>,
        pub email_from: Option<String>,
        pub sentry_dsn: Option<String>,
        pub provider_timeout_secs: u64,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let symbols_raw =
                std::env::var("SYMBOLS").unwrap_or_else(|_| DEFAULT_SYMBOLS.to_string());

            let provider_timeout_secs = match std::env::var("PROVIDER_TIMEOUT_SECS") {
                Ok(s) => s
                    .trim()
                    .parse::<u64>()
                    .with_context(|| format!("PROVIDER_TIMEOUT_SECS is not a number: {s}"))?,
                Err(_) => DEFAULT_PROVIDER_TIMEOUT_SECS,
            };

            Ok(Self {
                symbols: parse_symbols(&symbols_raw),
                finnhub_api_key: non_empty_var("FINNHUB_API_KEY"),
                finnhub_base_url: non_empty_var("FINNHUB_BASE_URL"),
                yahoo_base_url: non_empty_var("YAHOO_BASE_URL"),
                yahoo_crumb: non_empty_var("YAHOO_CRUMB"),
                yahoo_cookie: non_empty_var("YAHOO_COOKIE"),
                resend_api_key: non_empty_var("RESEND_API_KEY"),
                resend_base_url: non_empty_var("RESEND_BASE_URL"),
                email_to: non_empty_var("EMAIL_TO"),
                email_from: non_empty_var("EMAIL_FROM"),
                sentry_dsn: non_empty_var("SENTRY_DSN"),
                provider_timeout_secs,
            })
        }

        pub fn require_finnhub_api_key(&self) -> anyhow::Result<&str> {
            self.finnhub_api_key
                .as_deref()
                .context("FINNHUB_API_KEY is required")
        }

        pub fn require_resend_api_key(&self) -> anyhow::Result<&str> {
            self.resend_api_key
                .as_deref()
                .context("RESEND_API_KEY is required")
        }

        pub fn require_email_to(&self) -> anyhow::Result<&str> {
            self.email_to.as_deref().context("EMAIL_TO is required")
        }

        pub fn require_email_from(&self) -> anyhow::Result<&str> {
            self.email_from.as_deref().context("EMAIL_FROM is required")
        }
    }

    /// Splits a comma-separated ticker list, trimming and upper-casing each entry.
    pub fn parse_symbols(raw: &str) -> Vec<String> {
        raw.split(',')
            .map(|s| s.trim().to_ascii_uppercase())
            .filter(|s| !s.is_empty())
            .collect()
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

}
