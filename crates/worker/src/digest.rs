use analyst_core::collect::{collect_actions, ActionsReport};
use analyst_core::ingest::provider::AnalystActionsProvider;
use analyst_core::notify::resend::EmailMessage;
use analyst_core::pipeline::NormalizeOptions;
use analyst_core::render::html::{digest_html, digest_subject};
use analyst_core::time::window::LookbackWindow;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct Digest {
    pub subject: String,
    pub html: String,
    pub report: ActionsReport,
}

impl Digest {
    pub fn into_message(self, from: &str, to: &str) -> EmailMessage {
        EmailMessage {
            from: from.to_string(),
            to: vec![to.to_string()],
            subject: self.subject,
            html: self.html,
        }
    }
}

pub async fn build_digest(
    provider: &dyn AnalystActionsProvider,
    symbols: &[String],
    window: LookbackWindow,
    options: &NormalizeOptions,
    now: DateTime<Utc>,
) -> anyhow::Result<Digest> {
    let report = collect_actions(provider, symbols, window, options, now).await?;

    Ok(Digest {
        subject: digest_subject(report.table.len()),
        html: digest_html(&report.table, &window),
        report,
    })
}
