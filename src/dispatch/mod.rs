use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info};

use crate::db::models::{Category, Profile, Report};
use crate::summary::SummaryGenerator;
use crate::transport::{OutboundMessage, Transport};

pub const REPORT_SEND_FAILED: &str = "Произошла ошибка при отправке отчета. Попробуйте позже.";

/// Composes one report message and sends it to one recipient.
pub struct ReportDispatcher {
    transport: Arc<dyn Transport>,
    summarizer: Option<Arc<dyn SummaryGenerator>>,
    links: HashMap<Category, String>,
}

impl ReportDispatcher {
    pub fn new(
        transport: Arc<dyn Transport>,
        summarizer: Option<Arc<dyn SummaryGenerator>>,
        links: HashMap<Category, String>,
    ) -> Self {
        Self { transport, summarizer, links }
    }

    pub async fn compose(&self, report: &Report, profile: Option<&Profile>) -> String {
        let mut text = format!(
            "📄 *{}*\nИсточник: {}",
            escape_markdown(&report.title),
            escape_markdown(&report.source)
        );

        match self.links.get(&report.category) {
            Some(link) => text.push_str(&format!("\n[Открыть файл]({})", link)),
            // Code span keeps the raw path intact under Markdown rendering.
            None => text.push_str(&format!("\nФайл: `{}`", report.file_path.replace('`', "'"))),
        }

        if let Some(summary) = self.personalize(report, profile).await {
            text.push_str("\n\n💡 Персональный анализ:\n");
            text.push_str(&escape_markdown(&summary));
        }

        text
    }

    async fn personalize(&self, report: &Report, profile: Option<&Profile>) -> Option<String> {
        let summarizer = self.summarizer.as_ref()?;
        let profile = profile.filter(|p| !p.description.trim().is_empty())?;

        summarizer
            .summarize(
                &format!("{}\n{}", report.title, report.source),
                &profile.description,
                report.category.as_str(),
            )
            .await
    }

    /// Sends one report. Failures are logged and answered with an apology;
    /// returns whether the report itself reached the recipient.
    pub async fn deliver(
        &self,
        recipient: i64,
        report: &Report,
        profile: Option<&Profile>,
    ) -> bool {
        let text = self.compose(report, profile).await;

        match self.transport.send(OutboundMessage::text(recipient, text).markdown()).await {
            Ok(()) => {
                info!("Delivered report {} to {}", report.id, recipient);
                true
            }
            Err(e) => {
                error!("Error sending report {} to {}: {}", report.id, recipient, e);
                if let Err(e) = self
                    .transport
                    .send(OutboundMessage::text(recipient, REPORT_SEND_FAILED))
                    .await
                {
                    error!("Error sending apology to {}: {}", recipient, e);
                }
                false
            }
        }
    }
}

/// Escapes the characters legacy Telegram Markdown treats as markup.
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
