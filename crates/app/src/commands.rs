use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;

use tradetracker_analytics::{
    analyze_period, export_rows, insights, read_transactions_path, write_csv, Analytics, Insight,
};
use tradetracker_assist::{AssistedParser, OpenAiCompleter};
use tradetracker_core::{Category, DateRange, NewTransaction, Period};
use tradetracker_ocr::{parse_ocr_text, OcrText, ReceiptPipeline, ScanResult, VisionRecognizer};
use tradetracker_voice::{review_transcript, Transcript, VoiceReview};

use crate::config::AppConfig;

/// Typed text is taken as certain.
const TYPED_CONFIDENCE: f32 = 1.0;

type Service = Arc<OpenAiCompleter>;

/// Everything a command needs, built once from config and flags.
pub struct App {
    pub config: AppConfig,
    pub categories: Vec<Category>,
    service: Option<Service>,
    pub parser: AssistedParser<Service>,
    pub today: NaiveDate,
}

impl App {
    pub fn new(config: AppConfig, offline: bool, today: NaiveDate) -> Result<Self> {
        let service = if offline {
            None
        } else {
            OpenAiCompleter::from_config(&config.assist)
                .context("Failed to build completion client")?
                .map(Arc::new)
        };
        if service.is_none() {
            tracing::info!("remote assistance unavailable, using pattern parsing only");
        }
        let parser = Self::parser_for(&config, service.clone());
        let categories = config.categories();
        Ok(Self { config, categories, service, parser, today })
    }

    fn parser_for(config: &AppConfig, service: Option<Service>) -> AssistedParser<Service> {
        AssistedParser::new(service).with_timeout(config.assist.timeout())
    }
}

#[derive(Debug, Serialize)]
pub struct VoiceOutput {
    #[serde(flatten)]
    pub review: VoiceReview,
    /// Present only when the result passed validation.
    pub transaction: Option<NewTransaction>,
}

pub async fn voice(ctx: &App, text: &str) -> VoiceOutput {
    let review = review_transcript(&ctx.parser, Transcript::new(text, TYPED_CONFIDENCE), &ctx.categories).await;
    let transaction = if review.is_confirmable() {
        NewTransaction::from_parsed(&review.parsed, ctx.today)
            .ok()
            .map(|t| t.with_voice_input(text))
    } else {
        None
    };
    VoiceOutput { review, transaction }
}

#[derive(Debug, Serialize)]
pub struct ReceiptOutput {
    #[serde(flatten)]
    pub scan: ScanResult,
    pub summary: String,
    pub transaction: Option<NewTransaction>,
}

fn receipt_output(scan: ScanResult, today: NaiveDate) -> ReceiptOutput {
    let summary = tradetracker_parse::receipt_summary(&scan.receipt);
    let transaction = if scan.report.valid {
        let date = scan.receipt.transaction_date.unwrap_or(today);
        NewTransaction::from_parsed(&scan.receipt.transaction, date).ok()
    } else {
        None
    };
    ReceiptOutput { scan, summary, transaction }
}

pub async fn receipt(ctx: &App, image: &Path) -> Result<ReceiptOutput> {
    let recognizer = VisionRecognizer::from_config(&ctx.config.ocr).with_context(|| {
        format!("Receipt scanning needs the {} environment variable", ctx.config.ocr.api_key_env)
    })?;
    let pipeline = ReceiptPipeline::new(recognizer, App::parser_for(&ctx.config, ctx.service.clone()));
    let scan = pipeline
        .scan_file(image, &ctx.categories)
        .await
        .with_context(|| format!("Failed to scan {}", image.display()))?;
    Ok(receipt_output(scan, ctx.today))
}

pub async fn receipt_text(ctx: &App, file: &Path) -> Result<ReceiptOutput> {
    let text = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let ocr = OcrText { text, confidence: TYPED_CONFIDENCE };
    Ok(receipt_output(parse_ocr_text(&ctx.parser, ocr, &ctx.categories).await, ctx.today))
}

#[derive(Debug, Serialize)]
pub struct AnalyticsOutput {
    pub period: Period,
    pub range: DateRange,
    pub analytics: Analytics,
    pub insights: Vec<Insight>,
}

pub fn analytics(ctx: &App, csv: &Path, period: Period, export: Option<&Path>) -> Result<AnalyticsOutput> {
    let all = read_transactions_path(csv)
        .with_context(|| format!("Failed to load transactions from {}", csv.display()))?;
    let (selected, report) = analyze_period(&all, &ctx.categories, period, ctx.today);
    let found = insights(&report, &selected, ctx.today);

    if let Some(out) = export {
        let file = std::fs::File::create(out).with_context(|| format!("Failed to create {}", out.display()))?;
        write_csv(file, &export_rows(&selected, &ctx.categories))?;
        tracing::info!(rows = selected.len(), path = %out.display(), "exported transactions");
    }

    Ok(AnalyticsOutput { period, range: period.range(ctx.today), analytics: report, insights: found })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tradetracker_core::{CategoryId, TransactionKind};

    fn ctx() -> App {
        let config = AppConfig {
            categories: vec![
                Category::new("c1", "Sales", TransactionKind::Income),
                Category::new("c2", "Transport", TransactionKind::Expense),
            ],
            ..AppConfig::default()
        };
        App::new(config, true, NaiveDate::from_ymd_opt(2024, 3, 14).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn voice_builds_a_transaction() {
        let out = voice(&ctx(), "Bought transport fuel for 800 shillings").await;
        let t = out.transaction.unwrap();
        assert_eq!(t.kind, TransactionKind::Expense);
        assert_eq!(t.category_id, Some(CategoryId::new("c2")));
        assert_eq!(t.voice_input.as_deref(), Some("Bought transport fuel for 800 shillings"));
        assert_eq!(t.transaction_date, NaiveDate::from_ymd_opt(2024, 3, 14).unwrap());
    }

    #[tokio::test]
    async fn unparseable_voice_has_no_transaction() {
        let out = voice(&ctx(), "hello there").await;
        assert!(out.transaction.is_none());
        assert!(out.review.feedback.is_none());
    }

    #[tokio::test]
    async fn receipt_text_uses_printed_date() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "NAIVAS SUPERMARKET\n2024-03-12\nBread 150\nTOTAL 150").unwrap();
        let out = receipt_text(&ctx(), file.path()).await.unwrap();
        assert!(out.scan.report.valid);
        let t = out.transaction.unwrap();
        assert_eq!(t.transaction_date, NaiveDate::from_ymd_opt(2024, 3, 12).unwrap());
    }

    #[test]
    fn analytics_filters_and_exports() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("tx.csv");
        std::fs::write(
            &csv,
            "type,amount,description,category_id,transaction_date\n\
             income,1000,Sold rice,c1,2024-03-14\n\
             expense,200,Fuel,c2,2024-03-13\n\
             income,5000,Old sale,c1,2023-12-01\n",
        )
        .unwrap();
        let export = dir.path().join("out.csv");

        let out = analytics(&ctx(), &csv, Period::Last30Days, Some(&export)).unwrap();
        assert_eq!(out.analytics.summary.transaction_count, 2);
        assert_eq!(out.range.end, NaiveDate::from_ymd_opt(2024, 3, 14).unwrap());

        let written = std::fs::read_to_string(&export).unwrap();
        assert_eq!(written.lines().count(), 3);
        assert!(written.contains("Sold rice,Sales"));
    }
}
