//! Aggregates over recorded events and the daily summary message.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use jiff::civil::Date;
use jiff::tz::TimeZone;
use jiff::{SignedDuration, Timestamp, ToSpan};
use serde::Serialize;
use utoipa::ToSchema;

use super::gateway::{DeliveryGateway, send_isolated};
use super::recorder::EventRecorder;
use crate::config::MenuConfig;
use crate::error::AppResult;
use crate::models::{DeliveryResult, EventOutcome, Recipients, StoredEvent};
use crate::utils::PhoneNumber;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Statistics {
    pub window_days: u32,
    pub total: u64,
    /// Events where every caregiver was notified
    pub delivered: u64,
    pub failed: u64,
    /// Percent of delivered events, two decimals
    pub success_rate: f64,
    pub average_value: Option<f64>,
    pub critical: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DailyAverage {
    #[schema(value_type = String, format = Date)]
    pub date: Date,
    pub average: f64,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipientDelivery {
    #[schema(value_type = String)]
    pub phone: PhoneNumber,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RecipientDelivery {
    fn new(phone: PhoneNumber, result: DeliveryResult) -> Self {
        Self {
            phone,
            success: result.is_success(),
            message_id: result.message_id().map(str::to_string),
            error: result.error_detail().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportDelivery {
    pub text: String,
    pub deliveries: Vec<RecipientDelivery>,
}

fn round(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[derive(Clone)]
pub struct ReportService {
    recorder: Arc<dyn EventRecorder>,
    gateway: Arc<dyn DeliveryGateway>,
    recipients: Arc<Recipients>,
    menu: Arc<MenuConfig>,
    timezone: TimeZone,
    report_days: u32,
}

impl ReportService {
    pub fn new(
        recorder: Arc<dyn EventRecorder>,
        gateway: Arc<dyn DeliveryGateway>,
        recipients: Arc<Recipients>,
        menu: Arc<MenuConfig>,
        timezone: TimeZone,
        report_days: u32,
    ) -> Self {
        Self {
            recorder,
            gateway,
            recipients,
            menu,
            timezone,
            report_days,
        }
    }

    /// Numeric value of a recorded label. Labels no longer in the menu fall
    /// back to their digits (`"<110"` -> 110).
    fn value_of(&self, label: &str) -> Option<f64> {
        if let Some(bucket) = self.menu.bucket_by_label(label) {
            return Some(f64::from(bucket.value));
        }
        let digits: String = label.chars().filter(char::is_ascii_digit).collect();
        digits.parse::<u16>().ok().map(f64::from)
    }

    fn is_critical(&self, label: &str) -> bool {
        self.menu
            .bucket_by_label(label)
            .is_some_and(|bucket| bucket.critical)
    }

    fn average(&self, events: &[StoredEvent]) -> Option<f64> {
        let values: Vec<f64> = events
            .iter()
            .filter_map(|e| self.value_of(&e.record.bucket))
            .collect();
        if values.is_empty() {
            return None;
        }
        Some(round(values.iter().sum::<f64>() / values.len() as f64, 1))
    }

    pub fn summarize(&self, events: &[StoredEvent], window_days: u32) -> Statistics {
        let total = events.len() as u64;
        let delivered = events
            .iter()
            .filter(|e| e.outcome == EventOutcome::Delivered)
            .count() as u64;
        let critical = events
            .iter()
            .filter(|e| self.is_critical(&e.record.bucket))
            .count() as u64;
        let success_rate = if total == 0 {
            0.0
        } else {
            round(delivered as f64 * 100.0 / total as f64, 2)
        };

        Statistics {
            window_days,
            total,
            delivered,
            failed: total - delivered,
            success_rate,
            average_value: self.average(events),
            critical,
        }
    }

    pub async fn statistics(&self, window_days: u32) -> AppResult<Statistics> {
        let since = Timestamp::now()
            .checked_sub(SignedDuration::from_hours(24 * i64::from(window_days)))?;
        let events = self.recorder.since(since).await?;
        Ok(self.summarize(&events, window_days))
    }

    fn today(&self) -> Date {
        Timestamp::now().to_zoned(self.timezone.clone()).date()
    }

    /// Per-day averages for the last `days` calendar days, newest first.
    /// Days without readings are omitted.
    pub async fn daily_averages(&self, days: u32) -> AppResult<Vec<DailyAverage>> {
        let first = self
            .today()
            .checked_sub(i64::from(days.saturating_sub(1)).days())?;
        let start = first.to_zoned(self.timezone.clone())?.timestamp();
        let events = self.recorder.since(start).await?;
        Ok(self.group_by_day(&events))
    }

    pub fn group_by_day(&self, events: &[StoredEvent]) -> Vec<DailyAverage> {
        let mut days: BTreeMap<Date, (f64, u64)> = BTreeMap::new();
        for event in events {
            let Some(value) = self.value_of(&event.record.bucket) else {
                continue;
            };
            let date = event
                .record
                .recorded_at
                .to_zoned(self.timezone.clone())
                .date();
            let entry = days.entry(date).or_default();
            entry.0 += value;
            entry.1 += 1;
        }

        days.into_iter()
            .rev()
            .map(|(date, (sum, count))| DailyAverage {
                date,
                average: round(sum / count as f64, 1),
                count,
            })
            .collect()
    }

    pub fn format_report(&self, day: Date, today: &[StoredEvent], stats: &Statistics) -> String {
        let mut lines = vec![format!("📊 Давление за {}", day.strftime("%d.%m.%Y"))];

        match today.last() {
            None => lines.push("Сегодня измерений не было.".to_string()),
            Some(latest) => {
                lines.push(format!("Измерений: {}", today.len()));
                if let Some(average) = self.average(today) {
                    lines.push(format!("Среднее: {average:.0}"));
                }
                lines.push(format!("Последнее: {}", latest.record.bucket));
                let critical = today
                    .iter()
                    .filter(|e| self.is_critical(&e.record.bucket))
                    .count();
                if critical > 0 {
                    lines.push(format!("❗️ Критических: {critical}"));
                }
            }
        }

        lines.push(String::new());
        lines.push(format!(
            "За {} дн.: {} измерений, доставлено {}%",
            stats.window_days, stats.total, stats.success_rate
        ));
        lines.join("\n")
    }

    /// Sends today's summary to the senior and every caregiver. Each send
    /// settles independently.
    pub async fn send_daily_report(&self) -> AppResult<ReportDelivery> {
        let day = self.today();
        let start = day.to_zoned(self.timezone.clone())?.timestamp();
        let today = self.recorder.since(start).await?;
        let stats = self.statistics(self.report_days).await?;
        let text = self.format_report(day, &today, &stats);

        let sends = self.recipients.everyone().cloned().map(|phone| {
            let gateway = self.gateway.clone();
            let text = text.clone();
            async move {
                let result = send_isolated({
                    let phone = phone.clone();
                    async move { gateway.send_text(&phone, &text).await }
                })
                .await;
                RecipientDelivery::new(phone, result)
            }
        });
        let deliveries = join_all(sends).await;

        let sent = deliveries.iter().filter(|d| d.success).count();
        tracing::info!(
            readings_today = today.len(),
            sent,
            recipients = deliveries.len(),
            "Daily report sent"
        );

        Ok(ReportDelivery { text, deliveries })
    }
}
