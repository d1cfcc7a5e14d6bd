//! RestStore: hosted row-based backend over HTTP.
//!
//! Talks to a PostgREST-style API (`/rest/v1/<table>`) with `apikey` and
//! bearer headers. Requests run on a private current-thread tokio runtime
//! so the store can satisfy the synchronous [`ActivityStore`] trait.

use std::time::Duration;

use chrono::{NaiveDate, Utc};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;

use crate::calendar::ActivityDay;
use crate::error::{ConfigError, CoreError, Result};
use crate::format::date_key;
use crate::progression::{apply_award, ExperienceStats, XpUpdate, MAX_XP_AWARD};
use crate::storage::{ActivityStore, BackendConfig};
use crate::timer::SessionLogEntry;

#[derive(Debug, Deserialize)]
struct UserStatsRow {
    total_xp: i64,
}

#[derive(Debug, Deserialize)]
struct DailyActivityRow {
    date: NaiveDate,
    minutes_studied: i64,
}

#[derive(Debug, Serialize)]
struct StudySessionRow<'a> {
    phase: &'a str,
    duration_minutes: u32,
    started_at: String,
    completed_at: String,
}

/// Client for the hosted activity backend.
pub struct RestStore {
    base_url: Url,
    api_key: String,
    http_client: Client,
    runtime: tokio::runtime::Runtime,
}

impl RestStore {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: "backend.url".into(),
            message,
        };
        let mut base_url = Url::parse(base_url.trim()).map_err(|e| invalid(e.to_string()))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoreError::Custom(format!("http client: {e}")))?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self {
            base_url,
            api_key: api_key.to_string(),
            http_client,
            runtime,
        })
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        Self::new(
            &config.url,
            &config.api_key,
            Duration::from_secs(config.timeout_secs.max(1)),
        )
    }

    fn table_url(&self, table: &str) -> std::result::Result<Url, url::ParseError> {
        self.base_url.join(&format!("rest/v1/{table}"))
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn get_rows<T: for<'de> Deserialize<'de>>(
        &self,
        table: &str,
        select: &str,
        filters: &[(&str, &str)],
    ) -> std::result::Result<Vec<T>, Box<dyn std::error::Error + Send + Sync>> {
        let mut url = self.table_url(table)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("select", select);
            for (column, condition) in filters {
                query.append_pair(column, condition);
            }
        }
        let rows = self
            .authed(self.http_client.get(url))
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<T>>()
            .await?;
        Ok(rows)
    }

    async fn post_json(
        &self,
        table: &str,
        body: &serde_json::Value,
        upsert: bool,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let url = self.table_url(table)?;
        let prefer = if upsert {
            "resolution=merge-duplicates,return=minimal"
        } else {
            "return=minimal"
        };
        self.authed(self.http_client.post(url))
            .header("Prefer", prefer)
            .json(body)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn total_xp(&self) -> std::result::Result<u64, Box<dyn std::error::Error + Send + Sync>> {
        let rows: Vec<UserStatsRow> = self.get_rows("user_stats", "total_xp", &[]).await?;
        Ok(rows.first().map(|r| r.total_xp.max(0) as u64).unwrap_or(0))
    }
}

impl ActivityStore for RestStore {
    fn fetch_xp_stats(&self) -> Result<ExperienceStats> {
        let total = self
            .runtime
            .block_on(self.total_xp())
            .map_err(|e| CoreError::remote_fetch("fetch_xp_stats", e))?;
        Ok(ExperienceStats::from_total(total))
    }

    fn add_xp(&self, amount: u64, reason: &str) -> Result<XpUpdate> {
        let amount = amount.min(MAX_XP_AWARD);
        let before = self
            .runtime
            .block_on(self.total_xp())
            .map_err(|e| CoreError::remote_fetch("add_xp", e))?;
        let body = json!({
            "amount": amount,
            "reason": reason,
            "awarded_at": Utc::now().to_rfc3339(),
        });
        self.runtime
            .block_on(self.post_json("xp_events", &body, false))
            .map_err(|e| CoreError::remote_log("add_xp", e))?;
        let after = match self.runtime.block_on(self.total_xp()) {
            Ok(after) => after,
            Err(e) => {
                // The award is already stored; report it against the old total.
                tracing::warn!(error = %e, "xp total refetch failed after award");
                return Ok(apply_award(before, amount));
            }
        };

        let before_stats = ExperienceStats::from_total(before);
        let stats = ExperienceStats::from_total(after);
        Ok(XpUpdate {
            stats,
            awarded: amount,
            leveled_up: stats.current_level > before_stats.current_level,
        })
    }

    fn log_session(&self, entry: &SessionLogEntry) -> Result<()> {
        let row = StudySessionRow {
            phase: entry.phase.as_str(),
            duration_minutes: entry.duration_minutes,
            started_at: entry.started_at.to_rfc3339(),
            completed_at: entry.completed_at.to_rfc3339(),
        };
        let body = serde_json::to_value(row)?;
        self.runtime
            .block_on(self.post_json("study_sessions", &body, false))
            .map_err(|e| CoreError::remote_log("log_session", e))
    }

    fn fetch_activity(&self) -> Result<Vec<ActivityDay>> {
        let rows: Vec<DailyActivityRow> = self
            .runtime
            .block_on(self.get_rows("daily_activity", "date,minutes_studied", &[]))
            .map_err(|e| CoreError::remote_fetch("fetch_activity", e))?;
        Ok(rows
            .into_iter()
            .map(|r| ActivityDay::new(r.date, r.minutes_studied))
            .collect())
    }

    /// Adds to the minutes already stored for `date`.
    fn record_study_minutes(&self, date: NaiveDate, minutes: i64) -> Result<()> {
        let key = date_key(date);
        let filter = format!("eq.{key}");
        let existing: Vec<DailyActivityRow> = self
            .runtime
            .block_on(self.get_rows(
                "daily_activity",
                "date,minutes_studied",
                &[("date", filter.as_str())],
            ))
            .map_err(|e| CoreError::remote_fetch("record_study_minutes", e))?;
        let current: i64 = existing.iter().map(|r| r.minutes_studied).sum();

        let body = json!({
            "date": key,
            "minutes_studied": current.saturating_add(minutes),
        });
        self.runtime
            .block_on(self.post_json("daily_activity", &body, true))
            .map_err(|e| CoreError::remote_log("record_study_minutes", e))
    }
}
