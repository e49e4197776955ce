//! Job types for background processing jobs.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

/// Prefix carried by client-generated placeholder ids.
pub const TEMP_ID_PREFIX: &str = "temp-";

/// Identifier of a processing job.
///
/// Either assigned by the backend or a `temp-<millis>` placeholder created
/// before the backend confirmed the job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Wrap a server-assigned id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Placeholder id for an optimistic record created at `now`.
    pub fn temporary(now: DateTime<Utc>) -> Self {
        Self(format!("{TEMP_ID_PREFIX}{}", now.timestamp_millis()))
    }

    /// Whether this id is a client-side placeholder.
    pub fn is_temporary(&self) -> bool {
        self.0.starts_with(TEMP_ID_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Status of a processing job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl JobStatus {
    /// Pending or running.
    pub fn is_active(&self) -> bool {
        matches!(self, JobStatus::Pending | JobStatus::Running)
    }

    /// Completed, failed or cancelled.
    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }

    pub fn name(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Kind of work a job performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    LoadData,
    CleanData,
    Transform,
    GenerateGraph,
    Ingestion,
    #[serde(other)]
    Unknown,
}

impl JobType {
    /// Short label used in progress views.
    pub fn label(&self) -> &'static str {
        match self {
            JobType::LoadData => "Loading data",
            JobType::CleanData => "Cleaning data",
            JobType::Transform => "Transforming data",
            JobType::GenerateGraph => "Generating graph",
            JobType::Ingestion => "Ingesting data",
            JobType::Unknown => "Processing",
        }
    }
}

/// A background processing job as tracked by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,

    /// Schema / dataset the job operates on. Empty when the backend sent none.
    #[serde(default, deserialize_with = "string_or_number")]
    pub schema_id: String,

    pub job_type: JobType,

    pub status: JobStatus,

    /// Completion percentage, always within 0–100.
    #[serde(default, deserialize_with = "clamped_progress")]
    pub progress: u8,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub message: String,

    #[serde(deserialize_with = "lenient_datetime")]
    pub created_at: DateTime<Utc>,

    #[serde(deserialize_with = "lenient_datetime")]
    pub updated_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Value>,
}

/// Older backends name these fields differently. The canonical key wins
/// when both are present.
const LEGACY_KEYS: [(&str, &str); 2] = [("type", "job_type"), ("resource_id", "schema_id")];

impl Job {
    /// Decode one backend record, accepting the legacy field names.
    pub fn from_backend(mut value: serde_json::Value) -> serde_json::Result<Self> {
        if let Some(obj) = value.as_object_mut() {
            for (legacy, canonical) in LEGACY_KEYS {
                let Some(old) = obj.remove(legacy) else {
                    continue;
                };
                if obj.get(canonical).is_none_or(serde_json::Value::is_null) {
                    obj.insert(canonical.to_string(), old);
                }
            }
        }
        serde_json::from_value(value)
    }

    /// Decode a backend job list, dropping records that do not parse.
    pub fn from_backend_list(values: Vec<serde_json::Value>) -> Vec<Self> {
        values
            .into_iter()
            .filter_map(|value| {
                let id = value.get("id").cloned();
                match Self::from_backend(value) {
                    Ok(job) => Some(job),
                    Err(e) => {
                        warn!("Skipping malformed job record {:?}: {}", id, e);
                        None
                    }
                }
            })
            .collect()
    }

    /// Optimistic placeholder inserted before the backend confirms creation.
    pub fn placeholder(
        schema_id: impl Into<String>,
        options: &StartJobOptions,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: JobId::temporary(now),
            schema_id: schema_id.into(),
            job_type: options.job_type,
            status: JobStatus::Pending,
            progress: 0,
            message: options
                .message
                .clone()
                .unwrap_or_else(|| "Starting job...".to_string()),
            created_at: now,
            updated_at: now,
            result: None,
            error: None,
            config: options.config.clone(),
        }
    }

    /// Set progress, clamping to 0–100.
    pub fn with_progress(mut self, progress: f64) -> Self {
        self.progress = clamp_progress(progress);
        self
    }

    pub fn with_status(mut self, status: JobStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Parameters for starting a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartJobOptions {
    pub job_type: JobType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Job-specific configuration forwarded verbatim to the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Value>,
}

impl StartJobOptions {
    pub fn new(job_type: JobType) -> Self {
        Self {
            job_type,
            message: None,
            config: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_config(mut self, config: serde_json::Value) -> Self {
        self.config = Some(config);
        self
    }
}

fn clamp_progress(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.clamp(0.0, 100.0).round() as u8
}

fn clamped_progress<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value.map(clamp_progress).unwrap_or(0))
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Null,
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Null => String::new(),
    })
}

// The backend emits naive ISO timestamps (no offset); those are UTC.
fn lenient_datetime<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_temporary_id() {
        let now = Utc::now();
        let id = JobId::temporary(now);
        assert!(id.is_temporary());
        assert_eq!(id.0, format!("temp-{}", now.timestamp_millis()));
        assert!(!JobId::new("3f2a").is_temporary());
    }

    #[test]
    fn test_status_predicates() {
        assert!(JobStatus::Pending.is_active());
        assert!(JobStatus::Running.is_active());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_deserialize_backend_payload() {
        let job: Job = serde_json::from_value(json!({
            "id": "a1b2",
            "schema_id": 42,
            "job_type": "load_data",
            "status": "running",
            "progress": 37.6,
            "message": null,
            "created_at": "2025-03-01T10:00:00.123456",
            "updated_at": "2025-03-01T10:00:05Z"
        }))
        .unwrap();

        assert_eq!(job.id, JobId::new("a1b2"));
        assert_eq!(job.schema_id, "42");
        assert_eq!(job.job_type, JobType::LoadData);
        assert_eq!(job.status, JobStatus::Running);
        assert_eq!(job.progress, 38);
        assert_eq!(job.message, "");
        assert_eq!(job.created_at.timestamp(), 1_740_823_200);
    }

    #[test]
    fn test_progress_clamped_and_legacy_names() {
        let job = Job::from_backend(json!({
            "id": "x",
            "resource_id": "sales",
            "type": "kg_magic",
            "status": "completed",
            "progress": 140,
            "created_at": "2025-03-01T10:00:00Z",
            "updated_at": "2025-03-01T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(job.schema_id, "sales");
        assert_eq!(job.job_type, JobType::Unknown);
        assert_eq!(job.progress, 100);
    }

    #[test]
    fn test_canonical_name_wins_over_legacy() {
        let job = Job::from_backend(json!({
            "id": "x",
            "schema_id": 7,
            "resource_id": "ignored",
            "type": "schema",
            "job_type": "load_data",
            "status": "running",
            "created_at": "2025-03-01T10:00:00Z",
            "updated_at": "2025-03-01T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(job.schema_id, "7");
        assert_eq!(job.job_type, JobType::LoadData);
    }

    #[test]
    fn test_null_or_missing_schema_id_is_empty() {
        let base = json!({
            "id": "x",
            "job_type": "transform",
            "status": "pending",
            "created_at": "2025-03-01T10:00:00Z",
            "updated_at": "2025-03-01T10:00:00Z"
        });
        let job = Job::from_backend(base.clone()).unwrap();
        assert_eq!(job.schema_id, "");

        let mut with_null = base;
        with_null["schema_id"] = serde_json::Value::Null;
        assert_eq!(Job::from_backend(with_null).unwrap().schema_id, "");
    }

    #[test]
    fn test_backend_list_skips_bad_records() {
        let jobs = Job::from_backend_list(vec![
            json!({
                "id": "good-1",
                "schema_id": "1",
                "job_type": "load_data",
                "status": "running",
                "created_at": "2025-03-01T10:00:00Z",
                "updated_at": "2025-03-01T10:00:00Z"
            }),
            json!({"id": "broken", "status": "exploded"}),
            json!("not an object"),
            json!({
                "id": "good-2",
                "schema_id": null,
                "type": "clean_data",
                "status": "completed",
                "created_at": "2025-03-01T10:00:00Z",
                "updated_at": "2025-03-01T10:00:00Z"
            }),
        ]);

        let ids: Vec<_> = jobs.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, ["good-1", "good-2"]);
        assert_eq!(jobs[1].job_type, JobType::CleanData);
    }

    #[test]
    fn test_placeholder_is_pending() {
        let now = Utc::now();
        let options = StartJobOptions::new(JobType::CleanData).with_message("Cleaning");
        let job = Job::placeholder("7", &options, now);
        assert!(job.id.is_temporary());
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.progress, 0);
        assert_eq!(job.message, "Cleaning");
        assert_eq!(job.with_progress(-3.0).progress, 0);
    }
}
