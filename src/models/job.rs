use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a job.
///
/// The wire names (including the space in `"IN PROGRESS"`) are owned by the
/// service. Being a closed enum, no other value is representable locally,
/// even transiently; an unknown status in a response is a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    #[serde(rename = "TODO")]
    Todo,
    #[serde(rename = "IN PROGRESS")]
    InProgress,
    #[serde(rename = "DONE")]
    Done,
}

impl JobStatus {
    /// All statuses in fixed enumeration order (TODO, IN PROGRESS, DONE).
    pub const ALL: [JobStatus; 3] = [JobStatus::Todo, JobStatus::InProgress, JobStatus::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Todo => "TODO",
            JobStatus::InProgress => "IN PROGRESS",
            JobStatus::Done => "DONE",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for JobStatus {
    type Err = String;

    /// Accepts the wire names plus the separators people actually type
    /// (`in-progress`, `IN_PROGRESS`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(['-', '_'], " ");
        match normalized.as_str() {
            "TODO" => Ok(JobStatus::Todo),
            "IN PROGRESS" | "INPROGRESS" => Ok(JobStatus::InProgress),
            "DONE" => Ok(JobStatus::Done),
            other => Err(format!(
                "unknown status '{other}' (expected TODO, IN PROGRESS or DONE)"
            )),
        }
    }
}

/// A single task as the service returns it.
///
/// `id` is opaque, server-assigned and immutable; timestamps are computed
/// server-side only, so they stay optional on the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: JobStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Partial update body for `PUT /jobs/{id}`. Unset fields are omitted so
/// the server only touches what the caller changed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct JobPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
}

/// Job mutations come back wrapped: `{"message": ..., "job": {...}}`.
#[derive(Debug, Deserialize)]
pub struct JobEnvelope {
    #[serde(default)]
    pub message: Option<String>,
    pub job: Job,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_wire_names_match_the_service() {
        assert_eq!(serde_json::to_string(&JobStatus::Todo).unwrap(), "\"TODO\"");
        assert_eq!(
            serde_json::to_string(&JobStatus::InProgress).unwrap(),
            "\"IN PROGRESS\""
        );
        assert_eq!(serde_json::to_string(&JobStatus::Done).unwrap(), "\"DONE\"");
    }

    #[test]
    fn status_rejects_unknown_values() {
        let result = serde_json::from_str::<JobStatus>("\"QUEUED\"");
        assert!(result.is_err());
    }

    #[test]
    fn status_parses_human_input() {
        assert_eq!("todo".parse::<JobStatus>().unwrap(), JobStatus::Todo);
        assert_eq!(
            "in-progress".parse::<JobStatus>().unwrap(),
            JobStatus::InProgress
        );
        assert_eq!(
            "IN_PROGRESS".parse::<JobStatus>().unwrap(),
            JobStatus::InProgress
        );
        assert_eq!(" done ".parse::<JobStatus>().unwrap(), JobStatus::Done);
        assert!("finished".parse::<JobStatus>().is_err());
    }

    #[test]
    fn job_deserializes_without_timestamps() {
        let job: Job = serde_json::from_str(
            r#"{"id": 7, "title": "Buy milk", "description": "", "status": "TODO"}"#,
        )
        .unwrap();
        assert_eq!(job.id, 7);
        assert_eq!(job.description.as_deref(), Some(""));
        assert_eq!(job.status, JobStatus::Todo);
        assert!(job.created_at.is_none());
    }

    #[test]
    fn patch_omits_unset_fields() {
        let patch = JobPatch {
            title: Some("New title".into()),
            ..JobPatch::default()
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json, serde_json::json!({"title": "New title"}));
    }
}
