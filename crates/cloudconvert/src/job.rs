//! CloudConvert job and task descriptors.
//!
//! The provider wraps every job in a `{"data": {...}}` envelope. Only the
//! fields the relay reads are modelled; everything else is ignored.

use serde::Deserialize;
use winzaap_core::pipeline::{EXPORT_TASK, IMPORT_TASK};

use crate::error::ConversionError;

/// `{"data": ...}` envelope around a job descriptor.
#[derive(Debug, Clone, Deserialize)]
pub struct JobEnvelope {
    pub data: Job,
}

/// Lifecycle status shared by jobs and tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Waiting,
    Processing,
    Finished,
    Error,
    /// Any status this client does not know about; treated as in progress.
    #[serde(other)]
    Unknown,
}

/// A remote conversion job.
#[derive(Debug, Clone, Deserialize)]
pub struct Job {
    pub id: String,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// A single step within a job.
#[derive(Debug, Clone, Deserialize)]
pub struct Task {
    pub name: String,
    #[serde(default)]
    pub status: Status,
    pub message: Option<String>,
    pub code: Option<String>,
    pub result: Option<TaskResult>,
}

/// Task result payload. Which field is set depends on the operation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskResult {
    /// Present on `import/upload` tasks.
    pub form: Option<UploadForm>,
    /// Present on `export/url` tasks once finished.
    #[serde(default)]
    pub files: Vec<ExportFile>,
}

/// Upload target handed out by an `import/upload` task.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadForm {
    pub url: String,
    /// Form fields that must precede the file in the upload.
    #[serde(default)]
    pub parameters: serde_json::Map<String, serde_json::Value>,
}

/// A downloadable file produced by an `export/url` task.
#[derive(Debug, Clone, Deserialize)]
pub struct ExportFile {
    pub filename: Option<String>,
    pub url: String,
}

impl Job {
    /// Find a task by name.
    pub fn task(&self, name: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.name == name)
    }

    /// First task the provider marked as failed, if any.
    pub fn failed_task(&self) -> Option<&Task> {
        self.tasks.iter().find(|t| t.status == Status::Error)
    }

    /// Upload form of the import task.
    pub fn upload_form(&self) -> Result<&UploadForm, ConversionError> {
        self.required_task(IMPORT_TASK)?
            .result
            .as_ref()
            .and_then(|r| r.form.as_ref())
            .ok_or_else(|| {
                ConversionError::MalformedResponse(format!(
                    "task '{IMPORT_TASK}' of job {} has no upload form",
                    self.id
                ))
            })
    }

    /// First file produced by the export task.
    pub fn export_file(&self) -> Result<&ExportFile, ConversionError> {
        self.required_task(EXPORT_TASK)?
            .result
            .as_ref()
            .and_then(|r| r.files.first())
            .ok_or_else(|| {
                ConversionError::MalformedResponse(format!(
                    "task '{EXPORT_TASK}' of job {} lists no result files",
                    self.id
                ))
            })
    }

    /// Describe why this job failed, from its first failed task.
    pub fn failure(&self) -> ConversionError {
        let (task, message) = match self.failed_task() {
            Some(t) => (
                t.name.clone(),
                t.message
                    .clone()
                    .or_else(|| t.code.clone())
                    .unwrap_or_else(|| "no error message provided".to_string()),
            ),
            None => ("unknown".to_string(), "job reported error status".to_string()),
        };
        ConversionError::JobFailed {
            job_id: self.id.clone(),
            task,
            message,
        }
    }

    fn required_task(&self, name: &str) -> Result<&Task, ConversionError> {
        self.task(name).ok_or_else(|| {
            ConversionError::MalformedResponse(format!(
                "task '{name}' not found in job {}",
                self.id
            ))
        })
    }
}

/// Render a form parameter as the text value sent in a multipart field.
///
/// Strings go out verbatim; other JSON values are sent as their JSON text.
pub fn form_value_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
