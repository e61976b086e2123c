//! The three-task conversion pipeline submitted to the provider.
//!
//! Every job is `import/upload` → `convert` → `export/url`. Task names are
//! fixed so the relay can find the upload form and the export URL again in
//! the job descriptors the provider sends back.

use serde_json::json;

/// Task that receives the uploaded source file.
pub const IMPORT_TASK: &str = "import-my-file";

/// Task that converts the imported file.
pub const CONVERT_TASK: &str = "convert-my-file";

/// Task that publishes the converted file under a temporary URL.
pub const EXPORT_TASK: &str = "export-my-file";

/// Target format requested from the provider.
pub const OUTPUT_FORMAT: &str = "pdf";

/// MIME type of the artifact returned to the client.
pub const OUTPUT_CONTENT_TYPE: &str = "application/pdf";

/// Download name of the artifact returned to the client.
pub const OUTPUT_FILENAME: &str = "converted.pdf";

/// Build the `POST /jobs` request body for a conversion to `output_format`.
pub fn conversion_job_payload(output_format: &str) -> serde_json::Value {
    json!({
        "tasks": {
            IMPORT_TASK: {
                "operation": "import/upload",
            },
            CONVERT_TASK: {
                "operation": "convert",
                "input": IMPORT_TASK,
                "output_format": output_format,
            },
            EXPORT_TASK: {
                "operation": "export/url",
                "input": CONVERT_TASK,
            },
        }
    })
}

/// `Content-Disposition` header value for the returned artifact.
pub fn attachment_disposition() -> String {
    format!("attachment; filename=\"{OUTPUT_FILENAME}\"")
}
