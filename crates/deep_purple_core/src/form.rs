//! crates/deep_purple_core/src/form.rs
//!
//! The communication form: one form, five operations. The selected mode
//! decides which fields are shown, which are required, and which endpoint the
//! submission goes to.

use serde::{Deserialize, Serialize};

use crate::charts::AnalysisReport;
use crate::domain::{CommunicationDraft, UploadRequest};
use crate::ports::{CommunicationService, PortError, PortResult};

/// Longest content the backend accepts for analysis.
pub const MAX_CONTENT_CHARS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormMode {
    Save,
    Update,
    Delete,
    Get,
    Upload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    Content,
    ModelName,
    Id,
    File,
}

impl FormMode {
    pub const ALL: [FormMode; 5] = [
        FormMode::Save,
        FormMode::Update,
        FormMode::Delete,
        FormMode::Get,
        FormMode::Upload,
    ];

    pub fn description(&self) -> &'static str {
        match self {
            FormMode::Save => "Analyze the content and save the analysis.",
            FormMode::Update => "Update existing analysis data by ID.",
            FormMode::Delete => "Delete analysis data by ID.",
            FormMode::Get => "Get analysis data by its ID.",
            FormMode::Upload => "Upload a file for analysis.",
        }
    }

    pub fn fields(&self) -> &'static [FormField] {
        match self {
            FormMode::Save => &[FormField::Content, FormField::ModelName],
            FormMode::Update => &[FormField::Content, FormField::ModelName, FormField::Id],
            FormMode::Delete | FormMode::Get => &[FormField::Id],
            FormMode::Upload => &[FormField::Content, FormField::ModelName, FormField::File],
        }
    }
}

/// A file picked in the upload field.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Raw field values as submitted. Fields hidden by the mode are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormInput {
    pub mode: Option<FormMode>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(skip)]
    pub file: Option<UploadFile>,
}

/// A validated submission, ready for exactly one backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum FormCommand {
    Save(CommunicationDraft),
    Update { id: i64, draft: CommunicationDraft },
    Delete { id: i64 },
    Get { id: i64 },
    Upload(UploadRequest),
}

fn required_text(value: Option<String>, field: &str) -> PortResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| PortError::Invalid(format!("{field} is required")))
}

fn required_id(value: Option<i64>) -> PortResult<i64> {
    value.ok_or_else(|| PortError::Invalid("id is required".to_string()))
}

fn draft(content: Option<String>, model_name: Option<String>) -> PortResult<CommunicationDraft> {
    let content = required_text(content, "content")?;
    if content.chars().count() > MAX_CONTENT_CHARS {
        return Err(PortError::Invalid(format!(
            "content cannot exceed {MAX_CONTENT_CHARS} characters"
        )));
    }
    Ok(CommunicationDraft {
        content,
        model_name: required_text(model_name, "model name")?,
    })
}

impl FormInput {
    pub fn into_command(self) -> PortResult<FormCommand> {
        let mode = self
            .mode
            .ok_or_else(|| PortError::Invalid("select an operation".to_string()))?;
        match mode {
            FormMode::Save => Ok(FormCommand::Save(draft(self.content, self.model_name)?)),
            FormMode::Update => Ok(FormCommand::Update {
                id: required_id(self.id)?,
                draft: draft(self.content, self.model_name)?,
            }),
            FormMode::Delete => Ok(FormCommand::Delete {
                id: required_id(self.id)?,
            }),
            FormMode::Get => Ok(FormCommand::Get {
                id: required_id(self.id)?,
            }),
            FormMode::Upload => {
                let file = self
                    .file
                    .ok_or_else(|| PortError::Invalid("file is required".to_string()))?;
                Ok(FormCommand::Upload(UploadRequest {
                    file_name: file.name,
                    bytes: file.bytes,
                    model_name: required_text(self.model_name, "model name")?,
                }))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FormOutcome {
    Analysed { report: AnalysisReport },
    Deleted { id: i64, message: String },
}

/// Sends the command to its endpoint. One command, one request.
pub async fn submit(
    service: &dyn CommunicationService,
    command: FormCommand,
) -> PortResult<FormOutcome> {
    let communication = match command {
        FormCommand::Save(draft) => service.save(&draft).await?,
        FormCommand::Update { id, draft } => service.update(id, &draft).await?,
        FormCommand::Get { id } => service.get(id).await?,
        FormCommand::Upload(request) => service.upload(request).await?,
        FormCommand::Delete { id } => {
            service.delete(id).await?;
            return Ok(FormOutcome::Deleted {
                id,
                message: format!("Communication with ID {id} has been deleted."),
            });
        }
    };
    Ok(FormOutcome::Analysed {
        report: AnalysisReport::from_communication(&communication),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::NOT_AVAILABLE;
    use crate::domain::Communication;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingService {
        calls: Mutex<Vec<String>>,
    }

    impl RecordingService {
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CommunicationService for RecordingService {
        async fn save(&self, draft: &CommunicationDraft) -> PortResult<Communication> {
            self.record(format!("POST /communications {}", draft.content));
            Ok(Communication::default())
        }

        async fn update(&self, id: i64, _draft: &CommunicationDraft) -> PortResult<Communication> {
            self.record(format!("PUT /communications/{id}"));
            Ok(Communication::default())
        }

        async fn delete(&self, id: i64) -> PortResult<()> {
            self.record(format!("DELETE /communications/{id}"));
            Ok(())
        }

        async fn get(&self, id: i64) -> PortResult<Communication> {
            self.record(format!("GET /communications/{id}"));
            Ok(Communication {
                id: Some(id),
                content: Some("hello".to_string()),
                ..Communication::default()
            })
        }

        async fn list(&self) -> PortResult<Vec<Communication>> {
            self.record("GET /communications".to_string());
            Ok(Vec::new())
        }

        async fn upload(&self, request: UploadRequest) -> PortResult<Communication> {
            self.record(format!("POST /communications/upload {}", request.file_name));
            Ok(Communication::default())
        }
    }

    #[test]
    fn visible_fields_follow_mode() {
        assert_eq!(FormMode::Delete.fields(), &[FormField::Id]);
        assert_eq!(FormMode::Get.fields(), &[FormField::Id]);
        assert!(FormMode::Save.fields().contains(&FormField::Content));
        assert!(!FormMode::Save.fields().contains(&FormField::Id));
        assert!(FormMode::Upload.fields().contains(&FormField::File));
    }

    #[test]
    fn missing_mode_or_id_is_invalid() {
        assert!(FormInput::default().into_command().is_err());

        let get_without_id = FormInput {
            mode: Some(FormMode::Get),
            ..FormInput::default()
        };
        assert!(matches!(get_without_id.into_command(), Err(PortError::Invalid(_))));
    }

    #[test]
    fn oversized_content_is_rejected() {
        let input = FormInput {
            mode: Some(FormMode::Save),
            content: Some("x".repeat(MAX_CONTENT_CHARS + 1)),
            model_name: Some("gpt".to_string()),
            ..FormInput::default()
        };
        assert!(input.into_command().is_err());
    }

    #[test]
    fn hidden_fields_are_ignored() {
        let input = FormInput {
            mode: Some(FormMode::Delete),
            content: Some("ignored".to_string()),
            id: Some(3),
            ..FormInput::default()
        };
        assert_eq!(input.into_command().unwrap(), FormCommand::Delete { id: 3 });
    }

    #[tokio::test]
    async fn get_issues_one_request_and_tolerates_missing_primary() {
        let service = RecordingService::default();
        let command = FormInput {
            mode: Some(FormMode::Get),
            id: Some(42),
            ..FormInput::default()
        }
        .into_command()
        .unwrap();

        let outcome = submit(&service, command).await.unwrap();

        assert_eq!(service.calls(), vec!["GET /communications/42".to_string()]);
        match outcome {
            FormOutcome::Analysed { report } => {
                assert_eq!(report.id, "42");
                assert_eq!(report.primary_emotion, NOT_AVAILABLE);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn delete_reports_notice() {
        let service = RecordingService::default();

        let outcome = submit(&service, FormCommand::Delete { id: 7 }).await.unwrap();

        assert_eq!(
            outcome,
            FormOutcome::Deleted {
                id: 7,
                message: "Communication with ID 7 has been deleted.".to_string(),
            }
        );
        assert_eq!(service.calls(), vec!["DELETE /communications/7".to_string()]);
    }

    #[tokio::test]
    async fn upload_requires_file_and_model() {
        let service = RecordingService::default();
        let input = FormInput {
            mode: Some(FormMode::Upload),
            model_name: Some("gemini".to_string()),
            file: Some(UploadFile {
                name: "notes.txt".to_string(),
                bytes: b"so happy".to_vec(),
            }),
            ..FormInput::default()
        };

        submit(&service, input.into_command().unwrap()).await.unwrap();

        assert_eq!(
            service.calls(),
            vec!["POST /communications/upload notes.txt".to_string()]
        );
    }
}
