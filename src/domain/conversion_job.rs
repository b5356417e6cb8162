use super::{TaskOperation, TaskStatus};

/// Where and how the import task expects the source file to be posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadForm {
    pub url: String,
    /// Form fields in the order the service listed them. They must be sent
    /// verbatim and ahead of the file part.
    pub parameters: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultFile {
    pub filename: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionTask {
    pub id: String,
    pub name: String,
    pub operation: TaskOperation,
    pub status: TaskStatus,
    pub message: Option<String>,
    pub upload_form: Option<UploadForm>,
    pub files: Vec<ResultFile>,
}

impl ConversionTask {
    /// Name if the service echoed one back, otherwise the task id.
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionJob {
    pub id: String,
    pub tasks: Vec<ConversionTask>,
}

impl ConversionJob {
    pub fn new(id: impl Into<String>, tasks: Vec<ConversionTask>) -> Self {
        Self {
            id: id.into(),
            tasks,
        }
    }

    pub fn import_form(&self) -> Option<&UploadForm> {
        self.tasks
            .iter()
            .filter(|t| t.operation == TaskOperation::Import)
            .find_map(|t| t.upload_form.as_ref())
    }

    pub fn failed_task(&self) -> Option<&ConversionTask> {
        self.tasks.iter().find(|t| t.status == TaskStatus::Failed)
    }

    /// All tasks finished, or at least one failed.
    pub fn is_terminal(&self) -> bool {
        self.failed_task().is_some() || self.tasks.iter().all(|t| t.status == TaskStatus::Finished)
    }

    /// First result file of the first finished export task.
    pub fn export_file(&self) -> Option<&ResultFile> {
        self.tasks
            .iter()
            .filter(|t| t.operation == TaskOperation::Export && t.status == TaskStatus::Finished)
            .find_map(|t| t.files.first())
    }
}
