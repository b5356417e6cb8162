use std::fmt;

/// What a conversion task does, reduced to the three steps the pipeline
/// drives. Unknown operations are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TaskOperation {
    Import,
    Convert,
    Export,
    Other(String),
}

impl TaskOperation {
    pub fn from_operation(operation: &str) -> Self {
        match operation.split('/').next().unwrap_or(operation) {
            "import" => TaskOperation::Import,
            "convert" => TaskOperation::Convert,
            "export" => TaskOperation::Export,
            _ => TaskOperation::Other(operation.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TaskOperation::Import => "import",
            TaskOperation::Convert => "convert",
            TaskOperation::Export => "export",
            TaskOperation::Other(op) => op,
        }
    }
}

impl fmt::Display for TaskOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
