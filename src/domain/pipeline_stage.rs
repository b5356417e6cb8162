use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStage {
    Receiving,
    Converting,
    Transcribing,
    Responding,
    Failed,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Receiving => "RECEIVING",
            PipelineStage::Converting => "CONVERTING",
            PipelineStage::Transcribing => "TRANSCRIBING",
            PipelineStage::Responding => "RESPONDING",
            PipelineStage::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineStage::Responding | PipelineStage::Failed)
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
