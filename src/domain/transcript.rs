use super::RecognitionSegment;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transcript {
    segments: Vec<String>,
}

impl Transcript {
    /// Keeps the top alternative of every segment, in service order.
    /// Segments without any alternative contribute nothing.
    pub fn from_segments(segments: &[RecognitionSegment]) -> Self {
        Self {
            segments: segments
                .iter()
                .filter_map(|s| s.best())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn text(&self) -> String {
        self.segments.join("\n")
    }
}
