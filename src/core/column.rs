use serde::{Deserialize, Serialize};

/// Named columns of the benchmark result table.
///
/// Serialized names are the header strings the benchmark runner writes,
/// including its `wigth` spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Column {
    #[serde(rename = "Iterations")]
    Iterations,
    #[serde(rename = "GenerationTime(ms)")]
    GenerationTime,
    #[serde(rename = "RenderTime(ms)")]
    RenderTime,
    #[serde(rename = "Triangles")]
    Triangles,
    #[serde(rename = "Leaves")]
    Leaves,
    #[serde(rename = "wigth", alias = "width")]
    Width,
    #[serde(rename = "height")]
    Height,
    #[serde(rename = "shadowmap")]
    ShadowMap,
    #[serde(rename = "CameraYaw")]
    CameraYaw,
}

impl Column {
    /// Header order of files written by the benchmark runner.
    pub const ALL: [Column; 9] = [
        Column::Iterations,
        Column::GenerationTime,
        Column::RenderTime,
        Column::Triangles,
        Column::Leaves,
        Column::Width,
        Column::Height,
        Column::ShadowMap,
        Column::CameraYaw,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Column::Iterations => "Iterations",
            Column::GenerationTime => "GenerationTime(ms)",
            Column::RenderTime => "RenderTime(ms)",
            Column::Triangles => "Triangles",
            Column::Leaves => "Leaves",
            Column::Width => "wigth",
            Column::Height => "height",
            Column::ShadowMap => "shadowmap",
            Column::CameraYaw => "CameraYaw",
        }
    }

    pub fn from_header(name: &str) -> Option<Self> {
        match name.trim() {
            "width" => Some(Column::Width),
            other => Self::ALL.into_iter().find(|c| c.header() == other),
        }
    }

    /// Measured quantities; everything else is a configuration parameter.
    pub fn is_metric(self) -> bool {
        matches!(
            self,
            Column::GenerationTime | Column::RenderTime | Column::Triangles | Column::Leaves
        )
    }

    pub fn parameters() -> impl Iterator<Item = Column> {
        Self::ALL.into_iter().filter(|c| !c.is_metric())
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.header())
    }
}
