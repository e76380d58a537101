use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Failure category recorded at the point of failure. Batch summaries
/// aggregate by this tag instead of inspecting error text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Input,
    Computation,
    Collaborator,
}

impl ErrorKind {
    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::Input => "input",
            ErrorKind::Computation => "computation",
            ErrorKind::Collaborator => "collaborator",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("missing required column '{column}' in {}", .path.display())]
    MissingColumn { column: String, path: PathBuf },

    #[error("{}: {rows} usable rows after parsing, need at least {minimum}", .path.display())]
    TooFewRows {
        path: PathBuf,
        rows: usize,
        minimum: usize,
    },

    #[error("cannot estimate a sampling rate from {count} timestamps")]
    TooFewTimestamps { count: usize },

    #[error("no telemetry files found in {}", .path.display())]
    NoInputFiles { path: PathBuf },

    #[error("degenerate sampling rate {rate} Hz (median interval {median_delta_secs} s)")]
    DegenerateSamplingRate { rate: f64, median_delta_secs: f64 },

    #[error("i/o failure on {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed delimited data in {}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to render chart {}: {message}", .path.display())]
    Render { path: PathBuf, message: String },
}

impl DetectError {
    pub fn missing_column(column: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        DetectError::MissingColumn {
            column: column.into(),
            path: path.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DetectError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        DetectError::Csv {
            path: path.into(),
            source,
        }
    }

    pub fn render(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        DetectError::Render {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DetectError::MissingColumn { .. }
            | DetectError::TooFewRows { .. }
            | DetectError::TooFewTimestamps { .. }
            | DetectError::NoInputFiles { .. } => ErrorKind::Input,
            DetectError::DegenerateSamplingRate { .. } => ErrorKind::Computation,
            DetectError::Io { .. } | DetectError::Csv { .. } | DetectError::Render { .. } => {
                ErrorKind::Collaborator
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        let input = DetectError::missing_column("weight_3", "a.csv");
        assert_eq!(input.kind(), ErrorKind::Input);

        let computation = DetectError::DegenerateSamplingRate {
            rate: f64::INFINITY,
            median_delta_secs: 0.0,
        };
        assert_eq!(computation.kind(), ErrorKind::Computation);

        let collaborator = DetectError::io(
            "a.csv",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(collaborator.kind(), ErrorKind::Collaborator);
    }

    #[test]
    fn test_messages_carry_context() {
        let err = DetectError::missing_column("timestamp", "data/run1.csv");
        let text = err.to_string();
        assert!(text.contains("timestamp"));
        assert!(text.contains("run1.csv"));
    }
}
