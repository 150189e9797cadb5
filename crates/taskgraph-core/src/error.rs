use std::fmt;

/// Result alias for graph operations.
pub type Result<T, E = GraphError> = std::result::Result<T, E>;

/// Errors raised by graph construction and the analysis engines.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// An edge, duration or source referenced a vertex outside `[0, n)`.
    #[error("invalid vertex {vertex}: graph has {vertex_count} vertices")]
    InvalidVertex { vertex: usize, vertex_count: usize },

    /// Kahn's algorithm ordered fewer vertices than the graph holds.
    ///
    /// The partial order is discarded; only the counts are kept.
    #[error("cycle present: ordered {ordered} of {vertex_count} vertices")]
    CycleDetected { ordered: usize, vertex_count: usize },

    /// Summing edge weights along a path left the `i64` range.
    #[error("distance overflow relaxing edge {from} -> {to}")]
    WeightOverflow { from: usize, to: usize },
}

impl GraphError {
    /// Machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidVertex { .. } => ErrorCode::InvalidVertex,
            Self::CycleDetected { .. } => ErrorCode::CycleDetected,
            Self::WeightOverflow { .. } => ErrorCode::WeightOverflow,
        }
    }

    /// Returns `true` for [`GraphError::CycleDetected`].
    #[must_use]
    pub const fn is_cycle(&self) -> bool {
        matches!(self, Self::CycleDetected { .. })
    }
}

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidVertex,
    CycleDetected,
    WeightOverflow,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::InvalidVertex => "E2001",
            Self::CycleDetected => "E2002",
            Self::WeightOverflow => "E2003",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::InvalidVertex => "Vertex id out of range",
            Self::CycleDetected => "cycle present",
            Self::WeightOverflow => "Path distance overflow",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::InvalidVertex => Some("Task ids must be packed densely from 0."),
            Self::CycleDetected => {
                Some("Analyse the condensation graph, or break the dependency cycle.")
            }
            Self::WeightOverflow => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
