//! Crate-level error types.

use std::fmt;

/// Which engine capability failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineErrorKind {
    /// Engine instance could not be created or initialized.
    Init,
    /// Engine could not attach to its display surface.
    Attach,
    /// Structure content could not be loaded or parsed.
    Load,
    /// A residue selection could not be resolved.
    Selection,
    /// A batch of scene edits failed to commit.
    Commit,
    /// Color-theme provider registration or application failed.
    Theme,
    /// The engine instance was already torn down.
    Disposed,
}

impl fmt::Display for EngineErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::Attach => "attach",
            Self::Load => "load",
            Self::Selection => "selection",
            Self::Commit => "commit",
            Self::Theme => "theme",
            Self::Disposed => "disposed",
        };
        f.write_str(name)
    }
}

/// Error reported by a [`SceneEngine`](crate::engine::SceneEngine)
/// implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineError {
    /// Failing capability.
    pub kind: EngineErrorKind,
    /// Engine-supplied detail.
    pub message: String,
}

impl EngineError {
    /// Create an error of the given kind.
    pub fn new(kind: EngineErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "engine {} error: {}", self.kind, self.message)
    }
}

impl std::error::Error for EngineError {}

/// Errors produced by the viso-sync crate.
#[derive(Debug)]
pub enum SyncError {
    /// The underlying engine rejected an operation.
    Engine(EngineError),
    /// A highlight's residue range is inverted.
    InvalidHighlight {
        /// First residue of the range.
        start: i32,
        /// Last residue of the range (inclusive).
        end: i32,
    },
    /// A color string is not valid hex.
    ColorParse(String),
    /// TOML options parsing/serialization failure.
    OptionsParse(String),
    /// Replay scenario could not be decoded.
    Scenario(String),
    /// Generic I/O failure.
    Io(std::io::Error),
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Engine(e) => write!(f, "{e}"),
            Self::InvalidHighlight { start, end } => {
                write!(f, "invalid highlight range {start}..={end}")
            }
            Self::ColorParse(s) => write!(f, "invalid color: {s:?}"),
            Self::OptionsParse(msg) => {
                write!(f, "options parse error: {msg}")
            }
            Self::Scenario(msg) => write!(f, "scenario error: {msg}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Engine(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<EngineError> for SyncError {
    fn from(e: EngineError) -> Self {
        Self::Engine(e)
    }
}

impl From<std::io::Error> for SyncError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
