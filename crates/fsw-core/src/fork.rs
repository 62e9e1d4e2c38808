//! Install targets
//!
//! The marketplace's install buttons launch the stock `vscode:` URI handler.
//! Each fork here registers its own scheme of the same shape, so retargeting
//! a button is a prefix swap plus a label rewrite. The set is closed: a
//! stored preference outside it means version skew or a hand-edited storage
//! area, and the reconciler treats it as "do nothing" rather than guessing.

#[cfg(not(feature = "std"))]
use alloc::string::{String, ToString};

use core::fmt;
use core::str::FromStr;

/// The href prefix the marketplace renders and we rewrite away.
pub const VSCODE_HREF_PREFIX: &str = "vscode:extension/";

/// Substring shared by every install href, stock or retargeted.
pub const EXTENSION_MARKER: &str = ":extension/";

// =============================================================================
// Fork
// =============================================================================

/// A VS Code fork an install button can be retargeted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fork {
    Codium,
    CodeOss,
    Theia,
    Trae,
    Windsurf,
    Cursor,
    Positron,
    Marscode,
}

impl Fork {
    /// Every supported fork, in popup display order.
    pub const ALL: [Fork; 8] = [
        Fork::Codium,
        Fork::CodeOss,
        Fork::Theia,
        Fork::Trae,
        Fork::Windsurf,
        Fork::Cursor,
        Fork::Positron,
        Fork::Marscode,
    ];

    /// Seeded into storage on install; also the read default.
    pub const DEFAULT: Fork = Fork::Codium;

    /// The stored identifier, which doubles as the URI scheme.
    pub fn id(&self) -> &'static str {
        match self {
            Fork::Codium => "codium",
            Fork::CodeOss => "code-oss",
            Fork::Theia => "theia",
            Fork::Trae => "trae",
            Fork::Windsurf => "windsurf",
            Fork::Cursor => "cursor",
            Fork::Positron => "positron",
            Fork::Marscode => "marscode",
        }
    }

    /// Identifier with only the first character uppercased.
    pub fn display_name(&self) -> &'static str {
        match self {
            Fork::Codium => "Codium",
            Fork::CodeOss => "Code-oss",
            Fork::Theia => "Theia",
            Fork::Trae => "Trae",
            Fork::Windsurf => "Windsurf",
            Fork::Cursor => "Cursor",
            Fork::Positron => "Positron",
            Fork::Marscode => "Marscode",
        }
    }

    /// Expected visible text of a retargeted install button.
    pub fn install_label(&self) -> &'static str {
        match self {
            Fork::Codium => "Install on Codium",
            Fork::CodeOss => "Install on Code-oss",
            Fork::Theia => "Install on Theia",
            Fork::Trae => "Install on Trae",
            Fork::Windsurf => "Install on Windsurf",
            Fork::Cursor => "Install on Cursor",
            Fork::Positron => "Install on Positron",
            Fork::Marscode => "Install on Marscode",
        }
    }

    /// Expected href prefix of a retargeted install button.
    pub fn href_prefix(&self) -> &'static str {
        match self {
            Fork::Codium => "codium:extension/",
            Fork::CodeOss => "code-oss:extension/",
            Fork::Theia => "theia:extension/",
            Fork::Trae => "trae:extension/",
            Fork::Windsurf => "windsurf:extension/",
            Fork::Cursor => "cursor:extension/",
            Fork::Positron => "positron:extension/",
            Fork::Marscode => "marscode:extension/",
        }
    }

    /// Look up a fork by its stored identifier.
    pub fn from_id(id: &str) -> Option<Fork> {
        Fork::ALL.iter().copied().find(|fork| fork.id() == id)
    }
}

impl Default for Fork {
    fn default() -> Self {
        Fork::DEFAULT
    }
}

impl fmt::Display for Fork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Error for identifiers outside the supported set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown fork identifier: {0:?}")]
pub struct UnknownFork(pub String);

impl FromStr for Fork {
    type Err = UnknownFork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Fork::from_id(s).ok_or_else(|| UnknownFork(s.to_string()))
    }
}
