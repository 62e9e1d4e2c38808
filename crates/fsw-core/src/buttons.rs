//! Install-button markup contract and edit planning
//!
//! The selectors below are the coupling points to the marketplace's markup.
//! They are not ours: if the page ships different class names, every query
//! comes back empty and the extension degrades to a permanent no-op.
//!
//! Planning is pure. The DOM driver snapshots what a button currently shows,
//! asks [`plan_button`] what to change, and applies exactly that. A snapshot
//! that already matches the expected state plans to a no-op, which is what
//! keeps the observe/mutate cycle from feeding itself.

#[cfg(not(feature = "std"))]
use alloc::{format, string::String};

use crate::fork::{Fork, VSCODE_HREF_PREFIX};

// =============================================================================
// Marketplace DOM contract
// =============================================================================

/// Class of the element wrapping each install button.
pub const CONTAINER_CLASS: &str = "ux-oneclick-install-button-container";

/// Selector for install-button containers.
pub const CONTAINER_SELECTOR: &str = ".ux-oneclick-install-button-container";

/// Selector for the install anchor inside a container.
pub const LINK_SELECTOR: &str = "a[href*=\":extension/\"]";

/// Class of the label element inside the anchor, when present.
pub const LABEL_CLASS: &str = "ms-Button-label";

/// Selector for the label element. Falls back to the anchor itself when the
/// marketplace renders the text inline.
pub const LABEL_SELECTOR: &str = ".ms-Button-label";

/// Selector matching an install anchor only when it sits inside a
/// container, for classifying mutation targets anywhere in the document.
pub const LINK_IN_CONTAINER_SELECTOR: &str =
    ".ux-oneclick-install-button-container a[href*=\":extension/\"]";

/// Selector matching a label only inside an install anchor.
pub const LABEL_IN_BUTTON_SELECTOR: &str =
    ".ux-oneclick-install-button-container a[href*=\":extension/\"] .ms-Button-label";

/// Attribute recording that a link has been reconciled.
pub const MARKER_ATTR: &str = "data-modified-by-script";

/// Value written to [`MARKER_ATTR`].
pub const MARKER_VALUE: &str = "true";

/// Visual marker style asserted on every reconciled anchor.
pub const MARKER_BORDER: &str = "2px solid #4CAF50";
pub const MARKER_PADDING: &str = "2px 5px";

// =============================================================================
// Snapshots and edits
// =============================================================================

/// What an install button currently shows, captured by the DOM driver
/// immediately before planning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonSnapshot {
    /// Raw `href` attribute of the anchor.
    pub href: String,
    /// Visible label text (untrimmed).
    pub label: String,
    /// Whether the reconciled marker attribute is present.
    pub marked: bool,
}

/// The writes a button needs to match the expected state. Style assertion is
/// not planned here; the driver re-checks it on every pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ButtonEdits {
    /// Replacement href, when the current one carries the stock prefix.
    pub href: Option<String>,
    /// Replacement label text, when the current one diverges.
    pub label: Option<&'static str>,
    /// Whether the marker attribute must be written.
    pub mark: bool,
}

impl ButtonEdits {
    /// True when applying this plan would write nothing.
    pub fn is_noop(&self) -> bool {
        self.href.is_none() && self.label.is_none() && !self.mark
    }

    /// Number of individual writes this plan performs.
    pub fn write_count(&self) -> usize {
        usize::from(self.href.is_some())
            + usize::from(self.label.is_some())
            + usize::from(self.mark)
    }
}

/// Rewrite a stock install href to the fork's scheme, preserving the
/// extension identifier suffix. Returns `None` for hrefs that do not carry
/// the stock prefix — including ones already rewritten.
#[inline]
pub fn rewrite_href(href: &str, fork: Fork) -> Option<String> {
    let suffix = href.strip_prefix(VSCODE_HREF_PREFIX)?;
    Some(format!("{}{}", fork.href_prefix(), suffix))
}

/// Plan the writes for one button.
///
/// Label comparison trims the snapshot text first; the marketplace pads the
/// button text with whitespace in some layouts.
pub fn plan_button(snapshot: &ButtonSnapshot, fork: Fork) -> ButtonEdits {
    let href = rewrite_href(&snapshot.href, fork);
    let expected = fork.install_label();
    let label = (snapshot.label.trim() != expected).then_some(expected);

    let edits = ButtonEdits {
        href,
        label,
        mark: !snapshot.marked,
    };
    if !edits.is_noop() {
        log::debug!(
            "button plan: href={} label={} mark={}",
            edits.href.is_some(),
            edits.label.is_some(),
            edits.mark
        );
    }
    edits
}

// =============================================================================
// Pass outcome
// =============================================================================

/// Result of one full reconcile pass over the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    /// No containers in the document yet; nothing was touched.
    NoContainers,
    /// Stored preference is outside the supported set; nothing was touched.
    InvalidPreference,
    /// Containers were evaluated, whether or not any needed writes.
    Reconciled {
        /// Containers found in the document.
        containers: usize,
        /// Buttons that needed at least one write.
        edited: usize,
    },
}

impl PassOutcome {
    /// The not-yet-ready signal: false only while the page has not rendered
    /// any install button. This is what the startup poll keys off.
    pub fn containers_found(&self) -> bool {
        !matches!(self, PassOutcome::NoContainers)
    }
}
