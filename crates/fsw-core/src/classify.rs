//! Mutation-batch relevance classification
//!
//! The host framework re-renders constantly; most of what the observer
//! reports has nothing to do with install buttons. The watchdog summarizes
//! each native mutation record into a [`ChangeRecord`] (the only step that
//! needs a document) and asks this module whether the batch warrants a
//! reconcile pass. Anything that cannot be summarized is dropped by the
//! bridge, so an unexpected mutation shape degrades to "skip", never to an
//! error inside the observer callback.

use bitflags::bitflags;

// =============================================================================
// Watched attributes
// =============================================================================

/// Attribute names the observer subscribes to, in filter order.
pub const OBSERVED_ATTRIBUTES: [&str; 4] =
    ["href", "style", "class", crate::buttons::MARKER_ATTR];

/// An attribute the observer is filtered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchedAttr {
    Href,
    Style,
    Class,
    /// The reconciled marker; only its removal is interesting.
    Marker,
}

impl WatchedAttr {
    /// Map an observed attribute name. `None` for names outside the filter,
    /// which can only appear if the subscription options drift.
    pub fn from_name(name: &str) -> Option<WatchedAttr> {
        match name {
            "href" => Some(WatchedAttr::Href),
            "style" => Some(WatchedAttr::Style),
            "class" => Some(WatchedAttr::Class),
            crate::buttons::MARKER_ATTR => Some(WatchedAttr::Marker),
            _ => None,
        }
    }
}

// =============================================================================
// Change records
// =============================================================================

/// How the bridge classified the element a mutation targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeInterest {
    /// The install anchor itself.
    Link,
    /// An install-button container.
    Container,
    /// Anything else.
    Other,
}

/// A native mutation record reduced to what classification needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeRecord {
    /// Child-list change; `touches_button` is true when any added or removed
    /// node is, contains, or sits inside button markup.
    NodesChanged { touches_button: bool },
    /// Watched-attribute change on some element.
    AttributeChanged {
        target: NodeInterest,
        attr: WatchedAttr,
        /// Whether the marker attribute is present on the target after the
        /// change. Only consulted for [`WatchedAttr::Marker`].
        marker_present: bool,
    },
    /// Character-data change; `in_label` is true when the text node lives
    /// under an install button's label.
    TextChanged { in_label: bool },
}

bitflags! {
    /// What a batch of changes touched, for logging and the CLI harness.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BatchImpact: u8 {
        /// Button markup appeared or disappeared.
        const NODES = 1 << 0;
        /// An install href changed.
        const HREF = 1 << 1;
        /// Inline style changed on button markup.
        const STYLE = 1 << 2;
        /// Class changed on button markup.
        const CLASS = 1 << 3;
        /// The reconciled marker was removed.
        const MARKER_REMOVED = 1 << 4;
        /// Label text changed.
        const TEXT = 1 << 5;
    }
}

// =============================================================================
// Classification
// =============================================================================

/// Fold a batch into its impact set.
pub fn batch_impact(records: &[ChangeRecord]) -> BatchImpact {
    let mut impact = BatchImpact::empty();
    for record in records {
        impact |= record_impact(record);
    }
    impact
}

/// True when the batch plausibly touched an install button and a reconcile
/// pass should be scheduled.
pub fn batch_is_relevant(records: &[ChangeRecord]) -> bool {
    let impact = batch_impact(records);
    if !impact.is_empty() {
        log::trace!("relevant mutation batch: {impact:?}");
    }
    !impact.is_empty()
}

fn record_impact(record: &ChangeRecord) -> BatchImpact {
    match record {
        ChangeRecord::NodesChanged { touches_button: true } => BatchImpact::NODES,
        ChangeRecord::NodesChanged { touches_button: false } => BatchImpact::empty(),
        ChangeRecord::AttributeChanged {
            target: NodeInterest::Other,
            ..
        } => BatchImpact::empty(),
        ChangeRecord::AttributeChanged { attr, marker_present, .. } => match attr {
            WatchedAttr::Href => BatchImpact::HREF,
            WatchedAttr::Style => BatchImpact::STYLE,
            WatchedAttr::Class => BatchImpact::CLASS,
            // Re-setting the marker is our own write; only removal matters.
            WatchedAttr::Marker if !marker_present => BatchImpact::MARKER_REMOVED,
            WatchedAttr::Marker => BatchImpact::empty(),
        },
        ChangeRecord::TextChanged { in_label: true } => BatchImpact::TEXT,
        ChangeRecord::TextChanged { in_label: false } => BatchImpact::empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_batch_irrelevant() {
        assert!(!batch_is_relevant(&[]));
        assert_eq!(batch_impact(&[]), BatchImpact::empty());
    }

    #[test]
    fn test_node_changes() {
        assert!(batch_is_relevant(&[ChangeRecord::NodesChanged {
            touches_button: true
        }]));
        assert!(!batch_is_relevant(&[ChangeRecord::NodesChanged {
            touches_button: false
        }]));
    }

    #[test]
    fn test_href_change_on_link() {
        let batch = [ChangeRecord::AttributeChanged {
            target: NodeInterest::Link,
            attr: WatchedAttr::Href,
            marker_present: true,
        }];
        assert_eq!(batch_impact(&batch), BatchImpact::HREF);
    }

    #[test]
    fn test_style_change_on_container() {
        let batch = [ChangeRecord::AttributeChanged {
            target: NodeInterest::Container,
            attr: WatchedAttr::Style,
            marker_present: false,
        }];
        assert_eq!(batch_impact(&batch), BatchImpact::STYLE);
    }

    #[test]
    fn test_attr_change_elsewhere_irrelevant() {
        let batch = [ChangeRecord::AttributeChanged {
            target: NodeInterest::Other,
            attr: WatchedAttr::Href,
            marker_present: false,
        }];
        assert!(!batch_is_relevant(&batch));
    }

    #[test]
    fn test_marker_removal_relevant_presence_not() {
        let removed = ChangeRecord::AttributeChanged {
            target: NodeInterest::Link,
            attr: WatchedAttr::Marker,
            marker_present: false,
        };
        let reasserted = ChangeRecord::AttributeChanged {
            target: NodeInterest::Link,
            attr: WatchedAttr::Marker,
            marker_present: true,
        };
        assert_eq!(batch_impact(&[removed]), BatchImpact::MARKER_REMOVED);
        assert!(!batch_is_relevant(&[reasserted]));
    }

    #[test]
    fn test_label_text_change() {
        assert!(batch_is_relevant(&[ChangeRecord::TextChanged { in_label: true }]));
        assert!(!batch_is_relevant(&[ChangeRecord::TextChanged {
            in_label: false
        }]));
    }

    #[test]
    fn test_mixed_batch_accumulates() {
        let batch = [
            ChangeRecord::NodesChanged {
                touches_button: false,
            },
            ChangeRecord::TextChanged { in_label: true },
            ChangeRecord::AttributeChanged {
                target: NodeInterest::Link,
                attr: WatchedAttr::Href,
                marker_present: true,
            },
        ];
        assert_eq!(batch_impact(&batch), BatchImpact::TEXT | BatchImpact::HREF);
    }

    #[test]
    fn test_from_name_covers_observed_attributes() {
        for name in OBSERVED_ATTRIBUTES {
            assert!(WatchedAttr::from_name(name).is_some(), "unmapped: {name}");
        }
        assert_eq!(WatchedAttr::from_name("id"), None);
        assert_eq!(
            WatchedAttr::from_name(crate::buttons::MARKER_ATTR),
            Some(WatchedAttr::Marker)
        );
    }
}
