//! Observability events for the select pipeline
//!
//! Events are explicit and typed; each maps to one stable name used as
//! the `event` field of the log line.

use std::fmt;

/// Observable events of one select call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Select call begins
    SelectStart,
    /// No usable search term; resolved empty without a store query
    SelectShortCircuit,
    /// Terms with unregistered operators were dropped
    TermsDropped,
    /// Primary query returned
    PrimaryQueryComplete,
    /// Descendant query returned
    DescendantQueryComplete,
    /// Descendants linked into the forest
    TreeMerged,
    /// Fetched descendants whose parent is outside the result set
    DescendantsOrphaned,
    /// Select call finished successfully
    SelectComplete,
    /// Select call failed
    SelectFailed,
}

impl Event {
    /// Returns the event name
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::SelectStart => "SELECT_START",
            Event::SelectShortCircuit => "SELECT_SHORT_CIRCUIT",
            Event::TermsDropped => "TERMS_DROPPED",
            Event::PrimaryQueryComplete => "PRIMARY_QUERY_COMPLETE",
            Event::DescendantQueryComplete => "DESCENDANT_QUERY_COMPLETE",
            Event::TreeMerged => "TREE_MERGED",
            Event::DescendantsOrphaned => "DESCENDANTS_ORPHANED",
            Event::SelectComplete => "SELECT_COMPLETE",
            Event::SelectFailed => "SELECT_FAILED",
        }
    }

    /// Returns true if this event reports a failure
    pub fn is_failure(&self) -> bool {
        matches!(self, Event::SelectFailed)
    }

    /// Returns true if this event reports something the caller may have
    /// gotten wrong
    pub fn is_warning(&self) -> bool {
        matches!(self, Event::TermsDropped | Event::DescendantsOrphaned)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_unique() {
        let events = [
            Event::SelectStart,
            Event::SelectShortCircuit,
            Event::TermsDropped,
            Event::PrimaryQueryComplete,
            Event::DescendantQueryComplete,
            Event::TreeMerged,
            Event::DescendantsOrphaned,
            Event::SelectComplete,
            Event::SelectFailed,
        ];

        let mut names: Vec<_> = events.iter().map(Event::as_str).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), events.len());
    }

    #[test]
    fn test_failure_classification() {
        assert!(Event::SelectFailed.is_failure());
        assert!(!Event::SelectComplete.is_failure());
        assert!(Event::TermsDropped.is_warning());
    }
}
