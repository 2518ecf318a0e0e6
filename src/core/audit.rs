//! Audit logger - append-only change trail
//!
//! New entries are prepended so reading the trail back is most-recent-first.
//! There is no query API beyond the whole sequence; display limiting is the
//! CLI's concern.

use crate::entities::AuditEntry;

/// The append-only audit trail
#[derive(Debug, Clone, Default)]
pub struct AuditTrail {
    entries: Vec<AuditEntry>,
}

impl AuditTrail {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate from persisted entries (already most-recent-first)
    pub fn from_entries(entries: Vec<AuditEntry>) -> Self {
        Self { entries }
    }

    /// Append a new entry; it becomes the first one read back
    pub fn record(&mut self, entry: AuditEntry) {
        self.entries.insert(0, entry);
    }

    /// The whole trail, most recent first
    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::identity::{EntityId, EntityPrefix};
    use crate::entities::AuditTarget;

    fn entry(message: &str) -> AuditEntry {
        AuditEntry::new(
            AuditTarget::Tree,
            EntityId::new(EntityPrefix::Evt),
            "test",
            message,
        )
    }

    #[test]
    fn test_new_entries_come_first() {
        let mut trail = AuditTrail::new();
        trail.record(entry("first"));
        trail.record(entry("second"));
        trail.record(entry("third"));

        let messages: Vec<&str> = trail.entries().iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, ["third", "second", "first"]);
    }

    #[test]
    fn test_rehydration_preserves_order() {
        let mut trail = AuditTrail::new();
        trail.record(entry("a"));
        trail.record(entry("b"));

        let restored = AuditTrail::from_entries(trail.entries().to_vec());
        assert_eq!(restored.entries(), trail.entries());
    }
}
