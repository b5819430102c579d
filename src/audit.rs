/// Append-only ordered record of every decision and action taken while
/// running a task. Attached to the `ApplicationTask` as its permanent
/// record; entries are also mirrored to the diagnostic log.
#[derive(Debug, Default)]
pub struct AuditLog {
    entries: Vec<String>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one entry. Entries are short human-readable strings; they are
    /// written before the corresponding UI mutation so the log reflects
    /// intent even if the action itself fails.
    pub fn push(&mut self, entry: impl Into<String>) {
        let entry = entry.into();
        log::info!("audit: {}", entry);
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Consume the log for attachment to the task record.
    pub fn into_entries(self) -> Vec<String> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_preserve_order() {
        let mut audit = AuditLog::new();
        audit.push("opened job page");
        audit.push("step 1: 2 questions found");
        audit.push("clicked Continue");

        assert_eq!(audit.len(), 3);
        assert_eq!(audit.entries()[0], "opened job page");
        assert_eq!(audit.entries()[2], "clicked Continue");

        let entries = audit.into_entries();
        assert_eq!(entries.len(), 3);
    }

    #[test]
    fn test_empty() {
        let audit = AuditLog::new();
        assert!(audit.is_empty());
        assert_eq!(audit.len(), 0);
    }
}
