//! User-facing notices raised by the session
//!
//! Every caught failure becomes a transient notice. Persistent notices stay
//! until the user dismisses them.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: u64,
    pub severity: Severity,
    pub message: String,
    /// Requires an explicit dismiss instead of timing out
    pub persistent: bool,
}

#[derive(Debug, Default)]
pub struct NotificationCenter {
    next_id: u64,
    items: Vec<Notification>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, severity: Severity, message: impl Into<String>, persistent: bool) -> u64 {
        self.next_id += 1;
        self.items.push(Notification {
            id: self.next_id,
            severity,
            message: message.into(),
            persistent,
        });
        self.next_id
    }

    pub fn success(&mut self, message: impl Into<String>) -> u64 {
        self.push(Severity::Success, message, false)
    }

    pub fn warning(&mut self, message: impl Into<String>) -> u64 {
        self.push(Severity::Warning, message, false)
    }

    pub fn error(&mut self, message: impl Into<String>) -> u64 {
        self.push(Severity::Error, message, false)
    }

    pub fn pending(&self) -> &[Notification] {
        &self.items
    }

    /// Take transient notices; persistent ones stay until dismissed
    pub fn drain_transient(&mut self) -> Vec<Notification> {
        let (persistent, transient) = std::mem::take(&mut self.items)
            .into_iter()
            .partition(|n| n.persistent);
        self.items = persistent;
        transient
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.id != id);
        self.items.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_keeps_persistent() {
        let mut center = NotificationCenter::new();
        center.success("Saved");
        let sticky = center.push(Severity::Error, "Autosave disabled", true);

        let drained = center.drain_transient();
        assert_eq!(drained.len(), 1);
        assert_eq!(drained[0].message, "Saved");
        assert_eq!(center.pending().len(), 1);

        assert!(center.dismiss(sticky));
        assert!(center.pending().is_empty());
        assert!(!center.dismiss(sticky));
    }
}
