/// Ordered participant list.
///
/// Names are trimmed and blank entries dropped on the way in; insertion
/// order is preserved for display. Duplicate names are kept as-is: the
/// application does not enforce uniqueness, and the ledger's exact-match
/// exclusion makes every copy of a name ineligible once one of them wins.
#[derive(Debug, Clone, Default)]
pub struct RosterStore {
    names: Vec<String>,
}

impl RosterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole roster. Any remaining-pool view derived elsewhere
    /// must be recomputed by the caller.
    pub fn replace_all<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.names = names
            .into_iter()
            .map(|n| n.as_ref().trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();
        tracing::info!("Roster replaced: {} participants", self.names.len());
    }

    pub fn size(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn all(&self) -> &[String] {
        &self.names
    }

    /// Placeholder roster seeded when no roster file is present.
    pub fn demo_roster() -> Vec<String> {
        ["张三", "李四", "王五", "赵六", "孙七"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}
