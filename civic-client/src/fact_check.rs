use civic_types::{FactCheck, Verdict};

/// Local filter over a fetched fact-check list.
///
/// The query is a case-insensitive substring match against the claim,
/// claimant and summary; the verdict must match exactly. Unset criteria
/// match everything, and input order is kept.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FactCheckFilter {
    pub query: Option<String>,
    pub verdict: Option<Verdict>,
}

impl FactCheckFilter {
    pub fn new(query: Option<String>, verdict: Option<Verdict>) -> Self {
        let query = query
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty());
        Self { query, verdict }
    }

    pub fn is_active(&self) -> bool {
        self.query.is_some() || self.verdict.is_some()
    }

    pub fn matches(&self, item: &FactCheck) -> bool {
        if let Some(verdict) = self.verdict {
            if item.verdict != verdict {
                return false;
            }
        }
        match &self.query {
            None => true,
            Some(query) => {
                let needle = query.to_lowercase();
                item.claim.to_lowercase().contains(&needle)
                    || item.summary.to_lowercase().contains(&needle)
                    || item
                        .claimant
                        .as_deref()
                        .is_some_and(|c| c.to_lowercase().contains(&needle))
            }
        }
    }

    pub fn apply<'a>(&self, items: &'a [FactCheck]) -> Vec<&'a FactCheck> {
        items.iter().filter(|item| self.matches(item)).collect()
    }
}
