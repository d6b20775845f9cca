use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteDirection::Up => "up",
            VoteDirection::Down => "down",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "up" => Some(VoteDirection::Up),
            "down" => Some(VoteDirection::Down),
            _ => None,
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            VoteDirection::Up => VoteDirection::Down,
            VoteDirection::Down => VoteDirection::Up,
        }
    }
}

/// How a vote request altered the stored vote, as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteTransition {
    Added,
    Removed,
    Changed,
}

impl VoteTransition {
    /// Toggle rule applied by the voting endpoint: a first vote is added,
    /// repeating the same direction removes it, the other direction changes it.
    pub fn between(previous: Option<VoteDirection>, requested: VoteDirection) -> Self {
        match previous {
            None => VoteTransition::Added,
            Some(prev) if prev == requested => VoteTransition::Removed,
            Some(_) => VoteTransition::Changed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VoteTransition::Added => "added",
            VoteTransition::Removed => "removed",
            VoteTransition::Changed => "changed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "added" => Some(VoteTransition::Added),
            "removed" => Some(VoteTransition::Removed),
            "changed" => Some(VoteTransition::Changed),
            _ => None,
        }
    }
}

/// Kind of content item a vote targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Politician,
    Post,
    Poll,
    FactCheck,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Politician => "politician",
            ContentKind::Post => "post",
            ContentKind::Poll => "poll",
            ContentKind::FactCheck => "fact_check",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "politician" => Some(ContentKind::Politician),
            "post" => Some(ContentKind::Post),
            "poll" => Some(ContentKind::Poll),
            "fact_check" => Some(ContentKind::FactCheck),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OfficeCategory {
    Executive,
    Legislative,
    Judicial,
}

impl OfficeCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfficeCategory::Executive => "executive",
            OfficeCategory::Legislative => "legislative",
            OfficeCategory::Judicial => "judicial",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "executive" => Some(OfficeCategory::Executive),
            "legislative" => Some(OfficeCategory::Legislative),
            "judicial" => Some(OfficeCategory::Judicial),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JurisdictionLevel {
    Federal,
    State,
    Local,
}

impl JurisdictionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            JurisdictionLevel::Federal => "federal",
            JurisdictionLevel::State => "state",
            JurisdictionLevel::Local => "local",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "federal" => Some(JurisdictionLevel::Federal),
            "state" => Some(JurisdictionLevel::State),
            "local" => Some(JurisdictionLevel::Local),
            _ => None,
        }
    }
}

/// Fact-check verdict returned by the analysis service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    True,
    MostlyTrue,
    Mixed,
    MostlyFalse,
    False,
    Unverifiable,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::True => "true",
            Verdict::MostlyTrue => "mostly_true",
            Verdict::Mixed => "mixed",
            Verdict::MostlyFalse => "mostly_false",
            Verdict::False => "false",
            Verdict::Unverifiable => "unverifiable",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Verdict::True => "True",
            Verdict::MostlyTrue => "Mostly True",
            Verdict::Mixed => "Mixed",
            Verdict::MostlyFalse => "Mostly False",
            Verdict::False => "False",
            Verdict::Unverifiable => "Unverifiable",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace([' ', '-'], "_").as_str() {
            "true" => Some(Verdict::True),
            "mostly_true" => Some(Verdict::MostlyTrue),
            "mixed" => Some(Verdict::Mixed),
            "mostly_false" => Some(Verdict::MostlyFalse),
            "false" => Some(Verdict::False),
            "unverifiable" => Some(Verdict::Unverifiable),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_between() {
        use VoteDirection::*;
        assert_eq!(VoteTransition::between(None, Up), VoteTransition::Added);
        assert_eq!(VoteTransition::between(Some(Up), Up), VoteTransition::Removed);
        assert_eq!(VoteTransition::between(Some(Down), Down), VoteTransition::Removed);
        assert_eq!(VoteTransition::between(Some(Up), Down), VoteTransition::Changed);
        assert_eq!(VoteTransition::between(Some(Down), Up), VoteTransition::Changed);
    }

    #[test]
    fn test_transition_wire_format() {
        let json = serde_json::to_string(&VoteTransition::Changed).unwrap();
        assert_eq!(json, "\"changed\"");
        let parsed: VoteTransition = serde_json::from_str("\"removed\"").unwrap();
        assert_eq!(parsed, VoteTransition::Removed);
    }

    #[test]
    fn test_content_kind_parse_accepts_dashes() {
        assert_eq!(ContentKind::parse("fact-check"), Some(ContentKind::FactCheck));
        assert_eq!(ContentKind::parse("Politician"), Some(ContentKind::Politician));
        assert_eq!(ContentKind::parse("ranking"), None);
    }

    #[test]
    fn test_verdict_parse_labels() {
        assert_eq!(Verdict::parse("Mostly False"), Some(Verdict::MostlyFalse));
        assert_eq!(Verdict::parse("mostly-true"), Some(Verdict::MostlyTrue));
        assert_eq!(Verdict::parse("pants on fire"), None);
        for verdict in [Verdict::True, Verdict::Mixed, Verdict::Unverifiable] {
            assert_eq!(Verdict::parse(verdict.as_str()), Some(verdict));
        }
    }
}
