use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use civic_types::{JurisdictionLevel, OfficeCategory};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSeed {
    pub code: String,
    pub name: String,
    pub group: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfficeSeed {
    pub name: String,
    pub category: OfficeCategory,
    pub level: JurisdictionLevel,
    pub description: String,
}

/// Credentials for the privileged operator account
#[derive(Clone, PartialEq)]
pub struct OperatorSeed {
    pub email: String,
    pub name: String,
    pub password: String,
}

impl std::fmt::Debug for OperatorSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperatorSeed")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl OperatorSeed {
    pub fn new(email: impl Into<String>, name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into().trim().to_string(),
            name: name.into(),
            password: password.into(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.email.is_empty() || !self.email.contains('@') {
            return Err(format!("'{}' is not a valid operator email", self.email));
        }
        if self.name.trim().is_empty() {
            return Err("Operator name cannot be empty".to_string());
        }
        if self.password.len() < 8 {
            return Err("Operator password must be at least 8 characters".to_string());
        }
        Ok(())
    }
}

/// Fixed reference tuples written by the loader
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceCatalog {
    #[serde(default)]
    pub regions: Vec<RegionSeed>,
    #[serde(default)]
    pub offices: Vec<OfficeSeed>,
}

impl ReferenceCatalog {
    /// US states and DC grouped by Census region, plus common elected offices
    pub fn standard() -> Self {
        let regions = STANDARD_REGIONS
            .iter()
            .map(|(code, name, group)| RegionSeed {
                code: code.to_string(),
                name: name.to_string(),
                group: group.to_string(),
            })
            .collect();

        let offices = STANDARD_OFFICES
            .iter()
            .map(|(name, category, level, description)| OfficeSeed {
                name: name.to_string(),
                category: *category,
                level: *level,
                description: description.to_string(),
            })
            .collect();

        Self { regions, offices }
    }

    /// Region codes that appear more than once; the last occurrence wins
    pub fn duplicate_region_codes(&self) -> Vec<String> {
        duplicates(self.regions.iter().map(|r| r.code.as_str()))
    }

    /// Office names that appear more than once; the last occurrence wins
    pub fn duplicate_office_names(&self) -> Vec<String> {
        duplicates(self.offices.iter().map(|o| o.name.as_str()))
    }

    /// Tuples with an empty natural key or display name
    pub fn blank_entries(&self) -> Vec<String> {
        let mut blanks = Vec::new();
        for (i, region) in self.regions.iter().enumerate() {
            if region.code.trim().is_empty() || region.name.trim().is_empty() {
                blanks.push(format!("region #{}", i + 1));
            }
        }
        for (i, office) in self.offices.iter().enumerate() {
            if office.name.trim().is_empty() {
                blanks.push(format!("office #{}", i + 1));
            }
        }
        blanks
    }
}

fn duplicates<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut repeated = Vec::new();
    for key in keys {
        if !seen.insert(key) && !repeated.iter().any(|r: &String| r.as_str() == key) {
            repeated.push(key.to_string());
        }
    }
    repeated
}

const STANDARD_REGIONS: &[(&str, &str, &str)] = &[
    ("CT", "Connecticut", "Northeast"),
    ("ME", "Maine", "Northeast"),
    ("MA", "Massachusetts", "Northeast"),
    ("NH", "New Hampshire", "Northeast"),
    ("RI", "Rhode Island", "Northeast"),
    ("VT", "Vermont", "Northeast"),
    ("NJ", "New Jersey", "Northeast"),
    ("NY", "New York", "Northeast"),
    ("PA", "Pennsylvania", "Northeast"),
    ("IL", "Illinois", "Midwest"),
    ("IN", "Indiana", "Midwest"),
    ("MI", "Michigan", "Midwest"),
    ("OH", "Ohio", "Midwest"),
    ("WI", "Wisconsin", "Midwest"),
    ("IA", "Iowa", "Midwest"),
    ("KS", "Kansas", "Midwest"),
    ("MN", "Minnesota", "Midwest"),
    ("MO", "Missouri", "Midwest"),
    ("NE", "Nebraska", "Midwest"),
    ("ND", "North Dakota", "Midwest"),
    ("SD", "South Dakota", "Midwest"),
    ("DE", "Delaware", "South"),
    ("DC", "District of Columbia", "South"),
    ("FL", "Florida", "South"),
    ("GA", "Georgia", "South"),
    ("MD", "Maryland", "South"),
    ("NC", "North Carolina", "South"),
    ("SC", "South Carolina", "South"),
    ("VA", "Virginia", "South"),
    ("WV", "West Virginia", "South"),
    ("AL", "Alabama", "South"),
    ("KY", "Kentucky", "South"),
    ("MS", "Mississippi", "South"),
    ("TN", "Tennessee", "South"),
    ("AR", "Arkansas", "South"),
    ("LA", "Louisiana", "South"),
    ("OK", "Oklahoma", "South"),
    ("TX", "Texas", "South"),
    ("AZ", "Arizona", "West"),
    ("CO", "Colorado", "West"),
    ("ID", "Idaho", "West"),
    ("MT", "Montana", "West"),
    ("NV", "Nevada", "West"),
    ("NM", "New Mexico", "West"),
    ("UT", "Utah", "West"),
    ("WY", "Wyoming", "West"),
    ("AK", "Alaska", "West"),
    ("CA", "California", "West"),
    ("HI", "Hawaii", "West"),
    ("OR", "Oregon", "West"),
    ("WA", "Washington", "West"),
];

const STANDARD_OFFICES: &[(&str, OfficeCategory, JurisdictionLevel, &str)] = &[
    (
        "President",
        OfficeCategory::Executive,
        JurisdictionLevel::Federal,
        "Head of state and head of the federal government",
    ),
    (
        "Vice President",
        OfficeCategory::Executive,
        JurisdictionLevel::Federal,
        "First in the presidential line of succession; presides over the Senate",
    ),
    (
        "Cabinet Secretary",
        OfficeCategory::Executive,
        JurisdictionLevel::Federal,
        "Head of a federal executive department",
    ),
    (
        "U.S. Senator",
        OfficeCategory::Legislative,
        JurisdictionLevel::Federal,
        "Member of the U.S. Senate; two per state, six-year terms",
    ),
    (
        "U.S. Representative",
        OfficeCategory::Legislative,
        JurisdictionLevel::Federal,
        "Member of the U.S. House of Representatives; two-year terms",
    ),
    (
        "Supreme Court Justice",
        OfficeCategory::Judicial,
        JurisdictionLevel::Federal,
        "Member of the Supreme Court of the United States",
    ),
    (
        "Governor",
        OfficeCategory::Executive,
        JurisdictionLevel::State,
        "Chief executive of a state",
    ),
    (
        "Lieutenant Governor",
        OfficeCategory::Executive,
        JurisdictionLevel::State,
        "Second-ranking state executive",
    ),
    (
        "Attorney General",
        OfficeCategory::Executive,
        JurisdictionLevel::State,
        "Chief legal officer of a state",
    ),
    (
        "Secretary of State",
        OfficeCategory::Executive,
        JurisdictionLevel::State,
        "State officer usually responsible for elections and public records",
    ),
    (
        "State Senator",
        OfficeCategory::Legislative,
        JurisdictionLevel::State,
        "Member of a state's upper legislative chamber",
    ),
    (
        "State Representative",
        OfficeCategory::Legislative,
        JurisdictionLevel::State,
        "Member of a state's lower legislative chamber",
    ),
    (
        "State Supreme Court Justice",
        OfficeCategory::Judicial,
        JurisdictionLevel::State,
        "Member of a state's court of last resort",
    ),
    (
        "Mayor",
        OfficeCategory::Executive,
        JurisdictionLevel::Local,
        "Chief executive of a city or town",
    ),
    (
        "City Council Member",
        OfficeCategory::Legislative,
        JurisdictionLevel::Local,
        "Member of a municipal legislative body",
    ),
    (
        "County Commissioner",
        OfficeCategory::Legislative,
        JurisdictionLevel::Local,
        "Member of a county governing board",
    ),
    (
        "Sheriff",
        OfficeCategory::Executive,
        JurisdictionLevel::Local,
        "Elected chief law enforcement officer of a county",
    ),
    (
        "District Attorney",
        OfficeCategory::Executive,
        JurisdictionLevel::Local,
        "Chief prosecutor for a county or judicial district",
    ),
    (
        "School Board Member",
        OfficeCategory::Legislative,
        JurisdictionLevel::Local,
        "Member of a local board of education",
    ),
];
