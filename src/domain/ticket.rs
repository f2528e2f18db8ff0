use crate::domain::board::{BoardConfig, FieldRule};
use crate::domain::issue::RawIssue;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt, str::FromStr};

/// Tracker issue key (e.g., FLT-1, CORE-204)
///
/// The key is kept exactly as the tracker reported it, minus surrounding
/// whitespace. Keys shaped like `PROJECT-123` order by project, then
/// numerically; any other key sorts after them by its text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TicketKey(String);

impl TicketKey {
    /// Returns the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the project prefix of a `PROJECT-123` key
    pub fn project(&self) -> Option<&str> {
        self.split().map(|(project, _)| project)
    }

    /// Returns the numeric part of a `PROJECT-123` key
    pub fn number(&self) -> Option<u32> {
        self.split().map(|(_, number)| number)
    }

    fn split(&self) -> Option<(&str, u32)> {
        let (project, number) = self.0.rsplit_once('-')?;

        let project_ok = project
            .chars()
            .next()
            .map_or(false, |c| c.is_ascii_alphabetic())
            && project
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !project_ok || number.is_empty() || !number.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        number.parse().ok().map(|n| (project, n))
    }
}

impl FromStr for TicketKey {
    type Err = crate::error::FlightboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        if key.is_empty() || key.chars().any(char::is_whitespace) {
            return Err(crate::error::FlightboardError::InvalidTicketKey(s.to_string()));
        }
        Ok(Self(key.to_string()))
    }
}

impl TryFrom<String> for TicketKey {
    type Error = crate::error::FlightboardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TicketKey> for String {
    fn from(key: TicketKey) -> Self {
        key.0
    }
}

impl Ord for TicketKey {
    fn cmp(&self, other: &Self) -> Ordering {
        let by_parts = match (self.split(), other.split()) {
            (Some((a_project, a_number)), Some((b_project, b_number))) => a_project
                .bytes()
                .map(|b| b.to_ascii_uppercase())
                .cmp(b_project.bytes().map(|b| b.to_ascii_uppercase()))
                .then(a_number.cmp(&b_number)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        // Equal parts (FLT-7 vs FLT-007) fall back to the text to stay consistent with Eq
        by_parts.then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for TicketKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TicketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A classified issue, ready for display on the board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub key: TicketKey,
    pub summary: String,
    /// Field the issue was classified into
    pub field: String,
    /// Lane the ticket is displayed in; differs from `field` for delayed tickets
    pub lane: String,
    pub status: String,
    pub resolution: Option<String>,
    pub team: Option<String>,
    pub team_name: Option<String>,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_in_days: Option<i64>,
    #[serde(default)]
    pub due_soon: bool,
    #[serde(default)]
    pub delayed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
    pub included: bool,
}

impl Ticket {
    /// Creates a bare ticket in the given field
    pub fn new(key: TicketKey, field: impl Into<String>) -> Self {
        let field = field.into();
        Self {
            key,
            summary: String::new(),
            lane: field.clone(),
            label: field.clone(),
            field,
            status: String::new(),
            resolution: None,
            team: None,
            team_name: None,
            color: None,
            priority: None,
            labels: Vec::new(),
            due_date: None,
            due_in_days: None,
            due_soon: false,
            delayed: false,
            updated: None,
            included: true,
        }
    }

    /// Projects a raw tracker issue onto the field it was classified into
    pub fn from_raw(key: TicketKey, raw: &RawIssue, field: &str) -> Self {
        let mut ticket = Self::new(key, field);
        ticket.summary = raw.summary.trim().to_string();
        ticket.status = raw.status.trim().to_string();
        ticket.resolution = raw.resolution().map(str::to_string);
        ticket.team = raw.team.clone().filter(|t| !t.trim().is_empty());
        ticket.priority = raw.priority.clone();
        ticket.labels = raw.labels.clone();
        ticket.due_date = raw.due_date;
        ticket.updated = raw.updated;
        ticket
    }

    /// Display name of the team, falling back to the raw team identifier
    pub fn team_label(&self) -> Option<&str> {
        self.team_name.as_deref().or(self.team.as_deref())
    }

    /// Applies the field's display rules.
    ///
    /// Sets label, color, team display name and due-date proximity. A ticket
    /// that is past due and still unresolved is flagged delayed, and moves to
    /// the delayed lane when the board declares one.
    pub fn format(&mut self, rule: &FieldRule, config: &BoardConfig, today: NaiveDate) {
        self.label = rule.label.clone().unwrap_or_else(|| self.field.clone());
        self.color = rule.color.clone();
        self.team_name = self
            .team
            .as_ref()
            .and_then(|team| config.teams.get(team))
            .cloned();

        self.due_in_days = self.due_date.map(|due| (due - today).num_days());
        self.due_soon = match (self.due_in_days, rule.due_soon_days) {
            (Some(days), Some(window)) => (0..=window).contains(&days),
            _ => false,
        };
        self.delayed = self.resolution.is_none() && self.due_in_days.map_or(false, |d| d < 0);

        self.lane = if self.delayed && config.has_delayed_lane() {
            config.epics.delayed.clone()
        } else {
            self.field.clone()
        };
    }

    /// Whether the field's inclusion rules admit this ticket onto the board
    pub fn should_be_included(&self, rule: &FieldRule, today: NaiveDate) -> bool {
        if rule.hidden {
            return false;
        }

        if let Some(resolved) = rule.resolved {
            if self.resolution.is_some() != resolved {
                return false;
            }
        }

        if let (Some(max_age), Some(updated)) = (rule.max_age_days, self.updated) {
            // A cutoff outside the calendar's range excludes nothing
            let cutoff = Duration::try_days(max_age).and_then(|age| today.checked_sub_signed(age));
            if cutoff.map_or(false, |cutoff| updated.date_naive() < cutoff) {
                return false;
            }
        }

        if let Some(teams) = &rule.teams {
            match &self.team {
                Some(team) if teams.iter().any(|t| t == team) => {}
                _ => return false,
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 15).unwrap()
    }

    fn config() -> BoardConfig {
        BoardConfig::from_json_str(
            r#"{
                "teams": { "core": "Core Platform" },
                "epics": {
                    "project": "FLT",
                    "fields": {
                        "todo": { "states": "Open", "label": "To do", "color": "blue", "due_soon_days": 7 },
                        "delayed": { "label": "Delayed" }
                    }
                }
            }"#,
        )
        .unwrap()
    }

    fn key(s: &str) -> TicketKey {
        s.parse().unwrap()
    }

    #[test]
    fn test_ticket_key_parsing() {
        assert_eq!(key("FLT-1").as_str(), "FLT-1");
        assert_eq!(key(" FLT-1 ").as_str(), "FLT-1");
        assert_eq!(key("CORE_2-7").project(), Some("CORE_2"));
        assert_eq!(key("CORE_2-7").number(), Some(7));

        assert!(TicketKey::from_str("").is_err());
        assert!(TicketKey::from_str("   ").is_err());
        assert!(TicketKey::from_str("FLT 12").is_err());
    }

    #[test]
    fn test_ticket_key_keeps_tracker_spelling() {
        assert_eq!(key("flt-42").as_str(), "flt-42");
        assert_eq!(key("FLT-007").as_str(), "FLT-007");
        assert_eq!(key("FLT-007").number(), Some(7));
        assert_ne!(key("FLT-007"), key("FLT-7"));

        let odd = key("legacy:42");
        assert_eq!(odd.as_str(), "legacy:42");
        assert_eq!(odd.project(), None);
        assert_eq!(odd.number(), None);
    }

    #[test]
    fn test_ticket_key_orders_numerically() {
        assert!(key("FLT-2") < key("FLT-10"));
        assert!(key("ABC-99") < key("FLT-1"));
        assert!(key("flt-3") < key("FLT-4"));
        assert!(key("FLT-7") < key("FLT-007") || key("FLT-007") < key("FLT-7"));
        assert!(key("ZZZ-999") < key("legacy:1"));
        assert!(key("legacy:1") < key("legacy:2"));
    }

    #[test]
    fn test_ticket_key_rejects_invalid_json() {
        assert!(serde_json::from_str::<TicketKey>(r#""FLT-3""#).is_ok());
        assert!(serde_json::from_str::<TicketKey>(r#""not a key""#).is_err());
        assert!(serde_json::from_str::<TicketKey>(r#""""#).is_err());
    }

    #[test]
    fn test_format_applies_field_rule() {
        let config = config();
        let rule = config.field("todo").unwrap();

        let raw = RawIssue::new("FLT-1", "Open")
            .with_team("core")
            .with_due_date(today() + Duration::days(3));
        let mut ticket = Ticket::from_raw(key("FLT-1"), &raw, "todo");
        ticket.format(rule, &config, today());

        assert_eq!(ticket.label, "To do");
        assert_eq!(ticket.color.as_deref(), Some("blue"));
        assert_eq!(ticket.team_name.as_deref(), Some("Core Platform"));
        assert_eq!(ticket.due_in_days, Some(3));
        assert!(ticket.due_soon);
        assert!(!ticket.delayed);
        assert_eq!(ticket.lane, "todo");
    }

    #[test]
    fn test_format_label_defaults_to_field_name() {
        let config = config();
        let rule = FieldRule::default();

        let mut ticket = Ticket::new(key("FLT-1"), "review");
        ticket.format(&rule, &config, today());

        assert_eq!(ticket.label, "review");
        assert!(ticket.color.is_none());
        assert!(ticket.team_name.is_none());
    }

    #[test]
    fn test_format_moves_overdue_unresolved_ticket_to_delayed_lane() {
        let config = config();
        let rule = config.field("todo").unwrap();

        let raw = RawIssue::new("FLT-1", "Open").with_due_date(today() - Duration::days(2));
        let mut ticket = Ticket::from_raw(key("FLT-1"), &raw, "todo");
        ticket.format(rule, &config, today());

        assert!(ticket.delayed);
        assert!(!ticket.due_soon);
        assert_eq!(ticket.field, "todo");
        assert_eq!(ticket.lane, "delayed");
    }

    #[test]
    fn test_format_resolved_ticket_is_never_delayed() {
        let config = config();
        let rule = config.field("todo").unwrap();

        let raw = RawIssue::new("FLT-1", "Open")
            .with_resolution("Fixed")
            .with_due_date(today() - Duration::days(2));
        let mut ticket = Ticket::from_raw(key("FLT-1"), &raw, "todo");
        ticket.format(rule, &config, today());

        assert!(!ticket.delayed);
        assert_eq!(ticket.lane, "todo");
    }

    #[test]
    fn test_overdue_ticket_stays_in_lane_without_delayed_field() {
        let config = BoardConfig::from_json_str(
            r#"{ "epics": { "project": "FLT", "fields": { "todo": { "states": "Open" } } } }"#,
        )
        .unwrap();
        let rule = config.field("todo").unwrap();

        let raw = RawIssue::new("FLT-1", "Open").with_due_date(today() - Duration::days(2));
        let mut ticket = Ticket::from_raw(key("FLT-1"), &raw, "todo");
        ticket.format(rule, &config, today());

        assert!(ticket.delayed);
        assert_eq!(ticket.lane, "todo");
    }

    #[test]
    fn test_should_be_included_rules() {
        let mut ticket = Ticket::new(key("FLT-1"), "done");
        assert!(ticket.should_be_included(&FieldRule::default(), today()));

        let hidden = FieldRule {
            hidden: true,
            ..FieldRule::default()
        };
        assert!(!ticket.should_be_included(&hidden, today()));

        let needs_resolution = FieldRule {
            resolved: Some(true),
            ..FieldRule::default()
        };
        assert!(!ticket.should_be_included(&needs_resolution, today()));
        ticket.resolution = Some("Fixed".to_string());
        assert!(ticket.should_be_included(&needs_resolution, today()));

        let fresh_only = FieldRule {
            max_age_days: Some(14),
            ..FieldRule::default()
        };
        ticket.updated = Some(Utc::now() - Duration::days(400));
        assert!(!ticket.should_be_included(&fresh_only, Utc::now().date_naive()));
        ticket.updated = Some(Utc::now());
        assert!(ticket.should_be_included(&fresh_only, Utc::now().date_naive()));

        let core_only = FieldRule {
            teams: Some(vec!["core".to_string()]),
            ..FieldRule::default()
        };
        assert!(!ticket.should_be_included(&core_only, today()));
        ticket.team = Some("core".to_string());
        assert!(ticket.should_be_included(&core_only, today()));
    }

    #[test]
    fn test_extreme_max_age_excludes_nothing() {
        let mut ticket = Ticket::new(key("FLT-1"), "todo");
        ticket.updated = Some(Utc::now() - Duration::days(400));

        for max_age in [100_000_000, i64::MAX, i64::MIN] {
            let rule = FieldRule {
                max_age_days: Some(max_age),
                ..FieldRule::default()
            };
            assert!(ticket.should_be_included(&rule, today()), "max_age_days = {}", max_age);
        }
    }

    #[test]
    fn test_ticket_serialization_omits_empty_metadata() {
        let ticket = Ticket::new(key("FLT-1"), "todo");
        let json = serde_json::to_string(&ticket).unwrap();

        assert!(!json.contains("due_date"));
        assert!(!json.contains("labels"));

        let back: Ticket = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ticket);
    }
}
