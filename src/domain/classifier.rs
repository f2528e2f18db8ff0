use crate::domain::{
    board::BoardConfig,
    issue::RawIssue,
    rules::StateIndex,
    ticket::{Ticket, TicketKey},
};
use crate::error::SkipReason;
use chrono::NaiveDate;

/// Turns raw tracker issues into board tickets.
///
/// Classification is a pure function of the issue, the compiled index, the
/// board configuration and the date it runs for.
pub struct Classifier<'a> {
    config: &'a BoardConfig,
    index: &'a StateIndex,
    today: NaiveDate,
}

impl<'a> Classifier<'a> {
    pub fn new(config: &'a BoardConfig, index: &'a StateIndex, today: NaiveDate) -> Self {
        Self {
            config,
            index,
            today,
        }
    }

    /// Classifies one issue.
    ///
    /// Issues that cannot be placed on the board are reported as a
    /// [`SkipReason`]. A classified ticket may still carry `included == false`
    /// when its field's inclusion rules reject it.
    pub fn classify(&self, raw: &RawIssue) -> Result<Ticket, SkipReason> {
        let key: TicketKey = raw
            .key
            .parse()
            .map_err(|_| SkipReason::Malformed(format!("invalid key '{}'", raw.key)))?;

        let status = raw.status.trim();
        if status.is_empty() {
            return Err(SkipReason::Malformed(format!("{} has no status", key)));
        }

        let field = self.index.resolve(status, raw.resolution())?;

        let rule = self.config.field(field).ok_or_else(|| {
            SkipReason::Malformed(format!("{} resolved to undeclared field '{}'", key, field))
        })?;

        let mut ticket = Ticket::from_raw(key, raw, field);
        ticket.format(rule, self.config, self.today);
        ticket.included = ticket.should_be_included(rule, self.today);

        Ok(ticket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rules::compile;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 15).unwrap()
    }

    fn config() -> BoardConfig {
        BoardConfig::from_json_str(
            r#"{
                "teams": { "core": "Core Platform" },
                "epics": {
                    "project": "FLT",
                    "status": ["Open", "Resolved"],
                    "fields": {
                        "todo": { "states": "Open" },
                        "done": { "states": "Resolved", "resolution": ["Fixed", "Done"] },
                        "archived": { "states": "Closed", "hidden": true },
                        "delayed": {}
                    }
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_end_to_end_classification() {
        let config = config();
        let index = compile(&config.epics.fields, &config.epics.delayed);
        let classifier = Classifier::new(&config, &index, today());

        let open = classifier.classify(&RawIssue::new("FLT-1", "Open")).unwrap();
        assert_eq!(open.field, "todo");
        assert!(open.included);

        let fixed = classifier
            .classify(&RawIssue::new("FLT-2", "Resolved").with_resolution("Fixed"))
            .unwrap();
        assert_eq!(fixed.field, "done");
        assert!(fixed.included);

        let wont_fix = classifier.classify(&RawIssue::new("FLT-3", "Resolved").with_resolution("WontFix"));
        assert!(matches!(wont_fix, Err(SkipReason::UnmappedResolution { .. })));
    }

    #[test]
    fn test_hidden_field_is_classified_but_excluded() {
        let config = config();
        let index = compile(&config.epics.fields, &config.epics.delayed);
        let classifier = Classifier::new(&config, &index, today());

        let ticket = classifier.classify(&RawIssue::new("FLT-4", "Closed")).unwrap();
        assert_eq!(ticket.field, "archived");
        assert!(!ticket.included);
    }

    #[test]
    fn test_malformed_issues_are_skipped() {
        let config = config();
        let index = compile(&config.epics.fields, &config.epics.delayed);
        let classifier = Classifier::new(&config, &index, today());

        assert!(matches!(
            classifier.classify(&RawIssue::new("", "Open")),
            Err(SkipReason::Malformed(_))
        ));
        assert!(matches!(
            classifier.classify(&RawIssue::new("FLT-5", "  ")),
            Err(SkipReason::Malformed(_))
        ));
        assert!(matches!(
            classifier.classify(&RawIssue::new("FLT-6", "Backlog")),
            Err(SkipReason::UnmappedStatus(_))
        ));
    }

    #[test]
    fn test_unresolved_issue_on_resolution_only_state_is_skipped() {
        let config = config();
        let index = compile(&config.epics.fields, &config.epics.delayed);
        let classifier = Classifier::new(&config, &index, today());

        let result = classifier.classify(&RawIssue::new("FLT-7", "Resolved"));
        assert_eq!(
            result,
            Err(SkipReason::UnmappedResolution {
                status: "Resolved".to_string(),
                resolution: None,
            })
        );
    }

    #[test]
    fn test_classification_formats_ticket() {
        let config = config();
        let index = compile(&config.epics.fields, &config.epics.delayed);
        let classifier = Classifier::new(&config, &index, today());

        let ticket = classifier
            .classify(
                &RawIssue::new("flt-8", "Open")
                    .with_summary("Ship the board")
                    .with_team("core")
                    .with_due_date(today() - Duration::days(1)),
            )
            .unwrap();

        assert_eq!(ticket.key.as_str(), "flt-8");
        assert_eq!(ticket.summary, "Ship the board");
        assert_eq!(ticket.team_name.as_deref(), Some("Core Platform"));
        assert!(ticket.delayed);
        assert_eq!(ticket.field, "todo");
        assert_eq!(ticket.lane, "delayed");
    }
}
