use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of the index document.
///
/// Identity is the URL; the name and listed title are carried through to the
/// record untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub listed_title: String,
}

impl Target {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        listed_title: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            listed_title: listed_title.into(),
        }
    }
}

/// Signals extracted from a single fetched page.
///
/// Wire names follow the published output document (`github`, `linkedin`,
/// `twitter`, ...), not the Rust field names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSignals {
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(rename = "github", default)]
    pub source_host_links: Vec<String>,
    #[serde(rename = "linkedin", default)]
    pub professional_network_link: Option<String>,
    #[serde(rename = "twitter", default)]
    pub social_link: Option<String>,
    /// At most [`crate::harvest::extract::MAX_STACK_TAGS`] entries.
    #[serde(rename = "stack", default)]
    pub stack_tags: Vec<String>,
    #[serde(rename = "experience", default)]
    pub experience_hint: Option<String>,
    #[serde(rename = "title", default)]
    pub page_title: Option<String>,
    #[serde(rename = "location", default)]
    pub location_hint: Option<String>,
}

/// Result of harvesting one target.
///
/// Serialized inline into the record with a `status` tag, so an error record
/// carries only `error` and an ok record carries every signal field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    Ok(PageSignals),
    Error { error: String },
}

/// One target plus what happened when it was harvested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestRecord {
    #[serde(flatten)]
    pub target: Target,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl HarvestRecord {
    pub fn ok(target: Target, signals: PageSignals) -> Self {
        Self {
            target,
            outcome: Outcome::Ok(signals),
        }
    }

    pub fn error(target: Target, reason: impl Into<String>) -> Self {
        Self {
            target,
            outcome: Outcome::Error {
                error: reason.into(),
            },
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self.outcome, Outcome::Ok(_))
    }

    /// Signals for an `ok` record, `None` for an error record.
    pub fn signals(&self) -> Option<&PageSignals> {
        match &self.outcome {
            Outcome::Ok(signals) => Some(signals),
            Outcome::Error { .. } => None,
        }
    }

    pub fn error_reason(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Ok(_) => None,
            Outcome::Error { error } => Some(error),
        }
    }
}

/// Counts over a complete record list. Signal counts only consider `ok` records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub with_email: usize,
    pub with_github: usize,
    pub with_stack: usize,
    pub with_linkedin: usize,
    pub with_twitter: usize,
}

/// `meta` block of the output document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputMeta {
    pub scraped_at: DateTime<Utc>,
    #[serde(flatten)]
    pub stats: SummaryStats,
}

/// The final output document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarvestOutput {
    pub meta: OutputMeta,
    #[serde(rename = "portfolios")]
    pub records: Vec<HarvestRecord>,
}

/// Lightweight progress marker written next to the partial record list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressMarker {
    pub completed_count: usize,
    pub total_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn jane() -> Target {
        Target::new("Jane Doe", "https://jane.dev", "Frontend Engineer")
    }

    #[test]
    fn test_ok_record_wire_shape() {
        let signals = PageSignals {
            emails: vec!["jane@jane.dev".to_string()],
            stack_tags: vec!["React".to_string()],
            ..PageSignals::default()
        };
        let value = serde_json::to_value(HarvestRecord::ok(jane(), signals)).unwrap();

        assert_eq!(value["name"], "Jane Doe");
        assert_eq!(value["listedTitle"], "Frontend Engineer");
        assert_eq!(value["status"], "ok");
        assert_eq!(value["emails"], json!(["jane@jane.dev"]));
        assert_eq!(value["github"], json!([]));
        assert_eq!(value["linkedin"], serde_json::Value::Null);
        assert_eq!(value["stack"], json!(["React"]));
        assert!(value.get("error").is_none());
    }

    #[test]
    fn test_error_record_wire_shape() {
        let value = serde_json::to_value(HarvestRecord::error(jane(), "timeout")).unwrap();

        assert_eq!(value["status"], "error");
        assert_eq!(value["error"], "timeout");
        assert!(value.get("emails").is_none());
        assert!(value.get("stack").is_none());
    }

    #[test]
    fn test_record_deserializes_from_legacy_partial() {
        let raw = json!([
            {
                "name": "Ann", "url": "https://ann.io", "listedTitle": "",
                "status": "error", "error": "HTTP 503"
            },
            {
                "name": "Bo", "url": "https://bo.io", "listedTitle": "Dev",
                "emails": [], "github": ["https://github.com/bo"], "linkedin": null,
                "twitter": null, "stack": ["Rust"], "experience": "5+ years",
                "title": "Bo", "location": null, "status": "ok"
            }
        ]);

        let records: Vec<HarvestRecord> = serde_json::from_value(raw).unwrap();

        assert_eq!(records[0].error_reason(), Some("HTTP 503"));
        assert!(records[1].is_ok());
        let signals = records[1].signals().unwrap();
        assert_eq!(signals.source_host_links, vec!["https://github.com/bo"]);
        assert_eq!(signals.experience_hint.as_deref(), Some("5+ years"));
    }

    #[test]
    fn test_meta_flattens_stats() {
        let meta = OutputMeta {
            scraped_at: Utc::now(),
            stats: SummaryStats {
                total: 3,
                successful: 2,
                failed: 1,
                ..SummaryStats::default()
            },
        };
        let value = serde_json::to_value(meta).unwrap();

        assert!(value["scrapedAt"].is_string());
        assert_eq!(value["total"], 3);
        assert_eq!(value["withLinkedin"], 0);
    }
}
