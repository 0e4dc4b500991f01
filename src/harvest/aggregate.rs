//! Summary statistics and output assembly.

use chrono::{DateTime, Utc};

use crate::model::{HarvestOutput, HarvestRecord, Outcome, OutputMeta, SummaryStats};

impl SummaryStats {
    /// Single pass over the records.
    pub fn from_records(records: &[HarvestRecord]) -> Self {
        records.iter().fold(Self::default(), |mut stats, record| {
            stats.total += 1;
            match &record.outcome {
                Outcome::Ok(signals) => {
                    stats.successful += 1;
                    stats.with_email += usize::from(!signals.emails.is_empty());
                    stats.with_github += usize::from(!signals.source_host_links.is_empty());
                    stats.with_stack += usize::from(!signals.stack_tags.is_empty());
                    stats.with_linkedin += usize::from(signals.professional_network_link.is_some());
                    stats.with_twitter += usize::from(signals.social_link.is_some());
                }
                Outcome::Error { .. } => stats.failed += 1,
            }
            stats
        })
    }
}

/// Concatenates prior and new records and stamps the document.
pub fn assemble(
    prior: Vec<HarvestRecord>,
    fresh: Vec<HarvestRecord>,
    scraped_at: DateTime<Utc>,
) -> HarvestOutput {
    let mut records = prior;
    records.extend(fresh);

    HarvestOutput {
        meta: OutputMeta {
            scraped_at,
            stats: SummaryStats::from_records(&records),
        },
        records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PageSignals, Target};

    fn target(i: usize) -> Target {
        Target::new(format!("Dev {i}"), format!("https://dev{i}.io"), "")
    }

    #[test]
    fn test_counts_per_signal() {
        let records = vec![
            HarvestRecord::ok(
                target(0),
                PageSignals {
                    emails: vec!["a@a.io".into()],
                    source_host_links: vec!["https://github.com/a".into()],
                    stack_tags: vec!["Rust".into()],
                    ..PageSignals::default()
                },
            ),
            HarvestRecord::ok(
                target(1),
                PageSignals {
                    professional_network_link: Some("https://linkedin.com/in/b".into()),
                    social_link: Some("https://x.com/b".into()),
                    ..PageSignals::default()
                },
            ),
            HarvestRecord::error(target(2), "timeout"),
        ];

        let stats = SummaryStats::from_records(&records);

        assert_eq!(
            stats,
            SummaryStats {
                total: 3,
                successful: 2,
                failed: 1,
                with_email: 1,
                with_github: 1,
                with_stack: 1,
                with_linkedin: 1,
                with_twitter: 1,
            }
        );
    }

    #[test]
    fn test_all_errors_still_produce_output() {
        let fresh = (0..4)
            .map(|i| HarvestRecord::error(target(i), "HTTP 500"))
            .collect();

        let output = assemble(Vec::new(), fresh, Utc::now());

        assert_eq!(output.meta.stats.total, 4);
        assert_eq!(output.meta.stats.failed, 4);
        assert_eq!(output.meta.stats.successful, 0);
        assert_eq!(output.records.len(), 4);
    }

    #[test]
    fn test_prior_records_come_first() {
        let prior = vec![HarvestRecord::error(target(0), "timeout")];
        let fresh = vec![HarvestRecord::ok(target(1), PageSignals::default())];

        let output = assemble(prior, fresh, Utc::now());

        let urls: Vec<_> = output.records.iter().map(|r| r.target.url.as_str()).collect();
        assert_eq!(urls, vec!["https://dev0.io", "https://dev1.io"]);
        assert_eq!(output.meta.stats.successful, 1);
    }

    #[test]
    fn test_empty_record_list() {
        assert_eq!(SummaryStats::from_records(&[]), SummaryStats::default());
    }
}
