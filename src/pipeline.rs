use crate::extractor::SenderNameExtractor;
use crate::filter::{SenderClass, SenderFilter};
use crate::models::{Config, EmittedRecord, InboundMessage, ReferenceMatch};
use crate::reference::ReferenceIndex;
use tracing::{debug, info};

pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// What happened to one `From` header.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Excluded,
    NotInstitution,
    NoCollegeName,
    Unresolved { college_name: String },
    Resolved { college_name: String, reference: ReferenceMatch },
}

/// Counters for one scan over a batch of messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub total: usize,
    pub missing_sender: usize,
    pub excluded: usize,
    pub not_institution: usize,
    pub no_college_name: usize,
    pub unresolved: usize,
    pub resolved: usize,
}

#[derive(Debug, Clone)]
pub struct ScanResult {
    pub records: Vec<EmittedRecord>,
    pub summary: ScanSummary,
}

/// Filter -> extract -> lookup over a shared, read-only reference index.
pub struct Pipeline<'a> {
    filter: SenderFilter,
    extractor: SenderNameExtractor,
    index: &'a ReferenceIndex,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        filter: SenderFilter,
        extractor: SenderNameExtractor,
        index: &'a ReferenceIndex,
    ) -> Self {
        Self {
            filter,
            extractor,
            index,
        }
    }

    pub fn from_config(config: &Config, index: &'a ReferenceIndex) -> Self {
        let extractor = SenderNameExtractor::new(&config.institution_keywords)
            .with_domain_overrides(&config.domain_overrides);
        Self::new(SenderFilter::from_config(config), extractor, index)
    }

    pub fn process(&self, from_header: &str) -> Outcome {
        match self.filter.classify(from_header) {
            SenderClass::Excluded => {
                debug!("Skipping excluded sender or domain: {}", from_header);
                return Outcome::Excluded;
            }
            SenderClass::NotInstitution => {
                debug!("Not from a college: {}", from_header);
                return Outcome::NotInstitution;
            }
            SenderClass::Institution => {}
        }

        let Some(college_name) = self.extractor.extract(from_header) else {
            info!("Could not extract college name from: {}", from_header);
            return Outcome::NoCollegeName;
        };

        match self.index.lookup(&college_name) {
            // a blank rate cell resolves the name but has nothing to report
            Some(reference) if reference.acceptance_rate.is_empty() => {
                info!("No acceptance rate recorded for {}", college_name);
                Outcome::Unresolved { college_name }
            }
            Some(reference) => {
                info!(
                    "Acceptance rate for {}: {}% ({:?} match on {:?})",
                    college_name, reference.acceptance_rate, reference.tier, reference.matched_key
                );
                Outcome::Resolved {
                    college_name,
                    reference,
                }
            }
            None => {
                info!("Acceptance rate for {} not found in data", college_name);
                Outcome::Unresolved { college_name }
            }
        }
    }

    /// Acceptance rate for a raw `From` header, or `None` when the sender is
    /// filtered out or cannot be resolved.
    pub fn resolve(&self, from_header: &str) -> Option<String> {
        match self.process(from_header) {
            Outcome::Resolved { reference, .. } => Some(reference.acceptance_rate),
            _ => None,
        }
    }

    pub fn run(&self, messages: &[InboundMessage]) -> ScanResult {
        let mut records = Vec::new();
        let mut summary = ScanSummary {
            total: messages.len(),
            ..ScanSummary::default()
        };

        for message in messages {
            let Some(from_header) = message.from.as_deref() else {
                debug!("No 'From' header in {}, skipping", message.source);
                summary.missing_sender += 1;
                continue;
            };

            match self.process(from_header) {
                Outcome::Excluded => summary.excluded += 1,
                Outcome::NotInstitution => summary.not_institution += 1,
                Outcome::NoCollegeName => summary.no_college_name += 1,
                Outcome::Unresolved { .. } => summary.unresolved += 1,
                Outcome::Resolved {
                    college_name,
                    reference,
                } => {
                    summary.resolved += 1;
                    records.push(EmittedRecord {
                        date: message
                            .date
                            .map(|date| date.format(DATE_FORMAT).to_string())
                            .unwrap_or_default(),
                        college_name,
                        acceptance_rate: reference.acceptance_rate,
                    });
                }
            }
        }

        ScanResult { records, summary }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchTier, ReferenceRow};
    use chrono::DateTime;

    fn index() -> ReferenceIndex {
        ReferenceIndex::load(vec![
            ReferenceRow::new("Boston University", "14"),
            ReferenceRow::new("University of Colorado Denver", "68"),
            ReferenceRow::new("Creighton University", "72"),
            ReferenceRow::new("United States Naval Academy", ""),
        ])
        .unwrap()
    }

    #[test]
    fn test_personal_sender_resolves_through_domain() {
        let index = index();
        let pipeline = Pipeline::from_config(&Config::default(), &index);
        assert_eq!(pipeline.resolve("Jane Doe <jane@bu.edu>").as_deref(), Some("14"));
    }

    #[test]
    fn test_process_outcomes() {
        let index = index();
        let pipeline = Pipeline::from_config(&Config::default(), &index);

        assert_eq!(pipeline.process("admissions@vchsweb.org"), Outcome::Excluded);
        assert_eq!(pipeline.process("Deals <deals@store.com>"), Outcome::NotInstitution);
        assert_eq!(pipeline.process("Jane Doe"), Outcome::NotInstitution);
        assert_eq!(pipeline.process("Admissions Office"), Outcome::NoCollegeName);
        assert_eq!(
            pipeline.process("Jane Doe <jane@zzqx.edu>"),
            Outcome::Unresolved {
                college_name: "ZZQX".to_string()
            }
        );

        assert_eq!(
            pipeline.process("United States Naval Academy <admissions@usna.edu>"),
            Outcome::Unresolved {
                college_name: "UNITED-STATES-NAVAL-ACADEMY".to_string()
            }
        );

        match pipeline.process("U. of Colorado Denver <news@ucdenver.edu>") {
            Outcome::Resolved {
                college_name,
                reference,
            } => {
                assert_eq!(college_name, "UNIVERSITY-OF-COLORADO-DENVER");
                assert_eq!(reference.acceptance_rate, "68");
                assert_eq!(reference.tier, MatchTier::NormalizedExact);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_run_emits_resolved_records_only() {
        let index = index();
        let pipeline = Pipeline::from_config(&Config::default(), &index);
        let date = DateTime::parse_from_rfc2822("Tue, 14 May 2024 09:30:00 -0600").unwrap();

        let messages = vec![
            InboundMessage {
                source: "1.eml".to_string(),
                date: Some(date),
                from: Some("\"Creighton\" <info@admissions.creighton.edu>".to_string()),
            },
            InboundMessage {
                source: "2.eml".to_string(),
                date: None,
                from: Some("Boston University Admissions <admissions@bu.edu>".to_string()),
            },
            InboundMessage {
                source: "3.eml".to_string(),
                date: Some(date),
                from: Some("College Board <noreply@collegeboard.org>".to_string()),
            },
            InboundMessage {
                source: "4.eml".to_string(),
                date: Some(date),
                from: None,
            },
            InboundMessage {
                source: "5.eml".to_string(),
                date: Some(date),
                from: Some("United States Naval Academy <admissions@usna.edu>".to_string()),
            },
        ];

        let result = pipeline.run(&messages);
        assert_eq!(
            result.records,
            vec![
                EmittedRecord {
                    date: "2024-05-14 09:30:00".to_string(),
                    college_name: "CREIGHTON-UNIVERSITY".to_string(),
                    acceptance_rate: "72".to_string(),
                },
                EmittedRecord {
                    date: String::new(),
                    college_name: "BOSTON-UNIVERSITY".to_string(),
                    acceptance_rate: "14".to_string(),
                },
            ]
        );
        assert_eq!(
            result.summary,
            ScanSummary {
                total: 5,
                missing_sender: 1,
                excluded: 1,
                unresolved: 1,
                resolved: 2,
                ..ScanSummary::default()
            }
        );
    }
}
