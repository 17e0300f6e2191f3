use crate::error::{AnalyzerError, Result};
use crate::models::{
    MatchTier, ReferenceMatch, ReferenceRecord, ReferenceRow, DEFAULT_FUZZY_CUTOFF,
};
use crate::normalizer::normalize_name;
use crate::similarity::similarity_ratio;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

const DISPLAY_NAME_FIELD: &str = "institution.displayName";
const ACCEPTANCE_RATE_FIELD: &str = "searchData.acceptanceRate.rawValue";

impl ReferenceRecord {
    /// Validate one reference row. `row` is the 1-based data row number.
    /// Only an absent column is an error; blank cells are kept as "".
    pub fn from_row(row: usize, data: ReferenceRow) -> Result<Self> {
        let display_name = data
            .display_name
            .map(|name| name.trim().to_lowercase())
            .ok_or(AnalyzerError::MissingField {
                row,
                field: DISPLAY_NAME_FIELD,
            })?;
        let acceptance_rate = data
            .acceptance_rate
            .map(|rate| rate.trim().to_string())
            .ok_or(AnalyzerError::MissingField {
                row,
                field: ACCEPTANCE_RATE_FIELD,
            })?;

        Ok(Self {
            normalized_key: normalize_name(&display_name),
            raw_name: display_name,
            acceptance_rate,
        })
    }
}

/// Immutable institution -> acceptance rate index with tiered lookup.
///
/// Lookup tiers, first hit wins:
/// 1. normalized query equals a normalized key
/// 2. lower-cased query equals a raw reference name
/// 3. normalized query contains a key or is contained in one (longest key wins)
/// 4. best similarity ratio, accepted only at or above the fuzzy cutoff
#[derive(Debug, Clone)]
pub struct ReferenceIndex {
    raw: HashMap<String, String>,
    // normalized key -> position in `entries`
    normalized: HashMap<String, usize>,
    // (normalized key, rate) in first-insertion order
    entries: Vec<(String, String)>,
    fuzzy_cutoff: f64,
}

impl ReferenceIndex {
    /// Build the index from reference rows. A row missing the display name or
    /// acceptance rate column aborts the load. Colliding keys keep the last
    /// rate.
    pub fn load<I>(rows: I) -> Result<Self>
    where
        I: IntoIterator<Item = ReferenceRow>,
    {
        let mut index = Self {
            raw: HashMap::new(),
            normalized: HashMap::new(),
            entries: Vec::new(),
            fuzzy_cutoff: DEFAULT_FUZZY_CUTOFF,
        };

        for (i, row) in rows.into_iter().enumerate() {
            let record = ReferenceRecord::from_row(i + 1, row)?;
            index.insert(record);
        }

        Ok(index)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let rows = csv_reader
            .deserialize::<ReferenceRow>()
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let index = Self::load(rows)?;

        info!(
            "Loaded {} reference institutions ({} normalized keys)",
            index.raw.len(),
            index.entries.len()
        );
        Ok(index)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        debug!("Reading reference data from {}", path.as_ref().display());
        Self::from_reader(file)
    }

    pub fn with_fuzzy_cutoff(mut self, cutoff: f64) -> Self {
        self.fuzzy_cutoff = cutoff;
        self
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    fn insert(&mut self, record: ReferenceRecord) {
        if record.raw_name.is_empty() {
            debug!("Skipping reference row without a display name");
            return;
        }
        self.raw.insert(record.raw_name, record.acceptance_rate.clone());

        // A name made only of generic words has nothing left to compare on.
        if record.normalized_key.is_empty() {
            return;
        }
        match self.normalized.get(&record.normalized_key) {
            Some(&position) => self.entries[position].1 = record.acceptance_rate,
            None => {
                self.normalized
                    .insert(record.normalized_key.clone(), self.entries.len());
                self.entries.push((record.normalized_key, record.acceptance_rate));
            }
        }
    }

    /// Acceptance rate for `name`, or `None` when no tier is confident.
    pub fn acceptance_rate(&self, name: &str) -> Option<String> {
        self.lookup(name).map(|found| found.acceptance_rate)
    }

    /// Resolve `name` through the lookup tiers, reporting the matched key and
    /// the tier that answered.
    pub fn lookup(&self, name: &str) -> Option<ReferenceMatch> {
        let query = normalize_name(name);

        if let Some(&position) = self.normalized.get(&query) {
            let (key, rate) = &self.entries[position];
            return Some(ReferenceMatch::exact(rate, key, MatchTier::NormalizedExact));
        }

        let raw_name = name.trim().to_lowercase();
        if let Some(rate) = self.raw.get(&raw_name) {
            return Some(ReferenceMatch::exact(rate, &raw_name, MatchTier::RawExact));
        }

        if query.is_empty() {
            return None;
        }

        if let Some(position) = self.substring_match(&query) {
            let (key, rate) = &self.entries[position];
            return Some(ReferenceMatch::approximate(
                rate,
                key,
                MatchTier::Substring,
                similarity_ratio(key, &query),
            ));
        }

        let (position, ratio) = self.fuzzy_match(&query)?;
        let (key, rate) = &self.entries[position];
        Some(ReferenceMatch::approximate(rate, key, MatchTier::Fuzzy, ratio))
    }

    /// Longest key that contains or is contained in `query`; ties go to the
    /// key inserted first.
    fn substring_match(&self, query: &str) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (position, (key, _)) in self.entries.iter().enumerate() {
            if !(query.contains(key.as_str()) || key.contains(query)) {
                continue;
            }
            let longer = best.map_or(true, |b| key.len() > self.entries[b].0.len());
            if longer {
                best = Some(position);
            }
        }
        best
    }

    /// Most similar key if its ratio reaches the cutoff; ties go to the key
    /// inserted first. The ratio is taken with the key as the first sequence.
    fn fuzzy_match(&self, query: &str) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (position, (key, _)) in self.entries.iter().enumerate() {
            let ratio = similarity_ratio(key, query);
            if best.map_or(true, |(_, best_ratio)| ratio > best_ratio) {
                best = Some((position, ratio));
            }
        }
        best.filter(|(_, ratio)| *ratio >= self.fuzzy_cutoff)
    }
}
