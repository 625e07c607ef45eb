//! Exception-tag taxonomy.
//!
//! Attendance rows carry a free-text exception label ("sick", "dinas luar",
//! "cuti tahunan", …). The taxonomy maps that text onto a closed set of
//! buckets by case-insensitive keyword *containment*, not exact match:
//! `"sick leave - approved"` matches the `sick` keyword.
//!
//! The keyword lists are required to be disjoint across buckets; a custom
//! taxonomy is validated at load time and any overlap is surfaced as a
//! configuration warning instead of silently double-classifying rows.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{AnalyticsError, Result};

// ── ExceptionBucket ───────────────────────────────────────────────────────────

/// How an exception tag affects the attendance analytics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExceptionBucket {
    /// On duty elsewhere (business trip, remote, meeting): counts as present
    /// despite no clock scan.
    Present,
    /// Sick / approved leave: removed from the working-day denominator
    /// entirely, neither presence nor absence.
    Excluded,
    /// Unauthorized absence: counts as a working day but never as present.
    Penalized,
    /// No exception keyword matched.
    None,
}

impl ExceptionBucket {
    /// Canonical lowercase identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExceptionBucket::Present => "present",
            ExceptionBucket::Excluded => "excluded",
            ExceptionBucket::Penalized => "penalized",
            ExceptionBucket::None => "none",
        }
    }
}

// ── Keyword containment ───────────────────────────────────────────────────────

/// Whether the lowercased tag contains any of the given keywords.
pub fn tag_contains_any<S: AsRef<str>>(tag_lower: &str, keywords: &[S]) -> bool {
    keywords.iter().any(|k| tag_lower.contains(k.as_ref()))
}

// ── ExceptionTaxonomy ─────────────────────────────────────────────────────────

/// The synonym-to-bucket mapping table.
///
/// The defaults reproduce the original deployment's keyword lists exactly;
/// a JSON file with the same three fields can override them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExceptionTaxonomy {
    pub present: Vec<String>,
    pub excluded: Vec<String>,
    pub penalized: Vec<String>,
}

impl Default for ExceptionTaxonomy {
    fn default() -> Self {
        let to_vec = |words: &[&str]| words.iter().map(|w| w.to_string()).collect();
        Self {
            present: to_vec(&["dinas", "trip", "tugas", "wfh", "meeting"]),
            excluded: to_vec(&["sakit", "sick", "cuti", "leave", "izin", "off", "libur"]),
            penalized: to_vec(&["alpha", "mangkir", "unpaid", "absen"]),
        }
    }
}

impl ExceptionTaxonomy {
    /// Load a taxonomy override from a JSON file.
    ///
    /// Keywords are lowercased and trimmed; empty keywords are a
    /// configuration error, cross-bucket overlaps are logged as warnings.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| AnalyticsError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let mut taxonomy: ExceptionTaxonomy = serde_json::from_str(&raw)?;
        taxonomy.normalize();
        taxonomy.validate()?;
        for overlap in taxonomy.overlaps() {
            warn!("exception taxonomy overlap: {}", overlap);
        }
        Ok(taxonomy)
    }

    /// Lowercase and trim every keyword.
    fn normalize(&mut self) {
        for list in [&mut self.present, &mut self.excluded, &mut self.penalized] {
            for kw in list.iter_mut() {
                *kw = kw.trim().to_lowercase();
            }
        }
    }

    /// Reject empty buckets and empty keywords.
    ///
    /// An empty keyword would match every tag via containment, which turns
    /// the whole dataset into one bucket.
    pub fn validate(&self) -> Result<()> {
        for (name, list) in [
            ("present", &self.present),
            ("excluded", &self.excluded),
            ("penalized", &self.penalized),
        ] {
            if list.is_empty() {
                return Err(AnalyticsError::Config(format!(
                    "taxonomy bucket \"{}\" has no keywords",
                    name
                )));
            }
            if list.iter().any(|k| k.is_empty()) {
                return Err(AnalyticsError::Config(format!(
                    "taxonomy bucket \"{}\" contains an empty keyword",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Cross-bucket keyword collisions (equal or substring-related keywords).
    ///
    /// Disjointness is a design assumption: a tag matching two buckets has
    /// undefined classification, so an overlapping configuration deserves a
    /// warning before any rows are processed.
    pub fn overlaps(&self) -> Vec<String> {
        let buckets = [
            ("present", &self.present),
            ("excluded", &self.excluded),
            ("penalized", &self.penalized),
        ];
        let mut found = Vec::new();
        for i in 0..buckets.len() {
            for j in (i + 1)..buckets.len() {
                let (name_a, list_a) = buckets[i];
                let (name_b, list_b) = buckets[j];
                for a in list_a.iter() {
                    for b in list_b.iter() {
                        if a.contains(b.as_str()) || b.contains(a.as_str()) {
                            found.push(format!(
                                "\"{}\" ({}) collides with \"{}\" ({})",
                                a, name_a, b, name_b
                            ));
                        }
                    }
                }
            }
        }
        found
    }

    /// Membership test for one bucket, by keyword containment.
    ///
    /// The classifier probes buckets independently (the working-day test
    /// only cares about Excluded, the presence test about Present and
    /// Penalized), so membership is exposed per bucket rather than only as
    /// a single resolved value.
    pub fn matches(&self, tag: &str, bucket: ExceptionBucket) -> bool {
        let tag_lower = tag.to_lowercase();
        match bucket {
            ExceptionBucket::Present => tag_contains_any(&tag_lower, &self.present),
            ExceptionBucket::Excluded => tag_contains_any(&tag_lower, &self.excluded),
            ExceptionBucket::Penalized => tag_contains_any(&tag_lower, &self.penalized),
            ExceptionBucket::None => {
                !tag_contains_any(&tag_lower, &self.present)
                    && !tag_contains_any(&tag_lower, &self.excluded)
                    && !tag_contains_any(&tag_lower, &self.penalized)
            }
        }
    }

    /// Resolve a tag to its bucket.
    ///
    /// With a disjoint taxonomy at most one bucket can match; the probe
    /// order only matters for misconfigured overlapping taxonomies.
    pub fn bucket_of(&self, tag: &str) -> ExceptionBucket {
        if self.matches(tag, ExceptionBucket::Present) {
            ExceptionBucket::Present
        } else if self.matches(tag, ExceptionBucket::Excluded) {
            ExceptionBucket::Excluded
        } else if self.matches(tag, ExceptionBucket::Penalized) {
            ExceptionBucket::Penalized
        } else {
            ExceptionBucket::None
        }
    }
}

// ── LeaveCategory ─────────────────────────────────────────────────────────────

/// Named categories of the leave-type breakdown.
///
/// Scanned across the FULL row collection (not just working days); a row can
/// legitimately count under two different categories when its tag contains
/// synonyms of both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LeaveCategory {
    Sick,
    Leave,
    BusinessTrip,
    Unpaid,
    Wfh,
}

impl LeaveCategory {
    /// All categories, in breakdown display order.
    pub const ALL: [LeaveCategory; 5] = [
        LeaveCategory::Sick,
        LeaveCategory::Leave,
        LeaveCategory::BusinessTrip,
        LeaveCategory::Unpaid,
        LeaveCategory::Wfh,
    ];

    /// Keyword synonyms counted for this category.
    pub fn synonyms(&self) -> &'static [&'static str] {
        match self {
            LeaveCategory::Sick => &["sick", "sakit"],
            LeaveCategory::Leave => &["leave", "cuti"],
            LeaveCategory::BusinessTrip => &["trip", "dinas"],
            LeaveCategory::Unpaid => &["unpaid", "alpha"],
            LeaveCategory::Wfh => &["wfh"],
        }
    }

    /// Canonical camelCase identifier matching the breakdown field names.
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveCategory::Sick => "sick",
            LeaveCategory::Leave => "leave",
            LeaveCategory::BusinessTrip => "businessTrip",
            LeaveCategory::Unpaid => "unpaidLeave",
            LeaveCategory::Wfh => "wfh",
        }
    }

    /// Whether a (lowercased) tag counts under this category.
    pub fn matches(&self, tag_lower: &str) -> bool {
        tag_contains_any(tag_lower, self.synonyms())
    }
}
