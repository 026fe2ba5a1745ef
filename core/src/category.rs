//! Destination categories an image can be sorted into.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// The single category assigned to every classified image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Documents,
    Selfies,
    People,
    Nature,
    /// Fallback for undecodable images and images no detector claims.
    Unknown,
}

impl Category {
    /// All categories in summary order.
    pub const ALL: [Category; 5] = [
        Category::Documents,
        Category::Selfies,
        Category::People,
        Category::Nature,
        Category::Unknown,
    ];

    /// Directory name used under the output folder.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Documents => "documents",
            Category::Selfies => "selfies",
            Category::People => "people",
            Category::Nature => "nature",
            Category::Unknown => "unknown",
        }
    }

    fn index(self) -> usize {
        match self {
            Category::Documents => 0,
            Category::Selfies => 1,
            Category::People => 2,
            Category::Nature => 3,
            Category::Unknown => 4,
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Category::Documents => "Documents",
            Category::Selfies => "Selfies",
            Category::People => "People",
            Category::Nature => "Nature",
            Category::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

/// Per-category count of images copied during one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    counts: [usize; 5],
    /// Files that were classified but could not be copied.
    pub failed: usize,
}

impl Tally {
    pub fn record(&mut self, category: Category) {
        self.counts[category.index()] += 1;
    }

    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    pub fn count(&self, category: Category) -> usize {
        self.counts[category.index()]
    }

    /// Number of successfully copied images.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, usize)> + '_ {
        Category::ALL
            .iter()
            .map(move |category| (*category, self.count(*category)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_names_are_lowercase() {
        let names: Vec<_> = Category::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(
            names,
            vec!["documents", "selfies", "people", "nature", "unknown"]
        );
    }

    #[test]
    fn display_is_capitalized() {
        assert_eq!(Category::Selfies.to_string(), "Selfies");
        assert_eq!(Category::Unknown.to_string(), "Unknown");
    }

    #[test]
    fn serializes_as_directory_name() {
        let json = serde_json::to_string(&Category::Nature).unwrap();
        assert_eq!(json, "\"nature\"");
        let parsed: Category = serde_json::from_str("\"people\"").unwrap();
        assert_eq!(parsed, Category::People);
    }

    #[test]
    fn tally_totals_exclude_failures() {
        let mut tally = Tally::default();
        tally.record(Category::Nature);
        tally.record(Category::Nature);
        tally.record(Category::Documents);
        tally.record_failure();
        assert_eq!(tally.count(Category::Nature), 2);
        assert_eq!(tally.count(Category::People), 0);
        assert_eq!(tally.total(), 3);
        assert_eq!(tally.failed, 1);
        assert_eq!(tally.iter().count(), 5);
    }
}
