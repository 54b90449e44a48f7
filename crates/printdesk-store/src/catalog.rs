//! Paper catalog entities and their compatibility edges.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::units::Millimeters;

labelled_enum! {
    /// Paper size series classification.
    pub enum SizeSeries ("size series") {
        A => "A",
        B => "B",
        NorthAmerican => "NA",
        Other => "OTHER",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductType {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperType {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

/// A paper weight and the paper types it can be produced on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperWeight {
    pub id: u64,
    pub gsm: u32,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub paper_type_ids: BTreeSet<u64>,
}

/// A physical sheet size and the weights it can be produced in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperSize {
    pub id: u64,
    pub name: String,
    pub series: SizeSeries,
    pub width_mm: Millimeters,
    pub height_mm: Millimeters,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub paper_weight_ids: BTreeSet<u64>,
}

impl PaperSize {
    /// Orientation-independent identity of the sheet: (short side, long side).
    pub fn dimension_key(&self) -> (Millimeters, Millimeters) {
        dimension_key(self.width_mm, self.height_mm)
    }

    /// Whether `width × height` names this sheet in either orientation.
    pub fn matches_dimensions(&self, width_mm: Millimeters, height_mm: Millimeters) -> bool {
        self.dimension_key() == dimension_key(width_mm, height_mm)
    }
}

pub(crate) fn dimension_key(a: Millimeters, b: Millimeters) -> (Millimeters, Millimeters) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Authoritative allow-lists for one product type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProductTypeSpecification {
    pub product_type_id: u64,
    #[serde(default)]
    pub paper_type_ids: BTreeSet<u64>,
    #[serde(default)]
    pub paper_weight_ids: BTreeSet<u64>,
    #[serde(default)]
    pub paper_size_ids: BTreeSet<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotated_dimensions_match_the_same_sheet() {
        let size = PaperSize {
            id: 1,
            name: "Banner".to_string(),
            series: SizeSeries::Other,
            width_mm: Millimeters::whole(100),
            height_mm: Millimeters::whole(50),
            paper_weight_ids: BTreeSet::new(),
        };
        assert!(size.matches_dimensions(Millimeters::whole(50), Millimeters::whole(100)));
        assert!(size.matches_dimensions(Millimeters::whole(100), Millimeters::whole(50)));
        assert!(!size.matches_dimensions(Millimeters::whole(100), Millimeters::whole(51)));
    }

    #[test]
    fn series_uses_short_labels() {
        assert_eq!(SizeSeries::NorthAmerican.as_str(), "NA");
        assert_eq!("other".parse::<SizeSeries>(), Ok(SizeSeries::Other));
    }
}
