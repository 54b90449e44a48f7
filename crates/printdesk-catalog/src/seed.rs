//! Standard sheet sizes.

use printdesk_store::{Ledger, LedgerError, Millimeters, SizeSeries};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StandardSize {
    pub name: &'static str,
    pub series: SizeSeries,
    pub width_mm: u64,
    pub height_mm: u64,
}

const fn standard(
    name: &'static str,
    series: SizeSeries,
    width_mm: u64,
    height_mm: u64,
) -> StandardSize {
    StandardSize {
        name,
        series,
        width_mm,
        height_mm,
    }
}

pub const STANDARD_SIZES: &[StandardSize] = &[
    standard("A0", SizeSeries::A, 841, 1189),
    standard("A1", SizeSeries::A, 594, 841),
    standard("A2", SizeSeries::A, 420, 594),
    standard("A3", SizeSeries::A, 297, 420),
    standard("A4", SizeSeries::A, 210, 297),
    standard("A5", SizeSeries::A, 148, 210),
    standard("A6", SizeSeries::A, 105, 148),
    standard("B0", SizeSeries::B, 1000, 1414),
    standard("B1", SizeSeries::B, 707, 1000),
    standard("B2", SizeSeries::B, 500, 707),
    standard("B3", SizeSeries::B, 353, 500),
    standard("B4", SizeSeries::B, 250, 353),
    standard("B5", SizeSeries::B, 176, 250),
    standard("B6", SizeSeries::B, 125, 176),
    standard("Letter", SizeSeries::NorthAmerican, 216, 279),
    standard("Legal", SizeSeries::NorthAmerican, 216, 356),
    standard("Tabloid", SizeSeries::NorthAmerican, 279, 432),
    standard("Executive", SizeSeries::NorthAmerican, 184, 267),
    standard("Business Card", SizeSeries::Other, 89, 51),
    standard("DL Envelope", SizeSeries::Other, 110, 220),
    standard("C4 Envelope", SizeSeries::Other, 229, 324),
    standard("C5 Envelope", SizeSeries::Other, 162, 229),
    standard("C6 Envelope", SizeSeries::Other, 114, 162),
    standard("Square", SizeSeries::Other, 148, 148),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub created: usize,
    pub updated: usize,
    pub links_added: usize,
}

impl SeedReport {
    pub fn changed(&self) -> bool {
        self.created + self.updated + self.links_added > 0
    }
}

/// Create or relabel every standard size, then link every size to every
/// weight. Running it twice changes nothing the second time.
pub fn seed_standard_sizes_in(ledger: &mut Ledger) -> Result<SeedReport, LedgerError> {
    let mut report = SeedReport::default();

    for standard in STANDARD_SIZES {
        let width_mm = Millimeters::whole(standard.width_mm);
        let height_mm = Millimeters::whole(standard.height_mm);
        match ledger.find_size_by_dimensions(width_mm, height_mm) {
            Some(existing) => {
                let size_id = existing.id;
                if ledger.relabel_paper_size(size_id, standard.name, standard.series)? {
                    report.updated += 1;
                }
            }
            None => {
                ledger.add_paper_size(standard.name, standard.series, width_mm, height_mm, &[])?;
                report.created += 1;
            }
        }
    }

    let weight_ids: Vec<u64> = ledger.paper_weights().map(|weight| weight.id).collect();
    let size_ids: Vec<u64> = ledger.paper_sizes().map(|size| size.id).collect();
    for size_id in &size_ids {
        for weight_id in &weight_ids {
            if ledger.link_size_to_weight(*size_id, *weight_id)? {
                report.links_added += 1;
            }
        }
    }

    tracing::info!(
        created = report.created,
        updated = report.updated,
        links_added = report.links_added,
        "seeded standard paper sizes"
    );
    Ok(report)
}
