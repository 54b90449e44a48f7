//! Read-side compatibility queries.

use crate::error::CatalogError;
use printdesk_store::{Ledger, PaperSize, PaperType, PaperWeight};
use serde::{Deserialize, Serialize};

/// The allow-lists of one product type, resolved to catalog rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecificationView {
    pub product_type_id: u64,
    pub paper_types: Vec<PaperType>,
    pub paper_weights: Vec<PaperWeight>,
    pub paper_sizes: Vec<PaperSize>,
}

/// Weights producible on a paper type, lightest first.
///
/// An unknown paper type is `NotFound`; a known one with no edges is an
/// empty list.
pub fn compatible_weights_in(
    ledger: &Ledger,
    paper_type_id: u64,
) -> Result<Vec<PaperWeight>, CatalogError> {
    if ledger.paper_type(paper_type_id).is_none() {
        return Err(CatalogError::NotFound(format!(
            "paper type not found: {paper_type_id}"
        )));
    }
    let mut weights: Vec<PaperWeight> = ledger
        .paper_weights()
        .filter(|weight| weight.paper_type_ids.contains(&paper_type_id))
        .cloned()
        .collect();
    sort_weights(&mut weights);
    Ok(weights)
}

/// Sizes available in a weight, or every size when `paper_weight_id` is
/// `None`. Ordered by series, then name.
pub fn compatible_sizes_in(
    ledger: &Ledger,
    paper_weight_id: Option<u64>,
) -> Result<Vec<PaperSize>, CatalogError> {
    let mut sizes: Vec<PaperSize> = match paper_weight_id {
        None => ledger.paper_sizes().cloned().collect(),
        Some(weight_id) => {
            if ledger.paper_weight(weight_id).is_none() {
                return Err(CatalogError::NotFound(format!(
                    "paper weight not found: {weight_id}"
                )));
            }
            ledger
                .paper_sizes()
                .filter(|size| size.paper_weight_ids.contains(&weight_id))
                .cloned()
                .collect()
        }
    };
    sort_sizes(&mut sizes);
    Ok(sizes)
}

/// The explicit specification override for a product type.
///
/// Without an override all three lists are empty; there is no fallback to
/// the compatibility graph.
pub fn specification_for_in(
    ledger: &Ledger,
    product_type_id: u64,
) -> Result<SpecificationView, CatalogError> {
    if ledger.product_type(product_type_id).is_none() {
        return Err(CatalogError::NotFound(format!(
            "product type not found: {product_type_id}"
        )));
    }
    let Some(spec) = ledger.specification(product_type_id) else {
        return Ok(SpecificationView {
            product_type_id,
            ..SpecificationView::default()
        });
    };

    let mut paper_types: Vec<PaperType> = spec
        .paper_type_ids
        .iter()
        .filter_map(|id| ledger.paper_type(*id))
        .cloned()
        .collect();
    paper_types.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

    let mut paper_weights: Vec<PaperWeight> = spec
        .paper_weight_ids
        .iter()
        .filter_map(|id| ledger.paper_weight(*id))
        .cloned()
        .collect();
    sort_weights(&mut paper_weights);

    let mut paper_sizes: Vec<PaperSize> = spec
        .paper_size_ids
        .iter()
        .filter_map(|id| ledger.paper_size(*id))
        .cloned()
        .collect();
    sort_sizes(&mut paper_sizes);

    Ok(SpecificationView {
        product_type_id,
        paper_types,
        paper_weights,
        paper_sizes,
    })
}

fn sort_weights(weights: &mut [PaperWeight]) {
    weights.sort_by(|a, b| a.gsm.cmp(&b.gsm).then(a.id.cmp(&b.id)));
}

fn sort_sizes(sizes: &mut [PaperSize]) {
    sizes.sort_by(|a, b| {
        a.series
            .cmp(&b.series)
            .then_with(|| a.name.cmp(&b.name))
            .then(a.id.cmp(&b.id))
    });
}
