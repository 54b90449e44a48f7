//! Resolve-or-create for ad-hoc sheet sizes.

use crate::error::CatalogError;
use printdesk_store::{Ledger, Millimeters, PaperSize, SizeSeries};
use serde::{Deserialize, Serialize};

pub const CUSTOM_SIZE_PREFIX: &str = "Custom Size";

/// An ad-hoc size as entered at job intake. Dimensions are raw text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomSizeRequest {
    #[serde(default)]
    pub name: String,
    pub width_mm: String,
    pub height_mm: String,
    pub paper_weight_id: u64,
}

impl CustomSizeRequest {
    pub fn new(
        width_mm: impl Into<String>,
        height_mm: impl Into<String>,
        paper_weight_id: u64,
    ) -> Self {
        Self {
            name: String::new(),
            width_mm: width_mm.into(),
            height_mm: height_mm.into(),
            paper_weight_id,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeResolution {
    pub size: PaperSize,
    pub created: bool,
}

fn parse_dimension(field: &str, raw: &str) -> Result<Millimeters, CatalogError> {
    let value: Millimeters = raw
        .parse()
        .map_err(|err| CatalogError::invalid_dimension(field, raw, err))?;
    if value.is_zero() {
        return Err(CatalogError::ValidationFailed(format!(
            "{field} must be greater than zero"
        )));
    }
    Ok(value)
}

fn is_custom_name(name: &str) -> bool {
    name.get(..CUSTOM_SIZE_PREFIX.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(CUSTOM_SIZE_PREFIX))
}

/// Every digit in the name read as one number; `Custom Size 2b7` is 27.
fn embedded_number(name: &str) -> u64 {
    let digits: String = name.chars().filter(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

/// `Custom Size N`, one past the highest number among existing custom names.
pub fn next_custom_size_name(ledger: &Ledger) -> String {
    let highest = ledger
        .paper_sizes()
        .filter(|size| is_custom_name(&size.name))
        .map(|size| embedded_number(&size.name))
        .max()
        .unwrap_or(0);
    format!("{CUSTOM_SIZE_PREFIX} {}", highest.saturating_add(1))
}

/// Find the sheet in either orientation or create it, then link the weight.
///
/// Returns the resolution and whether the ledger changed. Calling twice with
/// the same dimensions never creates a second row.
pub fn resolve_or_create_in(
    ledger: &mut Ledger,
    request: &CustomSizeRequest,
) -> Result<(SizeResolution, bool), CatalogError> {
    let width_mm = parse_dimension("width_mm", &request.width_mm)?;
    let height_mm = parse_dimension("height_mm", &request.height_mm)?;
    let weight_id = request.paper_weight_id;
    if ledger.paper_weight(weight_id).is_none() {
        return Err(CatalogError::NotFound(format!(
            "paper weight not found: {weight_id}"
        )));
    }

    if let Some(existing) = ledger.find_size_by_dimensions(width_mm, height_mm) {
        let size_id = existing.id;
        let linked = ledger.link_size_to_weight(size_id, weight_id)?;
        let size = ledger
            .paper_size(size_id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(format!("paper size not found: {size_id}")))?;
        tracing::debug!(size = %size.name, linked, "custom size resolved to existing sheet");
        return Ok((
            SizeResolution {
                size,
                created: false,
            },
            linked,
        ));
    }

    let requested = request.name.trim();
    let name = if requested.is_empty() || is_custom_name(requested) {
        next_custom_size_name(ledger)
    } else {
        requested.to_string()
    };
    let size = ledger
        .add_paper_size(&name, SizeSeries::Other, width_mm, height_mm, &[weight_id])?
        .clone();
    tracing::info!(
        size = %size.name,
        width_mm = %size.width_mm,
        height_mm = %size.height_mm,
        "created custom paper size"
    );
    Ok((
        SizeResolution {
            size,
            created: true,
        },
        true,
    ))
}
