//! Docket number text format.

use regex::Regex;
use std::sync::OnceLock;

pub const LOCAL_DOCKET_PREFIX: &str = "LOC-";

/// Column width of a docket number in the ledger.
pub const MAX_DOCKET_LEN: usize = 20;

/// `LOC-` followed by the number zero-padded to three digits.
///
/// Wider numbers keep all their digits (`LOC-1000`).
pub fn format_local_docket(number: u64) -> String {
    format!("{LOCAL_DOCKET_PREFIX}{number:03}")
}

fn local_docket_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^LOC-(\d+)(?:-.*)?$").expect("docket regex must compile"))
}

/// Numeric part of a LOCAL docket number, if it has one.
///
/// Anything after a second `-` is ignored, so `LOC-012-A` reads as 12.
/// Digit runs too long for a counter are logged and read as `None`.
pub fn local_docket_suffix(docket_number: &str) -> Option<u64> {
    let digits = local_docket_re()
        .captures(docket_number.trim())
        .and_then(|caps| caps.get(1))?;
    match digits.as_str().parse() {
        Ok(number) => Some(number),
        Err(err) => {
            tracing::warn!(
                docket = docket_number,
                error = %err,
                "LOCAL docket suffix does not fit the counter; ignoring"
            );
            None
        }
    }
}
