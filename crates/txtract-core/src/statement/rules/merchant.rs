//! Merchant text cleanup.

use super::patterns::{TRAILING_PHONE, TRAILING_STATE};

/// Strip a trailing state code and phone number, then collapse whitespace.
///
/// `"STARBUCKS 800-782-7282 WA"` becomes `"STARBUCKS"`.
pub fn clean_merchant(text: &str) -> String {
    let without_state = TRAILING_STATE.replace(text.trim(), "");
    let without_phone = TRAILING_PHONE.replace(&without_state, "");
    without_phone.split_whitespace().collect::<Vec<_>>().join(" ")
}
