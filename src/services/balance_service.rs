use crate::api::wise::Balance;
use crate::models::BalancePair;

/// Reduce balances to `[currency, value]` pairs, keeping upstream order
pub fn to_pairs(balances: &[Balance]) -> Vec<BalancePair<'_>> {
    balances
        .iter()
        .map(|b| BalancePair(&b.currency, b.total_worth.value))
        .collect()
}

/// Serialize balances as a JSON array of `[currency, value]` arrays.
///
/// An empty slice encodes as `[]`.
pub fn render_json(balances: &[Balance]) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(&to_pairs(balances))
}

/// Render balances as `CUR: 0.00` lines, each terminated by a newline
pub fn render_text(balances: &[Balance]) -> String {
    balances
        .iter()
        .map(|b| format!("{}: {:.2}\n", b.currency, b.total_worth.value))
        .collect()
}
