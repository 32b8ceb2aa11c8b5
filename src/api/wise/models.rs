use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Worth of a balance in its own currency
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TotalWorth {
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: f64,
}

/// One entry of the GET balances response.
///
/// Wise returns many more fields per balance (id, type, amount, reservedAmount, ...);
/// only the ones we re-expose are kept and the rest are skipped by serde.
/// Missing or null fields decode as their zero value rather than failing the batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    #[serde(default, deserialize_with = "null_as_default")]
    pub currency: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total_worth: TotalWorth,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
impl Balance {
    pub fn new(currency: impl Into<String>, value: f64) -> Self {
        Self {
            currency: currency.into(),
            total_worth: TotalWorth { value },
        }
    }
}

/// Error returned by the Wise API client
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// 401 Unauthorized (bad or expired API key)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    /// 403 Forbidden (key lacks access to the profile)
    #[error("Forbidden: {0}")]
    Forbidden(String),
    /// 404 Not Found (unknown profile)
    #[error("Not Found: {0}")]
    NotFound(String),
    /// 429 Too Many Requests
    #[error("Rate Limited: {0}")]
    RateLimited(String),
    /// 5xx Server Error
    #[error("Server Error ({0}): {1}")]
    Server(u16, String),
    /// Other non-success HTTP status
    #[error("HTTP Error ({0}): {1}")]
    Http(u16, String),
    /// Network/request error
    #[error("Request Error: {0}")]
    Request(String),
    /// Body is not a JSON array of balances
    #[error("Deserialization Error: {0}")]
    Deserialization(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_ignores_extra_fields() {
        let body = r#"[{
            "id": 123,
            "currency": "EUR",
            "type": "STANDARD",
            "amount": {"value": 10.0, "currency": "EUR"},
            "totalWorth": {"value": 10.25, "currency": "EUR"}
        }]"#;

        let balances: Vec<Balance> = serde_json::from_str(body).expect("parse failed");

        assert_eq!(balances, vec![Balance::new("EUR", 10.25)]);
    }

    #[test]
    fn test_missing_or_null_fields_are_zero() {
        let body = r#"[
            {"currency": "EUR"},
            {"currency": "GBP", "totalWorth": null},
            {"currency": "USD", "totalWorth": {}},
            {"currency": null, "totalWorth": {"value": null}},
            {"totalWorth": {"value": 7.5}}
        ]"#;

        let balances: Vec<Balance> = serde_json::from_str(body).expect("parse failed");

        assert_eq!(
            balances,
            vec![
                Balance::new("EUR", 0.0),
                Balance::new("GBP", 0.0),
                Balance::new("USD", 0.0),
                Balance::new("", 0.0),
                Balance::new("", 7.5),
            ]
        );
    }

    #[test]
    fn test_wrong_value_type_still_fails() {
        let body = r#"[{"currency": "EUR", "totalWorth": {"value": "ten"}}]"#;

        assert!(serde_json::from_str::<Vec<Balance>>(body).is_err());
    }
}
