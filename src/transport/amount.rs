use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer};
use serde_json::value::RawValue;

/// Reads `message-price` / `remaining-balance`, which Nexmo sends either quoted or
/// as a bare number. A bare number keeps its exact token, so `1.43000000` is not
/// shortened to `1.43`. `null` and a missing field both read as `None`.
pub fn optional_amount<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<Box<RawValue>>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let token = raw.get().trim();

    if token.starts_with('"') {
        return serde_json::from_str::<String>(token)
            .map(Some)
            .map_err(D::Error::custom);
    }
    if token.parse::<f64>().is_ok() {
        return Ok(Some(token.to_owned()));
    }
    Err(D::Error::custom(format!(
        "expected amount as JSON string or number, got {token}"
    )))
}
