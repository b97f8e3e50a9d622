//! Lenient deserializers for client-supplied JSON.

use bazaar_core::ProductId;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Int(i64),
    Uint(u64),
}

impl StringOrNumber {
    fn into_string(self) -> String {
        match self {
            Self::String(s) => s,
            Self::Int(n) => n.to_string(),
            Self::Uint(n) => n.to_string(),
        }
    }
}

/// Accept a product id sent as either a JSON string or a JSON integer.
///
/// Blank strings and `null` come back as `None`.
pub fn optional_product_id<'de, D>(deserializer: D) -> Result<Option<ProductId>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<StringOrNumber>::deserialize(deserializer)?;
    Ok(raw
        .map(StringOrNumber::into_string)
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
        .map(ProductId::new))
}

/// Accept a required product id sent as a JSON string or integer.
pub fn product_id<'de, D>(deserializer: D) -> Result<ProductId, D::Error>
where
    D: Deserializer<'de>,
{
    optional_product_id(deserializer)?
        .ok_or_else(|| serde::de::Error::custom("product id cannot be blank"))
}

/// Accept a free-text field sent as a string or a number (phone, pincode).
pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<StringOrNumber>::deserialize(deserializer)?;
    Ok(raw.map(StringOrNumber::into_string).unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Quantity {
    Int(i64),
    Float(f64),
    String(String),
}

/// Accept a quantity sent as an integer, a float or a numeric string.
///
/// Fractions truncate toward zero; anything unparseable becomes 0, which
/// callers reject as an invalid quantity.
pub fn lenient_qty<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Quantity>::deserialize(deserializer)?;
    #[allow(clippy::cast_possible_truncation)] // saturating float-to-int cast
    let qty = match raw {
        Some(Quantity::Int(n)) => n,
        Some(Quantity::Float(f)) => f.trunc() as i64,
        Some(Quantity::String(s)) => s.trim().parse().unwrap_or(0),
        None => 0,
    };
    Ok(qty)
}
