use thiserror::Error;

use super::*;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum QuantityParseError {
    #[error("empty quantity")]
    Empty,
    #[error("invalid number in quantity {0:?}")]
    InvalidNumber(String),
    #[error("unknown suffix {suffix:?} in quantity {quantity:?}")]
    UnknownSuffix { quantity: String, suffix: String },
}

/// Numeric views of a Kubernetes `Quantity` such as `"3500m"`, `"8Gi"` or `"1e3"`.
pub trait QuantityExt {
    fn to_f64(&self) -> Result<f64, QuantityParseError>;

    /// Whole cores, rounded up the way `Quantity.Value()` does.
    fn to_cores(&self) -> Result<i64, QuantityParseError> {
        self.to_f64().map(|value| value.ceil() as i64)
    }

    /// Bytes, rounded up.
    fn to_memory(&self) -> Result<i64, QuantityParseError> {
        self.to_f64().map(|value| value.ceil() as i64)
    }
}

impl QuantityExt for resource::Quantity {
    fn to_f64(&self) -> Result<f64, QuantityParseError> {
        parse(&self.0)
    }
}

fn parse(text: &str) -> Result<f64, QuantityParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(QuantityParseError::Empty);
    }

    let split = text
        .find(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | '+' | '-')))
        .unwrap_or(text.len());
    let (number, suffix) = text.split_at(split);
    let number = number
        .parse::<f64>()
        .map_err(|_| QuantityParseError::InvalidNumber(text.to_string()))?;
    let multiplier = multiplier(suffix).ok_or_else(|| QuantityParseError::UnknownSuffix {
        quantity: text.to_string(),
        suffix: suffix.to_string(),
    })?;

    Ok(number * multiplier)
}

fn multiplier(suffix: &str) -> Option<f64> {
    let multiplier = match suffix {
        "" => 1.0,
        "n" => 1e-9,
        "u" => 1e-6,
        "m" => 1e-3,
        "k" => 1e3,
        "M" => 1e6,
        "G" => 1e9,
        "T" => 1e12,
        "P" => 1e15,
        "E" => 1e18,
        "Ki" => 1024_f64,
        "Mi" => 1024_f64.powi(2),
        "Gi" => 1024_f64.powi(3),
        "Ti" => 1024_f64.powi(4),
        "Pi" => 1024_f64.powi(5),
        "Ei" => 1024_f64.powi(6),
        other => {
            let exponent = other.strip_prefix(['e', 'E'])?.parse::<i32>().ok()?;
            10_f64.powi(exponent)
        }
    };
    Some(multiplier)
}
