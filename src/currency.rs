// Display currencies. All calculations run in SAR; conversion happens once,
// right before formatting.
use crate::errors::EstimateError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "SAR")]
    Sar,
    #[serde(rename = "AED")]
    Aed,
    #[serde(rename = "USD")]
    Usd,
}

/// Multiplicative rate of each currency relative to one SAR.
pub const CONVERSION_RATES: [(Currency, f64); 3] = [
    (Currency::Sar, Currency::Sar.rate()),
    (Currency::Aed, Currency::Aed.rate()),
    (Currency::Usd, Currency::Usd.rate()),
];

impl Currency {
    pub const ALL: [Currency; 3] = [Currency::Sar, Currency::Aed, Currency::Usd];

    pub fn code(self) -> &'static str {
        match self {
            Currency::Sar => "SAR",
            Currency::Aed => "AED",
            Currency::Usd => "USD",
        }
    }

    pub const fn rate(self) -> f64 {
        match self {
            Currency::Sar => 1.0,
            Currency::Aed => 0.98,
            Currency::Usd => 0.27,
        }
    }

    pub fn convert(self, amount_sar: f64) -> f64 {
        amount_sar * self.rate()
    }
}

/// Convert a SAR amount into the currency named by `code`.
pub fn convert(amount_sar: f64, code: &str) -> Result<f64, EstimateError> {
    let currency: Currency = code.parse()?;
    Ok(currency.convert(amount_sar))
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = EstimateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SAR" => Ok(Currency::Sar),
            "AED" => Ok(Currency::Aed),
            "USD" => Ok(Currency::Usd),
            _ => Err(EstimateError::UnknownCurrency {
                code: s.trim().to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sar_is_identity() {
        assert_eq!(Currency::Sar.convert(1_234_567.89), 1_234_567.89);
        assert_eq!(convert(42.0, "SAR").unwrap(), 42.0);
    }

    #[test]
    fn conversion_is_linear() {
        for currency in Currency::ALL {
            let a = 1000.0;
            let b = 2500.0;
            let lhs = currency.convert(a + b);
            let rhs = currency.convert(a) + currency.convert(b);
            assert!((lhs - rhs).abs() < 1e-9);
            assert!((currency.convert(a) - a * currency.rate()).abs() < 1e-12);
        }
        assert!((convert(100.0, "usd").unwrap() - 27.0).abs() < 1e-9);
        assert!((convert(100.0, "AED").unwrap() - 98.0).abs() < 1e-9);
    }

    #[test]
    fn each_currency_has_its_own_rate() {
        assert_eq!(Currency::Aed.rate(), 0.98);
        assert_eq!(Currency::Usd.rate(), 0.27);
        for (currency, rate) in CONVERSION_RATES {
            assert_eq!(currency.rate(), rate);
        }
        let listed: Vec<Currency> = CONVERSION_RATES.iter().map(|(c, _)| *c).collect();
        assert_eq!(listed, Currency::ALL.to_vec());
    }

    #[test]
    fn unknown_code_is_reported() {
        let err = convert(1.0, "EUR").unwrap_err();
        assert_eq!(err, EstimateError::UnknownCurrency { code: "EUR".to_string() });
    }
}
