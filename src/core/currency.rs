//! Currency codes, rate snapshots and the rate source abstraction

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

macro_rules! currency_codes {
    ($($variant:ident => $code:literal),+ $(,)?) => {
        /// A supported ISO 4217 currency. The set is closed.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
        pub enum CurrencyCode {
            $(
                #[serde(rename = $code)]
                $variant,
            )+
        }

        impl CurrencyCode {
            /// Every known currency, in alphabetical order.
            pub const ALL: &'static [CurrencyCode] = &[$(CurrencyCode::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(CurrencyCode::$variant => $code,)+
                }
            }
        }
    };
}

currency_codes! {
    Aed => "AED", Amd => "AMD", Ars => "ARS", Aud => "AUD", Azn => "AZN",
    Bdt => "BDT", Bgn => "BGN", Brl => "BRL", Byn => "BYN", Cad => "CAD",
    Chf => "CHF", Clp => "CLP", Cny => "CNY", Cop => "COP", Czk => "CZK",
    Dkk => "DKK", Egp => "EGP", Eur => "EUR", Gbp => "GBP", Gel => "GEL",
    Hkd => "HKD", Huf => "HUF", Idr => "IDR", Ils => "ILS", Inr => "INR",
    Jpy => "JPY", Kgs => "KGS", Krw => "KRW", Kzt => "KZT", Mdl => "MDL",
    Mxn => "MXN", Myr => "MYR", Ngn => "NGN", Nok => "NOK", Nzd => "NZD",
    Pen => "PEN", Php => "PHP", Pkr => "PKR", Pln => "PLN", Ron => "RON",
    Rsd => "RSD", Rub => "RUB", Sar => "SAR", Sek => "SEK", Sgd => "SGD",
    Thb => "THB", Try => "TRY", Twd => "TWD", Uah => "UAH", Usd => "USD",
    Uzs => "UZS", Vnd => "VND", Zar => "ZAR",
}

impl CurrencyCode {
    /// Selection used until the user picks their own currencies.
    pub const DEFAULT_SELECTION: [CurrencyCode; 4] = [
        CurrencyCode::Gel,
        CurrencyCode::Rub,
        CurrencyCode::Eur,
        CurrencyCode::Usd,
    ];
}

impl Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CurrencyCode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        CurrencyCode::ALL
            .iter()
            .copied()
            .find(|code| code.as_str() == upper)
            .ok_or_else(|| anyhow!("Unknown currency code: {}", s))
    }
}

/// Exchange rates relative to a single base currency, as fetched on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSnapshot {
    pub base: CurrencyCode,
    pub rates: HashMap<CurrencyCode, f64>,
    pub fetched_on: NaiveDate,
    pub provider_updated_on: NaiveDate,
}

impl RateSnapshot {
    /// Units of `currency` per one unit of the base, if known and nonzero.
    pub fn rate(&self, currency: CurrencyCode) -> Option<f64> {
        self.rates.get(&currency).copied().filter(|rate| *rate != 0.0)
    }

    /// A snapshot is complete when every known currency has a rate.
    pub fn is_complete(&self) -> bool {
        CurrencyCode::ALL
            .iter()
            .all(|code| self.rates.contains_key(code))
    }
}

#[async_trait]
pub trait RateSource: Send + Sync {
    /// Fetches current rates with `base` as the pivot. One attempt per call.
    async fn fetch_rates(&self, base: CurrencyCode) -> Result<RateSnapshot>;
}
