//! Display formatting for money amounts.
//!
//! Amounts stay exact decimals everywhere; rounding happens only here, when a
//! value is turned into text for a customer.

use std::fmt;
use std::str::FromStr;

use bigdecimal::{BigDecimal, RoundingMode, Signed};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Currency {
    /// US dollars: `$1,234.50`.
    #[default]
    Usd,
    /// Indonesian rupiah: `Rp 25.000`, no minor units.
    Idr,
}

impl Currency {
    pub fn code(self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Idr => "IDR",
        }
    }

    fn fraction_digits(self) -> i64 {
        match self {
            Currency::Usd => 2,
            Currency::Idr => 0,
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Idr => "Rp ",
        }
    }

    fn group_separator(self) -> char {
        match self {
            Currency::Usd => ',',
            Currency::Idr => '.',
        }
    }

    fn decimal_separator(self) -> char {
        match self {
            Currency::Usd => '.',
            Currency::Idr => ',',
        }
    }

    pub fn format(self, amount: &BigDecimal) -> String {
        format_amount(self, amount)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Currency::Usd),
            "IDR" => Ok(Currency::Idr),
            other => Err(format!("unsupported currency '{}'", other)),
        }
    }
}

/// Round half-up to the currency's minor unit and render with its symbol and
/// separators.
pub fn format_amount(currency: Currency, amount: &BigDecimal) -> String {
    let rounded = amount.with_scale_round(currency.fraction_digits(), RoundingMode::HalfUp);
    let sign = if rounded.is_negative() { "-" } else { "" };
    let digits = rounded.abs().to_string();

    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (digits.as_str(), None),
    };

    let mut out = String::with_capacity(digits.len() + 8);
    out.push_str(sign);
    out.push_str(currency.prefix());
    out.push_str(&group_thousands(whole, currency.group_separator()));
    if let Some(fraction) = fraction {
        out.push(currency.decimal_separator());
        out.push_str(fraction);
    }
    out
}

pub fn format_usd(amount: &BigDecimal) -> String {
    format_amount(Currency::Usd, amount)
}

pub fn format_idr(amount: &BigDecimal) -> String {
    format_amount(Currency::Idr, amount)
}

fn group_thousands(whole: &str, separator: char) -> String {
    let len = whole.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(separator);
        }
        out.push(ch);
    }
    out
}
