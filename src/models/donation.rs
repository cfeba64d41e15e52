use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A row of `donations`. Written by the payment side, read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Donation {
    pub id: Uuid,
    pub donor_name: Option<String>,
    pub donor_email: Option<String>,
    pub amount: Decimal,
    pub currency: String,
    pub donation_date: DateTime<Utc>,
    pub status: String,
    pub notes: Option<String>,
}

impl Donation {
    pub fn donor_label(&self) -> &str {
        self.donor_name.as_deref().filter(|n| !n.trim().is_empty()).unwrap_or("Anonymous")
    }

    pub fn email_label(&self) -> &str {
        self.donor_email.as_deref().filter(|e| !e.trim().is_empty()).unwrap_or("N/A")
    }

    pub fn amount_label(&self) -> String {
        format!("{} {}", self.currency, format_amount(self.amount))
    }

    pub fn date_label(&self) -> String {
        self.donation_date.format("%Y-%m-%d").to_string()
    }
}

/// Aggregates over a full donation set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DonationStats {
    pub total: Decimal,
    pub count: usize,
    pub average: Decimal,
}

impl DonationStats {
    pub fn from_donations(donations: &[Donation]) -> Self {
        let total: Decimal = donations.iter().map(|d| d.amount).sum();
        let count = donations.len();
        let average = if count == 0 {
            Decimal::ZERO
        } else {
            total
                .checked_div(Decimal::from(count as u64))
                .unwrap_or(Decimal::ZERO)
        };
        Self { total, count, average }
    }

    pub fn total_label(&self) -> String {
        format_amount(self.total)
    }

    pub fn average_label(&self) -> String {
        format_amount(self.average)
    }
}

/// Two decimals, integer part grouped in thousands with spaces (`12 345.60`).
pub fn format_amount(amount: Decimal) -> String {
    let fixed = format!("{:.2}", amount.round_dp(2));
    let (sign, digits) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped}.{frac_part}")
}
