use crate::date::get_month_length;
use crate::shared::entity::{Entity, UserId, ID};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingPeriod {
    Monthly,
    Yearly,
}

impl BillingPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    /// The next charge date one period after `date`. Days past the end
    /// of the target month clamp to its last day (Jan 31 -> Feb 28).
    pub fn advance(&self, date: NaiveDate) -> NaiveDate {
        let (year, month) = match self {
            Self::Yearly => (date.year() + 1, date.month()),
            Self::Monthly => {
                if date.month() == 12 {
                    (date.year() + 1, 1)
                } else {
                    (date.year(), date.month() + 1)
                }
            }
        };
        let day = date.day().min(get_month_length(year, month));
        NaiveDate::from_ymd_opt(year, month, day).expect("Clamped day is always valid")
    }
}

impl std::str::FromStr for BillingPeriod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(anyhow::anyhow!("Unknown billing period: {}", s)),
        }
    }
}

/// A recurring paid subscription charged by the daily billing sweep.
///
/// On a successful charge `next_payment_date` advances by one period;
/// on failure it is left untouched so the subscription is naturally
/// retried the next day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingSubscription {
    pub id: ID,
    pub payer: UserId,
    /// Price in minor currency units
    pub price_minor: i64,
    pub period: BillingPeriod,
    pub next_payment_date: NaiveDate,
    /// Stored payment-method token; charges are skipped without one
    pub payment_token: Option<String>,
    pub is_active: bool,
}

impl BillingSubscription {
    pub fn new(
        payer: UserId,
        price_minor: i64,
        period: BillingPeriod,
        first_payment_date: NaiveDate,
    ) -> Self {
        Self {
            id: Default::default(),
            payer,
            price_minor,
            period,
            next_payment_date: first_payment_date,
            payment_token: None,
            is_active: true,
        }
    }
}

impl Entity for BillingSubscription {
    fn id(&self) -> &ID {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().expect("Valid date")
    }

    #[test]
    fn monthly_advance() {
        assert_eq!(
            BillingPeriod::Monthly.advance(date("2021-02-15")),
            date("2021-03-15")
        );
        assert_eq!(
            BillingPeriod::Monthly.advance(date("2021-12-31")),
            date("2022-01-31")
        );
    }

    #[test]
    fn monthly_advance_clamps_to_month_end() {
        assert_eq!(
            BillingPeriod::Monthly.advance(date("2021-01-31")),
            date("2021-02-28")
        );
        assert_eq!(
            BillingPeriod::Monthly.advance(date("2020-01-31")),
            date("2020-02-29")
        );
    }

    #[test]
    fn yearly_advance() {
        assert_eq!(
            BillingPeriod::Yearly.advance(date("2021-06-01")),
            date("2022-06-01")
        );
        assert_eq!(
            BillingPeriod::Yearly.advance(date("2020-02-29")),
            date("2021-02-28")
        );
    }
}
