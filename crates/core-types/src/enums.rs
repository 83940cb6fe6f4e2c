use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Spend above which a long-tenured customer is labeled VIP.
pub const VIP_SPEND_THRESHOLD: Decimal = dec!(5000);

/// Months of order history that separate New customers from Regular/VIP.
pub const LOYALTY_MONTHS: i32 = 12;

/// Revenue above which a product is a High Performer.
pub const HIGH_PERFORMER_REVENUE: Decimal = dec!(50000);

/// Revenue at or above which a product is at least a Mid Performer.
pub const MID_PERFORMER_REVENUE: Decimal = dec!(10000);

/// Customer segment label derived from lifespan and total spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CustomerSegment {
    #[serde(rename = "VIP")]
    Vip,
    Regular,
    New,
}

impl CustomerSegment {
    /// Classifies a customer from its aggregate metrics.
    ///
    /// The three outcomes are mutually exclusive and exhaustive: VIP and
    /// Regular both require at least [`LOYALTY_MONTHS`] of history and are
    /// split by [`VIP_SPEND_THRESHOLD`] (strictly above for VIP); everyone
    /// else is New.
    pub fn classify(lifespan_months: i32, total_sales: Decimal) -> Self {
        if lifespan_months >= LOYALTY_MONTHS && total_sales > VIP_SPEND_THRESHOLD {
            CustomerSegment::Vip
        } else if lifespan_months >= LOYALTY_MONTHS {
            CustomerSegment::Regular
        } else {
            CustomerSegment::New
        }
    }
}

impl fmt::Display for CustomerSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CustomerSegment::Vip => "VIP",
            CustomerSegment::Regular => "Regular",
            CustomerSegment::New => "New",
        };
        f.write_str(label)
    }
}

impl FromStr for CustomerSegment {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "vip" => Ok(CustomerSegment::Vip),
            "regular" => Ok(CustomerSegment::Regular),
            "new" => Ok(CustomerSegment::New),
            other => Err(CoreError::InvalidInput(
                "customer segment".to_string(),
                format!("unknown label '{other}' (expected VIP, Regular or New)"),
            )),
        }
    }
}

/// Product segment label derived from total revenue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductSegment {
    #[serde(rename = "High Performer")]
    HighPerformer,
    #[serde(rename = "Mid Performer")]
    MidPerformer,
    #[serde(rename = "Low Performer")]
    LowPerformer,
}

impl ProductSegment {
    /// Classifies a product from its total revenue. Both Mid boundaries are
    /// inclusive: exactly 10 000 and exactly 50 000 are Mid Performers.
    pub fn classify(total_sales: Decimal) -> Self {
        if total_sales > HIGH_PERFORMER_REVENUE {
            ProductSegment::HighPerformer
        } else if total_sales >= MID_PERFORMER_REVENUE {
            ProductSegment::MidPerformer
        } else {
            ProductSegment::LowPerformer
        }
    }
}

impl fmt::Display for ProductSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProductSegment::HighPerformer => "High Performer",
            ProductSegment::MidPerformer => "Mid Performer",
            ProductSegment::LowPerformer => "Low Performer",
        };
        f.write_str(label)
    }
}

impl FromStr for ProductSegment {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "high" | "high performer" => Ok(ProductSegment::HighPerformer),
            "mid" | "mid performer" => Ok(ProductSegment::MidPerformer),
            "low" | "low performer" => Ok(ProductSegment::LowPerformer),
            other => Err(CoreError::InvalidInput(
                "product segment".to_string(),
                format!("unknown label '{other}' (expected High, Mid or Low)"),
            )),
        }
    }
}

/// Demographic age bucket used by the customer report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgeGroup {
    #[serde(rename = "Under 20")]
    Under20,
    #[serde(rename = "21-29")]
    From21To29,
    #[serde(rename = "31-39")]
    From31To39,
    #[serde(rename = "41-49")]
    From41To49,
    #[serde(rename = "50 and above")]
    FiftyAndAbove,
}

impl AgeGroup {
    /// Buckets an age exactly the way the legacy report does.
    ///
    /// The ranges deliberately leave 20, 30 and 40 unmatched; those ages fall
    /// through to the final bucket. Kept for output compatibility with the
    /// existing reports.
    pub fn from_age(age: i32) -> Self {
        match age {
            a if a < 20 => AgeGroup::Under20,
            21..=29 => AgeGroup::From21To29,
            31..=39 => AgeGroup::From31To39,
            41..=49 => AgeGroup::From41To49,
            _ => AgeGroup::FiftyAndAbove,
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AgeGroup::Under20 => "Under 20",
            AgeGroup::From21To29 => "21-29",
            AgeGroup::From31To39 => "31-39",
            AgeGroup::From41To49 => "41-49",
            AgeGroup::FiftyAndAbove => "50 and above",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_segment_boundaries() {
        // VIP needs both the full year of history and spend strictly above the threshold.
        assert_eq!(CustomerSegment::classify(12, dec!(5000.01)), CustomerSegment::Vip);
        assert_eq!(CustomerSegment::classify(24, dec!(9000)), CustomerSegment::Vip);
        // Spend exactly at the threshold stays Regular.
        assert_eq!(CustomerSegment::classify(12, dec!(5000)), CustomerSegment::Regular);
        assert_eq!(CustomerSegment::classify(12, dec!(100)), CustomerSegment::Regular);
        // Less than a year of history is always New, whatever the spend.
        assert_eq!(CustomerSegment::classify(11, dec!(99999)), CustomerSegment::New);
        assert_eq!(CustomerSegment::classify(0, dec!(0)), CustomerSegment::New);
    }

    #[test]
    fn test_product_segment_boundaries() {
        assert_eq!(ProductSegment::classify(dec!(60000)), ProductSegment::HighPerformer);
        assert_eq!(ProductSegment::classify(dec!(50000.01)), ProductSegment::HighPerformer);
        // Both Mid boundaries are inclusive.
        assert_eq!(ProductSegment::classify(dec!(50000)), ProductSegment::MidPerformer);
        assert_eq!(ProductSegment::classify(dec!(10000)), ProductSegment::MidPerformer);
        assert_eq!(ProductSegment::classify(dec!(9999.99)), ProductSegment::LowPerformer);
        assert_eq!(ProductSegment::classify(dec!(0)), ProductSegment::LowPerformer);
    }

    #[test]
    fn test_age_group_ladder_including_gaps() {
        assert_eq!(AgeGroup::from_age(19), AgeGroup::Under20);
        assert_eq!(AgeGroup::from_age(21), AgeGroup::From21To29);
        assert_eq!(AgeGroup::from_age(29), AgeGroup::From21To29);
        assert_eq!(AgeGroup::from_age(31), AgeGroup::From31To39);
        assert_eq!(AgeGroup::from_age(41), AgeGroup::From41To49);
        assert_eq!(AgeGroup::from_age(49), AgeGroup::From41To49);
        assert_eq!(AgeGroup::from_age(50), AgeGroup::FiftyAndAbove);
        // 20, 30 and 40 sit in none of the ranges and land in the last bucket.
        assert_eq!(AgeGroup::from_age(20), AgeGroup::FiftyAndAbove);
        assert_eq!(AgeGroup::from_age(30), AgeGroup::FiftyAndAbove);
        assert_eq!(AgeGroup::from_age(40), AgeGroup::FiftyAndAbove);
    }

    #[test]
    fn test_segment_labels() {
        assert_eq!(CustomerSegment::Vip.to_string(), "VIP");
        assert_eq!(ProductSegment::HighPerformer.to_string(), "High Performer");
        assert_eq!(AgeGroup::FiftyAndAbove.to_string(), "50 and above");
    }

    #[test]
    fn test_segment_parsing() {
        assert_eq!("VIP".parse::<CustomerSegment>().unwrap(), CustomerSegment::Vip);
        assert_eq!("regular".parse::<CustomerSegment>().unwrap(), CustomerSegment::Regular);
        assert_eq!("High Performer".parse::<ProductSegment>().unwrap(), ProductSegment::HighPerformer);
        assert_eq!("low".parse::<ProductSegment>().unwrap(), ProductSegment::LowPerformer);
        assert!("platinum".parse::<CustomerSegment>().is_err());
    }
}
