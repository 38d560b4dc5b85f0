//! Customer order models.
//!
//! This module defines [`OligoOrderLine`], one row of the customer's purchase
//! order, and [`QuantityTier`], the synthesis scale that selects which catalog
//! price rows apply.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Synthesis scale in micromoles.
///
/// Only two scales are sold. Any other requested amount is rejected by the
/// reconciliation engine.
///
/// # Example
///
/// ```
/// use oligo_billing::models::QuantityTier;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let tier = QuantityTier::from_amount(Decimal::from_str("0.20").unwrap());
/// assert_eq!(tier, Some(QuantityTier::PointTwo));
/// assert_eq!(QuantityTier::One.to_string(), "1");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuantityTier {
    /// 1 umole scale.
    #[serde(rename = "1")]
    One,
    /// 0.2 umole scale.
    #[serde(rename = "0.2")]
    PointTwo,
}

impl QuantityTier {
    /// Maps a requested amount onto a tier, comparing numerically so that
    /// `1`, `1.0` and `1.00` are all the 1 umole tier.
    pub fn from_amount(amount: Decimal) -> Option<Self> {
        if amount == Decimal::ONE {
            Some(Self::One)
        } else if amount == Decimal::new(2, 1) {
            Some(Self::PointTwo)
        } else {
            None
        }
    }

    /// The label fragment used in catalog descriptions and statement specs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::One => "1",
            Self::PointTwo => "0.2",
        }
    }
}

impl fmt::Display for QuantityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One requested oligo from the customer order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OligoOrderLine {
    /// Oligo name (Oligo Name column). Used as the result key.
    pub name: String,
    /// Requested synthesis amount in umole (Amount column), not yet validated.
    pub amount: Decimal,
    /// Length in monomers (mer column).
    pub length: u32,
    /// 5' modification label, trimmed. Empty means none.
    pub mod5: String,
    /// 3' modification label, trimmed. Empty means none.
    pub mod3: String,
}

impl OligoOrderLine {
    /// Creates an order line, trimming the modification labels.
    pub fn new(
        name: impl Into<String>,
        amount: Decimal,
        length: u32,
        mod5: &str,
        mod3: &str,
    ) -> Self {
        Self {
            name: name.into(),
            amount,
            length,
            mod5: mod5.trim().to_string(),
            mod3: mod3.trim().to_string(),
        }
    }

    /// Returns true if neither end carries a modification.
    pub fn is_unmodified(&self) -> bool {
        self.mod5.is_empty() && self.mod3.is_empty()
    }
}
