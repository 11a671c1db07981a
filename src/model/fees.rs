use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Membership tiers an operator can assign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum MembershipType {
    Platinum,
    Diamond,
    Gold,
    Standard,
}

impl MembershipType {
    pub const ALL: [MembershipType; 4] = [
        MembershipType::Platinum,
        MembershipType::Diamond,
        MembershipType::Gold,
        MembershipType::Standard,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MembershipType::Platinum => "Platinum",
            MembershipType::Diamond => "Diamond",
            MembershipType::Gold => "Gold",
            MembershipType::Standard => "Standard",
        }
    }

    /// Monthly fee charged for the tier before any class costs.
    pub fn standard_fee(self) -> f64 {
        match self {
            MembershipType::Platinum => 10_000.0,
            MembershipType::Diamond => 7_500.0,
            MembershipType::Gold => 4_000.0,
            MembershipType::Standard => 2_000.0,
        }
    }
}

impl fmt::Display for MembershipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MembershipType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        MembershipType::ALL
            .into_iter()
            .find(|tier| tier.as_str() == value)
            .ok_or_else(|| value.to_string())
    }
}

/// Membership type name -> monthly base fee.
///
/// Lookups use the stored text, so rows carrying a type the schedule does not
/// know simply miss and the caller decides on the fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct FeeSchedule {
    fees: BTreeMap<String, f64>,
}

impl FeeSchedule {
    /// Creates a schedule with no entries.
    pub fn empty() -> Self {
        Self {
            fees: BTreeMap::new(),
        }
    }

    /// Inserts or replaces the fee for a membership type.
    pub fn with_fee(mut self, membership_type: impl Into<String>, fee: f64) -> Self {
        self.fees.insert(membership_type.into(), fee);
        self
    }

    pub fn base_fee(&self, membership_type: &str) -> Option<f64> {
        self.fees.get(membership_type).copied()
    }
}

impl Default for FeeSchedule {
    fn default() -> Self {
        MembershipType::ALL
            .into_iter()
            .fold(FeeSchedule::empty(), |schedule, tier| {
                schedule.with_fee(tier.as_str(), tier.standard_fee())
            })
    }
}
