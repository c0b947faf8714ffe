pub mod bonus;
pub mod monthly;
pub mod revision;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::{round_half_up, Money};

pub use bonus::{
    calculate_bonus_year, BonusContext, BonusHistoryItem, BonusLeaveKind, BonusPremiumResult,
    HealthCapAccumulator, LeaveCalendar,
};
pub use monthly::{calculate_monthly_premium, MonthlyPremiumResult};
pub use revision::{
    calculate_revision, DayCountCategory, MonthlyPayment, RevisionAverage, RevisionInput,
};

/// 保険料の労使折半。
/// 被保険者負担は総額の半分を円未満四捨五入、事業主負担は総額との差。
/// 二重丸めで1円ずれないよう、両者の和は常に総額と一致する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PremiumSplit {
    pub total: Money,
    pub employee: Money,
    pub employer: Money,
}

impl PremiumSplit {
    pub fn halve(total: Money) -> Self {
        let employee = round_half_up(total / Decimal::TWO);
        Self {
            total,
            employee,
            employer: total - employee,
        }
    }

    pub fn zero() -> Self {
        Self {
            total: Money::ZERO,
            employee: Money::ZERO,
            employer: Money::ZERO,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.total.is_zero()
    }
}
