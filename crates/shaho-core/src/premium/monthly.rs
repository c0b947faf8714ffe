use serde::{Deserialize, Serialize};

use super::PremiumSplit;
use crate::decimal::{percent_to_ratio, Money};
use crate::rates::InsuranceRates;

/// 月額保険料の計算結果。作成後は不変。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyPremiumResult {
    /// 標準報酬月額（健保等級から）
    pub health_standard_amount: Money,
    /// 標準報酬月額（厚年等級から）
    pub pension_standard_amount: Money,
    pub health: PremiumSplit,
    /// 介護保険分（40歳以上65歳未満のみ）
    pub care: Option<PremiumSplit>,
    /// 厚生年金分（70歳未満のみ）
    pub pension: Option<PremiumSplit>,
}

/// 標準報酬月額・料率・年齢から月額保険料を求める。
///
/// - 健保は介護なし料率で計算し、介護分は込み料率との差分を別建てで出す
/// - 介護は 40 <= 年齢 < 65 のときのみ、厚年は 70 歳未満のみ
/// - 各制度とも被保険者負担は折半の円未満四捨五入、事業主負担は差額
pub fn calculate_monthly_premium(
    health_standard_amount: Money,
    pension_standard_amount: Money,
    rates: &InsuranceRates,
    age: i32,
) -> MonthlyPremiumResult {
    let health_total = health_standard_amount * percent_to_ratio(rates.non_care_rate);
    let health = PremiumSplit::halve(health_total);

    let care = if (40..65).contains(&age) {
        let care_total = health_standard_amount * percent_to_ratio(rates.care_rate());
        Some(PremiumSplit::halve(care_total))
    } else {
        None
    };

    let pension = if (0..70).contains(&age) {
        let pension_total = pension_standard_amount * percent_to_ratio(rates.pension_rate);
        Some(PremiumSplit::halve(pension_total))
    } else {
        None
    };

    MonthlyPremiumResult {
        health_standard_amount,
        pension_standard_amount,
        health,
        care,
        pension,
    }
}
