use serde::{Deserialize, Serialize};
use strum::AsRefStr;

use crate::decimal::{floor_to_unit, Money};
use crate::error::EngineResult;

/// 支払基礎日数の判定に使う就労区分
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
pub enum DayCountCategory {
    /// 一般の被保険者（17日以上）
    General,
    /// 短時間就労者。17日以上の月があればそれを使い、
    /// なければ15〜16日の月で代替する
    ShortTime,
    /// 特定適用事業所の短時間労働者（11日以上）
    ShortTimeSpecial,
}

/// 報酬月額1か月ぶんの届出データ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyPayment {
    /// 月（4〜6月の定時決定なら 4, 5, 6）
    pub month: u8,
    /// 報酬額。未報告なら None
    pub amount: Option<Money>,
    /// 支払基礎日数。未報告なら None
    pub paid_days: Option<u32>,
    /// 遡及払いぶん。平均前に控除する
    pub retro_pay: Option<Money>,
    /// 途中入社などの月途中月
    pub partial_month: bool,
    /// 低額支給として除外フラグ済み
    pub low_payment: bool,
}

#[derive(Debug, Clone)]
pub struct RevisionInput<'a> {
    pub months: &'a [MonthlyPayment],
    pub category: DayCountCategory,
    /// 従前の標準報酬月額。対象月が無いときのフォールバック
    pub previous_standard: Option<Money>,
}

/// 平均計算の結果。等級への当てはめは呼び出し側（エンジン）が行う。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionAverage {
    /// 1円未満切り捨て後の平均額（フォールバック時は従前額そのもの）
    pub average: Money,
    pub used_months: Vec<u8>,
    /// 対象月が無く従前額（なければ0）を返したか
    pub fell_back: bool,
}

fn qualifies(payment: &MonthlyPayment, min_days: u32) -> bool {
    if payment.partial_month || payment.low_payment {
        return false;
    }
    match (payment.amount, payment.paid_days) {
        (Some(_), Some(days)) => days >= min_days,
        _ => false,
    }
}

fn adjusted_amount(payment: &MonthlyPayment) -> Money {
    let amount = payment.amount.unwrap_or(Money::ZERO);
    amount - payment.retro_pay.unwrap_or(Money::ZERO)
}

/// 3か月の報酬から改定用の平均額を求める。
///
/// - 区分ごとの最低支払基礎日数で対象月を絞る
/// - 月途中・低額フラグの月は区分によらず除外
/// - 遡及払いは平均前に控除
/// - 対象月0なら従前の標準報酬月額（なければ0）をそのまま返す
/// - 平均は1円未満切り捨て（賞与の1000円単位とは異なる）
pub fn calculate_revision(input: &RevisionInput<'_>) -> EngineResult<RevisionAverage> {
    let qualifying: Vec<&MonthlyPayment> = match input.category {
        DayCountCategory::General => {
            input.months.iter().filter(|m| qualifies(m, 17)).collect()
        }
        DayCountCategory::ShortTimeSpecial => {
            input.months.iter().filter(|m| qualifies(m, 11)).collect()
        }
        DayCountCategory::ShortTime => {
            let full: Vec<&MonthlyPayment> =
                input.months.iter().filter(|m| qualifies(m, 17)).collect();
            if !full.is_empty() {
                full
            } else {
                // 15〜16日の月で代替
                input
                    .months
                    .iter()
                    .filter(|m| {
                        qualifies(m, 15)
                            && m.paid_days.map_or(false, |days| days <= 16)
                    })
                    .collect()
            }
        }
    };

    if qualifying.is_empty() {
        return Ok(RevisionAverage {
            average: input.previous_standard.unwrap_or(Money::ZERO),
            used_months: vec![],
            fell_back: true,
        });
    }

    let sum: Money = qualifying.iter().map(|m| adjusted_amount(m)).sum();
    let count = Money::from(qualifying.len() as u32);
    let average = floor_to_unit(sum / count, Money::ONE)?;

    Ok(RevisionAverage {
        average,
        used_months: qualifying.iter().map(|m| m.month).collect(),
        fell_back: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn payment(month: u8, amount: Money, days: u32) -> MonthlyPayment {
        MonthlyPayment {
            month,
            amount: Some(amount),
            paid_days: Some(days),
            retro_pay: None,
            partial_month: false,
            low_payment: false,
        }
    }

    #[test]
    fn general_requires_seventeen_days() {
        let months = [
            payment(4, dec!(300000), 20),
            payment(5, dec!(310000), 10),
            payment(6, dec!(320000), 18),
        ];
        let result = calculate_revision(&RevisionInput {
            months: &months,
            category: DayCountCategory::General,
            previous_standard: None,
        })
        .unwrap();

        assert_eq!(result.used_months, vec![4, 6]);
        assert_eq!(result.average, dec!(310000));
        assert!(!result.fell_back);
    }

    #[test]
    fn average_is_floored_to_one_yen() {
        let months = [
            payment(4, dec!(300000), 20),
            payment(5, dec!(300001), 20),
            payment(6, dec!(300001), 20),
        ];
        let result = calculate_revision(&RevisionInput {
            months: &months,
            category: DayCountCategory::General,
            previous_standard: None,
        })
        .unwrap();

        // (300000 + 300001 + 300001) / 3 = 300000.66... → 300000
        assert_eq!(result.average, dec!(300000));
    }

    #[test]
    fn retro_pay_is_subtracted_before_averaging() {
        let mut april = payment(4, dec!(350000), 20);
        april.retro_pay = Some(dec!(50000));
        let months = [april, payment(5, dec!(300000), 20), payment(6, dec!(300000), 20)];

        let result = calculate_revision(&RevisionInput {
            months: &months,
            category: DayCountCategory::General,
            previous_standard: None,
        })
        .unwrap();

        assert_eq!(result.average, dec!(300000));
    }

    #[test]
    fn short_time_falls_back_to_fifteen_day_band() {
        let months = [
            payment(4, dec!(120000), 16),
            payment(5, dec!(110000), 15),
            payment(6, dec!(100000), 10),
        ];
        let result = calculate_revision(&RevisionInput {
            months: &months,
            category: DayCountCategory::ShortTime,
            previous_standard: None,
        })
        .unwrap();

        assert_eq!(result.used_months, vec![4, 5]);
        assert_eq!(result.average, dec!(115000));
    }

    #[test]
    fn short_time_prefers_full_months_when_any_exist() {
        let months = [
            payment(4, dec!(150000), 17),
            payment(5, dec!(110000), 15),
            payment(6, dec!(100000), 16),
        ];
        let result = calculate_revision(&RevisionInput {
            months: &months,
            category: DayCountCategory::ShortTime,
            previous_standard: None,
        })
        .unwrap();

        assert_eq!(result.used_months, vec![4]);
        assert_eq!(result.average, dec!(150000));
    }

    #[test]
    fn special_short_time_requires_eleven_days() {
        let months = [
            payment(4, dec!(90000), 11),
            payment(5, dec!(90000), 10),
            payment(6, dec!(96000), 12),
        ];
        let result = calculate_revision(&RevisionInput {
            months: &months,
            category: DayCountCategory::ShortTimeSpecial,
            previous_standard: None,
        })
        .unwrap();

        assert_eq!(result.used_months, vec![4, 6]);
        assert_eq!(result.average, dec!(93000));
    }

    #[test]
    fn flagged_months_are_always_excluded() {
        let mut may = payment(5, dec!(300000), 20);
        may.partial_month = true;
        let mut june = payment(6, dec!(300000), 20);
        june.low_payment = true;
        let months = [payment(4, dec!(280000), 20), may, june];

        let result = calculate_revision(&RevisionInput {
            months: &months,
            category: DayCountCategory::General,
            previous_standard: None,
        })
        .unwrap();

        assert_eq!(result.used_months, vec![4]);
        assert_eq!(result.average, dec!(280000));
    }

    #[test]
    fn zero_qualifying_months_returns_previous_standard() {
        let months = [
            payment(4, dec!(300000), 5),
            payment(5, dec!(300000), 5),
            payment(6, dec!(300000), 5),
        ];
        let result = calculate_revision(&RevisionInput {
            months: &months,
            category: DayCountCategory::General,
            previous_standard: Some(dec!(260000)),
        })
        .unwrap();

        assert!(result.fell_back);
        assert_eq!(result.average, dec!(260000));
        assert!(result.used_months.is_empty());

        let result = calculate_revision(&RevisionInput {
            months: &months,
            category: DayCountCategory::General,
            previous_standard: None,
        })
        .unwrap();
        assert_eq!(result.average, Money::ZERO);
    }

    #[test]
    fn unreported_amount_or_days_is_excluded() {
        let mut may = payment(5, dec!(300000), 20);
        may.amount = None;
        let mut june = payment(6, dec!(300000), 20);
        june.paid_days = None;
        let months = [payment(4, dec!(280000), 20), may, june];

        let result = calculate_revision(&RevisionInput {
            months: &months,
            category: DayCountCategory::General,
            previous_standard: None,
        })
        .unwrap();

        assert_eq!(result.used_months, vec![4]);
    }
}
