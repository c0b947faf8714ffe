use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use super::PremiumSplit;
use crate::decimal::{floor_to_unit, percent_to_ratio, Money};
use crate::error::EngineResult;
use crate::judgment::graph::DateRange;
use crate::rates::InsuranceRates;

/// 標準賞与額の年度累計上限（健保・介護）
pub fn health_annual_cap() -> Money {
    Money::from(5_730_000_u32)
}

/// 厚年の1支給月あたり上限
pub fn pension_monthly_cap() -> Money {
    Money::from(1_500_000_u32)
}

fn standard_bonus_unit() -> Money {
    Money::from(1_000_u32)
}

/// 賞与に付く休業タグ。付いていれば法定免除。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BonusLeaveKind {
    Maternity,
    Childcare,
}

/// 賞与支給1件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusHistoryItem {
    pub paid_on: NaiveDate,
    pub amount: Money,
    /// 賞与種別（夏季/冬季/決算 など。計算には使わない）
    pub bonus_type: String,
    pub fiscal_year: u16,
    pub leave: Option<BonusLeaveKind>,
}

/// 休業期間カレンダー。支給月の末日が期間内なら免除判定に使う。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveCalendar {
    pub maternity: Vec<DateRange>,
    pub childcare: Vec<DateRange>,
}

impl LeaveCalendar {
    /// 支給月末日が産休期間内、または30日超の育休期間内なら免除
    fn exempts(&self, month_end: NaiveDate) -> bool {
        if self.maternity.iter().any(|range| range.contains(month_end)) {
            return true;
        }
        self.childcare
            .iter()
            .any(|range| range.contains(month_end) && range.span_days() > 30)
    }
}

/// 賞与計算の前提条件
#[derive(Debug, Clone)]
pub struct BonusContext<'a> {
    pub birth_date: NaiveDate,
    pub rates: &'a InsuranceRates,
    pub leave_calendar: &'a LeaveCalendar,
}

/// 健保・介護の年度累計キャップの残量管理。
/// エンジン内で唯一の明示的な可変状態であり、従業員・年度ごとに
/// リセットして使う。別従業員の計算と共有してはならない。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HealthCapAccumulator {
    applied: Money,
}

impl HealthCapAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn applied(&self) -> Money {
        self.applied
    }

    /// 年度キャップまでの残り
    pub fn headroom(&self) -> Money {
        (health_annual_cap() - self.applied).max(Money::ZERO)
    }

    fn consume(&mut self, amount: Money) {
        self.applied += amount;
    }

    pub fn reset(&mut self) {
        self.applied = Money::ZERO;
    }
}

/// 賞与1件ぶんの計算結果。作成後は不変で、同月2件目以降は
/// 前件の累計を参照した新しい結果を作る（書き換えない）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusPremiumResult {
    pub paid_on: NaiveDate,
    pub raw_amount: Money,
    /// 同月内累計の標準賞与額（1000円未満切り捨て後）
    pub cumulative_standard_amount: Money,
    /// 年度キャップ適用後の健保・介護の対象額（同月内累計）
    pub health_applicable_amount: Money,
    /// 月額上限適用後の厚年の対象額（同月内累計）
    pub pension_applicable_amount: Money,
    /// この支給で実際に徴収する健保（・介護込み）保険料
    pub health: PremiumSplit,
    /// この支給で実際に徴収する厚年保険料
    pub pension: PremiumSplit,
    pub health_cap_applied: bool,
    pub pension_cap_applied: bool,
    /// 支給日時点で介護該当（料率選択に使った）
    pub care_applicable: bool,
    pub exempted: bool,
    /// 同月2件目以降の差分計算か
    pub differential: bool,
}

fn month_end(date: NaiveDate) -> NaiveDate {
    let first = date.with_day(1).unwrap_or(date);
    first + Months::new(1) - Days::new(1)
}

fn age_at(birth_date: NaiveDate, on: NaiveDate) -> i32 {
    let mut age = on.year() - birth_date.year();
    if (on.month(), on.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    age
}

/// 1年度ぶんの賞与を支給日昇順で処理する。
///
/// - 同一暦月はグループ化し、グループ内は日付昇順・同日は金額降順
/// - 標準賞与額は同月内の支給額合計を1000円未満切り捨てたもの
/// - 健保・介護は年度累計573万円まで。残枠は月初時点の値で固定し、
///   月終了時にその月の適用額を累計へ反映する
/// - 厚年は同月累計150万円まで（年度累計はしない）
/// - 同月2件目以降は累計計算同士の差分のみ徴収し、負の差分は0に丸める
/// - 免除対象の支給は保険料を0にするが、標準賞与額の累計には含める
///
/// `accumulator` は従業員×年度ごとに呼び出し側が用意して持ち回す。
pub fn calculate_bonus_year(
    items: &[BonusHistoryItem],
    ctx: &BonusContext<'_>,
    accumulator: &mut HealthCapAccumulator,
) -> EngineResult<Vec<BonusPremiumResult>> {
    let mut sorted: Vec<&BonusHistoryItem> = items.iter().collect();
    sorted.sort_by(|a, b| {
        a.paid_on
            .cmp(&b.paid_on)
            .then(b.amount.cmp(&a.amount))
    });

    if let Some(first) = sorted.first() {
        if sorted.iter().any(|item| item.fiscal_year != first.fiscal_year) {
            tracing::warn!(
                fiscal_year = first.fiscal_year,
                "bonus items span multiple fiscal years; cap accumulator is per-year"
            );
        }
    }

    let mut results = Vec::with_capacity(sorted.len());
    let mut index = 0;

    while index < sorted.len() {
        let month_key = (sorted[index].paid_on.year(), sorted[index].paid_on.month());
        let mut group_end = index;
        while group_end < sorted.len()
            && (sorted[group_end].paid_on.year(), sorted[group_end].paid_on.month()) == month_key
        {
            group_end += 1;
        }

        let group = &sorted[index..group_end];
        process_month_group(group, ctx, accumulator, &mut results)?;
        index = group_end;
    }

    Ok(results)
}

fn process_month_group(
    group: &[&BonusHistoryItem],
    ctx: &BonusContext<'_>,
    accumulator: &mut HealthCapAccumulator,
    results: &mut Vec<BonusPremiumResult>,
) -> EngineResult<()> {
    // 月内で共有する残枠は月初時点の値で固定する
    let month_headroom = accumulator.headroom();

    let mut cumulative_raw = Money::ZERO;
    let mut prev_health = PremiumSplit::zero();
    let mut prev_pension = PremiumSplit::zero();
    let mut final_health_applicable = Money::ZERO;

    for (position, item) in group.iter().enumerate() {
        cumulative_raw += item.amount;
        let cumulative_standard = floor_to_unit(cumulative_raw, standard_bonus_unit())?;

        let health_applicable = cumulative_standard.min(month_headroom);
        let health_cap_applied = cumulative_standard > month_headroom;
        let pension_applicable = cumulative_standard.min(pension_monthly_cap());
        let pension_cap_applied = cumulative_standard > pension_monthly_cap();

        let age = age_at(ctx.birth_date, item.paid_on);
        let care_applicable = (40..65).contains(&age);
        let health_rate = ctx.rates.health_rate_for(care_applicable);

        let cumulative_health =
            PremiumSplit::halve(health_applicable * percent_to_ratio(health_rate));
        let cumulative_pension = if age >= 70 {
            PremiumSplit::zero()
        } else {
            PremiumSplit::halve(pension_applicable * percent_to_ratio(ctx.rates.pension_rate))
        };

        let differential = position > 0;
        let health_due = differential_split(&cumulative_health, &prev_health);
        let pension_due = differential_split(&cumulative_pension, &prev_pension);

        let exempted =
            item.leave.is_some() || ctx.leave_calendar.exempts(month_end(item.paid_on));

        results.push(BonusPremiumResult {
            paid_on: item.paid_on,
            raw_amount: item.amount,
            cumulative_standard_amount: cumulative_standard,
            health_applicable_amount: health_applicable,
            pension_applicable_amount: pension_applicable,
            health: if exempted { PremiumSplit::zero() } else { health_due },
            pension: if exempted { PremiumSplit::zero() } else { pension_due },
            health_cap_applied,
            pension_cap_applied,
            care_applicable,
            exempted,
            differential,
        });

        prev_health = cumulative_health;
        prev_pension = cumulative_pension;
        final_health_applicable = health_applicable;
    }

    accumulator.consume(final_health_applicable);
    Ok(())
}

/// 累計計算同士の差分。負になる場合（先行支給が上限を使い切った等）は
/// 0 に丸める。還付はしない。
fn differential_split(current: &PremiumSplit, previous: &PremiumSplit) -> PremiumSplit {
    let total = (current.total - previous.total).max(Money::ZERO);
    let employee = (current.employee - previous.employee)
        .max(Money::ZERO)
        .min(total);
    PremiumSplit {
        total,
        employee,
        employer: total - employee,
    }
}
