use chrono::NaiveDate;
use rust_decimal_macros::dec;

use shaho_core::judgment::{Answer, InsuranceKind};
use shaho_core::premium::{
    BonusHistoryItem, DayCountCategory, HealthCapAccumulator, LeaveCalendar, MonthlyPayment,
    RevisionInput,
};
use shaho_core::rates::{InsuranceRates, RateEntry, RateTable};
use shaho_core::{EngineConfig, InsuranceEngine};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn bonus(paid_on: NaiveDate, amount: rust_decimal::Decimal) -> BonusHistoryItem {
    BonusHistoryItem {
        paid_on,
        amount,
        bonus_type: "賞与".into(),
        fiscal_year: 2023,
        leave: None,
    }
}

/// 介護込みも10%にした料率（端数検証をしやすくするための試験用設定）
fn flat_ten_percent_config() -> EngineConfig {
    let mut config = EngineConfig::builtin();
    config.rate_table = RateTable::new(vec![RateEntry {
        fiscal_year: 2023,
        prefecture: "東京都".into(),
        rates: InsuranceRates {
            non_care_rate: dec!(10.00),
            care_inclusive_rate: dec!(10.00),
            pension_rate: dec!(18.300),
        },
    }]);
    config
}

#[test]
fn short_time_worker_walkthrough_is_eligible() {
    let engine = InsuranceEngine::with_builtin_master();
    let mut walker = engine.walker();

    walker.answer(Answer::Token("part-time".into())).unwrap();
    walker.answer(Answer::no()).unwrap(); // workingHours
    walker.answer(Answer::yes()).unwrap(); // shortTimeWorker
    walker.answer(Answer::no()).unwrap(); // studentStatus
    walker.answer(Answer::no()).unwrap(); // onLeave

    let result = engine.judge(&walker, 30, None).unwrap();
    assert!(result.health.eligible);
    assert!(result.pension.eligible);
    assert!(result.health.reason.contains("短時間労働者の要件を満たす"));
    assert!(result.pension.reason.contains("短時間労働者の要件を満たす"));
    assert!(!result.judgment(InsuranceKind::Care).eligible); // 30歳は介護対象外
}

#[test]
fn student_short_time_worker_is_excluded() {
    let engine = InsuranceEngine::with_builtin_master();
    let mut walker = engine.walker();

    walker.answer(Answer::Token("part-time".into())).unwrap();
    walker.answer(Answer::no()).unwrap();
    walker.answer(Answer::yes()).unwrap();
    walker.answer(Answer::yes()).unwrap(); // studentStatus = yes
    walker.answer(Answer::no()).unwrap();

    let result = engine.judge(&walker, 22, None).unwrap();
    assert!(!result.health.eligible);
    assert!(result.health.reason.contains("学生"));
}

#[test]
fn manual_branch_uses_manual_answers() {
    let engine = InsuranceEngine::with_builtin_master();
    let mut walker = engine.walker();

    walker.answer(Answer::Token("other".into())).unwrap();
    walker.answer(Answer::yes()).unwrap(); // manualHealth
    walker.answer(Answer::no()).unwrap(); // manualPension
    walker.answer(Answer::no()).unwrap(); // onLeave

    let result = engine.judge(&walker, 30, None).unwrap();
    assert!(result.health.eligible);
    assert!(!result.pension.eligible);
    assert!(result.health.reason.contains("手動判定"));
}

#[test]
fn single_bonus_scenario_matches_statute() {
    // 100万円の単独賞与、料率10%、45歳
    let engine = InsuranceEngine::new(flat_ten_percent_config());
    let mut acc = HealthCapAccumulator::new();

    let results = engine
        .bonus_year(
            &[bonus(date(2023, 6, 30), dec!(1000000))],
            2023,
            "東京都",
            date(1978, 4, 1), // 支給日時点45歳
            &LeaveCalendar::default(),
            &mut acc,
        )
        .unwrap();

    let r = &results[0];
    assert_eq!(r.cumulative_standard_amount, dec!(1000000));
    assert!(r.care_applicable);
    assert!(!r.pension_cap_applied);
    assert_eq!(r.health.total, dec!(100000));
    assert_eq!(r.health.employee, dec!(50000));
    assert_eq!(r.health.employee + r.health.employer, r.health.total);
}

#[test]
fn same_month_bonuses_against_exhausted_cap_yield_zero_differential() {
    let engine = InsuranceEngine::new(flat_ten_percent_config());
    let mut acc = HealthCapAccumulator::new();
    let calendar = LeaveCalendar::default();

    // 年度内で既に標準賞与額500万円を適用済みにする
    engine
        .bonus_year(
            &[bonus(date(2023, 7, 10), dec!(5000000))],
            2023,
            "東京都",
            date(1990, 1, 1),
            &calendar,
            &mut acc,
        )
        .unwrap();

    let results = engine
        .bonus_year(
            &[
                bonus(date(2023, 12, 5), dec!(2000000)),
                bonus(date(2023, 12, 20), dec!(1000000)),
            ],
            2023,
            "東京都",
            date(1990, 1, 1),
            &calendar,
            &mut acc,
        )
        .unwrap();

    // 1件目: 残枠73万円で頭打ち
    assert_eq!(results[0].health_applicable_amount, dec!(730000));
    assert!(results[0].health_cap_applied);

    // 2件目: 月内累計300万円だが適用額は73万円のまま → 差分0
    assert_eq!(results[1].cumulative_standard_amount, dec!(3000000));
    assert_eq!(results[1].health_applicable_amount, dec!(730000));
    assert!(results[1].health.is_zero());
    assert!(results[1].differential);

    // 年度を通じた適用累計は上限573万円を超えない
    assert_eq!(acc.applied(), dec!(5730000));
}

#[test]
fn annual_applied_total_never_exceeds_cap() {
    let engine = InsuranceEngine::new(flat_ten_percent_config());
    let mut acc = HealthCapAccumulator::new();
    let calendar = LeaveCalendar::default();

    let payments = [
        bonus(date(2023, 6, 30), dec!(2500000)),
        bonus(date(2023, 8, 10), dec!(1500500)),
        bonus(date(2023, 12, 8), dec!(2000000)),
        bonus(date(2024, 3, 15), dec!(1000000)),
    ];
    let results = engine
        .bonus_year(&payments, 2023, "東京都", date(1990, 1, 1), &calendar, &mut acc)
        .unwrap();

    assert!(acc.applied() <= dec!(5730000));
    for r in &results {
        assert!(r.health.total >= rust_decimal::Decimal::ZERO);
        assert!(r.pension.total >= rust_decimal::Decimal::ZERO);
    }
}

#[test]
fn monthly_premium_through_grade_lookup() {
    let engine = InsuranceEngine::with_builtin_master();

    // 報酬月額 305,000 → 健保22等級 300,000 / 厚年19等級 300,000
    let result = engine
        .monthly_premium(dec!(305000), 2023, "東京都", 45)
        .unwrap();

    assert_eq!(result.health_standard_amount, dec!(300000));
    assert_eq!(result.pension_standard_amount, dec!(300000));
    assert_eq!(result.health.total, dec!(30000));
    let care = result.care.unwrap();
    assert_eq!(care.total, dec!(5460)); // 300000 × 1.82%
    let pension = result.pension.unwrap();
    assert_eq!(pension.total, dec!(54900)); // 300000 × 18.3%
    assert_eq!(pension.employee + pension.employer, pension.total);
}

#[test]
fn pension_and_care_vanish_past_age_ceilings() {
    let engine = InsuranceEngine::with_builtin_master();

    let at69 = engine.monthly_premium(dec!(305000), 2023, "東京都", 69).unwrap();
    assert!(at69.pension.is_some());
    assert!(at69.care.is_none());

    let at70 = engine.monthly_premium(dec!(305000), 2023, "東京都", 70).unwrap();
    assert!(at70.pension.is_none());
}

#[test]
fn missing_rate_entry_is_reported_not_defaulted() {
    let engine = InsuranceEngine::with_builtin_master();
    assert!(engine.monthly_premium(dec!(305000), 2030, "東京都", 40).is_err());
}

#[test]
fn revision_scenario_uses_only_qualifying_months() {
    let engine = InsuranceEngine::with_builtin_master();

    let months = [
        MonthlyPayment {
            month: 4,
            amount: Some(dec!(310000)),
            paid_days: Some(20),
            retro_pay: Some(dec!(10000)),
            partial_month: false,
            low_payment: false,
        },
        MonthlyPayment {
            month: 5,
            amount: Some(dec!(320000)),
            paid_days: Some(10),
            retro_pay: None,
            partial_month: false,
            low_payment: false,
        },
        MonthlyPayment {
            month: 6,
            amount: Some(dec!(300001)),
            paid_days: Some(18),
            retro_pay: None,
            partial_month: false,
            low_payment: false,
        },
    ];

    let result = engine
        .revise(&RevisionInput {
            months: &months,
            category: DayCountCategory::General,
            previous_standard: Some(dec!(280000)),
        })
        .unwrap();

    // 4月と6月のみ。(300000 + 300001) / 2 = 300000.5 → 300000
    assert_eq!(result.used_months, vec![4, 6]);
    assert_eq!(result.average, dec!(300000));
    assert!(!result.fell_back);

    let health = result.health.unwrap();
    assert_eq!(health.grade, 22);
    assert_eq!(health.standard_amount, dec!(300000));
    let pension = result.pension.unwrap();
    assert_eq!(pension.grade, 19);
}

#[test]
fn revision_with_no_qualifying_months_keeps_previous_standard() {
    let engine = InsuranceEngine::with_builtin_master();
    let months = [MonthlyPayment {
        month: 4,
        amount: Some(dec!(310000)),
        paid_days: Some(3),
        retro_pay: None,
        partial_month: false,
        low_payment: false,
    }];

    let result = engine
        .revise(&RevisionInput {
            months: &months,
            category: DayCountCategory::General,
            previous_standard: Some(dec!(280000)),
        })
        .unwrap();

    assert!(result.fell_back);
    assert_eq!(result.average, dec!(280000));
    assert!(result.health.is_none());
}

#[test]
fn config_and_results_round_trip_as_json() {
    let config = EngineConfig::builtin();
    let json = serde_json::to_string(&config).unwrap();
    let restored: EngineConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(config, restored);

    let engine = InsuranceEngine::new(restored);
    let result = engine
        .monthly_premium(dec!(305000), 2023, "東京都", 45)
        .unwrap();
    let json = serde_json::to_string(&result).unwrap();
    assert!(json.contains("300000"));
}

#[test]
fn go_back_allows_revising_an_answer_before_judgment() {
    let engine = InsuranceEngine::with_builtin_master();
    let mut walker = engine.walker();

    walker.answer(Answer::Token("part-time".into())).unwrap();
    walker.answer(Answer::yes()).unwrap(); // workingHours: yes → 休業フローへ
    walker.go_back();
    walker.answer(Answer::no()).unwrap(); // 訂正して短時間労働者フローへ
    walker.answer(Answer::yes()).unwrap();
    walker.answer(Answer::no()).unwrap();
    walker.answer(Answer::no()).unwrap(); // onLeave

    let result = engine.judge(&walker, 35, None).unwrap();
    assert!(result.health.reason.contains("短時間労働者"));
}
