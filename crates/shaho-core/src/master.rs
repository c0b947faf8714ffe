//! 令和5年度の法定テーブルのスナップショット。
//!
//! 等級表・料率・質問グラフ・判定ルールはすべて設定データであり、
//! 年度更新はこのスナップショットの差し替えで行う（エンジン側の
//! 契約は変わらない）。ホストが JSON から独自の年度データを注入する
//! 場合はここを使わなくてよい。

use once_cell::sync::Lazy;
use rust_decimal_macros::dec;

use crate::decimal::Money;
use crate::grade::{GradeTable, GradeTableRow};
use crate::judgment::{
    AnswerKind, CategoryRules, JudgmentRule, Question, QuestionGraph, RuleTable, Transition,
};
use crate::rates::{InsuranceRates, RateEntry, RateTable};

fn rows(entries: &[(u32, u32, Option<u32>)]) -> Vec<GradeTableRow> {
    entries
        .iter()
        .enumerate()
        .map(|(index, (standard, lower, upper))| GradeTableRow {
            grade: (index + 1) as u16,
            standard_amount: Money::from(*standard),
            lower: Money::from(*lower),
            upper: upper.map(Money::from),
        })
        .collect()
}

/// 健康保険（介護共通）の標準報酬月額等級表: 1〜50等級
static HEALTH_GRADES: Lazy<GradeTable> = Lazy::new(|| {
    GradeTable::new(
        "health",
        rows(&[
            (58_000, 0, Some(63_000)),
            (68_000, 63_000, Some(73_000)),
            (78_000, 73_000, Some(83_000)),
            (88_000, 83_000, Some(93_000)),
            (98_000, 93_000, Some(101_000)),
            (104_000, 101_000, Some(107_000)),
            (110_000, 107_000, Some(114_000)),
            (118_000, 114_000, Some(122_000)),
            (126_000, 122_000, Some(130_000)),
            (134_000, 130_000, Some(138_000)),
            (142_000, 138_000, Some(146_000)),
            (150_000, 146_000, Some(155_000)),
            (160_000, 155_000, Some(165_000)),
            (170_000, 165_000, Some(175_000)),
            (180_000, 175_000, Some(185_000)),
            (190_000, 185_000, Some(195_000)),
            (200_000, 195_000, Some(210_000)),
            (220_000, 210_000, Some(230_000)),
            (240_000, 230_000, Some(250_000)),
            (260_000, 250_000, Some(270_000)),
            (280_000, 270_000, Some(290_000)),
            (300_000, 290_000, Some(310_000)),
            (320_000, 310_000, Some(330_000)),
            (340_000, 330_000, Some(350_000)),
            (360_000, 350_000, Some(370_000)),
            (380_000, 370_000, Some(395_000)),
            (410_000, 395_000, Some(425_000)),
            (440_000, 425_000, Some(455_000)),
            (470_000, 455_000, Some(485_000)),
            (500_000, 485_000, Some(515_000)),
            (530_000, 515_000, Some(545_000)),
            (560_000, 545_000, Some(575_000)),
            (590_000, 575_000, Some(605_000)),
            (620_000, 605_000, Some(635_000)),
            (650_000, 635_000, Some(665_000)),
            (680_000, 665_000, Some(695_000)),
            (710_000, 695_000, Some(730_000)),
            (750_000, 730_000, Some(770_000)),
            (790_000, 770_000, Some(810_000)),
            (830_000, 810_000, Some(855_000)),
            (880_000, 855_000, Some(905_000)),
            (930_000, 905_000, Some(955_000)),
            (980_000, 955_000, Some(1_005_000)),
            (1_030_000, 1_005_000, Some(1_055_000)),
            (1_090_000, 1_055_000, Some(1_115_000)),
            (1_150_000, 1_115_000, Some(1_175_000)),
            (1_210_000, 1_175_000, Some(1_235_000)),
            (1_270_000, 1_235_000, Some(1_295_000)),
            (1_330_000, 1_295_000, Some(1_355_000)),
            (1_390_000, 1_355_000, None),
        ]),
    )
});

/// 厚生年金の標準報酬月額等級表: 1〜32等級
static PENSION_GRADES: Lazy<GradeTable> = Lazy::new(|| {
    GradeTable::new(
        "pension",
        rows(&[
            (88_000, 0, Some(93_000)),
            (98_000, 93_000, Some(101_000)),
            (104_000, 101_000, Some(107_000)),
            (110_000, 107_000, Some(114_000)),
            (118_000, 114_000, Some(122_000)),
            (126_000, 122_000, Some(130_000)),
            (134_000, 130_000, Some(138_000)),
            (142_000, 138_000, Some(146_000)),
            (150_000, 146_000, Some(155_000)),
            (160_000, 155_000, Some(165_000)),
            (170_000, 165_000, Some(175_000)),
            (180_000, 175_000, Some(185_000)),
            (190_000, 185_000, Some(195_000)),
            (200_000, 195_000, Some(210_000)),
            (220_000, 210_000, Some(230_000)),
            (240_000, 230_000, Some(250_000)),
            (260_000, 250_000, Some(270_000)),
            (280_000, 270_000, Some(290_000)),
            (300_000, 290_000, Some(310_000)),
            (320_000, 310_000, Some(330_000)),
            (340_000, 330_000, Some(350_000)),
            (360_000, 350_000, Some(370_000)),
            (380_000, 370_000, Some(395_000)),
            (410_000, 395_000, Some(425_000)),
            (440_000, 425_000, Some(455_000)),
            (470_000, 455_000, Some(485_000)),
            (500_000, 485_000, Some(515_000)),
            (530_000, 515_000, Some(545_000)),
            (560_000, 545_000, Some(575_000)),
            (590_000, 575_000, Some(605_000)),
            (620_000, 605_000, Some(635_000)),
            (650_000, 635_000, None),
        ]),
    )
});

pub fn health_grade_table() -> GradeTable {
    HEALTH_GRADES.clone()
}

pub fn pension_grade_table() -> GradeTable {
    PENSION_GRADES.clone()
}

/// 協会けんぽ・令和5年度の料率（パーセント）
pub fn rate_table() -> RateTable {
    fn rates(non_care: Money, care_inclusive: Money) -> InsuranceRates {
        InsuranceRates {
            non_care_rate: non_care,
            care_inclusive_rate: care_inclusive,
            pension_rate: dec!(18.300),
        }
    }

    RateTable::new(vec![
        RateEntry {
            fiscal_year: 2023,
            prefecture: "東京都".into(),
            rates: rates(dec!(10.00), dec!(11.82)),
        },
        RateEntry {
            fiscal_year: 2023,
            prefecture: "大阪府".into(),
            rates: rates(dec!(10.29), dec!(12.11)),
        },
        RateEntry {
            fiscal_year: 2023,
            prefecture: "愛知県".into(),
            rates: rates(dec!(10.01), dec!(11.83)),
        },
    ])
}

fn question(
    id: &str,
    prompt: &str,
    kind: AnswerKind,
    next: &[(&str, Transition)],
) -> Question {
    Question {
        id: id.into(),
        prompt: prompt.into(),
        kind,
        next: next
            .iter()
            .map(|(token, transition)| ((*token).to_string(), transition.clone()))
            .collect(),
    }
}

fn to_question(id: &str) -> Transition {
    Transition::Question(id.into())
}

/// 標準の質問グラフ。起点は雇用区分の分類、BranchEnd 後は
/// 休業状況サブフロー（onLeave 起点）へ合流する。
pub fn question_graph() -> QuestionGraph {
    use Transition::{BranchEnd, FinalEnd};

    QuestionGraph {
        root: "employmentType".into(),
        leave_root: "onLeave".into(),
        questions: vec![
            question(
                "employmentType",
                "雇用区分を選択してください",
                AnswerKind::Choice(vec![
                    "executive".into(),
                    "regular".into(),
                    "contract".into(),
                    "part-time".into(),
                    "other".into(),
                ]),
                &[
                    ("executive", to_question("executiveRemuneration")),
                    ("regular", BranchEnd),
                    ("contract", to_question("contractOverTwoMonths")),
                    ("part-time", to_question("workingHours")),
                    ("other", to_question("manualHealth")),
                ],
            ),
            question(
                "executiveRemuneration",
                "役員報酬を受けていますか",
                AnswerKind::YesNo,
                &[("yes", BranchEnd), ("no", BranchEnd)],
            ),
            question(
                "contractOverTwoMonths",
                "2ヶ月を超える雇用見込みがありますか",
                AnswerKind::YesNo,
                &[("yes", BranchEnd), ("no", BranchEnd)],
            ),
            question(
                "workingHours",
                "所定労働時間・日数が通常の労働者の4分の3以上ですか",
                AnswerKind::YesNo,
                &[("yes", BranchEnd), ("no", to_question("shortTimeWorker"))],
            ),
            question(
                "shortTimeWorker",
                "週20時間以上・月額賃金8.8万円以上など短時間労働者の要件に該当しますか",
                AnswerKind::YesNo,
                &[("yes", to_question("studentStatus")), ("no", BranchEnd)],
            ),
            question(
                "studentStatus",
                "学生ですか",
                AnswerKind::YesNo,
                &[("yes", BranchEnd), ("no", BranchEnd)],
            ),
            question(
                "manualHealth",
                "（手動判定）健康保険に加入しますか",
                AnswerKind::YesNo,
                &[("yes", to_question("manualPension")), ("no", to_question("manualPension"))],
            ),
            question(
                "manualPension",
                "（手動判定）厚生年金に加入しますか",
                AnswerKind::YesNo,
                &[("yes", BranchEnd), ("no", BranchEnd)],
            ),
            // 休業状況サブフロー
            question(
                "onLeave",
                "現在休業中ですか",
                AnswerKind::YesNo,
                &[("yes", to_question("leaveType")), ("no", FinalEnd)],
            ),
            question(
                "leaveType",
                "休業の種類を選択してください",
                AnswerKind::Choice(vec![
                    "maternity".into(),
                    "childcare".into(),
                    "otherLeave".into(),
                ]),
                &[
                    ("maternity", to_question("maternityPeriod")),
                    ("childcare", to_question("childcarePeriod")),
                    ("otherLeave", FinalEnd),
                ],
            ),
            question(
                "maternityPeriod",
                "産前産後休業の期間を入力してください",
                AnswerKind::DateRange,
                &[("answered", FinalEnd)],
            ),
            question(
                "childcarePeriod",
                "育児休業の期間を入力してください",
                AnswerKind::DateRange,
                &[("answered", FinalEnd)],
            ),
        ],
    }
}

fn rule(priority: u8, conditions: &[(&str, &str)], eligible: bool, reason: &str) -> JudgmentRule {
    JudgmentRule {
        priority,
        conditions: conditions
            .iter()
            .map(|(question, token)| ((*question).to_string(), (*token).to_string()))
            .collect(),
        eligible,
        reason: reason.into(),
    }
}

/// 雇用区分 → 判定ルール。区分の追加・変更はこの表の編集で済む。
pub fn rule_table() -> RuleTable {
    let regular = vec![rule(1, &[], true, "正社員のため適用")];

    let executive = vec![
        rule(
            1,
            &[("executiveRemuneration", "yes")],
            true,
            "報酬を受ける役員のため適用",
        ),
        rule(
            2,
            &[("executiveRemuneration", "no")],
            false,
            "無報酬の役員は適用外",
        ),
    ];

    let contract = vec![
        rule(
            1,
            &[("contractOverTwoMonths", "yes")],
            true,
            "2ヶ月を超える雇用見込みがあるため適用",
        ),
        rule(
            2,
            &[("contractOverTwoMonths", "no")],
            false,
            "2ヶ月以内の臨時雇用は適用除外",
        ),
    ];

    let part_time = vec![
        rule(
            1,
            &[("workingHours", "yes")],
            true,
            "所定労働時間が通常の労働者の4分の3以上",
        ),
        rule(
            2,
            &[("shortTimeWorker", "yes"), ("studentStatus", "no")],
            true,
            "短時間労働者の要件を満たす",
        ),
        rule(
            3,
            &[("shortTimeWorker", "yes"), ("studentStatus", "yes")],
            false,
            "学生は短時間労働者の適用除外",
        ),
        rule(4, &[("shortTimeWorker", "no")], false, "加入要件を満たさない"),
    ];

    let manual_health = vec![
        rule(1, &[("manualHealth", "yes")], true, "手動判定により加入"),
        rule(2, &[("manualHealth", "no")], false, "手動判定により非加入"),
    ];
    let manual_pension = vec![
        rule(1, &[("manualPension", "yes")], true, "手動判定により加入"),
        rule(2, &[("manualPension", "no")], false, "手動判定により非加入"),
    ];

    let same = |rules: &Vec<JudgmentRule>| CategoryRules {
        health: rules.clone(),
        pension: rules.clone(),
    };

    RuleTable {
        categories: vec![
            ("regular".into(), same(&regular)),
            ("executive".into(), same(&executive)),
            ("contract".into(), same(&contract)),
            ("part-time".into(), same(&part_time)),
            (
                "manual".into(),
                CategoryRules {
                    health: manual_health,
                    pension: manual_pension,
                },
            ),
        ],
    }
}
