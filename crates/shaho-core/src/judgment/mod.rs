pub mod graph;
pub mod rules;
pub mod walker;

use serde::{Deserialize, Serialize};
use strum::AsRefStr;

pub use graph::{Answer, AnswerKind, DateRange, Question, QuestionGraph, Transition};
pub use rules::{CategoryRules, JudgmentRule, RuleOutcome, RuleTable};
pub use walker::{AnswerSet, QuestionnaireWalker, WalkState};

/// 保険種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
pub enum InsuranceKind {
    Health,
    Pension,
    Care,
}

/// 判定時点の休業状況
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, AsRefStr, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
pub enum LeaveStatus {
    #[default]
    None,
    /// 産前産後休業
    Maternity,
    /// 育児休業
    Childcare,
    /// 区分不明の休業
    Other,
}

/// 既に登録済みの手動判定。区分不明の休業時のみ参照される。
/// 過去回答からの推測はせず、明示的な入力としてのみ受け取る。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualDecision {
    pub health: bool,
    pub pension: bool,
}

/// 判定に必要な、回答以外の入力
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JudgmentContext {
    /// 判定時点の満年齢
    pub age: i32,
    pub leave: LeaveStatus,
    pub manual_override: Option<ManualDecision>,
}

/// 1保険種別の判定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuranceJudgment {
    pub eligible: bool,
    pub reason: String,
}

impl InsuranceJudgment {
    fn annotate(&mut self, note: &str) {
        // 理由は置き換えず追記し、元の判定根拠を残す
        self.reason = format!("{}（{}）", self.reason, note);
    }
}

/// 健保・厚年・介護それぞれの判定結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityResult {
    pub health: InsuranceJudgment,
    pub pension: InsuranceJudgment,
    pub care: InsuranceJudgment,
}

impl EligibilityResult {
    pub fn judgment(&self, kind: InsuranceKind) -> &InsuranceJudgment {
        match kind {
            InsuranceKind::Health => &self.health,
            InsuranceKind::Pension => &self.pension,
            InsuranceKind::Care => &self.care,
        }
    }
}

/// ルール評価＋法定の年齢上書き＋休業状況の補正をこの順で適用する。
pub fn judge(
    rule_table: &RuleTable,
    category: &str,
    answers: &AnswerSet,
    ctx: &JudgmentContext,
) -> EligibilityResult {
    let category_rules = rule_table.rules_for(category);
    if category_rules.is_none() {
        tracing::warn!(category, "no rules registered for employment category");
    }

    let base = |pick: fn(&CategoryRules) -> &[JudgmentRule]| -> InsuranceJudgment {
        let outcome = match category_rules {
            Some(rules) => rules::evaluate_rules(pick(rules), answers),
            None => RuleOutcome::unknown(),
        };
        InsuranceJudgment {
            eligible: outcome.eligible,
            reason: outcome.reason,
        }
    };

    let mut health = base(|rules| &rules.health);
    let mut pension = base(|rules| &rules.pension);

    // 法定の年齢上書き。ルール結果に関わらず無条件で適用する
    if ctx.age < 0 {
        health = InsuranceJudgment {
            eligible: false,
            reason: "年齢が不正".into(),
        };
        pension = InsuranceJudgment {
            eligible: false,
            reason: "年齢が不正".into(),
        };
    } else {
        if ctx.age >= 75 {
            health = InsuranceJudgment {
                eligible: false,
                reason: "75歳以上のため後期高齢者医療制度へ移行".into(),
            };
        }
        if ctx.age >= 70 {
            pension = InsuranceJudgment {
                eligible: false,
                reason: "70歳以上のため厚生年金の適用除外".into(),
            };
        }
    }

    // 介護保険はルール表とは独立に年齢のみで判定する
    let care = if (40..65).contains(&ctx.age) {
        InsuranceJudgment {
            eligible: true,
            reason: "40歳以上65歳未満のため介護保険第2号被保険者に該当".into(),
        }
    } else {
        InsuranceJudgment {
            eligible: false,
            reason: "介護保険第2号被保険者に該当しない".into(),
        }
    };

    let mut result = EligibilityResult {
        health,
        pension,
        care,
    };

    // 休業補正は最後
    match ctx.leave {
        LeaveStatus::None => {}
        LeaveStatus::Maternity => {
            result.health.annotate("産前産後休業中のため保険料免除");
            result.pension.annotate("産前産後休業中のため保険料免除");
        }
        LeaveStatus::Childcare => {
            result.health.annotate("育児休業中のため保険料免除");
            result.pension.annotate("育児休業中のため保険料免除");
        }
        LeaveStatus::Other => match ctx.manual_override {
            Some(manual) => {
                result.health.eligible = manual.health;
                result.health.annotate("手動判定を適用");
                result.pension.eligible = manual.pension;
                result.pension.annotate("手動判定を適用");
            }
            None => {
                result.health.eligible = false;
                result.health.annotate("休業区分不明のため要手動判定");
                result.pension.eligible = false;
                result.pension.annotate("休業区分不明のため要手動判定");
            }
        },
    }

    result
}
