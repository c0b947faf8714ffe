pub mod decimal;
pub mod error;
pub mod grade;
pub mod judgment;
pub mod logging;
pub mod master;
pub mod premium;
pub mod rates;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use decimal::Money;
use error::{EngineError, EngineResult};
use grade::GradeTable;
use judgment::{
    AnswerSet, EligibilityResult, JudgmentContext, LeaveStatus, ManualDecision, QuestionGraph,
    QuestionnaireWalker, RuleTable,
};
use premium::bonus::{BonusHistoryItem, BonusPremiumResult, HealthCapAccumulator, LeaveCalendar};
use premium::monthly::MonthlyPremiumResult;
use premium::revision::{RevisionAverage, RevisionInput};
use rates::RateTable;

/// エンジンに注入する設定一式。すべて不変データで、年度ごとの
/// スナップショットを複数共存させられる（グローバル状態を持たない）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub question_graph: QuestionGraph,
    pub rule_table: RuleTable,
    pub health_grades: GradeTable,
    pub pension_grades: GradeTable,
    pub rate_table: RateTable,
}

impl EngineConfig {
    /// 同梱の令和5年度スナップショット
    pub fn builtin() -> Self {
        Self {
            question_graph: master::question_graph(),
            rule_table: master::rule_table(),
            health_grades: master::health_grade_table(),
            pension_grades: master::pension_grade_table(),
            rate_table: master::rate_table(),
        }
    }
}

/// 等級への当てはめ結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradedAmount {
    pub grade: u16,
    pub standard_amount: Money,
}

/// 定時決定・随時改定の結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionResult {
    /// 1円未満切り捨て後の平均額
    pub average: Money,
    pub used_months: Vec<u8>,
    /// 対象月が無く従前額を据え置いたか
    pub fell_back: bool,
    /// 健保等級（フォールバック時は None）
    pub health: Option<GradedAmount>,
    /// 厚年等級（フォールバック時は None）
    pub pension: Option<GradedAmount>,
}

/// 加入判定と保険料計算の入口。
/// 構築時に設定を受け取り、以後は純粋計算のみを行う。
pub struct InsuranceEngine {
    config: EngineConfig,
}

impl InsuranceEngine {
    pub fn new(config: EngineConfig) -> Self {
        // 設定の不備は構築時に warn で報告する（計算自体は行える）
        config.health_grades.validate();
        config.pension_grades.validate();
        config.question_graph.validate();
        Self { config }
    }

    pub fn with_builtin_master() -> Self {
        Self::new(EngineConfig::builtin())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// 質問グラフの起点に立った歩行器を作る
    pub fn walker(&self) -> QuestionnaireWalker<'_> {
        QuestionnaireWalker::new(&self.config.question_graph)
    }

    /// 回答から判定用の雇用区分トークンを導く。
    /// 「その他」は手動判定用の合成区分 "manual" になる。
    pub fn employment_category(answers: &AnswerSet) -> Option<String> {
        answers.token("employmentType").map(|token| {
            if token == "other" {
                "manual".to_string()
            } else {
                token.to_string()
            }
        })
    }

    /// 回答から休業状況を導く
    fn leave_status(answers: &AnswerSet) -> LeaveStatus {
        if answers.token("onLeave") != Some("yes") {
            return LeaveStatus::None;
        }
        match answers.token("leaveType") {
            Some("maternity") => LeaveStatus::Maternity,
            Some("childcare") => LeaveStatus::Childcare,
            _ => LeaveStatus::Other,
        }
    }

    /// 歩行完了後の回答一式から加入判定を行う。
    /// FinalEnd 未到達なら `JudgmentNotReady`。
    pub fn judge(
        &self,
        walker: &QuestionnaireWalker<'_>,
        age: i32,
        manual_override: Option<ManualDecision>,
    ) -> EngineResult<EligibilityResult> {
        if !walker.is_ready() {
            return Err(EngineError::JudgmentNotReady);
        }

        let answers = walker.answers();
        let category = Self::employment_category(answers).unwrap_or_default();
        let ctx = JudgmentContext {
            age,
            leave: Self::leave_status(answers),
            manual_override,
        };

        Ok(judgment::judge(&self.config.rule_table, &category, answers, &ctx))
    }

    /// 報酬月額から月額保険料を計算する。
    /// 健保・厚年それぞれの等級表で標準報酬月額に直してから料率を掛ける。
    pub fn monthly_premium(
        &self,
        monthly_remuneration: Money,
        fiscal_year: u16,
        prefecture: &str,
        age: i32,
    ) -> EngineResult<MonthlyPremiumResult> {
        let rates = self.config.rate_table.lookup(fiscal_year, prefecture)?;
        let health_standard = self
            .config
            .health_grades
            .lookup(monthly_remuneration)?
            .standard_amount;
        let pension_standard = self
            .config
            .pension_grades
            .lookup(monthly_remuneration)?
            .standard_amount;

        Ok(premium::monthly::calculate_monthly_premium(
            health_standard,
            pension_standard,
            rates,
            age,
        ))
    }

    /// 1年度ぶんの賞与保険料を支給日順に計算する。
    /// `accumulator` は従業員×年度ごとに呼び出し側が持ち回す。
    pub fn bonus_year(
        &self,
        items: &[BonusHistoryItem],
        fiscal_year: u16,
        prefecture: &str,
        birth_date: NaiveDate,
        leave_calendar: &LeaveCalendar,
        accumulator: &mut HealthCapAccumulator,
    ) -> EngineResult<Vec<BonusPremiumResult>> {
        let rates = self.config.rate_table.lookup(fiscal_year, prefecture)?;
        let ctx = premium::bonus::BonusContext {
            birth_date,
            rates,
            leave_calendar,
        };
        premium::bonus::calculate_bonus_year(items, &ctx, accumulator)
    }

    /// 定時決定・随時改定。3か月平均を両等級表に当てはめる。
    pub fn revise(&self, input: &RevisionInput<'_>) -> EngineResult<RevisionResult> {
        let RevisionAverage {
            average,
            used_months,
            fell_back,
        } = premium::revision::calculate_revision(input)?;

        let (health, pension) = if fell_back {
            (None, None)
        } else {
            let health_row = self.config.health_grades.lookup(average)?;
            let pension_row = self.config.pension_grades.lookup(average)?;
            (
                Some(GradedAmount {
                    grade: health_row.grade,
                    standard_amount: health_row.standard_amount,
                }),
                Some(GradedAmount {
                    grade: pension_row.grade,
                    standard_amount: pension_row.standard_amount,
                }),
            )
        };

        Ok(RevisionResult {
            average,
            used_months,
            fell_back,
            health,
            pension,
        })
    }
}
