use serde::{Deserialize, Serialize};

use super::walker::AnswerSet;

/// 判定ルール1件。条件集合（質問ID→必要回答）が AnswerSet に
/// すべて含まれるとき適用される。priority 昇順で最初の完全一致が勝つ。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JudgmentRule {
    pub priority: u8,
    /// 質問ID → 要求回答トークン。空なら常に一致
    pub conditions: Vec<(String, String)>,
    pub eligible: bool,
    pub reason: String,
}

impl JudgmentRule {
    fn matches(&self, answers: &AnswerSet) -> bool {
        self.conditions
            .iter()
            .all(|(question, required)| answers.token(question) == Some(required.as_str()))
    }
}

/// ルール評価の結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleOutcome {
    pub eligible: bool,
    pub reason: String,
}

impl RuleOutcome {
    /// どのルールにも一致しなかった場合の既定結果
    pub fn unknown() -> Self {
        Self {
            eligible: false,
            reason: "判定不能（理由未特定）".into(),
        }
    }
}

/// priority 昇順で最初に一致したルールを採る。
/// 同 priority の重複一致はデータ作成上の欠陥として warn で報告し、
/// 先頭を採用する（黙って解決しない）。
pub fn evaluate_rules(rules: &[JudgmentRule], answers: &AnswerSet) -> RuleOutcome {
    let mut matched: Vec<&JudgmentRule> = rules.iter().filter(|rule| rule.matches(answers)).collect();
    matched.sort_by_key(|rule| rule.priority);

    let Some(first) = matched.first() else {
        return RuleOutcome::unknown();
    };

    if matched
        .iter()
        .filter(|rule| rule.priority == first.priority)
        .count()
        > 1
    {
        tracing::warn!(
            priority = first.priority,
            reason = %first.reason,
            "duplicate rule priority matched; rule table needs review"
        );
    }

    RuleOutcome {
        eligible: first.eligible,
        reason: first.reason.clone(),
    }
}

/// 雇用区分1つぶんの健保・厚年ルール
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRules {
    pub health: Vec<JudgmentRule>,
    pub pension: Vec<JudgmentRule>,
}

/// 雇用区分 → ルールの対応表。区分の追加はデータの追加であって
/// コードの追加ではない。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTable {
    pub categories: Vec<(String, CategoryRules)>,
}

impl RuleTable {
    pub fn rules_for(&self, category: &str) -> Option<&CategoryRules> {
        self.categories
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, rules)| rules)
    }
}
