use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// 期間回答（休業期間など）。開始 <= 終了であること。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> EngineResult<Self> {
        if start > end {
            return Err(EngineError::MalformedDateRange(format!(
                "{start} > {end}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// 期間の日数（両端含む）
    pub fn span_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// 回答の種別
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnswerKind {
    /// はい/いいえ（トークン "yes" / "no"）
    YesNo,
    /// 選択肢から1つ
    Choice(Vec<String>),
    /// 期間入力
    DateRange,
}

/// 期間回答の遷移キー。期間質問は回答値によらず単一の遷移を持つ。
pub const DATE_RANGE_ANSWERED: &str = "answered";

/// 与えられた回答1件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Answer {
    Token(String),
    Period(DateRange),
}

impl Answer {
    pub fn yes() -> Self {
        Answer::Token("yes".into())
    }

    pub fn no() -> Self {
        Answer::Token("no".into())
    }

    /// 遷移マップ検索用のキー
    pub fn transition_key(&self) -> &str {
        match self {
            Answer::Token(token) => token,
            Answer::Period(_) => DATE_RANGE_ANSWERED,
        }
    }
}

/// 回答から次に進む先
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transition {
    /// 次の質問へ
    Question(String),
    /// 雇用区分の分岐が終わり、休業状況サブフローへ
    BranchEnd,
    /// 質問終了。判定可能
    FinalEnd,
}

/// 質問1件。遷移マップに無い回答値は入力エラーとして弾かれる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub prompt: String,
    pub kind: AnswerKind,
    /// 回答トークン → 遷移
    pub next: Vec<(String, Transition)>,
}

impl Question {
    pub fn transition_for(&self, answer: &Answer) -> EngineResult<&Transition> {
        let key = answer.transition_key();
        self.next
            .iter()
            .find(|(token, _)| token == key)
            .map(|(_, transition)| transition)
            .ok_or_else(|| EngineError::UnknownAnswer {
                question: self.id.clone(),
                answer: key.to_string(),
            })
    }
}

/// 質問グラフ全体。起点（雇用区分の分類）と休業サブフローの起点を持つ。
/// 構築後は不変の設定データであり、エンジン生成時に注入される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionGraph {
    pub root: String,
    pub leave_root: String,
    pub questions: Vec<Question>,
}

impl QuestionGraph {
    pub fn get(&self, id: &str) -> EngineResult<&Question> {
        self.questions
            .iter()
            .find(|question| question.id == id)
            .ok_or_else(|| EngineError::UnknownQuestion(id.to_string()))
    }

    /// 全遷移先が実在するかの検査。不備は warn で報告する。
    pub fn validate(&self) -> bool {
        let mut ok = true;
        for anchor in [&self.root, &self.leave_root] {
            if self.get(anchor).is_err() {
                tracing::warn!(question = %anchor, "graph anchor question is missing");
                ok = false;
            }
        }
        for question in &self.questions {
            for (token, transition) in &question.next {
                if let Transition::Question(target) = transition {
                    if self.get(target).is_err() {
                        tracing::warn!(
                            question = %question.id,
                            answer = %token,
                            target = %target,
                            "transition target is missing"
                        );
                        ok = false;
                    }
                }
            }
        }
        ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn rejects_inverted_date_range() {
        assert!(DateRange::new(date(2023, 5, 1), date(2023, 4, 1)).is_err());
        let range = DateRange::new(date(2023, 4, 1), date(2023, 5, 1)).unwrap();
        assert!(range.contains(date(2023, 4, 15)));
        assert!(!range.contains(date(2023, 5, 2)));
        assert_eq!(range.span_days(), 31);
    }

    #[test]
    fn unmapped_answer_is_an_input_error() {
        let question = Question {
            id: "workingHours".into(),
            prompt: "所定労働時間は通常の労働者の4分の3以上ですか".into(),
            kind: AnswerKind::YesNo,
            next: vec![
                ("yes".into(), Transition::BranchEnd),
                ("no".into(), Transition::FinalEnd),
            ],
        };

        assert_eq!(
            question.transition_for(&Answer::yes()).unwrap(),
            &Transition::BranchEnd
        );
        assert_eq!(
            question.transition_for(&Answer::Token("maybe".into())),
            Err(EngineError::UnknownAnswer {
                question: "workingHours".into(),
                answer: "maybe".into()
            })
        );
    }

    #[test]
    fn validate_reports_dangling_transition() {
        let graph = QuestionGraph {
            root: "a".into(),
            leave_root: "a".into(),
            questions: vec![Question {
                id: "a".into(),
                prompt: "".into(),
                kind: AnswerKind::YesNo,
                next: vec![("yes".into(), Transition::Question("missing".into()))],
            }],
        };
        assert!(!graph.validate());
    }
}
