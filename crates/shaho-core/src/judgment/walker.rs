use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::graph::{Answer, Question, QuestionGraph, Transition};
use crate::error::EngineResult;

/// 回答の集合。初回回答の挿入順を履歴として保持し、
/// 「前の質問へ戻る」を決定的に巻き戻せるようにする。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSet {
    answers: HashMap<String, Answer>,
    history: Vec<String>,
}

impl AnswerSet {
    pub fn insert(&mut self, question_id: &str, answer: Answer) {
        if !self.answers.contains_key(question_id) {
            self.history.push(question_id.to_string());
        }
        self.answers.insert(question_id.to_string(), answer);
    }

    pub fn get(&self, question_id: &str) -> Option<&Answer> {
        self.answers.get(question_id)
    }

    /// トークン回答のみを返す（期間回答は None）
    pub fn token(&self, question_id: &str) -> Option<&str> {
        match self.answers.get(question_id) {
            Some(Answer::Token(token)) => Some(token),
            _ => None,
        }
    }

    pub fn period(&self, question_id: &str) -> Option<&super::graph::DateRange> {
        match self.answers.get(question_id) {
            Some(Answer::Period(range)) => Some(range),
            _ => None,
        }
    }

    pub fn remove(&mut self, question_id: &str) {
        self.answers.remove(question_id);
        self.history.retain(|id| id != question_id);
    }

    pub fn pop_last(&mut self) -> Option<String> {
        let last = self.history.pop()?;
        self.answers.remove(&last);
        Some(last)
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

/// 歩行中の位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkState {
    /// 質問中
    AtQuestion(String),
    /// FinalEnd に到達し判定可能
    Ready,
}

/// 質問グラフを回答に従って辿る状態機械。
///
/// 雇用区分の分岐が `BranchEnd` に達すると休業状況サブフローへ切り替わり、
/// `FinalEnd` で判定可能になる。グラフ上の循環は構造的には禁止されないため、
/// 巻き戻しは回答履歴スタックに基づいて行う。
#[derive(Debug, Clone)]
pub struct QuestionnaireWalker<'a> {
    graph: &'a QuestionGraph,
    answers: AnswerSet,
    state: WalkState,
    in_leave_flow: bool,
    /// 各回答時点の「休業フロー内か」。go_back で復元する
    flow_marks: Vec<bool>,
}

impl<'a> QuestionnaireWalker<'a> {
    pub fn new(graph: &'a QuestionGraph) -> Self {
        Self {
            graph,
            answers: AnswerSet::default(),
            state: WalkState::AtQuestion(graph.root.clone()),
            in_leave_flow: false,
            flow_marks: Vec::new(),
        }
    }

    pub fn state(&self) -> &WalkState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, WalkState::Ready)
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    pub fn into_answers(self) -> AnswerSet {
        self.answers
    }

    /// いま提示すべき質問。判定可能なら None
    pub fn current_question(&self) -> EngineResult<Option<&'a Question>> {
        match &self.state {
            WalkState::AtQuestion(id) => Ok(Some(self.graph.get(id)?)),
            WalkState::Ready => Ok(None),
        }
    }

    /// 現在の質問に回答し、次状態へ進む。
    /// 遷移マップに無い回答値は `UnknownAnswer`。
    pub fn answer(&mut self, answer: Answer) -> EngineResult<&WalkState> {
        let WalkState::AtQuestion(current_id) = self.state.clone() else {
            return Ok(&self.state);
        };

        let question = self.graph.get(&current_id)?;
        let transition = question.transition_for(&answer)?.clone();

        self.answers.insert(&current_id, answer);
        self.flow_marks.push(self.in_leave_flow);

        self.state = match transition {
            Transition::Question(next_id) => {
                self.graph.get(&next_id)?;
                WalkState::AtQuestion(next_id)
            }
            Transition::BranchEnd => {
                if self.in_leave_flow {
                    // 休業サブフロー内の BranchEnd はデータ作成上の欠陥。終端扱いにする
                    tracing::warn!(question = %current_id, "BranchEnd inside leave flow");
                    WalkState::Ready
                } else {
                    self.in_leave_flow = true;
                    WalkState::AtQuestion(self.graph.leave_root.clone())
                }
            }
            Transition::FinalEnd => WalkState::Ready,
        };

        Ok(&self.state)
    }

    /// ひとつ前の質問へ戻る。直近の回答を削除して状態を復元する。
    /// 履歴が空なら何もしない（エラーにはしない）。
    pub fn go_back(&mut self) {
        let Some(previous_id) = self.answers.pop_last() else {
            return;
        };
        if let Some(mark) = self.flow_marks.pop() {
            self.in_leave_flow = mark;
        }
        self.state = WalkState::AtQuestion(previous_id);
    }
}
