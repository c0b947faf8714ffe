use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::error::{EngineError, EngineResult};

/// 等級表の1行。下限は以含、上限は未満（最終行は上限なし）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeTableRow {
    /// 等級番号（1始まり）
    pub grade: u16,
    /// 標準報酬月額
    pub standard_amount: Money,
    /// 下限（以上）
    pub lower: Money,
    /// 上限（未満）。None は上限なし＝最終行
    pub upper: Option<Money>,
}

impl GradeTableRow {
    fn contains(&self, amount: Money) -> bool {
        amount >= self.lower && self.upper.map_or(true, |upper| amount < upper)
    }
}

/// 健保・厚年それぞれの等級表。行は等級昇順で連続していること。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeTable {
    /// 表の名称（エラー報告用。例: "health", "pension"）
    pub name: String,
    pub rows: Vec<GradeTableRow>,
}

impl GradeTable {
    pub fn new(name: impl Into<String>, rows: Vec<GradeTableRow>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// 報酬月額から該当等級を引く。
    /// 最終行の上限を超える金額は最終行に丸める（等級は上方開放）。
    /// 表が空なら `TableEmpty`。
    pub fn lookup(&self, amount: Money) -> EngineResult<&GradeTableRow> {
        let last = self.rows.last().ok_or_else(|| EngineError::TableEmpty {
            table: self.name.clone(),
        })?;

        Ok(self
            .rows
            .iter()
            .find(|row| row.contains(amount))
            .unwrap_or(last))
    }

    /// 行の連続性・単調性を検査し、不備は warn で報告する。
    /// 判定を止めるほどではないデータ作成上の欠陥として扱う。
    pub fn validate(&self) -> bool {
        let mut ok = true;

        if let Some(first) = self.rows.first() {
            if !first.lower.is_zero() {
                tracing::warn!(table = %self.name, "first row lower bound is not zero");
                ok = false;
            }
        }

        for pair in self.rows.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            if prev.upper != Some(next.lower) {
                tracing::warn!(
                    table = %self.name,
                    prev_grade = prev.grade,
                    next_grade = next.grade,
                    "grade rows are not contiguous"
                );
                ok = false;
            }
            if next.grade != prev.grade + 1 || next.standard_amount <= prev.standard_amount {
                tracing::warn!(
                    table = %self.name,
                    grade = next.grade,
                    "grade numbering or standard amount is not monotonic"
                );
                ok = false;
            }
        }

        if let Some(last) = self.rows.last() {
            if last.upper.is_some() {
                tracing::warn!(table = %self.name, "last row must be open-ended");
                ok = false;
            }
        }

        ok
    }
}
