use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::error::{EngineError, EngineResult};

/// 年度・都道府県ごとの保険料率（パーセント表記）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuranceRates {
    /// 健康保険料率（介護保険第2号被保険者に該当しない場合）
    pub non_care_rate: Money,
    /// 健康保険料率（介護保険料込み。40歳以上65歳未満）
    pub care_inclusive_rate: Money,
    /// 厚生年金保険料率
    pub pension_rate: Money,
}

impl InsuranceRates {
    /// 介護保険単独の料率（込み料率と単独料率の差分）
    pub fn care_rate(&self) -> Money {
        self.care_inclusive_rate - self.non_care_rate
    }

    /// 介護該当年齢なら込み料率、それ以外は単独の健保料率
    pub fn health_rate_for(&self, care_applicable: bool) -> Money {
        if care_applicable {
            self.care_inclusive_rate
        } else {
            self.non_care_rate
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateEntry {
    pub fiscal_year: u16,
    pub prefecture: String,
    pub rates: InsuranceRates,
}

/// (年度, 都道府県) → 料率の検索表。
/// 未登録キーは設定エラーとして報告し、推測値で埋めない。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTable {
    pub entries: Vec<RateEntry>,
}

impl RateTable {
    pub fn new(entries: Vec<RateEntry>) -> Self {
        Self { entries }
    }

    pub fn lookup(&self, fiscal_year: u16, prefecture: &str) -> EngineResult<&InsuranceRates> {
        self.entries
            .iter()
            .find(|entry| entry.fiscal_year == fiscal_year && entry.prefecture == prefecture)
            .map(|entry| &entry.rates)
            .ok_or_else(|| EngineError::RateNotFound {
                fiscal_year,
                prefecture: prefecture.to_string(),
            })
    }
}
