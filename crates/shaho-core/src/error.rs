use thiserror::Error;

/// エンジン全体のエラー型。
///
/// 設定データ起因（等級表・料率・質問グラフの不備）と入力起因
/// （未到達の判定要求、不正な金額/期間）を区別できる粒度で持つ。
/// どのテーブル・どのキーで失敗したかを運用者へ報告できること。
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// 等級表が空（設定エラー）
    #[error("grade table is empty: {table}")]
    TableEmpty { table: String },

    /// 対象年度・都道府県の料率が未登録（設定エラー)
    #[error("insurance rate not found: fiscal_year={fiscal_year}, prefecture={prefecture}")]
    RateNotFound {
        fiscal_year: u16,
        prefecture: String,
    },

    /// 質問グラフに存在しない質問ID（設定エラー）
    #[error("unknown question id: {0}")]
    UnknownQuestion(String),

    /// 回答値が質問の遷移マップに無い（入力エラー）
    #[error("unknown answer for question {question}: {answer}")]
    UnknownAnswer { question: String, answer: String },

    /// 終端（FinalEnd）到達前に判定が要求された（入力エラー）
    #[error("judgment requested before reaching a terminal state")]
    JudgmentNotReady,

    /// 期間の開始が終了より後など、日付範囲が不正（入力エラー）
    #[error("malformed date range: {0}")]
    MalformedDateRange(String),

    /// 数値として解釈できない金額（入力エラー）
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// ゼロ除算。料率など設定データ経由でのみ到達しうる
    #[error("division by zero")]
    DivisionByZero,
}

pub type EngineResult<T> = Result<T, EngineError>;
