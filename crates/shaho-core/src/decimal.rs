use std::cmp::Ordering;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{EngineError, EngineResult};

/// 金額型。給与計算で現れる円建て十進値を正確に保持する。
/// 浮動小数点は一切使わない。
pub type Money = Decimal;

/// 文字列から金額をパースする（カンマ・前後空白は許容）
pub fn parse_money(raw: &str) -> EngineResult<Money> {
    let cleaned = raw.trim().replace(',', "");
    Decimal::from_str(&cleaned).map_err(|_| EngineError::InvalidAmount(raw.to_string()))
}

pub fn add(a: Money, b: Money) -> Money {
    a + b
}

pub fn subtract(a: Money, b: Money) -> Money {
    a - b
}

pub fn multiply(a: Money, b: Money) -> Money {
    a * b
}

/// 除算。b がゼロのとき `DivisionByZero`
pub fn divide(a: Money, b: Money) -> EngineResult<Money> {
    a.checked_div(b).ok_or(EngineError::DivisionByZero)
}

pub fn compare(a: Money, b: Money) -> Ordering {
    a.cmp(&b)
}

/// 単位未満切り捨て。`unit` の倍数へゼロ方向に丸める。
/// 標準賞与額の1000円未満切り捨て、改定平均額の1円未満切り捨てに使う。
pub fn floor_to_unit(amount: Money, unit: Money) -> EngineResult<Money> {
    if unit.is_zero() {
        return Err(EngineError::DivisionByZero);
    }
    let quotient = (amount / unit).trunc();
    Ok(quotient * unit)
}

/// 円未満四捨五入（50銭ちょうどは切り上げ）。被保険者負担分の端数処理に使う。
pub fn round_half_up(amount: Money) -> Money {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// パーセント表記の料率を乗率へ変換する（例: 10.00 → 0.1000）
pub fn percent_to_ratio(rate_percent: Money) -> Money {
    rate_percent / Decimal::ONE_HUNDRED
}
