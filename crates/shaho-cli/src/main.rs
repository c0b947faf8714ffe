use std::io::Read;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::Deserialize;

use shaho_core::judgment::{Answer, DateRange, ManualDecision};
use shaho_core::logging::{init_tracing_subscriber, install_tracing_panic_hook};
use shaho_core::premium::{
    BonusHistoryItem, DayCountCategory, HealthCapAccumulator, LeaveCalendar, MonthlyPayment,
    RevisionInput,
};
use shaho_core::InsuranceEngine;

/// 社会保険の加入判定・保険料計算をコマンドラインから実行する。
/// 入力はJSON、出力もJSON。設定は同梱の令和5年度スナップショット。
#[derive(Parser)]
#[command(name = "shaho", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 質問回答一式から加入判定を行う
    Judge {
        /// 入力JSONのパス（"-" で標準入力）
        #[arg(long)]
        input: PathBuf,
    },
    /// 報酬月額から月額保険料を計算する
    Monthly {
        #[arg(long)]
        amount: Decimal,
        #[arg(long)]
        age: i32,
        #[arg(long, default_value_t = 2023)]
        fiscal_year: u16,
        #[arg(long, default_value = "東京都")]
        prefecture: String,
    },
    /// 1年度ぶんの賞与保険料を計算する
    Bonus {
        #[arg(long)]
        input: PathBuf,
    },
    /// 定時決定・随時改定の平均と等級を計算する
    Revise {
        #[arg(long)]
        input: PathBuf,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AnswerInput {
    Token(String),
    Period { start: NaiveDate, end: NaiveDate },
}

#[derive(Deserialize)]
struct JudgeRequest {
    /// 起点の質問から順に与える回答列
    answers: Vec<AnswerInput>,
    age: i32,
    manual_override: Option<ManualDecision>,
}

#[derive(Deserialize)]
struct BonusRequest {
    fiscal_year: u16,
    prefecture: String,
    birth_date: NaiveDate,
    #[serde(default)]
    leave_calendar: LeaveCalendar,
    items: Vec<BonusHistoryItem>,
}

#[derive(Deserialize)]
struct ReviseRequest {
    category: DayCountCategory,
    previous_standard: Option<Decimal>,
    months: Vec<MonthlyPayment>,
}

fn read_input(path: &PathBuf) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read stdin")?;
        Ok(buffer)
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_judge(engine: &InsuranceEngine, request: JudgeRequest) -> Result<()> {
    let mut walker = engine.walker();

    for answer in request.answers {
        let answer = match answer {
            AnswerInput::Token(token) => Answer::Token(token),
            AnswerInput::Period { start, end } => Answer::Period(DateRange::new(start, end)?),
        };
        if walker.is_ready() {
            bail!("answers continue past the final question");
        }
        walker.answer(answer)?;
    }

    let result = engine.judge(&walker, request.age, request.manual_override)?;
    print_json(&result)
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing_subscriber("shaho");
    install_tracing_panic_hook("shaho");

    let cli = Cli::parse();
    let engine = InsuranceEngine::with_builtin_master();

    match cli.command {
        Command::Judge { input } => {
            let request: JudgeRequest =
                serde_json::from_str(&read_input(&input)?).context("invalid judge request")?;
            run_judge(&engine, request)?;
        }
        Command::Monthly {
            amount,
            age,
            fiscal_year,
            prefecture,
        } => {
            let result = engine.monthly_premium(amount, fiscal_year, &prefecture, age)?;
            print_json(&result)?;
        }
        Command::Bonus { input } => {
            let request: BonusRequest =
                serde_json::from_str(&read_input(&input)?).context("invalid bonus request")?;
            let mut accumulator = HealthCapAccumulator::new();
            let results = engine.bonus_year(
                &request.items,
                request.fiscal_year,
                &request.prefecture,
                request.birth_date,
                &request.leave_calendar,
                &mut accumulator,
            )?;
            print_json(&results)?;
            tracing::info!(
                applied = %accumulator.applied(),
                "annual health cap consumption"
            );
        }
        Command::Revise { input } => {
            let request: ReviseRequest =
                serde_json::from_str(&read_input(&input)?).context("invalid revise request")?;
            let result = engine.revise(&RevisionInput {
                months: &request.months,
                category: request.category,
                previous_standard: request.previous_standard,
            })?;
            print_json(&result)?;
        }
    }

    Ok(())
}
