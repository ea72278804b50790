//! # 処理結果
//!
//! 入力ファイルごとの処理結果（[`Outcome`]）と、実行全体のサマリー（[`RunSummary`]）を定義する。
//!
//! ## 設計方針
//!
//! - **追記のみ**: サマリーへの結果の追加は [`RunSummary::push`] のみで、既存の結果は変更しない
//! - **1 ファイル 1 結果**: 抽出に失敗したファイルも SKIPPED として必ず記録される
//! - **列順の固定**: シリアライズ順が結果 CSV の列順になる

use chrono::{DateTime, Local};
use serde::Serialize;
use strum::IntoStaticStr;

use crate::{
    notification::NotificationError,
    record::{OnboardingRecord, RecordError},
    run::RunId,
};

/// 処理ステータス
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    IntoStaticStr,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum OutcomeStatus {
    /// 送信手段への引き渡しに成功
    Sent,
    /// 送信に失敗
    Failed,
    /// 抽出に失敗したため送信しなかった
    Skipped,
}

/// 1 ファイル分の処理結果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    #[serde(rename = "file")]
    pub source_name:       String,
    pub ticket_id:         String,
    pub case_id:           String,
    pub case_name:         String,
    pub recipient_address: String,
    pub status:            OutcomeStatus,
    pub error:             String,
}

impl Outcome {
    /// 送信成功
    pub fn sent(record: &OnboardingRecord) -> Self {
        Self::from_record(record, OutcomeStatus::Sent, String::new())
    }

    /// 送信失敗
    pub fn failed(record: &OnboardingRecord, error: &NotificationError) -> Self {
        Self::from_record(record, OutcomeStatus::Failed, error.to_string())
    }

    /// 抽出失敗（レコードのフィールドは空欄）
    pub fn skipped(source_name: impl Into<String>, error: &RecordError) -> Self {
        Self {
            source_name:       source_name.into(),
            ticket_id:         String::new(),
            case_id:           String::new(),
            case_name:         String::new(),
            recipient_address: String::new(),
            status:            OutcomeStatus::Skipped,
            error:             error.to_string(),
        }
    }

    fn from_record(record: &OnboardingRecord, status: OutcomeStatus, error: String) -> Self {
        Self {
            source_name: record.source_name.clone(),
            ticket_id: record.ticket_id.clone(),
            case_id: record.case_id.clone(),
            case_name: record.case_name.clone(),
            recipient_address: record.recipient_address.clone(),
            status,
            error,
        }
    }
}

/// ステータス別の件数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub sent:    usize,
    pub failed:  usize,
    pub skipped: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.sent + self.failed + self.skipped
    }
}

/// 実行サマリー
///
/// 1 回の実行で処理したファイルの結果を処理順に保持する。
/// 実行中は Run Coordinator が排他的に所有し、終了時に一度だけ永続化される。
#[derive(Debug, Clone)]
pub struct RunSummary {
    run_id:      RunId,
    started_at:  DateTime<Local>,
    finished_at: Option<DateTime<Local>>,
    outcomes:    Vec<Outcome>,
}

impl RunSummary {
    pub fn new(run_id: RunId, started_at: DateTime<Local>) -> Self {
        Self {
            run_id,
            started_at,
            finished_at: None,
            outcomes: Vec::new(),
        }
    }

    /// 結果を追記する
    pub fn push(&mut self, outcome: Outcome) {
        self.outcomes.push(outcome);
    }

    /// 終了時刻を記録する
    pub fn finish(&mut self, finished_at: DateTime<Local>) {
        self.finished_at = Some(finished_at);
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Local>> {
        self.finished_at
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// ステータス別の件数を集計する
    pub fn counts(&self) -> StatusCounts {
        self.outcomes
            .iter()
            .fold(StatusCounts::default(), |mut counts, outcome| {
                match outcome.status {
                    OutcomeStatus::Sent => counts.sent += 1,
                    OutcomeStatus::Failed => counts.failed += 1,
                    OutcomeStatus::Skipped => counts.skipped += 1,
                }
                counts
            })
    }
}
