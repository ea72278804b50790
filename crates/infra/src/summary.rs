//! # 実行サマリーの永続化
//!
//! 実行終了時に、ファイルごとの処理結果を 1 行 1 ファイルの CSV として書き出す。
//!
//! 出力先: `<logs_dir>/results_<YYYYmmdd_HHMMSS>.csv`（タイムスタンプは実行開始時刻）
//!
//! 列: `file, ticket_id, case_id, case_name, recipient_address, status, error`

use std::path::{Path, PathBuf};

use orbit_mailer_domain::{clock::file_timestamp, outcome::RunSummary};

use crate::error::InfraError;

/// 結果 CSV の列
pub const COLUMNS: [&str; 7] = [
    "file",
    "ticket_id",
    "case_id",
    "case_name",
    "recipient_address",
    "status",
    "error",
];

/// 実行サマリー保存トレイト
pub trait SummaryStore: Send + Sync {
    /// サマリーを保存し、保存先を返す
    fn save(&self, summary: &RunSummary) -> Result<PathBuf, InfraError>;
}

/// CSV ファイルへの保存実装
#[derive(Debug, Clone)]
pub struct CsvSummaryStore {
    dir: PathBuf,
}

impl CsvSummaryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// サマリーの保存先パス
    pub fn path_for(&self, summary: &RunSummary) -> PathBuf {
        self.dir.join(format!(
            "results_{}.csv",
            file_timestamp(summary.started_at())
        ))
    }
}

impl SummaryStore for CsvSummaryStore {
    #[tracing::instrument(skip_all, level = "debug")]
    fn save(&self, summary: &RunSummary) -> Result<PathBuf, InfraError> {
        let path = self.path_for(summary);
        write_csv(&path, summary)?;
        Ok(path)
    }
}

fn write_csv(path: &Path, summary: &RunSummary) -> Result<(), InfraError> {
    let mut writer = csv::Writer::from_path(path)?;
    // 結果が 0 件でもヘッダー行は出力する
    if summary.is_empty() {
        writer.write_record(COLUMNS)?;
    }
    for outcome in summary.outcomes() {
        writer.serialize(outcome)?;
    }
    writer.flush().map_err(|e| InfraError::io(path, e))
}
