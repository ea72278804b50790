//! # スプレッドシート読み込み
//!
//! 入力ディレクトリの走査と、xlsx ドキュメントの行データ読み出しを担当する。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `DocumentReader` trait でシート読み込みを抽象化し、
//!   ユースケース層のテストではモックに差し替える
//! - **最初のワークシートのみ**: オンボーディングシートは 1 シート構成
//! - **セル型の正規化**: 文字列以外のセル（数値・日付など）は表示文字列に変換し、
//!   空セルとエラーセルは `None` とする

use std::path::{Path, PathBuf};

use calamine::{Data, Reader, open_workbook_auto};
use orbit_mailer_domain::record::Row;

use crate::error::InfraError;

/// 入力ドキュメントの拡張子
pub const INPUT_EXTENSION: &str = "xlsx";

/// Office が編集中に作成するロックファイルの接頭辞
const LOCK_FILE_PREFIX: &str = "~$";

/// ドキュメント読み込みトレイト
pub trait DocumentReader: Send + Sync {
    /// 最初のワークシートの全行を読み出す
    fn read_rows(&self, path: &Path) -> Result<Vec<Row>, InfraError>;
}

/// calamine による xlsx 読み込み実装
#[derive(Debug, Clone, Default)]
pub struct XlsxDocumentReader;

impl DocumentReader for XlsxDocumentReader {
    #[tracing::instrument(skip_all, level = "debug", fields(path = %path.display()))]
    fn read_rows(&self, path: &Path) -> Result<Vec<Row>, InfraError> {
        let mut workbook = open_workbook_auto(path)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| InfraError::spreadsheet("workbook contains no worksheet"))??;

        Ok(range
            .rows()
            .map(|cells| cells.iter().map(cell_text).collect())
            .collect())
    }
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(value) => Some(value.clone()),
        other => Some(other.to_string()),
    }
}

/// 入力ディレクトリから処理対象のドキュメントを列挙する
///
/// 拡張子 `.xlsx`（大文字小文字を区別しない）の通常ファイルのみを対象とし、
/// Office のロックファイル（`~$` で始まるもの）は除外する。
/// 結果はファイル名の辞書順に並ぶ。
pub fn discover_documents(dir: &Path) -> Result<Vec<PathBuf>, InfraError> {
    let entries = std::fs::read_dir(dir).map_err(|e| InfraError::io(dir, e))?;

    let mut documents = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| InfraError::io(dir, e))?.path();
        if path.is_file() && is_input_document(&path) {
            documents.push(path);
        }
    }

    documents.sort();
    Ok(documents)
}

fn is_input_document(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
        return false;
    };

    !name.starts_with(LOCK_FILE_PREFIX)
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(INPUT_EXTENSION))
}

/// 結果 CSV やログに記録するドキュメント名（ファイル名部分）
pub fn document_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
