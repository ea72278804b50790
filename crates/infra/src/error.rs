//! # インフラ層エラー定義
//!
//! ファイルシステムやスプレッドシート、CSV の読み書きで発生するエラーを表現する。
//!
//! ## 設計方針
//!
//! - **エラーの変換**: `std::io::Error`, `calamine::Error`, `csv::Error` をラップ
//! - **SpanTrace 自動捕捉**: `From` 実装や convenience constructor で
//!   エラー生成時の呼び出し経路を自動記録する
//!
//! ## 構造
//!
//! `std::io::Error` と同じ struct + enum パターンを採用:
//! - [`InfraError`]: エラー種別（[`InfraErrorKind`]）と [`SpanTrace`] を保持するラッパー
//! - [`InfraErrorKind`]: エラーの具体的な種別（Io, Spreadsheet, Csv 等）

use std::{fmt, path::PathBuf};

use derive_more::Display;
use thiserror::Error;
use tracing_error::SpanTrace;

/// インフラ層で発生するエラー
///
/// エラー種別（[`InfraErrorKind`]）と [`SpanTrace`]（呼び出し経路）を保持する。
#[derive(Display)]
#[display("{kind}")]
pub struct InfraError {
    kind:       InfraErrorKind,
    span_trace: SpanTrace,
}

/// インフラ層エラーの種別
///
/// 表示文字列は結果 CSV の `error` 列にそのまま出力される。
#[derive(Debug, Error)]
pub enum InfraErrorKind {
    /// ファイル I/O エラー
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// 対象パス
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// スプレッドシートの読み込みエラー
    ///
    /// ファイルが壊れている、xlsx ではない、ワークシートが存在しない等。
    #[error("{0}")]
    Spreadsheet(String),

    /// CSV の書き出しエラー
    #[error("CSV error: {0}")]
    Csv(#[source] csv::Error),
}

// ===== InfraError のメソッド =====

impl InfraError {
    /// エラー種別を取得する
    pub fn kind(&self) -> &InfraErrorKind {
        &self.kind
    }

    /// SpanTrace を取得する
    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    // ===== Convenience constructors（SpanTrace 自動キャプチャ） =====

    /// I/O エラーを生成する
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self {
            kind:       InfraErrorKind::Io {
                path: path.into(),
                source,
            },
            span_trace: SpanTrace::capture(),
        }
    }

    /// スプレッドシートエラーを生成する
    pub fn spreadsheet(msg: impl Into<String>) -> Self {
        Self {
            kind:       InfraErrorKind::Spreadsheet(msg.into()),
            span_trace: SpanTrace::capture(),
        }
    }
}

// ===== トレイト実装 =====

impl fmt::Debug for InfraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfraError")
            .field("kind", &self.kind)
            .field("span_trace", &self.span_trace)
            .finish()
    }
}

impl std::error::Error for InfraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.kind.source()
    }
}

// ===== From 実装（SpanTrace 自動キャプチャ） =====

impl From<calamine::Error> for InfraError {
    fn from(source: calamine::Error) -> Self {
        Self::spreadsheet(source.to_string())
    }
}

impl From<csv::Error> for InfraError {
    fn from(source: csv::Error) -> Self {
        Self {
            kind:       InfraErrorKind::Csv(source),
            span_trace: SpanTrace::capture(),
        }
    }
}
