//! # ORBIT Mailer インフラ層
//!
//! 外部システム（ファイルシステム、スプレッドシート、メール送信手段）との
//! 接続・通信を担当するインフラストラクチャ層。
//!
//! ## 責務
//!
//! - **入力読み込み**: 入力ディレクトリの走査と xlsx シートの行データ読み出し
//! - **アセット読み込み**: インライン画像（バナー）の読み込み
//! - **通知送信**: SMTP リレー / デスクトップメールクライアントへの引き渡し
//! - **結果の永続化**: 実行サマリーの CSV 書き出し
//!
//! ## 依存関係
//!
//! ```text
//! app → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`spreadsheet`] - 入力ディレクトリの走査とシート読み込み
//! - [`asset`] - インライン画像の読み込み
//! - [`notification`] - メール送信トレイトと 2 つの実装
//! - [`summary`] - 実行サマリーの永続化
//! - [`error`] - インフラ層エラー定義

pub mod asset;
pub mod error;
pub mod notification;
pub mod spreadsheet;
pub mod summary;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use error::{InfraError, InfraErrorKind};
