//! # ユースケース層
//!
//! 入力ワークブックの抽出、メール本文の生成、送信、結果記録を統合する。
//!
//! ## 設計方針
//!
//! - **依存性注入**: 送信手段・結果の保存先は `Arc<dyn Trait>` で外部から注入
//! - **逐次処理**: ファイルはソート順に 1 件ずつ処理し、1 件の失敗で実行を止めない
//!
//! ## モジュール構成
//!
//! - [`extractor`] - ワークブックからオンボーディングレコードを抽出
//! - [`template_renderer`] - tera テンプレートエンジンによる件名・本文の生成
//! - [`run`] - 1 回の実行全体を制御するコーディネーター

pub mod extractor;
pub mod run;
pub mod template_renderer;

pub use extractor::RecordExtractor;
pub use run::{RunCoordinator, discover_inputs};
pub use template_renderer::{RenderedMessage, TemplateRenderer};
