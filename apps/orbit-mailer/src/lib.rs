//! # ORBIT Power BI オンボーディングメーラー
//!
//! 入力ディレクトリに置かれたオンボーディング依頼ワークブック（.xlsx）を 1 件ずつ読み、
//! アプリケーションオーナーへウェルカムメールを送信する。
//! 実行ごとに、ファイル単位の処理結果を CSV に記録する。
//!
//! ## 処理の流れ
//!
//! ```text
//! input_files/*.xlsx ─→ 抽出 ─→ 件名・本文生成 ─→ 送信（Outlook / SMTP）
//!                        │                           │
//!                        └──── SKIPPED        SENT / FAILED
//!                                     ↓
//!                          logs/results_<timestamp>.csv
//! ```
//!
//! ## モジュール構成
//!
//! - [`cli`] - コマンドライン引数
//! - [`config`] - 設定ファイルの読み込み
//! - [`sender`] - 送信手段の選択
//! - [`usecase`] - 抽出・本文生成・送信・結果記録

pub mod cli;
pub mod config;
pub mod sender;
pub mod usecase;
