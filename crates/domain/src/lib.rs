//! # ORBIT Mailer ドメイン層
//!
//! オンボーディング通知メールのバッチ送信における、ドメインモデルを定義する。
//!
//! ## 依存関係の方向
//!
//! ```text
//! app → infra → domain
//!   ↘
//!     shared
//! ```
//!
//! ドメイン層はファイル形式（xlsx）や送信手段（SMTP、デスクトップクライアント）に
//! 一切依存しない。
//!
//! ## モジュール構成
//!
//! - [`record`] - 入力シートから抽出するレコードと抽出エラー
//! - [`notification`] - 送信するメールメッセージと送信エラー
//! - [`outcome`] - ファイルごとの処理結果と実行サマリー
//! - [`run`] - 実行 ID
//! - [`clock`] - 時刻プロバイダ
//!
//! ## 使用例
//!
//! ```rust
//! use orbit_mailer_domain::record::{FieldMap, OnboardingRecord};
//!
//! let rows = vec![
//!     vec![Some("RITM".to_string()), Some("REQ1".to_string())],
//!     vec![Some("AIDE_ID".to_string()), Some("A100".to_string())],
//!     vec![Some("AIDE NAME".to_string()), Some("Finance App".to_string())],
//!     vec![Some("Application Owner".to_string()), Some("nkelly13".to_string())],
//! ];
//! let fields = FieldMap::from_rows(rows);
//! let record = OnboardingRecord::from_fields("a.xlsx", &fields, "corp.com").unwrap();
//! assert_eq!(record.recipient_address, "nkelly13@corp.com");
//! ```

pub mod clock;
pub mod notification;
pub mod outcome;
pub mod record;
pub mod run;
