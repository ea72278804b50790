//! # ORBIT Mailer 共有ユーティリティ
//!
//! ドメイン層・インフラ層・アプリケーションから共通で使う
//! ログ出力まわりのユーティリティを提供する。
//!
//! ## 設計方針
//!
//! - ビジネスロジックを含まない純粋なユーティリティのみを配置
//! - 外部クレートへの依存は最小限に抑える（トレーシング初期化は `observability` feature）

pub mod event_log;
pub mod observability;
