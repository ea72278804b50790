//! # ビジネスイベントログの構造化ヘルパー
//!
//! 処理ログを `jq` や `grep` で追跡しやすいよう、ログフィールドの命名規約と
//! ヘルパーマクロを提供する。
//!
//! ## ビジネスイベント
//!
//! [`log_business_event!`](crate::log_business_event) マクロで出力する。
//! `event.kind = "business_event"` マーカーが自動付与され、
//! `jq 'select(.["event.kind"] == "business_event")'` でフィルタできる。
//!
//! ## フィールド命名規約
//!
//! ドット記法（`event.category`、`error.kind`）を使用。tracing の
//! `$($field:ident).+` パターンでサポートされ、JSON 出力でフラットなキーになる。

/// ビジネスイベントを構造化ログとして出力する。
///
/// `event.kind = "business_event"` マーカーを自動付与し、
/// `tracing::info!` レベルで出力する。
///
/// ## 必須フィールド（慣例）
///
/// - `event.category`: イベントカテゴリ（[`event::category`] の定数を使用）
/// - `event.action`: アクション名（[`event::action`] の定数を使用）
/// - `event.result`: 結果（[`event::result`] の定数を使用）
///
/// ## 推奨フィールド
///
/// - `event.file`: 対象の入力ファイル名
#[macro_export]
macro_rules! log_business_event {
    ($($args:tt)*) => {
        ::tracing::info!(
            event.kind = "business_event",
            $($args)*
        )
    };
}

/// イベントフィールドの定数
pub mod event {
    /// イベントカテゴリ
    pub mod category {
        pub const DOCUMENT: &str = "document";
        pub const DELIVERY: &str = "delivery";
        pub const RUN: &str = "run";
    }

    /// イベントアクション
    pub mod action {
        // 入力ドキュメント
        pub const DOCUMENT_DISCOVERED: &str = "document.discovered";
        pub const DOCUMENT_SKIPPED: &str = "document.skipped";

        // 送信
        pub const MAIL_SENT: &str = "mail.sent";
        pub const MAIL_FAILED: &str = "mail.failed";

        // 実行
        pub const RUN_STARTED: &str = "run.started";
        pub const RUN_COMPLETED: &str = "run.completed";
    }

    /// イベント結果
    pub mod result {
        pub const SUCCESS: &str = "success";
        pub const FAILURE: &str = "failure";
        pub const SKIPPED: &str = "skipped";
    }
}

/// エラーコンテキストフィールドの定数
pub mod error {
    /// エラーカテゴリ
    pub mod category {
        /// 入力ドキュメント（読み込み・検証）
        pub const INPUT: &str = "input";
        /// 送信手段（SMTP、デスクトップクライアント）
        pub const TRANSPORT: &str = "transport";
        /// ファイルシステム（結果 CSV、アセット）
        pub const STORAGE: &str = "storage";
        /// 起動時設定
        pub const STARTUP: &str = "startup";
    }

    /// エラー種別
    pub mod kind {
        pub const DOCUMENT_UNREADABLE: &str = "document_unreadable";
        pub const VALIDATION: &str = "validation";
        pub const TRANSPORT_UNAVAILABLE: &str = "transport_unavailable";
        pub const TRANSPORT_FAILURE: &str = "transport_failure";
        pub const SUMMARY_WRITE: &str = "summary_write";
        pub const CONFIG: &str = "config";
    }
}
