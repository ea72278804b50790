//! # 通知送信
//!
//! メールの送信を担当するインフラストラクチャモジュール。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `NotificationSender` trait でメール送信を抽象化
//! - **2 つの実装**: SMTP リレー、デスクトップメールクライアント（Outlook）
//! - **起動時に選択**: 設定の `SEND_METHOD` で一度だけ選び、レコードごとには切り替えない
//! - **リトライなし**: 1 回の送信試行の結果がそのレコードの最終結果になる

mod desktop;
mod smtp;

use async_trait::async_trait;
pub use desktop::DesktopClientNotificationSender;
use orbit_mailer_domain::notification::{EmailMessage, NotificationError};
pub use smtp::{SmtpNotificationSender, SmtpSettings};

/// メール送信トレイト
///
/// メッセージを外部の送信手段に引き渡す。配送の完了までは保証せず、
/// 引き渡しの成功、または観測された失敗の原因を返す。
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// メールを送信する
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError>;
}
