//! # 送信手段の選択
//!
//! 設定の `SEND_METHOD` に応じて、実行全体で使う送信手段を 1 つ構築する。
//! 選択した送信手段が使えなくても、もう一方へ切り替えることはしない。

use std::sync::Arc;

use orbit_mailer_domain::notification::NotificationError;
use orbit_mailer_infra::notification::{
    DesktopClientNotificationSender,
    NotificationSender,
    SmtpNotificationSender,
};

use crate::config::{MailerConfig, SendMethod};

/// 設定から送信手段を構築する
pub fn build_sender(config: &MailerConfig) -> Result<Arc<dyn NotificationSender>, NotificationError> {
    let sender: Arc<dyn NotificationSender> = match config.send_method {
        SendMethod::Outlook => Arc::new(DesktopClientNotificationSender::new()),
        SendMethod::Smtp => Arc::new(SmtpNotificationSender::new(&config.smtp)?),
    };

    tracing::info!(send_method = %config.send_method, "送信手段を選択しました");
    Ok(sender)
}
