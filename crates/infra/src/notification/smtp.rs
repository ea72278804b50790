//! SMTP 通知送信実装
//!
//! lettre の `AsyncSmtpTransport` を使用してメールを送信する。
//! 接続は送信ごとに確立し、送信後に解放する。

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport,
    AsyncTransport,
    Tokio1Executor,
    message::{
        Attachment,
        Mailbox,
        Message,
        MultiPart,
        SinglePart,
        header::ContentType,
    },
    transport::smtp::authentication::Credentials,
};
use orbit_mailer_domain::notification::{EmailMessage, InlineImage, NotificationError};

use super::NotificationSender;

/// 暗黙的 TLS（SMTPS）で待ち受けるポート
const IMPLICIT_TLS_PORT: u16 = 465;

/// SMTP リレーの接続設定
#[derive(Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    /// SMTP サーバーのホスト名
    pub host:         String,
    /// SMTP サーバーのポート番号
    pub port:         u16,
    /// TLS を使うか（465 番ポートは暗黙的 TLS、それ以外は STARTTLS）
    pub use_tls:      bool,
    /// 認証ユーザー名（空なら匿名リレー）
    pub username:     String,
    /// 認証パスワード（空なら匿名リレー）
    pub password:     String,
    /// 送信元メールアドレス
    pub from_address: String,
}

// パスワードはログに出さない
impl std::fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("use_tls", &self.use_tls)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("from_address", &self.from_address)
            .finish()
    }
}

impl SmtpSettings {
    /// 認証情報を返す
    ///
    /// ユーザー名・パスワードのどちらかが空なら認証を行わない（匿名リレー）。
    pub fn credentials(&self) -> Option<Credentials> {
        if self.username.is_empty() || self.password.is_empty() {
            return None;
        }
        Some(Credentials::new(
            self.username.clone(),
            self.password.clone(),
        ))
    }
}

/// SMTP 通知送信
///
/// `lettre::AsyncSmtpTransport<Tokio1Executor>` をラップする。
pub struct SmtpNotificationSender {
    transport:    AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpNotificationSender {
    /// 新しい SMTP 送信インスタンスを作成
    ///
    /// この時点では接続しない。TLS 設定の構築に失敗した場合のみエラーを返す。
    pub fn new(settings: &SmtpSettings) -> Result<Self, NotificationError> {
        let builder = match (settings.use_tls, settings.port) {
            (true, IMPLICIT_TLS_PORT) => AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host),
            (true, _) => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host),
            // TLS なしで接続（社内リレーやローカル SMTP 向け）
            (false, _) => Ok(AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(
                &settings.host,
            )),
        }
        .map_err(|e| NotificationError::Unavailable(format!("SMTP TLS setup failed: {e}")))?
        .port(settings.port);

        let builder = match settings.credentials() {
            Some(credentials) => builder.credentials(credentials),
            None => builder,
        };

        Ok(Self {
            transport:    builder.build(),
            from_address: settings.from_address.clone(),
        })
    }

    /// multipart/related（HTML + インライン画像）のメッセージを組み立てる
    fn build_message(&self, email: &EmailMessage) -> Result<Message, NotificationError> {
        let mut builder = Message::builder()
            .from(parse_mailbox("from", &self.from_address)?)
            .to(parse_mailbox("to", &email.to)?)
            .subject(email.subject.as_str());

        if let Some(cc) = &email.cc {
            builder = builder.cc(parse_mailbox("cc", cc)?);
        }

        let alternative = MultiPart::alternative().singlepart(SinglePart::html(email.html_body.to_string()));
        let related = MultiPart::related().multipart(alternative);
        let related = match &email.inline_image {
            Some(image) => related.singlepart(inline_part(image)?),
            None => related,
        };

        builder
            .multipart(related)
            .map_err(|e| NotificationError::MessageBuild(e.to_string()))
    }
}

fn parse_mailbox(role: &str, address: &str) -> Result<Mailbox, NotificationError> {
    address
        .parse()
        .map_err(|e| NotificationError::InvalidAddress(format!("{role} '{address}': {e}")))
}

fn inline_part(image: &InlineImage) -> Result<SinglePart, NotificationError> {
    let content_type = ContentType::parse(&image.content_type).map_err(|e| {
        NotificationError::MessageBuild(format!("content type '{}': {e}", image.content_type))
    })?;

    Ok(
        Attachment::new_inline_with_name(image.content_id.clone(), image.filename.clone())
            .body(image.bytes.clone(), content_type),
    )
}

#[async_trait]
impl NotificationSender for SmtpNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError> {
        let message = self.build_message(email)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| NotificationError::SendFailed(format!("SMTP delivery failed: {e}")))?;

        Ok(())
    }
}
