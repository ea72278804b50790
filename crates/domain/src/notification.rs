//! # 通知
//!
//! 送信するメールメッセージと、送信時に発生するエラーを定義する。
//!
//! ## 設計方針
//!
//! - **本文の共有**: HTML 本文とバナー画像は全レコードで同一のため `Arc` で共有する
//! - **1 回限りの送信**: リトライは行わない。失敗はそのまま結果として記録される
//! - **送信手段に非依存**: デスクトップメールクライアント / SMTP リレーのどちらでも同じ型を使う

use std::sync::Arc;

use thiserror::Error;

/// バナー画像を参照する Content-ID
///
/// HTML 本文からは `cid:orbit_banner` として参照される。
pub const BANNER_CONTENT_ID: &str = "orbit_banner";

/// 通知送信エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotificationError {
    /// 送信手段が利用できない（メールクライアント未起動、非対応 OS など）
    ///
    /// 別の送信手段への自動切り替えは行わない。
    #[error("Mail transport unavailable: {0}")]
    Unavailable(String),

    /// 送信元・宛先アドレスが不正
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// メッセージの組み立てに失敗
    #[error("Failed to build message: {0}")]
    MessageBuild(String),

    /// 接続・認証・送信のいずれかに失敗
    #[error("Send failed: {0}")]
    SendFailed(String),

    /// テンプレートレンダリングに失敗
    #[error("Template rendering failed: {0}")]
    TemplateFailed(String),
}

/// インライン画像
///
/// HTML 本文から Content-ID で参照される画像。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    /// Content-ID（山括弧なし）
    pub content_id:   String,
    /// 添付ファイル名
    pub filename:     String,
    /// MIME タイプ（例: `image/jpeg`）
    pub content_type: String,
    /// 画像データ
    pub bytes:        Vec<u8>,
}

/// メールメッセージ
///
/// レンダリング結果と宛先をまとめたもの。NotificationSender に渡される。
#[derive(Debug, Clone)]
pub struct EmailMessage {
    /// 送信先メールアドレス
    pub to:           String,
    /// CC（未設定なら `None`）
    pub cc:           Option<String>,
    /// 件名
    pub subject:      String,
    /// HTML 本文
    pub html_body:    Arc<str>,
    /// インライン画像（アセットが見つからない場合は `None`）
    pub inline_image: Option<Arc<InlineImage>>,
}

impl EmailMessage {
    /// エンベロープ上のすべての受信者（To + CC）
    pub fn envelope_recipients(&self) -> Vec<&str> {
        std::iter::once(self.to.as_str())
            .chain(self.cc.as_deref())
            .collect()
    }
}
