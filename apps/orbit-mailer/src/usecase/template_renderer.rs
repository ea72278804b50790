//! # テンプレートレンダラー
//!
//! tera テンプレートエンジンでウェルカムメールの件名と HTML 本文を生成する。
//!
//! ## 設計方針
//!
//! - **`include_str!` によるコンパイル時埋め込み**: テンプレートはバイナリに埋め込まれる
//! - **本文は 1 回だけレンダリング**: 本文はレコードに依存しないため、起動時に生成して共有する
//! - **件名パターン**: `Welcome to ORBIT Power BI - Your Guide to Getting Started - [{RITM}][{AIDE_ID}][{AIDE NAME}]`

use std::sync::Arc;

use orbit_mailer_domain::{notification::NotificationError, record::OnboardingRecord};
use tera::{Context, Tera};

/// 件名の固定部分
pub const SUBJECT_PREFIX: &str = "Welcome to ORBIT Power BI - Your Guide to Getting Started - ";

const WELCOME_TEMPLATE: &str = "welcome.html";

/// レンダリング済みのメール内容
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub subject:   String,
    pub html_body: Arc<str>,
}

/// テンプレートレンダラー
pub struct TemplateRenderer {
    html_body: Arc<str>,
}

impl TemplateRenderer {
    /// 新しいレンダラーインスタンスを作成
    ///
    /// 本文中の画像参照は `cid:{content_id}` になる。
    pub fn new(content_id: &str) -> Result<Self, NotificationError> {
        let mut engine = Tera::default();
        engine
            .add_raw_template(
                WELCOME_TEMPLATE,
                include_str!("../../templates/welcome.html"),
            )
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;

        let mut context = Context::new();
        context.insert("banner_cid", content_id);

        let html_body = engine
            .render(WELCOME_TEMPLATE, &context)
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;

        Ok(Self {
            html_body: Arc::from(html_body),
        })
    }

    /// レコードから件名と本文を生成する
    pub fn render(&self, record: &OnboardingRecord) -> RenderedMessage {
        RenderedMessage {
            subject:   subject_for(record),
            html_body: Arc::clone(&self.html_body),
        }
    }

    pub fn html_body(&self) -> &str {
        &self.html_body
    }
}

/// 件名を生成する
///
/// レコードの値はそのまま埋め込む（エスケープしない）。
pub fn subject_for(record: &OnboardingRecord) -> String {
    format!(
        "{SUBJECT_PREFIX}[{}][{}][{}]",
        record.ticket_id, record.case_id, record.case_name
    )
}
