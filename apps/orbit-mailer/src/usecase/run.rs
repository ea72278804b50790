//! # 実行コーディネーター
//!
//! 入力ファイルを 1 件ずつ「抽出 → 件名・本文生成 → 送信 → 結果記録」の順に処理し、
//! 実行終了時にサマリーを保存する。
//!
//! ## 設計方針
//!
//! - **失敗の隔離**: 抽出失敗・送信失敗はそのファイルの結果として記録し、次のファイルへ進む
//! - **1 ファイル 1 結果**: 処理したファイルはすべてちょうど 1 件の結果を持つ
//! - **run_id によるログ相関**: 実行全体を `run` スパンで囲み、全ログに `run_id` を付与する

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use chrono::{DateTime, Local};
use orbit_mailer_domain::{
    clock::{Clock, SystemClock},
    notification::{EmailMessage, InlineImage, NotificationError},
    outcome::{Outcome, RunSummary},
    record::RecordError,
    run::RunId,
};
use orbit_mailer_infra::{
    notification::NotificationSender,
    spreadsheet::{DocumentReader, discover_documents, document_name},
    summary::SummaryStore,
};
use orbit_mailer_shared::{
    event_log::{error, event},
    log_business_event,
};
use tracing::Instrument;

use super::{RecordExtractor, TemplateRenderer};

/// 入力ディレクトリから処理対象のワークブックを列挙する
///
/// ディレクトリがない・読めない場合や対象ファイルがない場合は警告を出し、空を返す。
pub fn discover_inputs(input_dir: &Path) -> Vec<PathBuf> {
    let documents = match discover_documents(input_dir) {
        Ok(documents) => documents,
        Err(e) => {
            tracing::warn!(
                input_dir = %input_dir.display(),
                error = %e,
                "入力ディレクトリを読み込めません"
            );
            return Vec::new();
        }
    };

    if documents.is_empty() {
        tracing::warn!(
            input_dir = %input_dir.display(),
            "処理対象の .xlsx ファイルがありません"
        );
        return documents;
    }

    tracing::info!(count = documents.len(), "{} 件のファイルが見つかりました", documents.len());
    for path in &documents {
        log_business_event!(
            event.category = event::category::DOCUMENT,
            event.action = event::action::DOCUMENT_DISCOVERED,
            event.result = event::result::SUCCESS,
            event.file = %document_name(path),
            "入力ファイルを検出"
        );
    }
    documents
}

/// 実行コーディネーター
pub struct RunCoordinator<R> {
    extractor:     RecordExtractor<R>,
    renderer:      TemplateRenderer,
    sender:        Arc<dyn NotificationSender>,
    summary_store: Arc<dyn SummaryStore>,
    clock:         Arc<dyn Clock>,
    started_at:    Option<DateTime<Local>>,
    cc_email:      Option<String>,
    banner:        Option<Arc<InlineImage>>,
}

impl<R: DocumentReader> RunCoordinator<R> {
    pub fn new(
        extractor: RecordExtractor<R>,
        renderer: TemplateRenderer,
        sender: Arc<dyn NotificationSender>,
        summary_store: Arc<dyn SummaryStore>,
    ) -> Self {
        Self {
            extractor,
            renderer,
            sender,
            summary_store,
            clock: Arc::new(SystemClock),
            started_at: None,
            cc_email: None,
            banner: None,
        }
    }

    /// 全メールに付ける CC アドレスを設定する
    pub fn with_cc(mut self, cc_email: Option<String>) -> Self {
        self.cc_email = cc_email;
        self
    }

    /// 本文に埋め込むバナー画像を設定する
    pub fn with_banner(mut self, banner: Option<InlineImage>) -> Self {
        self.banner = banner.map(Arc::new);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// 実行開始時刻を指定する
    ///
    /// ログファイル名と結果ファイル名のタイムスタンプを揃えるため、起動時に取得した
    /// 時刻を渡す。未指定なら `run` の呼び出し時刻を使う。
    pub fn with_started_at(mut self, started_at: DateTime<Local>) -> Self {
        self.started_at = Some(started_at);
        self
    }

    /// 与えられたファイルを順に処理し、実行サマリーを返す
    ///
    /// サマリーの保存に失敗してもエラーにはせず、ログに記録する。
    pub async fn run(&self, documents: &[PathBuf]) -> RunSummary {
        let run_id = RunId::new();
        let span = tracing::info_span!("run", run_id = %run_id);

        async move {
            let started_at = self.started_at.unwrap_or_else(|| self.clock.now());
            let mut summary = RunSummary::new(run_id, started_at);
            log_business_event!(
                event.category = event::category::RUN,
                event.action = event::action::RUN_STARTED,
                event.result = event::result::SUCCESS,
                documents = documents.len(),
                "一括送信を開始"
            );

            for path in documents {
                summary.push(self.process_document(path).await);
            }
            summary.finish(self.clock.now());

            self.persist(&summary);

            let counts = summary.counts();
            log_business_event!(
                event.category = event::category::RUN,
                event.action = event::action::RUN_COMPLETED,
                event.result = event::result::SUCCESS,
                sent = counts.sent,
                failed = counts.failed,
                skipped = counts.skipped,
                "完了 Sent: {} | Failed: {} | Skipped: {}",
                counts.sent,
                counts.failed,
                counts.skipped
            );

            summary
        }
        .instrument(span)
        .await
    }

    /// 1 ファイルを処理し、結果を返す
    async fn process_document(&self, path: &Path) -> Outcome {
        let source_name = document_name(path);
        tracing::info!(file = %source_name, "処理中");

        let record = match self.extractor.extract(path) {
            Ok(record) => record,
            Err(e) => {
                let kind = match &e {
                    RecordError::Unreadable(_) => error::kind::DOCUMENT_UNREADABLE,
                    RecordError::MissingFields(_) => error::kind::VALIDATION,
                };
                log_business_event!(
                    event.category = event::category::DOCUMENT,
                    event.action = event::action::DOCUMENT_SKIPPED,
                    event.result = event::result::SKIPPED,
                    event.file = %source_name,
                    error.category = error::category::INPUT,
                    error.kind = kind,
                    error = %e,
                    "スキップしました"
                );
                return Outcome::skipped(source_name, &e);
            }
        };

        let rendered = self.renderer.render(&record);
        let email = EmailMessage {
            to:           record.recipient_address.clone(),
            cc:           self.cc_email.clone(),
            subject:      rendered.subject,
            html_body:    rendered.html_body,
            inline_image: self.banner.clone(),
        };

        match self.sender.send_email(&email).await {
            Ok(()) => {
                log_business_event!(
                    event.category = event::category::DELIVERY,
                    event.action = event::action::MAIL_SENT,
                    event.result = event::result::SUCCESS,
                    event.file = %source_name,
                    mail.recipient = %email.to,
                    mail.cc = email.cc.as_deref().unwrap_or_default(),
                    "送信しました"
                );
                Outcome::sent(&record)
            }
            Err(e) => {
                let kind = match &e {
                    NotificationError::Unavailable(_) => error::kind::TRANSPORT_UNAVAILABLE,
                    _ => error::kind::TRANSPORT_FAILURE,
                };
                log_business_event!(
                    event.category = event::category::DELIVERY,
                    event.action = event::action::MAIL_FAILED,
                    event.result = event::result::FAILURE,
                    event.file = %source_name,
                    mail.recipient = %email.to,
                    error.category = error::category::TRANSPORT,
                    error.kind = kind,
                    error = %e,
                    "送信に失敗しました"
                );
                Outcome::failed(&record, &e)
            }
        }
    }

    fn persist(&self, summary: &RunSummary) {
        match self.summary_store.save(summary) {
            Ok(path) => {
                tracing::info!(path = %path.display(), "結果を保存しました");
            }
            Err(e) => {
                tracing::error!(
                    error.category = error::category::STORAGE,
                    error.kind = error::kind::SUMMARY_WRITE,
                    error = %e,
                    "結果の保存に失敗しました"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Local, TimeZone};
    use orbit_mailer_domain::{
        clock::FixedClock,
        notification::BANNER_CONTENT_ID,
        outcome::{OutcomeStatus, StatusCounts},
    };
    use orbit_mailer_infra::{
        InfraError,
        mock::{
            MockDocumentReader,
            MockNotificationSender,
            MockSummaryStore,
            PanickingNotificationSender,
        },
    };
    use pretty_assertions::assert_eq;

    use super::*;

    fn complete(ticket: &'static str, owner: &'static str) -> Vec<(&'static str, &'static str)> {
        vec![
            ("RITM", ticket),
            ("AIDE_ID", "A100"),
            ("AIDE NAME", "Finance App"),
            ("Application Owner", owner),
        ]
    }

    fn make_coordinator(
        reader: MockDocumentReader,
        sender: Arc<dyn NotificationSender>,
        store: Arc<dyn SummaryStore>,
    ) -> RunCoordinator<MockDocumentReader> {
        RunCoordinator::new(
            RecordExtractor::new(reader, "corp.com"),
            TemplateRenderer::new(BANNER_CONTENT_ID).unwrap(),
            sender,
            store,
        )
    }

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names
            .iter()
            .map(|name| PathBuf::from("input_files").join(name))
            .collect()
    }

    #[tokio::test]
    async fn 全ファイルを送信しsentとして記録する() {
        let reader = MockDocumentReader::new()
            .with_document("a.xlsx", &complete("REQ1", "nkelly13"))
            .with_document("b.xlsx", &complete("REQ2", "jdoe@partner.org"));
        let sender = MockNotificationSender::new();
        let store = MockSummaryStore::new();
        let coordinator = make_coordinator(reader, Arc::new(sender.clone()), Arc::new(store.clone()))
            .with_cc(Some("orbit_powerbi_onboarding@corp.com".to_string()));

        let summary = coordinator.run(&paths(&["a.xlsx", "b.xlsx"])).await;

        assert_eq!(
            summary.counts(),
            StatusCounts {
                sent:    2,
                failed:  0,
                skipped: 0,
            }
        );
        let sent = sender.sent_emails();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, "nkelly13@corp.com");
        assert_eq!(sent[1].to, "jdoe@partner.org");
        assert_eq!(
            sent[0].cc.as_deref(),
            Some("orbit_powerbi_onboarding@corp.com")
        );
        assert!(sent[0].subject.ends_with("[REQ1][A100][Finance App]"));
        assert!(summary.finished_at().is_some());
    }

    #[tokio::test]
    async fn 必須フィールドが欠けたファイルは送信せずskippedにする() {
        let reader = MockDocumentReader::new().with_document(
            "missing.xlsx",
            &[("RITM", "REQ1"), ("AIDE NAME", "x"), ("Application Owner", "y")],
        );
        let coordinator = make_coordinator(
            reader,
            Arc::new(PanickingNotificationSender),
            Arc::new(MockSummaryStore::new()),
        );

        let summary = coordinator.run(&paths(&["missing.xlsx"])).await;

        let outcome = &summary.outcomes()[0];
        assert_eq!(outcome.status, OutcomeStatus::Skipped);
        assert_eq!(outcome.source_name, "missing.xlsx");
        assert!(outcome.error.starts_with("Missing required fields: AIDE_ID"));
        assert_eq!(outcome.recipient_address, "");
    }

    #[tokio::test]
    async fn 読めないファイルはskippedにして次へ進む() {
        let reader = MockDocumentReader::new()
            .with_unreadable("broken.xlsx")
            .with_document("ok.xlsx", &complete("REQ1", "nkelly13"));
        let sender = MockNotificationSender::new();
        let coordinator = make_coordinator(
            reader,
            Arc::new(sender.clone()),
            Arc::new(MockSummaryStore::new()),
        );

        let summary = coordinator.run(&paths(&["broken.xlsx", "ok.xlsx"])).await;

        let statuses: Vec<_> = summary.outcomes().iter().map(|o| o.status).collect();
        assert_eq!(statuses, vec![OutcomeStatus::Skipped, OutcomeStatus::Sent]);
        assert!(summary.outcomes()[0].error.starts_with("Cannot open document"));
        assert_eq!(sender.sent_emails().len(), 1);
    }

    #[tokio::test]
    async fn 送信失敗はfailedとして記録し残りの処理を続ける() {
        let reader = MockDocumentReader::new()
            .with_document("a.xlsx", &complete("REQ1", "nkelly13"))
            .with_document("b.xlsx", &complete("REQ2", "bounce"))
            .with_document("c.xlsx", &complete("REQ3", "jdoe"));
        let sender = MockNotificationSender::new().fail_for(
            "bounce@corp.com",
            NotificationError::SendFailed("550 mailbox unavailable".to_string()),
        );
        let coordinator = make_coordinator(
            reader,
            Arc::new(sender.clone()),
            Arc::new(MockSummaryStore::new()),
        );

        let summary = coordinator
            .run(&paths(&["a.xlsx", "b.xlsx", "c.xlsx"]))
            .await;

        let failed = &summary.outcomes()[1];
        assert_eq!(failed.status, OutcomeStatus::Failed);
        assert_eq!(failed.ticket_id, "REQ2");
        assert_eq!(failed.recipient_address, "bounce@corp.com");
        assert_eq!(failed.error, "Send failed: 550 mailbox unavailable");
        assert_eq!(summary.outcomes()[2].status, OutcomeStatus::Sent);
        assert_eq!(sender.sent_emails().len(), 2);
    }

    #[tokio::test]
    async fn 結果はファイル順に1件ずつ記録され件数の合計が一致する() {
        let reader = MockDocumentReader::new()
            .with_document("a.xlsx", &complete("REQ1", "nkelly13"))
            .with_unreadable("b.xlsx")
            .with_document("c.xlsx", &[("RITM", "REQ3")]);
        let coordinator = make_coordinator(
            reader,
            Arc::new(MockNotificationSender::new()),
            Arc::new(MockSummaryStore::new()),
        );
        let documents = paths(&["a.xlsx", "b.xlsx", "c.xlsx"]);

        let summary = coordinator.run(&documents).await;

        let names: Vec<_> = summary
            .outcomes()
            .iter()
            .map(|o| o.source_name.as_str())
            .collect();
        assert_eq!(names, vec!["a.xlsx", "b.xlsx", "c.xlsx"]);
        assert_eq!(summary.counts().total(), documents.len());
    }

    #[tokio::test]
    async fn 実行終了時にサマリーを1回保存する() {
        let reader =
            MockDocumentReader::new().with_document("a.xlsx", &complete("REQ1", "nkelly13"));
        let store = MockSummaryStore::new();
        let coordinator = make_coordinator(
            reader,
            Arc::new(MockNotificationSender::new()),
            Arc::new(store.clone()),
        );

        let summary = coordinator.run(&paths(&["a.xlsx"])).await;

        assert_eq!(store.saved(), vec![summary.outcomes().to_vec()]);
    }

    #[tokio::test]
    async fn サマリーの保存に失敗しても結果を返す() {
        struct FailingStore;
        impl SummaryStore for FailingStore {
            fn save(&self, _summary: &RunSummary) -> Result<PathBuf, InfraError> {
                Err(InfraError::io(
                    "logs/results.csv",
                    std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
                ))
            }
        }

        let reader =
            MockDocumentReader::new().with_document("a.xlsx", &complete("REQ1", "nkelly13"));
        let coordinator = make_coordinator(
            reader,
            Arc::new(MockNotificationSender::new()),
            Arc::new(FailingStore),
        );

        let summary = coordinator.run(&paths(&["a.xlsx"])).await;

        assert_eq!(summary.counts().sent, 1);
    }

    #[tokio::test]
    async fn バナー画像を全メールで共有する() {
        let reader = MockDocumentReader::new()
            .with_document("a.xlsx", &complete("REQ1", "nkelly13"))
            .with_document("b.xlsx", &complete("REQ2", "jdoe"));
        let sender = MockNotificationSender::new();
        let coordinator = make_coordinator(
            reader,
            Arc::new(sender.clone()),
            Arc::new(MockSummaryStore::new()),
        )
        .with_banner(Some(InlineImage {
            content_id:   BANNER_CONTENT_ID.to_string(),
            filename:     "orbit_banner.jpeg".to_string(),
            content_type: "image/jpeg".to_string(),
            bytes:        vec![0xFF, 0xD8, 0xFF],
        }));

        coordinator.run(&paths(&["a.xlsx", "b.xlsx"])).await;

        let sent = sender.sent_emails();
        let first = sent[0].inline_image.as_ref().unwrap();
        let second = sent[1].inline_image.as_ref().unwrap();
        assert!(Arc::ptr_eq(first, second));
        assert!(Arc::ptr_eq(&sent[0].html_body, &sent[1].html_body));
    }

    #[tokio::test]
    async fn 開始時刻と終了時刻はclockから取得する() {
        let at = Local.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap();
        let coordinator = make_coordinator(
            MockDocumentReader::new(),
            Arc::new(MockNotificationSender::new()),
            Arc::new(MockSummaryStore::new()),
        )
        .with_clock(Arc::new(FixedClock::new(at)));

        let summary = coordinator.run(&[]).await;

        assert_eq!(summary.started_at(), at);
        assert_eq!(summary.finished_at(), Some(at));
        assert!(summary.is_empty());
    }

    #[tokio::test]
    async fn 指定した開始時刻をサマリーに使う() {
        let started_at = Local.with_ymd_and_hms(2026, 3, 1, 9, 29, 59).unwrap();
        let now = Local.with_ymd_and_hms(2026, 3, 1, 9, 30, 5).unwrap();
        let coordinator = make_coordinator(
            MockDocumentReader::new(),
            Arc::new(MockNotificationSender::new()),
            Arc::new(MockSummaryStore::new()),
        )
        .with_clock(Arc::new(FixedClock::new(now)))
        .with_started_at(started_at);

        let summary = coordinator.run(&[]).await;

        assert_eq!(summary.started_at(), started_at);
        assert_eq!(summary.finished_at(), Some(now));
    }

    #[test]
    fn 入力ディレクトリがなければ空を返す() {
        let dir = tempfile::tempdir().unwrap();

        assert!(discover_inputs(&dir.path().join("input_files")).is_empty());
    }
}
