//! # テスト用モック
//!
//! ユースケース層のテストで使う、インメモリのモック実装。
//! `test-utils` feature で公開される。

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use orbit_mailer_domain::{
    notification::{EmailMessage, NotificationError},
    outcome::{Outcome, RunSummary},
    record::Row,
};

use crate::{
    error::InfraError,
    notification::NotificationSender,
    spreadsheet::DocumentReader,
    summary::SummaryStore,
};

// ===== MockNotificationSender =====

/// 送信したメールを記録するモック
///
/// `fail_for` で指定した宛先への送信は失敗させる。
#[derive(Clone, Default)]
pub struct MockNotificationSender {
    sent:     Arc<Mutex<Vec<EmailMessage>>>,
    failures: Arc<Mutex<HashMap<String, NotificationError>>>,
}

impl MockNotificationSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定した宛先への送信を失敗させる
    pub fn fail_for(self, to: impl Into<String>, error: NotificationError) -> Self {
        self.failures.lock().unwrap().insert(to.into(), error);
        self
    }

    /// 送信に成功したメール
    pub fn sent_emails(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSender for MockNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError> {
        if let Some(error) = self.failures.lock().unwrap().get(&email.to) {
            return Err(error.clone());
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

// ===== PanickingNotificationSender =====

/// 呼び出されたら panic するモック
///
/// 送信が行われないことを検証するために使う。
#[derive(Debug, Clone, Default)]
pub struct PanickingNotificationSender;

#[async_trait]
impl NotificationSender for PanickingNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError> {
        panic!("send_email must not be called (to = {})", email.to);
    }
}

// ===== MockDocumentReader =====

/// ファイル名ごとに行データ（または読み込みエラー）を返すモック
#[derive(Clone, Default)]
pub struct MockDocumentReader {
    documents: Arc<Mutex<HashMap<String, Option<Vec<Row>>>>>,
}

impl MockDocumentReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// キー・値のペアからなるドキュメントを登録する
    pub fn with_document(self, name: &str, pairs: &[(&str, &str)]) -> Self {
        let rows = pairs
            .iter()
            .map(|(key, value)| vec![Some(key.to_string()), Some(value.to_string())])
            .collect();
        self.documents
            .lock()
            .unwrap()
            .insert(name.to_string(), Some(rows));
        self
    }

    /// 読み込みに失敗するドキュメントを登録する
    pub fn with_unreadable(self, name: &str) -> Self {
        self.documents.lock().unwrap().insert(name.to_string(), None);
        self
    }
}

impl DocumentReader for MockDocumentReader {
    fn read_rows(&self, path: &Path) -> Result<Vec<Row>, InfraError> {
        let name = crate::spreadsheet::document_name(path);
        match self.documents.lock().unwrap().get(&name) {
            Some(Some(rows)) => Ok(rows.clone()),
            Some(None) => Err(InfraError::spreadsheet("Zip error: invalid Zip archive")),
            None => Err(InfraError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            )),
        }
    }
}

// ===== MockSummaryStore =====

/// 保存されたサマリーの結果を記録するモック
#[derive(Clone, Default)]
pub struct MockSummaryStore {
    saved: Arc<Mutex<Vec<Vec<Outcome>>>>,
}

impl MockSummaryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 保存されたサマリーごとの結果
    pub fn saved(&self) -> Vec<Vec<Outcome>> {
        self.saved.lock().unwrap().clone()
    }
}

impl SummaryStore for MockSummaryStore {
    fn save(&self, summary: &RunSummary) -> Result<PathBuf, InfraError> {
        self.saved.lock().unwrap().push(summary.outcomes().to_vec());
        Ok(PathBuf::from("mock://results.csv"))
    }
}
