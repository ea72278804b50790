//! # レコード抽出
//!
//! ワークブックの先頭シートをキー・値テーブルとして読み、
//! オンボーディングレコードに変換する。

use std::path::Path;

use orbit_mailer_domain::record::{FieldMap, OnboardingRecord, RecordError};
use orbit_mailer_infra::spreadsheet::{DocumentReader, document_name};

/// ワークブックからレコードを抽出する
pub struct RecordExtractor<R> {
    reader:       R,
    email_domain: String,
}

impl<R: DocumentReader> RecordExtractor<R> {
    pub fn new(reader: R, email_domain: impl Into<String>) -> Self {
        Self {
            reader,
            email_domain: email_domain.into(),
        }
    }

    /// 1 ファイル分のレコードを抽出する
    ///
    /// 開けないファイルは [`RecordError::Unreadable`]、必須フィールドの欠落は
    /// [`RecordError::MissingFields`] として返す。
    pub fn extract(&self, path: &Path) -> Result<OnboardingRecord, RecordError> {
        let rows = self
            .reader
            .read_rows(path)
            .map_err(|e| RecordError::Unreadable(e.to_string()))?;

        let fields = FieldMap::from_rows(rows);
        tracing::debug!(
            file = %path.display(),
            keys = fields.len(),
            "キー・値テーブルを読み込みました"
        );

        OnboardingRecord::from_fields(document_name(path), &fields, &self.email_domain)
    }
}
