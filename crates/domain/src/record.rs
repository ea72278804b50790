//! # オンボーディングレコード
//!
//! 入力スプレッドシート 1 件から抽出される正規化済みレコードを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 用途 |
//! |---|------------|------|
//! | [`FieldMap`] | キー・値テーブル | シートの行から組み立てたキー → 値の対応 |
//! | [`RequiredField`] | 必須フィールド | `RITM` / `AIDE_ID` / `AIDE NAME` / `Application Owner` |
//! | [`OnboardingRecord`] | レコード | 検証済みの抽出結果（宛先アドレスを含む） |
//! | [`RecordError`] | 抽出エラー | 読み込み不能・必須フィールド欠落 |
//!
//! ## 設計方針
//!
//! - **部分レコードを作らない**: 必須フィールドが 1 つでも欠ければ [`RecordError::MissingFields`]
//! - **読み込み失敗と検証失敗を区別**: 両者は別のバリアントで表現する
//! - **ファイル形式に非依存**: セルの読み出しはインフラ層が担当し、ここでは行データのみ扱う

use std::collections::HashMap;

use strum::IntoStaticStr;
use thiserror::Error;

/// 「値なし」を表すプレースホルダ文字列（大文字小文字を区別せず除外する）
pub const NO_VALUE_PLACEHOLDER: &str = "nan";

/// シートの 1 行分のセル
///
/// 空セルは `None` で表す。
pub type Row = Vec<Option<String>>;

/// キー・値テーブル
///
/// 各行の最初の空でないセルをキー、その次のセルを値として扱う。
/// キーと値はトリムされ、同じキーが複数回現れた場合は最後の値が残る。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap(HashMap<String, String>);

impl FieldMap {
    /// 行データからテーブルを組み立てる
    ///
    /// 値が空、または [`NO_VALUE_PLACEHOLDER`] と一致する行は読み飛ばす。
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<[Option<String>]>,
    {
        let mut map = HashMap::new();

        for row in rows {
            let cells = row.as_ref();
            let Some(key_index) = cells.iter().position(|cell| !normalize(cell).is_empty()) else {
                continue;
            };

            let key = normalize(&cells[key_index]);
            let value = cells
                .get(key_index + 1)
                .map(normalize)
                .unwrap_or_default();

            if value.is_empty() || value.eq_ignore_ascii_case(NO_VALUE_PLACEHOLDER) {
                continue;
            }

            map.insert(key, value);
        }

        Self(map)
    }

    /// キーに対応する値を返す
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn normalize(cell: &Option<String>) -> String {
    cell.as_deref().map(str::trim).unwrap_or_default().to_string()
}

/// 必須フィールド
///
/// シート上のキー文字列で表示される。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr, strum::Display)]
pub enum RequiredField {
    /// チケット番号
    #[strum(serialize = "RITM")]
    TicketId,
    /// AIDE ID
    #[strum(serialize = "AIDE_ID")]
    CaseId,
    /// AIDE 名
    #[strum(serialize = "AIDE NAME")]
    CaseName,
    /// アプリケーションオーナー（ユーザー名またはメールアドレス）
    #[strum(serialize = "Application Owner")]
    Owner,
}

impl RequiredField {
    /// シート上の出現順
    pub const ALL: [Self; 4] = [Self::TicketId, Self::CaseId, Self::CaseName, Self::Owner];

    /// シート上のキー文字列
    pub fn key(self) -> &'static str {
        self.into()
    }
}

/// レコード抽出エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// ドキュメントを開けない・解析できない
    #[error("Cannot open document: {0}")]
    Unreadable(String),

    /// 必須フィールドが欠落している
    #[error("Missing required fields: {}", join_keys(.0))]
    MissingFields(Vec<RequiredField>),
}

fn join_keys(fields: &[RequiredField]) -> String {
    fields
        .iter()
        .map(|field| field.key())
        .collect::<Vec<_>>()
        .join(", ")
}

/// オンボーディングレコード
///
/// 生成後は変更されない。必須フィールドはすべて空でないことが保証される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnboardingRecord {
    /// 入力ファイル名
    pub source_name:       String,
    /// RITM
    pub ticket_id:         String,
    /// AIDE_ID
    pub case_id:           String,
    /// AIDE NAME
    pub case_name:         String,
    /// シートに記載されたオーナー文字列
    pub owner_raw:         String,
    /// 解決済みの宛先アドレス
    pub recipient_address: String,
}

impl OnboardingRecord {
    /// キー・値テーブルからレコードを生成する
    ///
    /// # エラー
    ///
    /// 必須フィールドが欠落していれば、欠落したフィールドをシート上の順序で
    /// 列挙した [`RecordError::MissingFields`] を返す。
    pub fn from_fields(
        source_name: impl Into<String>,
        fields: &FieldMap,
        email_domain: &str,
    ) -> Result<Self, RecordError> {
        let missing: Vec<RequiredField> = RequiredField::ALL
            .into_iter()
            .filter(|field| fields.get(field.key()).is_none_or(str::is_empty))
            .collect();

        if !missing.is_empty() {
            return Err(RecordError::MissingFields(missing));
        }

        let value = |field: RequiredField| fields.get(field.key()).unwrap_or_default().to_string();
        let owner_raw = value(RequiredField::Owner);

        Ok(Self {
            source_name: source_name.into(),
            ticket_id: value(RequiredField::TicketId),
            case_id: value(RequiredField::CaseId),
            case_name: value(RequiredField::CaseName),
            recipient_address: resolve_recipient_address(&owner_raw, email_domain),
            owner_raw,
        })
    }
}

/// 宛先アドレスを解決する
///
/// `@` を含む場合はそのまま、含まない場合（ユーザー名）はデフォルトドメインを付与する。
/// アドレス構文の検証は行わない。
pub fn resolve_recipient_address(owner_raw: &str, email_domain: &str) -> String {
    if owner_raw.contains('@') {
        owner_raw.to_string()
    } else {
        format!("{owner_raw}@{email_domain}")
    }
}
