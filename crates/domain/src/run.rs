//! # 実行識別子

use derive_more::Display;
use uuid::Uuid;

/// 実行 ID
///
/// 1 回のバッチ実行を識別する。ログのスパンに付与され、
/// 同じ実行で出力されたログ行を突き合わせるために使う。UUID v7 を使用。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display("{_0}")]
pub struct RunId(Uuid);

impl RunId {
    /// 新しい ID を生成する（UUID v7）
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}
