//! # アセット読み込み
//!
//! メール本文に埋め込むインライン画像（バナー）を読み込む。
//! 画像が見つからない・読めない場合は警告を出し、画像なしで送信を続ける。

use std::path::Path;

use orbit_mailer_domain::notification::InlineImage;

/// インライン画像を読み込む
///
/// 読み込めなかった場合は `None` を返す（送信は画像なしで継続する）。
pub fn load_inline_image(path: &Path, content_id: &str) -> Option<InlineImage> {
    match std::fs::read(path) {
        Ok(bytes) => {
            tracing::debug!(path = %path.display(), size = bytes.len(), "バナー画像を読み込みました");
            Some(InlineImage {
                content_id: content_id.to_string(),
                filename: path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| format!("{content_id}.jpeg")),
                content_type: content_type_for(path).to_string(),
                bytes,
            })
        }
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "バナー画像が見つかりません。画像なしで送信します"
            );
            None
        }
    }
}

/// 拡張子から MIME タイプを推定する（不明な場合は JPEG）
fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        _ => "image/jpeg",
    }
}
