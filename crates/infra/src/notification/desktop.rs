//! デスクトップメールクライアント通知送信実装
//!
//! ローカルで起動している Outlook を PowerShell 経由の COM オートメーションで操作し、
//! メールを送信する。認証情報は不要。
//!
//! メッセージの内容はスクリプト本文に埋め込まず、作業ディレクトリのファイルと
//! `ORBIT_MAIL_*` 環境変数で受け渡す。

use std::{
    path::{Path, PathBuf},
    process::Stdio,
};

use async_trait::async_trait;
use orbit_mailer_domain::notification::{EmailMessage, NotificationError};
use tokio::process::Command;

use super::NotificationSender;

/// Outlook を操作する PowerShell スクリプト
const SEND_SCRIPT: &str = include_str!("../../scripts/outlook_send.ps1");

/// スクリプトが「Outlook に接続できない」ことを示す終了コード
const EXIT_CLIENT_UNAVAILABLE: i32 = 3;

/// デフォルトの PowerShell 実行ファイル
const DEFAULT_POWERSHELL: &str = "powershell.exe";

/// デスクトップメールクライアント通知送信
#[derive(Debug, Clone)]
pub struct DesktopClientNotificationSender {
    powershell: PathBuf,
}

impl DesktopClientNotificationSender {
    pub fn new() -> Self {
        Self {
            powershell: PathBuf::from(DEFAULT_POWERSHELL),
        }
    }

    /// PowerShell 実行ファイルを指定する（`pwsh` など）
    pub fn with_powershell(powershell: impl Into<PathBuf>) -> Self {
        Self {
            powershell: powershell.into(),
        }
    }

    async fn run_script(&self, email: &EmailMessage) -> Result<(), NotificationError> {
        let workdir = tempfile::tempdir().map_err(|e| {
            NotificationError::SendFailed(format!("cannot create scratch directory: {e}"))
        })?;

        let staged = stage_message(workdir.path(), email).await?;

        let mut command = Command::new(&self.powershell);
        command
            .args([
                "-NoProfile",
                "-NonInteractive",
                "-ExecutionPolicy",
                "Bypass",
                "-Command",
                SEND_SCRIPT,
            ])
            .env("ORBIT_MAIL_TO", &email.to)
            .env("ORBIT_MAIL_CC", email.cc.as_deref().unwrap_or_default())
            .env("ORBIT_MAIL_SUBJECT", &email.subject)
            .env("ORBIT_MAIL_BODY_PATH", &staged.body_path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());

        if let (Some(image), Some(attachment_path)) =
            (&email.inline_image, &staged.attachment_path)
        {
            command
                .env("ORBIT_MAIL_ATTACHMENT_PATH", attachment_path)
                .env("ORBIT_MAIL_CONTENT_ID", &image.content_id);
        }

        let output = command.output().await.map_err(|e| {
            NotificationError::Unavailable(format!(
                "cannot launch {}: {e}",
                self.powershell.display()
            ))
        })?;

        interpret_exit(output.status.code(), &String::from_utf8_lossy(&output.stderr))
    }
}

impl Default for DesktopClientNotificationSender {
    fn default() -> Self {
        Self::new()
    }
}

/// スクリプトに渡すファイルの配置先
#[derive(Debug)]
struct StagedMessage {
    body_path:       PathBuf,
    attachment_path: Option<PathBuf>,
}

/// 本文とインライン画像を作業ディレクトリに書き出す
///
/// 画像は `attachment/` 配下に置き、ファイル名が本文と重ならないようにする。
async fn stage_message(
    workdir: &Path,
    email: &EmailMessage,
) -> Result<StagedMessage, NotificationError> {
    let body_path = workdir.join("body.html");
    write_scratch(&body_path, email.html_body.as_bytes()).await?;

    let attachment_path = match &email.inline_image {
        Some(image) => {
            let dir = workdir.join("attachment");
            tokio::fs::create_dir(&dir).await.map_err(|e| {
                NotificationError::SendFailed(format!("cannot create {}: {e}", dir.display()))
            })?;
            let path = dir.join(&image.filename);
            write_scratch(&path, &image.bytes).await?;
            Some(path)
        }
        None => None,
    };

    Ok(StagedMessage {
        body_path,
        attachment_path,
    })
}

async fn write_scratch(path: &Path, contents: &[u8]) -> Result<(), NotificationError> {
    tokio::fs::write(path, contents).await.map_err(|e| {
        NotificationError::SendFailed(format!("cannot write {}: {e}", path.display()))
    })
}

/// スクリプトの終了コードを送信結果に変換する
fn interpret_exit(code: Option<i32>, stderr: &str) -> Result<(), NotificationError> {
    let detail = stderr.trim();
    match code {
        Some(0) => Ok(()),
        Some(EXIT_CLIENT_UNAVAILABLE) => Err(NotificationError::Unavailable(format!(
            "Outlook automation is not reachable: {detail}"
        ))),
        Some(code) => Err(NotificationError::SendFailed(format!(
            "Outlook send failed (exit {code}): {detail}"
        ))),
        None => Err(NotificationError::SendFailed(
            "Outlook send script was terminated by a signal".to_string(),
        )),
    }
}

#[async_trait]
impl NotificationSender for DesktopClientNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError> {
        if !cfg!(windows) {
            return Err(NotificationError::Unavailable(
                "desktop mail client automation requires Windows with Outlook installed"
                    .to_string(),
            ));
        }

        self.run_script(email).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use orbit_mailer_domain::notification::InlineImage;
    use rstest::rstest;

    use super::*;

    fn make_email() -> EmailMessage {
        EmailMessage {
            to:           "nkelly13@corp.com".to_string(),
            cc:           None,
            subject:      "subject".to_string(),
            html_body:    Arc::from("<p>body</p>"),
            inline_image: None,
        }
    }

    #[tokio::test]
    async fn 画像は本文と別のディレクトリに書き出す() {
        let workdir = tempfile::tempdir().unwrap();
        let email = EmailMessage {
            inline_image: Some(Arc::new(InlineImage {
                content_id:   "orbit_banner".to_string(),
                filename:     "body.html".to_string(),
                content_type: "image/jpeg".to_string(),
                bytes:        vec![0xFF, 0xD8, 0xFF],
            })),
            ..make_email()
        };

        let staged = stage_message(workdir.path(), &email).await.unwrap();
        let attachment_path = staged.attachment_path.unwrap();

        assert_ne!(staged.body_path, attachment_path);
        assert_eq!(
            std::fs::read_to_string(&staged.body_path).unwrap(),
            "<p>body</p>"
        );
        assert_eq!(std::fs::read(&attachment_path).unwrap(), vec![0xFF, 0xD8, 0xFF]);
    }

    #[tokio::test]
    async fn 画像がなければ本文だけを書き出す() {
        let workdir = tempfile::tempdir().unwrap();

        let staged = stage_message(workdir.path(), &make_email()).await.unwrap();

        assert!(staged.body_path.is_file());
        assert!(staged.attachment_path.is_none());
    }

    #[test]
    fn トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DesktopClientNotificationSender>();
    }

    #[test]
    fn 終了コード0は成功() {
        assert_eq!(interpret_exit(Some(0), ""), Ok(()));
    }

    #[test]
    fn 終了コード3はunavailable() {
        let result = interpret_exit(Some(3), "Retrieving the COM class factory failed\n");

        assert_eq!(
            result,
            Err(NotificationError::Unavailable(
                "Outlook automation is not reachable: Retrieving the COM class factory failed"
                    .to_string()
            ))
        );
    }

    #[rstest]
    #[case(Some(1))]
    #[case(Some(255))]
    #[case(None)]
    fn その他の終了はsend_failed(#[case] code: Option<i32>) {
        assert!(matches!(
            interpret_exit(code, "boom"),
            Err(NotificationError::SendFailed(_))
        ));
    }

    #[cfg(not(windows))]
    #[tokio::test]
    async fn windows以外ではunavailableを返す() {
        let sender = DesktopClientNotificationSender::new();

        let result = sender.send_email(&make_email()).await;

        assert!(matches!(result, Err(NotificationError::Unavailable(_))));
    }

    #[tokio::test]
    async fn powershellが起動できなければunavailableを返す() {
        let sender = DesktopClientNotificationSender::with_powershell("/nonexistent/powershell");

        let result = sender.run_script(&make_email()).await;

        assert!(matches!(result, Err(NotificationError::Unavailable(_))));
    }
}
