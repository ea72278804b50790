//! # Observability 基盤
//!
//! トレーシング初期化とログ出力形式の設定を提供する。
//! 処理ログは端末（標準出力）とログファイルの両方に同じ内容を出力する。
//! 環境変数 `LOG_FORMAT` による JSON / Pretty 出力の切り替えに対応する。

use std::path::PathBuf;

/// ログ出力形式
///
/// 環境変数 `LOG_FORMAT` で切り替える。
/// 値が未設定または不正な場合は [`Pretty`](LogFormat::Pretty) にフォールバックする。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// JSON 形式（ログ集約向け）
    Json,
    /// 人間が読みやすい形式
    #[default]
    Pretty,
}

impl LogFormat {
    /// 文字列からログ形式をパースする
    ///
    /// 大文字小文字は区別しない。不正な値の場合は [`Pretty`](LogFormat::Pretty) に
    /// フォールバックし、stderr に警告を出力する（トレーシング初期化前のため）。
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            "pretty" => Self::Pretty,
            other => {
                eprintln!("WARNING: unknown LOG_FORMAT={other:?}, falling back to pretty");
                Self::Pretty
            }
        }
    }

    /// 環境変数 `LOG_FORMAT` から読み取る
    ///
    /// 未設定の場合は [`Pretty`](LogFormat::Pretty) をデフォルトとする。
    pub fn from_env() -> Self {
        match std::env::var("LOG_FORMAT") {
            Ok(val) => Self::parse(&val),
            Err(_) => Self::default(),
        }
    }
}

/// トレーシング初期化設定
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// ログ出力形式
    pub log_format: LogFormat,
    /// ログファイルのパス（`None` なら端末のみ）
    pub log_file:   Option<PathBuf>,
}

impl TracingConfig {
    /// 新しい設定を作成する
    pub fn new(log_format: LogFormat) -> Self {
        Self {
            log_format,
            log_file: None,
        }
    }

    /// 環境変数から設定を読み取る
    ///
    /// `LOG_FORMAT` 環境変数で出力形式を決定する。
    pub fn from_env() -> Self {
        Self::new(LogFormat::from_env())
    }

    /// ログファイルへのミラー出力を有効にする
    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }
}

/// トレーシング初期化エラー
#[cfg(feature = "observability")]
#[derive(Debug, thiserror::Error)]
pub enum TracingInitError {
    /// ログファイルを作成できない
    #[error("cannot create log file {}: {source}", .path.display())]
    LogFile {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// グローバルサブスクライバが既に設定されている
    #[error("failed to install tracing subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// トレーシングを初期化する
///
/// `RUST_LOG` 環境変数でログレベルを制御可能。
/// 未設定の場合は `"info,orbit_mailer=debug"` をデフォルトとする。
///
/// ログファイルが指定されている場合、端末と同じイベントを ANSI エスケープなしで
/// ファイルにも書き出す。親ディレクトリは作成済みであること。
#[cfg(feature = "observability")]
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingInitError> {
    use std::{fs::File, sync::Mutex};

    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,orbit_mailer=debug".into());

    let file_layer = match &config.log_file {
        Some(path) => {
            let file = File::create(path).map_err(|source| TracingInitError::LogFile {
                path: path.clone(),
                source,
            })?;
            Some(fmt_layer(config.log_format, Mutex::new(file), false))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer(config.log_format, std::io::stdout, true))
        .with(file_layer)
        .try_init()?;

    Ok(())
}

/// 出力先ごとの fmt レイヤーを構築する
#[cfg(feature = "observability")]
fn fmt_layer<S, W>(
    log_format: LogFormat,
    writer: W,
    ansi: bool,
) -> Box<dyn tracing_subscriber::Layer<S> + Send + Sync + 'static>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    W: for<'w> tracing_subscriber::fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    use tracing_subscriber::Layer as _;

    match log_format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_target(true)
            .with_current_span(true)
            .with_span_list(false)
            .with_ansi(ansi)
            .with_writer(writer)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .with_ansi(ansi)
            .with_writer(writer)
            .boxed(),
    }
}
