//! # ORBIT Power BI オンボーディングメーラー
//!
//! 入力ワークブックからウェルカムメールを一括送信する CLI。
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `ORBIT_MAILER_CONFIG` | No | 設定ファイルのパス（デフォルト: `config.env`） |
//! | `RUST_LOG` | No | ログレベル（デフォルト: `info,orbit_mailer=debug`） |
//! | `LOG_FORMAT` | No | `json` で JSON 形式のログを出力 |
//!
//! 送信設定そのものは設定ファイルに記述する（[`orbit_mailer::config`] を参照）。
//!
//! ## 起動方法
//!
//! ```bash
//! cargo run -p orbit-mailer -- --config config.env --input-dir input_files
//! ```
//!
//! ## 終了コード
//!
//! 設定エラーなど起動時の失敗のみ非ゼロで終了する。
//! 個々のファイルの送信失敗・スキップは結果 CSV に記録され、終了コードには影響しない。

use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser;
use orbit_mailer::{
    cli::Args,
    config::MailerConfig,
    sender::build_sender,
    usecase::{RecordExtractor, RunCoordinator, TemplateRenderer, discover_inputs},
};
use orbit_mailer_domain::{
    clock::{Clock, SystemClock, file_timestamp},
    notification::BANNER_CONTENT_ID,
};
use orbit_mailer_infra::{
    asset::load_inline_image,
    spreadsheet::XlsxDocumentReader,
    summary::CsvSummaryStore,
};
use orbit_mailer_shared::{
    event_log::error,
    observability::{TracingConfig, init_tracing},
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）。ログ設定用で、送信設定は含めない
    dotenvy::dotenv().ok();

    let args = Args::parse();

    std::fs::create_dir_all(&args.logs_dir).with_context(|| {
        format!(
            "ログディレクトリを作成できません: {}",
            args.logs_dir.display()
        )
    })?;

    // ログファイルと結果 CSV は同じ開始時刻で命名する
    let started_at = SystemClock.now();
    let log_file = args
        .logs_dir
        .join(format!("email_log_{}.log", file_timestamp(started_at)));
    init_tracing(TracingConfig::from_env().with_log_file(&log_file))
        .context("トレーシングの初期化に失敗しました")?;

    tracing::info!(
        log_file = %log_file.display(),
        version = env!("CARGO_PKG_VERSION"),
        "ORBIT Power BI オンボーディングメーラーを起動します"
    );

    let config = MailerConfig::load(&args.config).inspect_err(|e| {
        tracing::error!(
            error.category = error::category::STARTUP,
            error.kind = error::kind::CONFIG,
            error = %e,
            config = %args.config.display(),
            "設定の読み込みに失敗しました"
        );
    })?;

    let documents = discover_inputs(&args.input_dir);
    if documents.is_empty() {
        tracing::info!("処理対象がないため終了します");
        return Ok(());
    }

    let sender = build_sender(&config).inspect_err(|e| {
        tracing::error!(
            error.category = error::category::STARTUP,
            error.kind = error::kind::TRANSPORT_UNAVAILABLE,
            error = %e,
            "送信手段を構築できません"
        );
    })?;
    let renderer = TemplateRenderer::new(BANNER_CONTENT_ID)?;

    let coordinator = RunCoordinator::new(
        RecordExtractor::new(XlsxDocumentReader, config.email_domain.clone()),
        renderer,
        sender,
        Arc::new(CsvSummaryStore::new(&args.logs_dir)),
    )
    .with_cc(config.cc_email.clone())
    .with_banner(load_inline_image(&args.banner, BANNER_CONTENT_ID))
    .with_started_at(started_at);

    coordinator.run(&documents).await;

    Ok(())
}
