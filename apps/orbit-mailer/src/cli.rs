//! # コマンドライン引数

use std::path::PathBuf;

use clap::Parser;

/// ORBIT Power BI オンボーディングメール一括送信
#[derive(Debug, Clone, Parser)]
#[command(name = "orbit-mailer", version, about)]
pub struct Args {
    /// 送信設定ファイル（dotenv 形式）
    #[arg(long, env = "ORBIT_MAILER_CONFIG", default_value = "config.env")]
    pub config: PathBuf,

    /// 入力ワークブック（.xlsx）を置くディレクトリ
    #[arg(long, default_value = "input_files")]
    pub input_dir: PathBuf,

    /// ログファイルと結果 CSV の出力先ディレクトリ
    #[arg(long, default_value = "logs")]
    pub logs_dir: PathBuf,

    /// メール本文に埋め込むバナー画像
    #[arg(long, default_value = "assets/orbit_banner.jpeg")]
    pub banner: PathBuf,
}
