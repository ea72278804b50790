//! # 送信設定
//!
//! dotenv 形式の設定ファイル（デフォルト: `config.env`）から送信設定を読み込む。
//! プロセスの環境変数には展開せず、読み込んだ値は [`MailerConfig`] として
//! 明示的に受け渡す。
//!
//! ## 設定キー
//!
//! | キー | 必須 | 説明 |
//! |------|------|------|
//! | `SEND_METHOD` | **Yes** | `OUTLOOK` または `SMTP`（大文字小文字を区別しない） |
//! | `EMAIL_DOMAIN` | **Yes** | オーナー ID に付与するドメイン |
//! | `CC_EMAIL` | No | 全メールに付ける CC アドレス |
//! | `SMTP_HOST` | SMTP 時 | SMTP サーバーのホスト名 |
//! | `SMTP_PORT` | No | ポート番号（デフォルト: `587`） |
//! | `SMTP_USE_TLS` | No | TLS を使うか（デフォルト: `true`） |
//! | `SMTP_USER` | No | 認証ユーザー名（空なら匿名リレー） |
//! | `SMTP_PASSWORD` | No | 認証パスワード |
//! | `SMTP_FROM` | SMTP 時 | 送信元アドレス |

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    str::FromStr,
};

use orbit_mailer_infra::notification::SmtpSettings;
use thiserror::Error;

/// SMTP のデフォルトポート（STARTTLS）
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// 設定キー
pub mod key {
    pub const SEND_METHOD: &str = "SEND_METHOD";
    pub const EMAIL_DOMAIN: &str = "EMAIL_DOMAIN";
    pub const CC_EMAIL: &str = "CC_EMAIL";
    pub const SMTP_HOST: &str = "SMTP_HOST";
    pub const SMTP_PORT: &str = "SMTP_PORT";
    pub const SMTP_USE_TLS: &str = "SMTP_USE_TLS";
    pub const SMTP_USER: &str = "SMTP_USER";
    pub const SMTP_PASSWORD: &str = "SMTP_PASSWORD";
    pub const SMTP_FROM: &str = "SMTP_FROM";
}

/// 送信方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum SendMethod {
    /// ローカルのデスクトップメールクライアント（Outlook）経由
    Outlook,
    /// SMTP リレー経由
    Smtp,
}

/// 設定読み込みエラー
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("cannot read config file {}: {source}", .path.display())]
    Read {
        path:   PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{key} has an invalid value '{value}': {reason}")]
    Invalid {
        key:    &'static str,
        value:  String,
        reason: String,
    },
}

/// 送信設定
#[derive(Debug, Clone)]
pub struct MailerConfig {
    /// 送信方式
    pub send_method:  SendMethod,
    /// オーナー ID に付与するドメイン
    pub email_domain: String,
    /// 全メールに付ける CC アドレス
    pub cc_email:     Option<String>,
    /// SMTP 接続設定（`send_method` が SMTP のときのみ使用）
    pub smtp:         SmtpSettings,
}

impl MailerConfig {
    /// 設定ファイルを読み込む
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let read_error = |source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        };
        let values = dotenvy::from_path_iter(path)
            .map_err(read_error)?
            .collect::<Result<HashMap<_, _>, _>>()
            .map_err(read_error)?;

        Self::from_map(&values)
    }

    /// キー・値のマップから設定を組み立てる
    pub fn from_map(values: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let lookup = Lookup(values);

        let send_method = lookup.required(key::SEND_METHOD)?;
        let send_method = SendMethod::from_str(send_method).map_err(|_| ConfigError::Invalid {
            key:    key::SEND_METHOD,
            value:  send_method.to_string(),
            reason: "expected OUTLOOK or SMTP".to_string(),
        })?;

        let email_domain = lookup.required(key::EMAIL_DOMAIN)?.to_string();
        let cc_email = lookup.optional(key::CC_EMAIL).map(str::to_string);

        let port = match lookup.optional(key::SMTP_PORT) {
            Some(value) => value.parse().map_err(|e| ConfigError::Invalid {
                key:    key::SMTP_PORT,
                value:  value.to_string(),
                reason: format!("{e}"),
            })?,
            None => DEFAULT_SMTP_PORT,
        };
        let use_tls = match lookup.optional(key::SMTP_USE_TLS) {
            Some(value) => parse_bool(key::SMTP_USE_TLS, value)?,
            None => true,
        };

        let smtp_required = |key| match send_method {
            SendMethod::Smtp => lookup.required(key).map(str::to_string),
            SendMethod::Outlook => Ok(lookup.optional(key).unwrap_or_default().to_string()),
        };

        let smtp = SmtpSettings {
            host: smtp_required(key::SMTP_HOST)?,
            port,
            use_tls,
            username: lookup.optional(key::SMTP_USER).unwrap_or_default().to_string(),
            // パスワードの前後の空白は値の一部として扱う
            password: values.get(key::SMTP_PASSWORD).cloned().unwrap_or_default(),
            from_address: smtp_required(key::SMTP_FROM)?,
        };

        Ok(Self {
            send_method,
            email_domain,
            cc_email,
            smtp,
        })
    }
}

struct Lookup<'a>(&'a HashMap<String, String>);

impl Lookup<'_> {
    /// 前後の空白を除いた値（空なら未設定扱い）
    fn optional(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    fn required(&self, key: &'static str) -> Result<&str, ConfigError> {
        self.optional(key).ok_or(ConfigError::Missing(key))
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn make_values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn smtp_values() -> HashMap<String, String> {
        make_values(&[
            ("SEND_METHOD", "SMTP"),
            ("EMAIL_DOMAIN", "corp.com"),
            ("CC_EMAIL", "orbit_powerbi_onboarding@corp.com"),
            ("SMTP_HOST", "smtp.corp.com"),
            ("SMTP_PORT", "25"),
            ("SMTP_USE_TLS", "false"),
            ("SMTP_USER", "relay-user"),
            ("SMTP_PASSWORD", "secret"),
            ("SMTP_FROM", "onboarding@corp.com"),
        ])
    }

    #[test]
    fn smtp設定をすべて読み込む() {
        let config = MailerConfig::from_map(&smtp_values()).unwrap();

        assert_eq!(config.send_method, SendMethod::Smtp);
        assert_eq!(config.email_domain, "corp.com");
        assert_eq!(
            config.cc_email.as_deref(),
            Some("orbit_powerbi_onboarding@corp.com")
        );
        assert_eq!(
            config.smtp,
            SmtpSettings {
                host:         "smtp.corp.com".to_string(),
                port:         25,
                use_tls:      false,
                username:     "relay-user".to_string(),
                password:     "secret".to_string(),
                from_address: "onboarding@corp.com".to_string(),
            }
        );
    }

    #[rstest]
    #[case("OUTLOOK", SendMethod::Outlook)]
    #[case("outlook", SendMethod::Outlook)]
    #[case("Smtp", SendMethod::Smtp)]
    fn 送信方式は大文字小文字を区別しない(
        #[case] raw: &str,
        #[case] expected: SendMethod,
    ) {
        let mut values = smtp_values();
        values.insert("SEND_METHOD".to_string(), raw.to_string());

        let config = MailerConfig::from_map(&values).unwrap();

        assert_eq!(config.send_method, expected);
    }

    #[test]
    fn 省略したsmtp項目はデフォルト値になる() {
        let values = make_values(&[
            ("SEND_METHOD", "SMTP"),
            ("EMAIL_DOMAIN", "corp.com"),
            ("SMTP_HOST", "smtp.corp.com"),
            ("SMTP_FROM", "onboarding@corp.com"),
        ]);

        let config = MailerConfig::from_map(&values).unwrap();

        assert_eq!(config.smtp.port, DEFAULT_SMTP_PORT);
        assert!(config.smtp.use_tls);
        assert!(config.smtp.credentials().is_none());
        assert_eq!(config.cc_email, None);
    }

    #[test]
    fn outlookではsmtp項目は不要() {
        let values = make_values(&[("SEND_METHOD", "OUTLOOK"), ("EMAIL_DOMAIN", "corp.com")]);

        let config = MailerConfig::from_map(&values).unwrap();

        assert_eq!(config.send_method, SendMethod::Outlook);
        assert_eq!(config.smtp.host, "");
    }

    #[rstest]
    #[case("SEND_METHOD")]
    #[case("EMAIL_DOMAIN")]
    #[case("SMTP_HOST")]
    #[case("SMTP_FROM")]
    fn 必須項目がなければmissingエラー(#[case] missing: &str) {
        let mut values = smtp_values();
        values.remove(missing);

        let result = MailerConfig::from_map(&values);

        assert!(matches!(result, Err(ConfigError::Missing(key)) if key == missing));
    }

    #[test]
    fn 空白だけの値は未設定として扱う() {
        let mut values = smtp_values();
        values.insert("EMAIL_DOMAIN".to_string(), "   ".to_string());

        let result = MailerConfig::from_map(&values);

        assert!(matches!(result, Err(ConfigError::Missing("EMAIL_DOMAIN"))));
    }

    #[rstest]
    #[case("SEND_METHOD", "EWS")]
    #[case("SMTP_PORT", "smtp")]
    #[case("SMTP_PORT", "70000")]
    #[case("SMTP_USE_TLS", "maybe")]
    fn 不正な値はinvalidエラー(#[case] key: &str, #[case] value: &str) {
        let mut values = smtp_values();
        values.insert(key.to_string(), value.to_string());

        let result = MailerConfig::from_map(&values);

        assert!(matches!(result, Err(ConfigError::Invalid { key: k, .. }) if k == key));
    }

    #[rstest]
    #[case("true", true)]
    #[case("True", true)]
    #[case("1", true)]
    #[case("no", false)]
    #[case("FALSE", false)]
    fn tls指定を真偽値として解釈する(#[case] raw: &str, #[case] expected: bool) {
        assert_eq!(parse_bool("SMTP_USE_TLS", raw).unwrap(), expected);
    }

    #[test]
    fn 設定ファイルから読み込む() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "# ORBIT mailer\nSEND_METHOD=smtp\nEMAIL_DOMAIN=corp.com\nSMTP_HOST=smtp.corp.com\nSMTP_FROM=\"onboarding@corp.com\""
        )
        .unwrap();

        let config = MailerConfig::load(file.path()).unwrap();

        assert_eq!(config.send_method, SendMethod::Smtp);
        assert_eq!(config.smtp.from_address, "onboarding@corp.com");
    }

    #[test]
    fn 設定ファイルがなければnot_foundエラー() {
        let dir = tempfile::tempdir().unwrap();

        let result = MailerConfig::load(&dir.path().join("config.env"));

        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn エラーメッセージにキー名が含まれる() {
        assert_eq!(
            ConfigError::Missing("EMAIL_DOMAIN").to_string(),
            "EMAIL_DOMAIN is not set"
        );
    }
}
