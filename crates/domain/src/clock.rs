//! # Clock（時刻プロバイダ）
//!
//! `Local::now()` の直接呼び出しを置き換え、ログファイル名・結果ファイル名の
//! タイムスタンプをテストで固定できるようにするための抽象化。

use chrono::{DateTime, Local};

/// 結果ファイル名・ログファイル名に使うタイムスタンプ形式
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// 現在時刻を提供するトレイト
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// 実際のシステム時刻を返す実装
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// 固定時刻を返すテスト用実装
pub struct FixedClock {
    now: DateTime<Local>,
}

impl FixedClock {
    pub fn new(now: DateTime<Local>) -> Self {
        Self { now }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.now
    }
}

/// ファイル名用のタイムスタンプ文字列（例: `20260301_093000`）
pub fn file_timestamp(at: DateTime<Local>) -> String {
    at.format(FILE_TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_system_clock_は現在時刻を返す() {
        let clock = SystemClock;
        let before = Local::now();
        let result = clock.now();
        let after = Local::now();

        assert!(result >= before);
        assert!(result <= after);
    }

    #[test]
    fn test_fixed_clock_はコンストラクタで渡した時刻を返す() {
        let fixed_time = Local::now();
        let clock = FixedClock::new(fixed_time);

        assert_eq!(clock.now(), fixed_time);
    }

    #[test]
    fn test_file_timestamp_の形式() {
        let at = Local.with_ymd_and_hms(2026, 3, 1, 9, 30, 5).unwrap();

        assert_eq!(file_timestamp(at), "20260301_093005");
    }
}
