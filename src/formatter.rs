//! Formatter Module
//!
//! セル値をレコードの値へ変換し、数値・日付を文字列化するモジュール。

use calamine::Data;
use chrono::{Duration, NaiveDate};

use crate::api::DateFormat;
use crate::error::PolicyDocError;
use crate::types::FieldValue;

/// セルフォーマッター
///
/// calamineのセル値を`FieldValue`へ変換するファサードとして機能します。
#[derive(Debug)]
pub(crate) struct CellFormatter {
    /// 日付フォーマッター
    date_formatter: DateFormatter,
}

impl CellFormatter {
    /// 新しいCellFormatterインスタンスを生成
    pub fn new() -> Self {
        Self {
            date_formatter: DateFormatter,
        }
    }

    /// セル値をレコードの値に変換
    ///
    /// # 引数
    ///
    /// * `cell` - calamineのセルデータ
    /// * `date_format` - 日付セルの出力形式
    /// * `is_1904` - 1904年エポックを使用するかどうか
    ///
    /// # 戻り値
    ///
    /// * `Ok(Some(FieldValue))` - 値を持つセル
    /// * `Ok(None)` - 空セル
    /// * `Err(PolicyDocError)` - 日付変換に失敗した場合
    pub fn to_field_value(
        &self,
        cell: &Data,
        date_format: &DateFormat,
        is_1904: bool,
    ) -> Result<Option<FieldValue>, PolicyDocError> {
        let value = match cell {
            Data::Int(i) => FieldValue::Number(*i as f64),
            Data::Float(f) => FieldValue::Number(*f),
            Data::String(s) => FieldValue::Text(s.clone()),
            Data::Bool(b) => FieldValue::Bool(*b),
            Data::DateTime(dt) => {
                let serial = dt.as_f64();
                if dt.is_duration() || *date_format == DateFormat::Serial {
                    FieldValue::Number(serial)
                } else {
                    FieldValue::Text(self.date_formatter.format(serial, date_format, is_1904)?)
                }
            }
            Data::DateTimeIso(s) | Data::DurationIso(s) => FieldValue::Text(s.clone()),
            Data::Error(e) => FieldValue::Text(e.to_string()),
            _ => return Ok(None),
        };
        Ok(Some(value))
    }

    /// ヘッダーセルの文字列表現（空セルは`None`）
    pub fn header_name(&self, cell: &Data) -> Option<String> {
        match cell {
            Data::Empty => None,
            Data::String(s) if s.is_empty() => None,
            Data::String(s) => Some(s.clone()),
            Data::Float(f) => Some(format_number(*f)),
            other => Some(other.to_string()),
        }
    }
}

impl Default for CellFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// 日付フォーマッター
///
/// Excelのシリアル日付値を文字列に変換します。
#[derive(Debug)]
pub(crate) struct DateFormatter;

impl DateFormatter {
    /// 日付値をフォーマット
    ///
    /// # エポックシステム
    ///
    /// - 1900年システム（デフォルト）: 1899年12月30日起算
    ///   - シリアル値60（存在しない1900年2月29日）以前は1日ずれる
    ///   - シリアル値61 = 1900年3月1日
    /// - 1904年システム: 1904年1月1日起算
    ///   - シリアル値0 = 1904年1月1日
    pub fn format(
        &self,
        serial_value: f64,
        date_format: &DateFormat,
        is_1904: bool,
    ) -> Result<String, PolicyDocError> {
        let epoch = if is_1904 {
            NaiveDate::from_ymd_opt(1904, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(1899, 12, 30)
        }
        .ok_or_else(|| PolicyDocError::Config("Invalid epoch date".to_string()))?;

        let mut days = serial_value.floor() as i64;
        // Excelの1900年うるう年バグ: 1-59は1日前にずれる
        if !is_1904 && (1..60).contains(&days) {
            days += 1;
        }

        let date = Duration::try_days(days)
            .and_then(|offset| epoch.checked_add_signed(offset))
            .ok_or_else(|| {
                PolicyDocError::Config(format!(
                    "Date calculation overflow: serial_value={}, is_1904={}",
                    serial_value, is_1904
                ))
            })?;

        let formatted = match date_format {
            DateFormat::Custom(format_str) => date.format(format_str).to_string(),
            _ => date.format("%Y-%m-%d").to_string(),
        };

        Ok(formatted)
    }
}

/// 数値の文字列化
///
/// 整数値は小数部なし（`350.0` → `350`）、それ以外は往復可能な最短表現。
pub(crate) fn format_number(value: f64) -> String {
    match whole_number(value) {
        Some(i) => i.to_string(),
        None => format!("{}", value),
    }
}

/// 小数部のない有限値を整数に変換する（精度を失う大きさの値は`None`）
pub(crate) fn whole_number(value: f64) -> Option<i64> {
    (value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15).then(|| value as i64)
}
