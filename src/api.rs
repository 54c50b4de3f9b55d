//! Public API Types
//!
//! 公開APIで使用する列挙型と定数を定義するモジュール。

/// 生成される文書のファイル名
pub const OUTPUT_FILE_NAME: &str = "GeneratedPolicyDocument.docx";

/// 生成される文書のMIMEタイプ
pub const DOCX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// 受け付けるスプレッドシートの拡張子（ファイル名の末尾で判定）
pub const SPREADSHEET_EXTENSION: &str = ".xlsx";

/// テンプレート文書の既定パス
pub const DEFAULT_TEMPLATE_PATH: &str = "docs_template.docx";

/// 日付セルの出力形式
///
/// スプレッドシートの日付セルをレコードに取り込む際の形式を指定します。
/// 既定ではセルに保存されている数値をそのまま取り込みます。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum DateFormat {
    /// ISO 8601形式（YYYY-MM-DD）
    ///
    /// 例: `2025-11-20`
    Iso8601,

    /// カスタム形式（chrono互換フォーマット文字列）
    ///
    /// # フォーマット指定子（主要なもの）
    ///
    /// - `%Y`: 4桁の年（例: 2025）
    /// - `%m`: 2桁の月（01-12）
    /// - `%d`: 2桁の日（01-31）
    /// - `%B`: 月名（例: November）
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use policydoc::{GeneratorBuilder, DateFormat};
    ///
    /// # fn main() -> Result<(), policydoc::PolicyDocError> {
    /// let generator = GeneratorBuilder::new()
    ///     .with_date_format(DateFormat::Custom("%d/%m/%Y".to_string()))
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    Custom(String),

    /// Excelのシリアル値をそのまま数値として取り込む
    ///
    /// 例: `2025-11-20` → `45981`
    #[default]
    Serial,
}

impl std::str::FromStr for DateFormat {
    type Err = std::convert::Infallible;

    /// `iso8601` / `serial` 以外の文字列はカスタム形式として扱う
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "iso8601" | "iso" => DateFormat::Iso8601,
            "serial" => DateFormat::Serial,
            other => DateFormat::Custom(other.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_format_from_str() {
        assert_eq!("iso8601".parse::<DateFormat>().unwrap(), DateFormat::Iso8601);
        assert_eq!("serial".parse::<DateFormat>().unwrap(), DateFormat::Serial);
        assert_eq!(DateFormat::default(), DateFormat::Serial);
        assert_eq!(
            "%d/%m/%Y".parse::<DateFormat>().unwrap(),
            DateFormat::Custom("%d/%m/%Y".to_string())
        );
    }

    #[test]
    fn test_output_constants() {
        assert_eq!(OUTPUT_FILE_NAME, "GeneratedPolicyDocument.docx");
        assert!(DOCX_MIME_TYPE.ends_with("wordprocessingml.document"));
    }
}
