//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use thiserror::Error;

/// policydocクレート全体で使用するエラー型
///
/// Excelファイルの読み込み、テンプレートの展開・置換、出力文書の書き出しで
/// 発生するすべてのエラーを統一的に扱います。
///
/// # エラーの種類
///
/// - `Io`: I/O操作中に発生したエラー（ファイル読み込み失敗など）
/// - `Parse`: Excelファイルの解析中に発生したエラー（calamine由来）
/// - `Zip` / `Xml`: テンプレート（DOCX）の展開・再構築中のエラー
/// - `InvalidFileType`: `.xlsx`以外のファイルが指定された
/// - `NoSheets` / `NoDataRows`: スプレッドシートに抽出対象がない
/// - `Template`: プレースホルダーの構文エラー
/// - `Config`: 設定の検証に失敗したエラー
/// - `SecurityViolation`: セキュリティ制限に違反したエラー
///
/// # 使用例
///
/// ```rust,no_run
/// use policydoc::PolicyDocError;
/// use std::fs::File;
///
/// fn open_template(path: &str) -> Result<(), PolicyDocError> {
///     let _file = File::open(path)?;  // Ioエラーが自動的に変換される
///     Ok(())
/// }
/// ```
#[derive(Error, Debug)]
pub enum PolicyDocError {
    /// I/O操作中に発生したエラー
    ///
    /// `#[from]`属性により、`std::io::Error`から自動的に変換されます。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Excelファイルの解析中に発生したエラー
    ///
    /// calamineクレートがExcelファイルを解析する際に発生したエラーです。
    /// ファイル形式が不正、破損したファイルなどが原因となります。
    #[error("Failed to parse Excel file: {0}")]
    Parse(#[from] calamine::Error),

    /// UTF-8文字列の変換エラー
    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// ZIPアーカイブの解析・書き込みエラー
    #[error("ZIP archive error: {0}")]
    Zip(String),

    /// XMLの読み書きエラー
    #[error("XML error: {0}")]
    Xml(String),

    /// 設定の検証に失敗したエラー
    ///
    /// `GeneratorBuilder::build()`時に設定を検証し、無効な設定が検出された
    /// 場合に発生します。
    ///
    /// # 例
    ///
    /// ```rust,no_run
    /// use policydoc::{GeneratorBuilder, PolicyDocError};
    ///
    /// let result = GeneratorBuilder::new()
    ///     .with_delimiters("", "}")  // 空の開始区切り文字
    ///     .build();
    ///
    /// match result {
    ///     Err(PolicyDocError::Config(msg)) => {
    ///         println!("設定エラー: {}", msg);
    ///     }
    ///     _ => {}
    /// }
    /// ```
    #[error("Configuration error: {0}")]
    Config(String),

    /// 拡張子が`.xlsx`でないファイルが選択された
    ///
    /// ファイル名の末尾のみで判定し、内容は読み込みません。
    #[error("Invalid file type: '{file_name}' (expected a .xlsx file)")]
    InvalidFileType {
        /// 選択されたファイル名
        file_name: String,
    },

    /// ワークブックにシートが1枚もない
    #[error("Workbook contains no sheets")]
    NoSheets,

    /// 最初のシートにヘッダー行以外のデータ行がない
    #[error("Sheet '{sheet}' contains no data rows")]
    NoDataRows {
        /// 対象シート名
        sheet: String,
    },

    /// テンプレートのプレースホルダー構文エラー
    ///
    /// # 例
    ///
    /// ```rust,no_run
    /// use policydoc::PolicyDocError;
    ///
    /// let error = PolicyDocError::Template {
    ///     part: "word/document.xml".to_string(),
    ///     message: "Unclosed tag 'policyNumber'".to_string(),
    /// };
    ///
    /// println!("{}", error);
    /// // 出力: "Template error in 'word/document.xml': Unclosed tag 'policyNumber'"
    /// ```
    #[error("Template error in '{part}': {message}")]
    Template {
        /// エラーが発生したアーカイブ内のパート名
        part: String,
        /// エラーの詳細メッセージ
        message: String,
    },

    /// セキュリティ制限に違反したエラー
    ///
    /// ZIP bomb攻撃、パストラバーサル攻撃、ファイルサイズ制限などの
    /// セキュリティ制限に違反した場合に発生します。
    #[error("Security violation: {0}")]
    SecurityViolation(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error: PolicyDocError = io_err.into();

        match error {
            PolicyDocError::Io(e) => {
                assert_eq!(e.kind(), io::ErrorKind::NotFound);
                assert_eq!(e.to_string(), "File not found");
            }
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_parse_error_display() {
        let parse_err = calamine::Error::Msg("Corrupted file");
        let error: PolicyDocError = parse_err.into();

        let error_msg = error.to_string();
        assert!(error_msg.contains("Failed to parse Excel file"));
        assert!(error_msg.contains("Corrupted file"));
    }

    #[test]
    fn test_invalid_file_type_display() {
        let error = PolicyDocError::InvalidFileType {
            file_name: "data.csv".to_string(),
        };
        let error_msg = error.to_string();
        assert!(error_msg.contains("data.csv"));
        assert!(error_msg.contains(".xlsx"));
    }

    #[test]
    fn test_template_error_display() {
        let error = PolicyDocError::Template {
            part: "word/document.xml".to_string(),
            message: "Unclosed tag 'price1'".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Template error in 'word/document.xml': Unclosed tag 'price1'"
        );
    }

    // エラー変換のテスト（?演算子の動作確認）
    #[test]
    fn test_error_conversion_with_question_mark() {
        fn io_operation() -> Result<(), PolicyDocError> {
            let _file = std::fs::File::open("nonexistent_template.docx")?;
            Ok(())
        }

        match io_operation() {
            Err(PolicyDocError::Io(_)) => {}
            _ => panic!("Expected Io error from ? operator"),
        }
    }

    #[test]
    fn test_all_error_formats() {
        let io_err: PolicyDocError = io::Error::other("test io").into();
        assert!(io_err.to_string().starts_with("IO error"));

        let config_err = PolicyDocError::Config("test config".to_string());
        assert!(config_err.to_string().starts_with("Configuration error"));

        let zip_err = PolicyDocError::Zip("test zip".to_string());
        assert!(zip_err.to_string().starts_with("ZIP archive error"));

        let rows_err = PolicyDocError::NoDataRows {
            sheet: "Sheet1".to_string(),
        };
        assert_eq!(rows_err.to_string(), "Sheet 'Sheet1' contains no data rows");

        let security_err = PolicyDocError::SecurityViolation("too big".to_string());
        assert!(security_err.to_string().starts_with("Security violation"));
    }
}
