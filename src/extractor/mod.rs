//! Extractor Module
//!
//! calamineを使用してスプレッドシートの最初のシートを読み込み、
//! 最初のデータ行を`PolicyRecord`として抽出します。

mod metadata;
mod workbook;

pub(crate) use metadata::WorkbookMetadata;
pub(crate) use workbook::WorkbookReader;

use std::path::Path;

use crate::api::SPREADSHEET_EXTENSION;
use crate::error::PolicyDocError;

/// ファイル名がスプレッドシートの拡張子で終わるかを検証する
///
/// 判定はファイル名の末尾のみで行い（大文字・小文字を区別）、内容は読み込みません。
///
/// # 使用例
///
/// ```rust
/// use policydoc::check_file_name;
///
/// assert!(check_file_name("policy.xlsx").is_ok());
/// assert!(check_file_name("data.csv").is_err());
/// ```
pub fn check_file_name(file_name: &str) -> Result<(), PolicyDocError> {
    if file_name.ends_with(SPREADSHEET_EXTENSION) {
        Ok(())
    } else {
        Err(PolicyDocError::InvalidFileType {
            file_name: file_name.to_string(),
        })
    }
}

/// パスのファイル名部分を検証する
pub(crate) fn check_path(path: &Path) -> Result<(), PolicyDocError> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    check_file_name(&file_name)
}
