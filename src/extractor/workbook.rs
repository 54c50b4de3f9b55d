//! Workbook Reader
//!
//! calamineのラッパーとして、最初のシートからレコードを抽出します。

use calamine::{open_workbook_auto_from_rs, Data, Reader, Sheets, Xlsx};
use std::collections::HashSet;
use std::io::Cursor;

use crate::api::DateFormat;
use crate::error::PolicyDocError;
use crate::extractor::WorkbookMetadata;
use crate::formatter::CellFormatter;
use crate::security::SecurityLimits;
use crate::types::PolicyRecord;

/// ワークブックリーダー
///
/// 入力全体をメモリに保持し、calamineで最初のシートを読み込みます。
pub(crate) struct WorkbookReader {
    /// calamineのワークブック（XLSX形式のみサポート）
    workbook: Xlsx<Cursor<Vec<u8>>>,
    /// xl/workbook.xmlから取得したメタデータ
    metadata: WorkbookMetadata,
    formatter: CellFormatter,
}

impl WorkbookReader {
    /// ワークブックを開く
    ///
    /// アーカイブのセキュリティ検証とメタデータ解析を行ってから、calamineで開きます。
    ///
    /// # 戻り値
    ///
    /// * `Ok(WorkbookReader)` - 読み込みに成功した場合
    /// * `Err(PolicyDocError)` - ZIPとして不正、XLSX以外の形式、セキュリティ違反の場合
    pub fn open(buffer: Vec<u8>, limits: &SecurityLimits) -> Result<Self, PolicyDocError> {
        let metadata = WorkbookMetadata::new(Cursor::new(buffer.as_slice()), limits)?;

        let sheets =
            open_workbook_auto_from_rs(Cursor::new(buffer)).map_err(PolicyDocError::Parse)?;
        let workbook = match sheets {
            Sheets::Xlsx(workbook) => workbook,
            _ => {
                return Err(PolicyDocError::Config(
                    "Only XLSX format is supported".to_string(),
                ))
            }
        };

        Ok(Self {
            workbook,
            metadata,
            formatter: CellFormatter::new(),
        })
    }

    /// 最初のシート名を取得
    pub fn first_sheet_name(&self) -> Result<String, PolicyDocError> {
        self.workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or(PolicyDocError::NoSheets)
    }

    /// 最初のシートの最初のデータ行をレコードとして抽出
    ///
    /// 使用範囲の先頭行をヘッダーとし、以降の空でない最初の行を読み取ります。
    /// 同じヘッダーが複数ある場合は左側の列を優先し、空のヘッダーの列は無視します。
    ///
    /// # 戻り値
    ///
    /// * `Ok(PolicyRecord)` - 抽出されたレコード
    /// * `Err(PolicyDocError::NoSheets)` - シートが存在しない場合
    /// * `Err(PolicyDocError::NoDataRows)` - ヘッダー行以外にデータがない場合
    pub fn first_record(&mut self, date_format: &DateFormat) -> Result<PolicyRecord, PolicyDocError> {
        let sheet_name = self.first_sheet_name()?;
        let range = self
            .workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| PolicyDocError::Parse(e.into()))?;

        let no_data = || PolicyDocError::NoDataRows {
            sheet: sheet_name.clone(),
        };

        let mut rows = range.rows();
        let header_row = rows.next().ok_or_else(no_data)?;
        let headers: Vec<Option<String>> = header_row
            .iter()
            .map(|cell| self.formatter.header_name(cell))
            .collect();

        // 空行はスキップ
        let data_row = rows
            .find(|row| row.iter().any(|cell| !matches!(cell, Data::Empty)))
            .ok_or_else(no_data)?;

        tracing::debug!(
            sheet = %sheet_name,
            columns = headers.len(),
            is_1904 = self.metadata.is_1904,
            "reading first data row"
        );

        let empty = Data::Empty;
        let mut record = PolicyRecord::default();
        let mut seen = HashSet::new();
        for (col, header) in headers.iter().enumerate() {
            let Some(name) = header else {
                continue;
            };
            if !seen.insert(name.as_str()) {
                continue;
            }

            let cell = data_row.get(col).unwrap_or(&empty);
            let value =
                self.formatter
                    .to_field_value(cell, date_format, self.metadata.is_1904)?;
            if !record.set(name, value) {
                tracing::trace!(column = %name, "ignoring column outside the record");
            }
        }

        Ok(record)
    }
}

// 実際のXLSXファイルが必要なため、テストは統合テスト（tests/）で実装します。
