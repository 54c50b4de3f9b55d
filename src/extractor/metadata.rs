//! Workbook Metadata Module
//!
//! calamineでは取得できないワークブック設定を`xl/workbook.xml`から直接読み取ります。

use std::io::{Read, Seek};
use zip::ZipArchive;

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::PolicyDocError;
use crate::security::SecurityLimits;

/// ワークブックのメタデータ
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct WorkbookMetadata {
    /// 1904年エポックを使用するかどうか
    pub is_1904: bool,
}

impl WorkbookMetadata {
    /// XLSXファイル（ZIPアーカイブ）を検証し、メタデータを解析する
    ///
    /// # 戻り値
    ///
    /// * `Ok(WorkbookMetadata)` - 解析に成功した場合
    /// * `Err(PolicyDocError::SecurityViolation)` - セキュリティ制限に違反した場合
    /// * `Err(PolicyDocError::Zip)` - ZIPアーカイブとして読めない場合
    pub fn new<R: Read + Seek>(
        xlsx_reader: R,
        limits: &SecurityLimits,
    ) -> Result<Self, PolicyDocError> {
        let mut archive =
            ZipArchive::new(xlsx_reader).map_err(|e| PolicyDocError::Zip(format!("{}", e)))?;

        limits.check_archive(&mut archive)?;

        let is_1904 = Self::parse_workbook(&mut archive)?;
        Ok(Self { is_1904 })
    }

    /// xl/workbook.xml の解析（`<workbookPr date1904="1"/>`）
    fn parse_workbook<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<bool, PolicyDocError> {
        let mut workbook_file = match archive.by_name("xl/workbook.xml") {
            Ok(file) => file,
            // workbook.xmlが存在しない場合はcalamine側でエラーになる
            Err(_) => return Ok(false),
        };

        let mut xml_content = Vec::new();
        workbook_file.read_to_end(&mut xml_content)?;

        let mut reader = Reader::from_reader(xml_content.as_slice());
        reader.trim_text(true);

        let mut buf = Vec::new();
        let mut is_1904 = false;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                    if e.local_name().as_ref() == b"workbookPr" {
                        for attr in e.attributes() {
                            let attr = attr.map_err(|e| {
                                PolicyDocError::Xml(format!("XML attribute error: {}", e))
                            })?;
                            if attr.key.as_ref() == b"date1904" {
                                let value_str = std::str::from_utf8(&attr.value)?;
                                is_1904 = value_str == "1" || value_str == "true";
                            }
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(PolicyDocError::Xml(format!("XML parse error: {}", e))),
                _ => {}
            }
            buf.clear();
        }

        Ok(is_1904)
    }
}
