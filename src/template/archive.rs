//! Template Archive
//!
//! DOCXのエントリを順番どおりに読み出し、本文・ヘッダー・フッター・脚注のパートだけを
//! 置換して書き戻します。その他のエントリは内容を変更せずにコピーします。

use std::io::{Cursor, Read, Write};

use zip::write::{FileOptions, ZipWriter};
use zip::{CompressionMethod, ZipArchive};

use crate::error::PolicyDocError;
use crate::security::SecurityLimits;
use crate::template::substitute::render_part;
use crate::template::TemplateOptions;
use crate::types::TemplateData;

/// 本文パート
const MAIN_DOCUMENT_PART: &str = "word/document.xml";

/// プレースホルダー置換の対象となるパートかどうか
///
/// 本文、ヘッダー（`word/header*.xml`）、フッター（`word/footer*.xml`）、脚注、文末脚注が対象です。
pub(crate) fn is_templated_part(name: &str) -> bool {
    if matches!(
        name,
        MAIN_DOCUMENT_PART | "word/footnotes.xml" | "word/endnotes.xml"
    ) {
        return true;
    }

    ["word/header", "word/footer"].iter().any(|prefix| {
        name.strip_prefix(prefix)
            .and_then(|rest| rest.strip_suffix(".xml"))
            .map(|number| number.chars().all(|c| c.is_ascii_digit()))
            .unwrap_or(false)
    })
}

/// テンプレートを展開し、置換済みのDOCXをバイト列として返す
///
/// # 戻り値
///
/// * `Ok(Vec<u8>)` - 生成されたDOCX
/// * `Err(PolicyDocError::Zip)` - ZIPとして読めない、または書き込みに失敗した場合
/// * `Err(PolicyDocError::Template)` - Word文書でない、またはタグの構文エラー
/// * `Err(PolicyDocError::SecurityViolation)` - セキュリティ制限に違反した場合
pub(crate) fn render_archive(
    template: &[u8],
    data: &TemplateData,
    options: &TemplateOptions,
    limits: &SecurityLimits,
) -> Result<Vec<u8>, PolicyDocError> {
    if template.len() as u64 > limits.max_input_file_size {
        return Err(PolicyDocError::SecurityViolation(format!(
            "Template size exceeds maximum: {} bytes (max: {} bytes)",
            template.len(),
            limits.max_input_file_size
        )));
    }

    let mut archive = ZipArchive::new(Cursor::new(template)).map_err(zip_error)?;
    limits.check_archive(&mut archive)?;

    if !archive.file_names().any(|name| name == MAIN_DOCUMENT_PART) {
        return Err(PolicyDocError::Template {
            part: MAIN_DOCUMENT_PART.to_string(),
            message: "missing main document part; not a Word document".to_string(),
        });
    }

    let mut writer = ZipWriter::new(Cursor::new(Vec::with_capacity(template.len())));

    for i in 0..archive.len() {
        let raw = archive.by_index_raw(i).map_err(zip_error)?;
        if raw.is_dir() || !is_templated_part(raw.name()) {
            // 圧縮済みデータをそのままコピー
            writer.raw_copy_file(raw).map_err(zip_error)?;
            continue;
        }
        let name = raw.name().to_string();
        drop(raw);

        let mut file = archive.by_index(i).map_err(zip_error)?;
        let method = match file.compression() {
            CompressionMethod::Stored => CompressionMethod::Stored,
            _ => CompressionMethod::Deflated,
        };
        let entry_options = FileOptions::default()
            .compression_method(method)
            .last_modified_time(file.last_modified());

        let mut content = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut content)?;
        drop(file);

        let rendered = render_part(&name, &content, data, options)?;
        writer.start_file(name, entry_options).map_err(zip_error)?;
        writer.write_all(&rendered)?;
    }

    let cursor = writer.finish().map_err(zip_error)?;
    Ok(cursor.into_inner())
}

fn zip_error(e: zip::result::ZipError) -> PolicyDocError {
    PolicyDocError::Zip(format!("{}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#;

    fn document(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>{}</w:t></w:r></w:p></w:body></w:document>"#,
            body
        )
    }

    fn build_docx(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut data = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut data));
            for (name, body) in entries {
                zip.start_file(*name, FileOptions::default()).unwrap();
                zip.write_all(body.as_bytes()).unwrap();
            }
            zip.finish().unwrap();
        }
        data
    }

    fn read_entry(docx: &[u8], name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(docx)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        content
    }

    fn data() -> TemplateData {
        let mut data = TemplateData::new();
        data.insert("policyNumber", "POL-7");
        data
    }

    #[test]
    fn test_is_templated_part() {
        assert!(is_templated_part("word/document.xml"));
        assert!(is_templated_part("word/header1.xml"));
        assert!(is_templated_part("word/footer12.xml"));
        assert!(is_templated_part("word/header.xml"));
        assert!(is_templated_part("word/footnotes.xml"));
        assert!(!is_templated_part("word/styles.xml"));
        assert!(!is_templated_part("word/_rels/header1.xml.rels"));
        assert!(!is_templated_part("word/headerFirst.xml"));
        assert!(!is_templated_part("[Content_Types].xml"));
    }

    #[test]
    fn test_render_archive_substitutes_document_and_header() {
        let header = document("Ref {policyNumber}");
        let template = build_docx(&[
            ("[Content_Types].xml", CONTENT_TYPES),
            ("word/document.xml", document("Policy {policyNumber}").as_str()),
            ("word/header1.xml", header.as_str()),
        ]);

        let out = render_archive(
            &template,
            &data(),
            &TemplateOptions::default(),
            &SecurityLimits::default(),
        )
        .unwrap();

        assert!(read_entry(&out, "word/document.xml").contains("Policy POL-7"));
        assert!(read_entry(&out, "word/header1.xml").contains("Ref POL-7"));
    }

    #[test]
    fn test_render_archive_keeps_other_entries_and_order() {
        let styles = "<w:styles>{policyNumber}</w:styles>";
        let template = build_docx(&[
            ("[Content_Types].xml", CONTENT_TYPES),
            ("word/styles.xml", styles),
            ("word/document.xml", document("{policyNumber}").as_str()),
        ]);

        let out = render_archive(
            &template,
            &data(),
            &TemplateOptions::default(),
            &SecurityLimits::default(),
        )
        .unwrap();

        assert_eq!(read_entry(&out, "word/styles.xml"), styles);
        assert_eq!(read_entry(&out, "[Content_Types].xml"), CONTENT_TYPES);

        let archive = ZipArchive::new(Cursor::new(out.as_slice())).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        assert_eq!(names.len(), 3);
        let mut archive = ZipArchive::new(Cursor::new(out.as_slice())).unwrap();
        let first = archive.by_index(0).unwrap().name().to_string();
        assert_eq!(first, "[Content_Types].xml");
    }

    /// 名前・圧縮方式・CRC・圧縮済みデータの一覧
    fn raw_entries(docx: &[u8]) -> Vec<(String, CompressionMethod, u32, Vec<u8>)> {
        let mut archive = ZipArchive::new(Cursor::new(docx)).unwrap();
        (0..archive.len())
            .map(|i| {
                let mut file = archive.by_index_raw(i).unwrap();
                let mut compressed = Vec::new();
                file.read_to_end(&mut compressed).unwrap();
                (file.name().to_string(), file.compression(), file.crc32(), compressed)
            })
            .collect()
    }

    #[test]
    fn test_render_archive_copies_other_entries_raw() {
        let styles = "<w:styles>".to_string() + &"<w:style/>".repeat(200) + "</w:styles>";
        let mut template = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut template));
            // 既定とは異なる圧縮レベル
            let fast = FileOptions::default().compression_level(Some(1));
            let stored = FileOptions::default().compression_method(CompressionMethod::Stored);
            zip.start_file("word/styles.xml", fast).unwrap();
            zip.write_all(styles.as_bytes()).unwrap();
            zip.add_directory("word/media/", stored).unwrap();
            zip.start_file("word/media/logo.png", stored).unwrap();
            zip.write_all(b"\x89PNG").unwrap();
            zip.start_file("word/document.xml", FileOptions::default()).unwrap();
            zip.write_all(document("{policyNumber}").as_bytes()).unwrap();
            zip.finish().unwrap();
        }

        let out = render_archive(
            &template,
            &data(),
            &TemplateOptions::default(),
            &SecurityLimits::default(),
        )
        .unwrap();

        let before = raw_entries(&template);
        let after = raw_entries(&out);
        assert_eq!(before.len(), after.len());
        for (old, new) in before.iter().zip(&after) {
            assert_eq!(old.0, new.0);
            if old.0 == "word/document.xml" {
                assert_ne!(old.3, new.3);
            } else {
                assert_eq!(old, new, "entry '{}' was not copied unchanged", old.0);
            }
        }
        assert!(read_entry(&out, "word/document.xml").contains("POL-7"));
    }

    #[test]
    fn test_render_archive_requires_main_document() {
        let template = build_docx(&[("[Content_Types].xml", CONTENT_TYPES)]);
        let result = render_archive(
            &template,
            &data(),
            &TemplateOptions::default(),
            &SecurityLimits::default(),
        );
        match result {
            Err(PolicyDocError::Template { part, .. }) => assert_eq!(part, "word/document.xml"),
            other => panic!("Expected Template error, got {:?}", other),
        }
    }

    #[test]
    fn test_render_archive_not_a_zip() {
        let result = render_archive(
            b"plain text",
            &data(),
            &TemplateOptions::default(),
            &SecurityLimits::default(),
        );
        assert!(matches!(result, Err(PolicyDocError::Zip(_))));
    }

    #[test]
    fn test_render_archive_template_too_large() {
        let template = build_docx(&[("word/document.xml", document("x").as_str())]);
        let limits = SecurityLimits {
            max_input_file_size: 10,
            ..Default::default()
        };
        let result = render_archive(&template, &data(), &TemplateOptions::default(), &limits);
        assert!(matches!(result, Err(PolicyDocError::SecurityViolation(_))));
    }
}
