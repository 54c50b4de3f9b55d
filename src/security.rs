//! Security Module
//!
//! スプレッドシートとテンプレート（いずれもZIPアーカイブ）を開く際の
//! セキュリティ対策を実装するモジュール。
//! ZIP bomb攻撃、パストラバーサル攻撃、巨大ファイルへの対策を提供します。

use std::io::{Read, Seek};
use zip::ZipArchive;

use crate::error::PolicyDocError;

/// セキュリティ設定
///
/// ファイル処理時のセキュリティ制限を定義します。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityLimits {
    /// 展開後の最大サイズ（バイト）
    /// デフォルト: 256MB
    pub max_decompressed_size: u64,
    /// ZIPアーカイブ内の最大ファイル数
    /// デフォルト: 10000
    pub max_file_count: usize,
    /// 単一ファイルの最大サイズ（バイト）
    /// デフォルト: 100MB
    pub max_file_size: u64,
    /// 入力ファイルの最大サイズ（バイト）
    /// デフォルト: 100MB
    pub max_input_file_size: u64,
}

impl Default for SecurityLimits {
    fn default() -> Self {
        Self {
            max_decompressed_size: 268_435_456, // 256MB
            max_file_count: 10_000,
            max_file_size: 104_857_600,       // 100MB
            max_input_file_size: 104_857_600, // 100MB
        }
    }
}

impl SecurityLimits {
    /// 入力全体をメモリに読み込む（サイズ上限付き）
    pub(crate) fn read_input<R: Read>(&self, reader: R) -> Result<Vec<u8>, PolicyDocError> {
        let mut buffer = Vec::new();
        // 上限+1バイトまで読み、超過を検出する
        let bytes_read = reader
            .take(self.max_input_file_size.saturating_add(1))
            .read_to_end(&mut buffer)?;

        if bytes_read as u64 > self.max_input_file_size {
            return Err(PolicyDocError::SecurityViolation(format!(
                "Input file size exceeds maximum: more than {} bytes",
                self.max_input_file_size
            )));
        }

        Ok(buffer)
    }

    /// アーカイブ全体のエントリ数・パス・展開後サイズを検証する
    pub(crate) fn check_archive<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
    ) -> Result<(), PolicyDocError> {
        // ファイル数の上限
        if archive.len() > self.max_file_count {
            return Err(PolicyDocError::SecurityViolation(format!(
                "ZIP archive contains too many files: {} (max: {})",
                archive.len(),
                self.max_file_count
            )));
        }

        let mut total_decompressed_size = 0u64;
        for i in 0..archive.len() {
            let file = archive
                .by_index(i)
                .map_err(|e| PolicyDocError::Zip(format!("{}", e)))?;

            // パストラバーサル対策
            let file_name = file.name();
            validate_zip_path(file_name).map_err(|e| {
                PolicyDocError::SecurityViolation(format!("Invalid ZIP path: {}", e))
            })?;

            let file_size = file.size();
            if file_size > self.max_file_size {
                return Err(PolicyDocError::SecurityViolation(format!(
                    "File '{}' exceeds maximum size: {} bytes (max: {} bytes)",
                    file_name, file_size, self.max_file_size
                )));
            }

            total_decompressed_size = total_decompressed_size
                .checked_add(file_size)
                .ok_or_else(|| {
                    PolicyDocError::SecurityViolation(
                        "Total decompressed size calculation overflow".to_string(),
                    )
                })?;

            if total_decompressed_size > self.max_decompressed_size {
                return Err(PolicyDocError::SecurityViolation(format!(
                    "Total decompressed size exceeds maximum: {} bytes (max: {} bytes)",
                    total_decompressed_size, self.max_decompressed_size
                )));
            }
        }

        Ok(())
    }
}

/// ファイルパスの検証
///
/// パストラバーサル攻撃を防ぐため、ZIPエントリのパスを検証します。
///
/// # 戻り値
///
/// * `Ok(())` - パスが安全な場合
/// * `Err(String)` - パスが危険な場合（`..`や絶対パスを含む）
pub(crate) fn validate_zip_path(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Err("Empty path is not allowed".to_string());
    }

    // 絶対パスを拒否（Windows形式の`C:\`やUnix形式の`/`で始まるパス）
    if path.starts_with('/') || path.starts_with("C:\\") || path.starts_with("c:\\") {
        return Err(format!("Absolute path is not allowed: {}", path));
    }

    if path.contains("..") {
        return Err(format!("Path traversal detected: {}", path));
    }

    if path.contains('\\') {
        return Err(format!("Backslash in path is not allowed: {}", path));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::{FileOptions, ZipWriter};

    fn zip_with_entries(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut data = Vec::new();
        {
            let mut zip = ZipWriter::new(Cursor::new(&mut data));
            for (name, body) in entries {
                zip.start_file(*name, FileOptions::default()).unwrap();
                zip.write_all(body).unwrap();
            }
            zip.finish().unwrap();
        }
        data
    }

    #[test]
    fn test_validate_zip_path_valid() {
        assert!(validate_zip_path("word/document.xml").is_ok());
        assert!(validate_zip_path("[Content_Types].xml").is_ok());
        assert!(validate_zip_path("xl/worksheets/sheet1.xml").is_ok());
    }

    #[test]
    fn test_validate_zip_path_rejects() {
        assert!(validate_zip_path("").is_err());
        assert!(validate_zip_path("/etc/passwd").is_err());
        assert!(validate_zip_path("C:\\Windows\\system32").is_err());
        assert!(validate_zip_path("word/../../etc/passwd").is_err());
        assert!(validate_zip_path("word\\document.xml").is_err());
    }

    #[test]
    fn test_read_input_within_limit() {
        let limits = SecurityLimits {
            max_input_file_size: 8,
            ..Default::default()
        };
        let data = limits.read_input(Cursor::new(vec![1u8; 8])).unwrap();
        assert_eq!(data.len(), 8);
    }

    #[test]
    fn test_read_input_over_limit() {
        let limits = SecurityLimits {
            max_input_file_size: 8,
            ..Default::default()
        };
        let result = limits.read_input(Cursor::new(vec![1u8; 9]));
        assert!(matches!(result, Err(PolicyDocError::SecurityViolation(_))));
    }

    #[test]
    fn test_check_archive_too_many_files() {
        let data = zip_with_entries(&[("a.xml", b"a"), ("b.xml", b"b"), ("c.xml", b"c")]);
        let limits = SecurityLimits {
            max_file_count: 2,
            ..Default::default()
        };
        let mut archive = ZipArchive::new(Cursor::new(data)).unwrap();
        match limits.check_archive(&mut archive) {
            Err(PolicyDocError::SecurityViolation(msg)) => assert!(msg.contains("too many files")),
            other => panic!("Expected SecurityViolation, got {:?}", other),
        }
    }

    #[test]
    fn test_check_archive_decompressed_size() {
        let data = zip_with_entries(&[("a.xml", &[b'a'; 64]), ("b.xml", &[b'b'; 64])]);
        let limits = SecurityLimits {
            max_decompressed_size: 100,
            ..Default::default()
        };
        let mut archive = ZipArchive::new(Cursor::new(data)).unwrap();
        match limits.check_archive(&mut archive) {
            Err(PolicyDocError::SecurityViolation(msg)) => {
                assert!(msg.contains("decompressed size"))
            }
            other => panic!("Expected SecurityViolation, got {:?}", other),
        }
    }

    #[test]
    fn test_check_archive_traversal() {
        let data = zip_with_entries(&[("../evil.xml", b"x")]);
        let mut archive = ZipArchive::new(Cursor::new(data)).unwrap();
        let result = SecurityLimits::default().check_archive(&mut archive);
        assert!(matches!(result, Err(PolicyDocError::SecurityViolation(_))));
    }
}
