//! Output Module
//!
//! テンプレートの取得元（`TemplateSource`）と、生成文書の保存先（`DocumentSink`）を
//! トレイトとして抽象化するモジュール。

use std::fs;
use std::path::{Path, PathBuf};

use crate::api::{DEFAULT_TEMPLATE_PATH, DOCX_MIME_TYPE, OUTPUT_FILE_NAME};
use crate::error::PolicyDocError;

/// 生成された文書
///
/// ファイル名とMIMEタイプは常に固定値です。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDocument {
    bytes: Vec<u8>,
}

impl GeneratedDocument {
    pub(crate) fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// ファイル名（`GeneratedPolicyDocument.docx`）
    pub fn file_name(&self) -> &'static str {
        OUTPUT_FILE_NAME
    }

    /// MIMEタイプ
    pub fn mime_type(&self) -> &'static str {
        DOCX_MIME_TYPE
    }

    /// 文書のバイト列
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// バイト列の所有権を取り出す
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// テンプレート文書の取得元
///
/// 生成のたびに読み込まれ、内容は変更されません。
pub trait TemplateSource {
    /// テンプレートのバイト列を読み込む
    fn load(&self) -> Result<Vec<u8>, PolicyDocError>;

    /// ログ出力用の説明
    fn describe(&self) -> String;
}

/// ファイルパスから読み込むテンプレート
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTemplate {
    path: PathBuf,
}

impl FileTemplate {
    /// 指定パスのテンプレート
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// テンプレートのパス
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE_PATH)
    }
}

impl TemplateSource for FileTemplate {
    fn load(&self) -> Result<Vec<u8>, PolicyDocError> {
        Ok(fs::read(&self.path)?)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// メモリ上のテンプレート
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BytesTemplate {
    bytes: Vec<u8>,
}

impl BytesTemplate {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }
}

impl TemplateSource for BytesTemplate {
    fn load(&self) -> Result<Vec<u8>, PolicyDocError> {
        Ok(self.bytes.clone())
    }

    fn describe(&self) -> String {
        format!("<in-memory template, {} bytes>", self.bytes.len())
    }
}

/// 生成文書の保存先
pub trait DocumentSink {
    /// 文書を保存し、保存先の説明を返す
    fn save(&mut self, document: GeneratedDocument) -> Result<String, PolicyDocError>;
}

/// ディレクトリに`GeneratedPolicyDocument.docx`として書き出す保存先
///
/// 同名のファイルは上書きされます。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// 書き出し先のファイルパス
    pub fn target_path(&self) -> PathBuf {
        self.dir.join(OUTPUT_FILE_NAME)
    }
}

impl DocumentSink for DirectorySink {
    fn save(&mut self, document: GeneratedDocument) -> Result<String, PolicyDocError> {
        let path = self.dir.join(document.file_name());
        fs::write(&path, document.bytes())?;
        Ok(path.display().to_string())
    }
}

/// 保存された文書をメモリに保持する保存先
#[derive(Debug, Default)]
pub struct MemorySink {
    documents: Vec<GeneratedDocument>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// これまでに保存された文書
    pub fn documents(&self) -> &[GeneratedDocument] {
        &self.documents
    }
}

impl DocumentSink for MemorySink {
    fn save(&mut self, document: GeneratedDocument) -> Result<String, PolicyDocError> {
        let description = format!("<memory #{}: {}>", self.documents.len(), document.file_name());
        self.documents.push(document);
        Ok(description)
    }
}
