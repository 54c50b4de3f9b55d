//! Session Module
//!
//! フォーム画面の状態（選択中のファイルと現在のレコード）を明示的に保持し、
//! ファイル選択・アップロード・文書生成の各操作を提供します。

use std::path::{Path, PathBuf};

use crate::builder::PolicyDocGenerator;
use crate::error::PolicyDocError;
use crate::extractor::check_path;
use crate::output::{DocumentSink, GeneratedDocument, TemplateSource};
use crate::types::PolicyRecord;

/// ユーザーに表示する通知
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Notice {
    /// `.xlsx`以外のファイルが選択された
    InvalidFileType {
        /// 選択されたファイル名
        file_name: String,
    },

    /// ファイルが選択されていない
    NoFileSelected,
}

impl Notice {
    /// 通知メッセージ
    pub fn message(&self) -> &'static str {
        match self {
            Notice::InvalidFileType { .. } => "Please upload a valid Excel file (.xlsx)",
            Notice::NoFileSelected => "Please upload a file first.",
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// アップロード操作の結果
#[derive(Debug)]
pub enum UploadOutcome {
    /// レコードを置き換えた
    Loaded,

    /// 通知を表示し、状態は変更しない
    Rejected(Notice),

    /// 抽出に失敗した（状態は変更しない）
    Failed(PolicyDocError),
}

/// フォームの状態
///
/// レコードはメモリ上にのみ保持され、アップロードのたびに丸ごと置き換えられます。
#[derive(Debug, Default)]
pub struct Session {
    generator: PolicyDocGenerator,
    selected_file: Option<PathBuf>,
    record: Option<PolicyRecord>,
}

impl Session {
    /// 指定のジェネレーターで新しいセッションを開始する
    pub fn new(generator: PolicyDocGenerator) -> Self {
        Self {
            generator,
            selected_file: None,
            record: None,
        }
    }

    /// ファイルを選択する
    ///
    /// 拡張子が`.xlsx`でない場合は通知を返し、選択中のファイルは変更しません。
    pub fn select_file(&mut self, path: impl AsRef<Path>) -> Result<(), Notice> {
        let path = path.as_ref();
        match check_path(path) {
            Ok(()) => {
                self.selected_file = Some(path.to_path_buf());
                Ok(())
            }
            Err(PolicyDocError::InvalidFileType { file_name }) => {
                tracing::warn!(file = %path.display(), "rejected file without .xlsx extension");
                Err(Notice::InvalidFileType { file_name })
            }
            Err(_) => Err(Notice::InvalidFileType {
                file_name: path.display().to_string(),
            }),
        }
    }

    /// 選択中のファイルからレコードを抽出し、現在のレコードを置き換える
    pub fn upload(&mut self) -> UploadOutcome {
        let Some(path) = self.selected_file.as_deref() else {
            tracing::warn!("upload requested with no file selected");
            return UploadOutcome::Rejected(Notice::NoFileSelected);
        };

        match self.generator.extract_file(path) {
            Ok(record) => {
                self.record = Some(record);
                UploadOutcome::Loaded
            }
            Err(e) => {
                tracing::error!(file = %path.display(), error = %e, "failed to read spreadsheet");
                UploadOutcome::Failed(e)
            }
        }
    }

    /// 選択中のファイル
    pub fn selected_file(&self) -> Option<&Path> {
        self.selected_file.as_deref()
    }

    /// 現在のレコード
    pub fn record(&self) -> Option<&PolicyRecord> {
        self.record.as_ref()
    }

    /// 現在のレコードの整形済みJSON（未アップロードの場合は`{}`）
    pub fn record_json(&self) -> Result<String, PolicyDocError> {
        let empty = PolicyRecord::default();
        self.record
            .as_ref()
            .unwrap_or(&empty)
            .to_json_pretty()
            .map_err(|e| PolicyDocError::Config(format!("Failed to serialize record: {}", e)))
    }

    /// 現在のレコードで文書を生成する
    ///
    /// レコードが未設定の場合は、すべてのフィールドを空として生成します。
    pub fn generate(&self, source: &dyn TemplateSource) -> Result<GeneratedDocument, PolicyDocError> {
        let empty = PolicyRecord::default();
        let record = self.record.as_ref().unwrap_or(&empty);
        self.generator.generate(record, source)
    }

    /// 文書を生成して保存先に渡す
    ///
    /// 失敗した場合はエラーをログに記録し、何も出力せずに`None`を返します。
    pub fn generate_and_save(
        &self,
        source: &dyn TemplateSource,
        sink: &mut dyn DocumentSink,
    ) -> Option<String> {
        let result = self
            .generate(source)
            .and_then(|document| sink.save(document));
        match result {
            Ok(saved) => Some(saved),
            Err(e) => {
                tracing::error!(error = %e, "Error generating document");
                None
            }
        }
    }
}
