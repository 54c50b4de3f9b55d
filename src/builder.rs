//! Builder Module
//!
//! Fluent Builder APIを提供し、`PolicyDocGenerator`インスタンスを段階的に構築する。

use chrono::format::{Item, StrftimeItems};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::api::DateFormat;
use crate::error::PolicyDocError;
use crate::extractor::{check_path, WorkbookReader};
use crate::output::{DocumentSink, GeneratedDocument, TemplateSource};
use crate::security::SecurityLimits;
use crate::template::{render_archive, TemplateOptions};
use crate::types::PolicyRecord;

/// 抽出・生成処理の設定を保持する内部構造体
#[derive(Debug, Clone, Default)]
pub(crate) struct GenerationConfig {
    /// 日付セルの出力形式
    pub date_format: DateFormat,

    /// テンプレート展開のオプション
    pub template: TemplateOptions,

    /// セキュリティ制限
    pub limits: SecurityLimits,
}

/// Fluent Builder APIを提供する構造体
///
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust,no_run
/// use policydoc::{GeneratorBuilder, DateFormat};
///
/// # fn main() -> Result<(), policydoc::PolicyDocError> {
/// let generator = GeneratorBuilder::new()
///     .with_date_format(DateFormat::Custom("%d %B %Y".to_string()))
///     .with_linebreaks(false)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct GeneratorBuilder {
    /// 内部設定（構築中）
    config: GenerationConfig,
}

impl GeneratorBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - 日付形式: Excelのシリアル値（数値のまま）
    /// - タグの区切り文字: `{` と `}`
    /// - 改行の変換: 有効
    /// - セキュリティ制限: `SecurityLimits::default()`
    pub fn new() -> Self {
        Self::default()
    }

    /// 日付セルの出力形式を指定する
    pub fn with_date_format(mut self, format: DateFormat) -> Self {
        self.config.date_format = format;
        self
    }

    /// 値に含まれる改行をWordの改行（`<w:br/>`）に変換するかを指定する
    pub fn with_linebreaks(mut self, linebreaks: bool) -> Self {
        self.config.template.linebreaks = linebreaks;
        self
    }

    /// タグの区切り文字を指定する
    ///
    /// # 制約
    ///
    /// * 開始・終了とも空でなく、互いに異なること
    /// * 制約違反の場合、`build()`時に`PolicyDocError::Config`を返す
    ///
    /// # 使用例
    ///
    /// ```rust,no_run
    /// use policydoc::GeneratorBuilder;
    ///
    /// // {{policyNumber}} 形式のテンプレート
    /// let builder = GeneratorBuilder::new().with_delimiters("{{", "}}");
    /// ```
    pub fn with_delimiters(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.config.template.start_delimiter = start.into();
        self.config.template.end_delimiter = end.into();
        self
    }

    /// セキュリティ制限を指定する
    pub fn with_security_limits(mut self, limits: SecurityLimits) -> Self {
        self.config.limits = limits;
        self
    }

    /// 設定を検証し、`PolicyDocGenerator`インスタンスを生成する
    ///
    /// # 発生し得るエラー
    ///
    /// * `PolicyDocError::Config(String)`: 設定の検証に失敗した場合
    ///   * 区切り文字が空、または開始と終了が同じ
    ///   * カスタム日付形式が不正な書式文字列
    ///   * セキュリティ制限に0が含まれる
    pub fn build(self) -> Result<PolicyDocGenerator, PolicyDocError> {
        let template = &self.config.template;

        // 1. 区切り文字の検証
        if template.start_delimiter.is_empty() || template.end_delimiter.is_empty() {
            return Err(PolicyDocError::Config(
                "Tag delimiters must not be empty".to_string(),
            ));
        }
        if template.start_delimiter == template.end_delimiter {
            return Err(PolicyDocError::Config(format!(
                "Start and end delimiters must differ: '{}'",
                template.start_delimiter
            )));
        }

        // 2. カスタム日付形式の検証
        if let DateFormat::Custom(ref format_str) = self.config.date_format {
            let invalid = format_str.is_empty()
                || StrftimeItems::new(format_str).any(|item| matches!(item, Item::Error));
            if invalid {
                return Err(PolicyDocError::Config(format!(
                    "Invalid date format string: '{}'",
                    format_str
                )));
            }
        }

        // 3. セキュリティ制限の検証
        let limits = &self.config.limits;
        if limits.max_input_file_size == 0
            || limits.max_file_count == 0
            || limits.max_file_size == 0
            || limits.max_decompressed_size == 0
        {
            return Err(PolicyDocError::Config(
                "Security limits must be greater than zero".to_string(),
            ));
        }

        Ok(PolicyDocGenerator::new(self.config))
    }
}

/// 抽出・生成処理のファサード
///
/// スプレッドシートからのレコード抽出（Extractor）と、テンプレートへの差し込み（Generator）を
/// それぞれ独立した操作として提供します。どちらも内部状態を持たない変換です。
///
/// # 使用例
///
/// ```rust,no_run
/// use policydoc::{FileTemplate, GeneratorBuilder};
/// use std::path::Path;
///
/// # fn main() -> Result<(), policydoc::PolicyDocError> {
/// let generator = GeneratorBuilder::new().build()?;
/// let record = generator.extract_file(Path::new("policy.xlsx"))?;
/// let document = generator.generate(&record, &FileTemplate::default())?;
/// std::fs::write(document.file_name(), document.bytes())?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PolicyDocGenerator {
    config: GenerationConfig,
}

impl Default for PolicyDocGenerator {
    fn default() -> Self {
        Self::new(GenerationConfig::default())
    }
}

impl PolicyDocGenerator {
    pub(crate) fn new(config: GenerationConfig) -> Self {
        Self { config }
    }

    /// スプレッドシートから最初のデータ行を抽出する
    ///
    /// 入力全体を読み込み、最初のシートの最初のデータ行だけを使用します。
    ///
    /// # 戻り値
    ///
    /// * `Ok(PolicyRecord)` - 抽出されたレコード
    /// * `Err(PolicyDocError)` - 読み込み・解析に失敗した場合、またはデータ行がない場合
    pub fn extract<R: Read>(&self, input: R) -> Result<PolicyRecord, PolicyDocError> {
        let buffer = self.config.limits.read_input(input)?;
        tracing::debug!(bytes = buffer.len(), "opening spreadsheet");

        let mut reader = WorkbookReader::open(buffer, &self.config.limits)?;
        let record = reader.first_record(&self.config.date_format)?;

        tracing::info!(
            policy_number = ?record.policy_number,
            "extracted record from first sheet"
        );
        Ok(record)
    }

    /// ファイル名を検証してからスプレッドシートを抽出する
    ///
    /// 拡張子が`.xlsx`でない場合は、ファイルを開かずに
    /// `PolicyDocError::InvalidFileType`を返します。
    pub fn extract_file(&self, path: &Path) -> Result<PolicyRecord, PolicyDocError> {
        check_path(path)?;
        let file = File::open(path)?;
        self.extract(file)
    }

    /// レコードをテンプレートに差し込み、文書を生成する
    ///
    /// `totalCost`は`price1 + price2`として生成時に算出されます。
    ///
    /// # 戻り値
    ///
    /// * `Ok(GeneratedDocument)` - 生成された文書
    /// * `Err(PolicyDocError)` - テンプレートの解析・置換・書き出しに失敗した場合
    pub fn render(
        &self,
        record: &PolicyRecord,
        template: &[u8],
    ) -> Result<GeneratedDocument, PolicyDocError> {
        let data = record.template_data();
        let bytes = render_archive(template, &data, &self.config.template, &self.config.limits)?;
        Ok(GeneratedDocument::new(bytes))
    }

    /// テンプレートを取得元から読み込み、文書を生成する
    pub fn generate(
        &self,
        record: &PolicyRecord,
        source: &dyn TemplateSource,
    ) -> Result<GeneratedDocument, PolicyDocError> {
        tracing::debug!(template = %source.describe(), "loading template");
        let template = source.load()?;
        let document = self.render(record, &template)?;
        tracing::info!(
            bytes = document.bytes().len(),
            file_name = document.file_name(),
            "generated document"
        );
        Ok(document)
    }

    /// 文書を生成し、保存先に渡す
    ///
    /// # 戻り値
    ///
    /// * `Ok(String)` - 保存先の説明（ファイルパスなど）
    pub fn generate_and_save(
        &self,
        record: &PolicyRecord,
        source: &dyn TemplateSource,
        sink: &mut dyn DocumentSink,
    ) -> Result<String, PolicyDocError> {
        let document = self.generate(record, source)?;
        sink.save(document)
    }
}
