//! Template Module
//!
//! DOCXテンプレート（ZIPアーカイブ）を展開し、プレースホルダーを置換して
//! 新しいアーカイブとして再構築します。

mod archive;
mod substitute;

pub(crate) use archive::render_archive;

/// テンプレート展開のオプション
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TemplateOptions {
    /// タグの開始区切り文字
    pub start_delimiter: String,

    /// タグの終了区切り文字
    pub end_delimiter: String,

    /// 値に含まれる改行を`<w:br/>`に変換するか
    pub linebreaks: bool,
}

impl Default for TemplateOptions {
    fn default() -> Self {
        Self {
            start_delimiter: "{".to_string(),
            end_delimiter: "}".to_string(),
            linebreaks: true,
        }
    }
}
