//! policydoc - Fill a Word policy template from the first row of an Excel sheet
//!
//! スプレッドシート（XLSX）の最初のシートから1行分の契約情報を抽出し、
//! Word文書（DOCX）テンプレートのプレースホルダーに差し込んで
//! `GeneratedPolicyDocument.docx`を生成します。
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use policydoc::{DirectorySink, FileTemplate, GeneratorBuilder};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let generator = GeneratorBuilder::new().build()?;
//!
//!     // 最初のシートの最初のデータ行を抽出
//!     let record = generator.extract_file(Path::new("policy.xlsx"))?;
//!     println!("{}", record.to_json_pretty()?);
//!
//!     // docs_template.docx に差し込み、カレントディレクトリに保存
//!     let saved = generator.generate_and_save(
//!         &record,
//!         &FileTemplate::default(),
//!         &mut DirectorySink::new("."),
//!     )?;
//!     println!("saved: {}", saved);
//!
//!     Ok(())
//! }
//! ```
//!
//! # In-memory Generation
//!
//! ```rust,no_run
//! use std::io::Cursor;
//! use policydoc::GeneratorBuilder;
//!
//! # fn main() -> Result<(), policydoc::PolicyDocError> {
//! let generator = GeneratorBuilder::new().build()?;
//! let xlsx: Vec<u8> = vec![]; // スプレッドシートのバイト列
//! let template: Vec<u8> = vec![]; // テンプレートのバイト列
//! let record = generator.extract(Cursor::new(xlsx))?;
//! let document = generator.render(&record, &template)?;
//! assert_eq!(document.file_name(), "GeneratedPolicyDocument.docx");
//! # Ok(())
//! # }
//! ```
//!
//! # Form Session
//!
//! ```rust,no_run
//! use policydoc::{FileTemplate, MemorySink, Session, UploadOutcome};
//!
//! let mut session = Session::default();
//! if let Err(notice) = session.select_file("policy.xlsx") {
//!     eprintln!("{}", notice);
//! }
//! if let UploadOutcome::Loaded = session.upload() {
//!     let mut sink = MemorySink::new();
//!     session.generate_and_save(&FileTemplate::default(), &mut sink);
//! }
//! ```

mod api;
mod builder;
mod error;
mod extractor;
mod formatter;
mod output;
mod security;
mod session;
mod template;
mod types;

// 公開API
pub use api::{
    DateFormat, DEFAULT_TEMPLATE_PATH, DOCX_MIME_TYPE, OUTPUT_FILE_NAME, SPREADSHEET_EXTENSION,
};
pub use builder::{GeneratorBuilder, PolicyDocGenerator};
pub use error::PolicyDocError;
pub use extractor::check_file_name;
pub use output::{
    BytesTemplate, DirectorySink, DocumentSink, FileTemplate, GeneratedDocument, MemorySink,
    TemplateSource,
};
pub use security::SecurityLimits;
pub use session::{Notice, Session, UploadOutcome};
pub use types::{FieldValue, PolicyRecord, TemplateData, RECORD_FIELDS, TOTAL_COST_FIELD};
