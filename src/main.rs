//! policydoc command-line tool
//!
//! Extracts the first data row of an Excel sheet and fills the policy template with it.

use std::io;
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::Registry;

use policydoc::{
    DateFormat, DirectorySink, FileTemplate, GeneratorBuilder, PolicyDocError, Session,
    UploadOutcome, DEFAULT_TEMPLATE_PATH,
};

#[derive(Parser, Debug)]
#[command(version, about = "Fill a Word policy template from the first row of an Excel sheet")]
struct Cli {
    /// Spreadsheet to read (.xlsx)
    input: PathBuf,

    /// Word template containing {placeholder} tags
    #[arg(long, default_value = DEFAULT_TEMPLATE_PATH)]
    template: PathBuf,

    /// Directory that receives GeneratedPolicyDocument.docx
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Date cell format: serial (stored number), iso8601, or a chrono format string such as %d/%m/%Y
    #[arg(long, default_value = "serial")]
    date_format: DateFormat,

    /// Keep newlines in values as-is instead of converting them to Word line breaks
    #[arg(long)]
    no_linebreaks: bool,

    /// Do not print the extracted record
    #[arg(short, long)]
    quiet: bool,

    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // logging setup
    let console_logger = fmt::layer()
        .with_writer(io::stderr)
        .with_timer(UtcTime::rfc_3339())
        .with_target(false)
        .with_filter(LevelFilter::from(cli.log_level));
    let subscriber = Registry::default().with(console_logger);
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("could not create logger: {}", e);
    }

    if let Err(e) = run(&cli) {
        handle_error(e);
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), PolicyDocError> {
    let generator = GeneratorBuilder::new()
        .with_date_format(cli.date_format.clone())
        .with_linebreaks(!cli.no_linebreaks)
        .build()?;
    let mut session = Session::new(generator);

    if let Err(notice) = session.select_file(&cli.input) {
        eprintln!("{}", notice);
        process::exit(2);
    }

    match session.upload() {
        UploadOutcome::Loaded => {}
        UploadOutcome::Rejected(notice) => {
            eprintln!("{}", notice);
            process::exit(2);
        }
        UploadOutcome::Failed(e) => return Err(e),
    }

    if !cli.quiet {
        println!("Uploaded Data:");
        println!("{}", session.record_json()?);
    }

    let template = FileTemplate::new(&cli.template);
    let mut sink = DirectorySink::new(&cli.out_dir);
    match session.generate_and_save(&template, &mut sink) {
        Some(saved) => {
            println!("Document generated: {}", saved);
            Ok(())
        }
        // the failure has already been logged
        None => process::exit(1),
    }
}

fn handle_error(error: PolicyDocError) {
    match error {
        PolicyDocError::Io(io_err) => {
            eprintln!("I/O Error: {}", io_err);
            eprintln!("Please check that the file exists and you have permission to access it.");
        }
        PolicyDocError::Parse(parse_err) => {
            eprintln!("Parse Error: {}", parse_err);
            eprintln!("The file may not be a valid Excel file or may be corrupted.");
        }
        PolicyDocError::Zip(msg) => {
            eprintln!("ZIP Archive Error: {}", msg);
            eprintln!("The file may be corrupted or not a valid ZIP archive.");
        }
        e @ (PolicyDocError::NoSheets | PolicyDocError::NoDataRows { .. }) => {
            eprintln!("{}", e);
            eprintln!("The first sheet needs a header row and at least one data row.");
        }
        PolicyDocError::Config(msg) => {
            eprintln!("Configuration Error: {}", msg);
        }
        other => eprintln!("Error: {}", other),
    }
}
