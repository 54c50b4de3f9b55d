//! パフォーマンスベンチマーク
//!
//! 抽出（XLSX → レコード）と生成（レコード → DOCX）のそれぞれの処理時間を測定します。
//! フィクスチャはメモリ上で生成するため、外部ファイルは不要です。

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rust_xlsxwriter::{Workbook, XlsxError};
use std::io::{Cursor, Write};
use zip::write::{FileOptions, ZipWriter};

use policydoc::{GeneratorBuilder, RECORD_FIELDS};

/// ヘッダー行 + 指定行数のデータを持つスプレッドシート
fn generate_sheet(rows: u32) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    for (col, name) in RECORD_FIELDS.iter().enumerate() {
        worksheet.write_string(0, col as u16, *name)?;
    }
    for row in 1..=rows {
        worksheet.write_string(row, 0, format!("POL-{:06}", row))?;
        worksheet.write_string(row, 1, "Jane Doe")?;
        worksheet.write_string(row, 2, "1 Main St")?;
        worksheet.write_string(row, 3, "555-0100")?;
        worksheet.write_string(row, 4, "jane@example.com")?;
        worksheet.write_string(row, 5, "Fire")?;
        worksheet.write_number(row, 6, 100.0 + row as f64)?;
        worksheet.write_string(row, 7, "Flood")?;
        worksheet.write_number(row, 8, 250.0)?;
        worksheet.write_string(row, 9, "2025-01-31")?;
    }
    workbook.save_to_buffer()
}

/// 指定数の段落にすべてのタグを分割ランで配置したテンプレート
fn generate_template(paragraphs: usize) -> Vec<u8> {
    let mut body = String::new();
    for i in 0..paragraphs {
        let name = RECORD_FIELDS[i % RECORD_FIELDS.len()];
        let (head, tail) = name.split_at(name.len() / 2);
        body.push_str(&format!(
            "<w:p><w:r><w:t>Line {}: {{{}</w:t></w:r><w:r><w:t>{}}} / {{totalCost}}</w:t></w:r></w:p>",
            i, head, tail
        ));
    }
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    );

    let mut data = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut data));
        zip.start_file("word/document.xml", FileOptions::default())
            .expect("start entry");
        zip.write_all(document.as_bytes()).expect("write entry");
        zip.finish().expect("finish archive");
    }
    data
}

fn benchmark_extract(c: &mut Criterion) {
    let generator = GeneratorBuilder::new().build().expect("default generator");
    let mut group = c.benchmark_group("extract");

    for rows in [1u32, 1_000, 10_000] {
        let data = generate_sheet(rows).expect("generate fixture");
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_function(format!("{}_rows", rows), |b| {
            b.iter(|| {
                let record = generator
                    .extract(Cursor::new(black_box(data.as_slice())))
                    .expect("extract");
                black_box(record);
            });
        });
    }

    group.finish();
}

fn benchmark_render(c: &mut Criterion) {
    let generator = GeneratorBuilder::new().build().expect("default generator");
    let sheet = generate_sheet(1).expect("generate fixture");
    let record = generator.extract(Cursor::new(sheet)).expect("extract");
    let mut group = c.benchmark_group("render");

    for paragraphs in [10usize, 1_000] {
        let template = generate_template(paragraphs);
        group.throughput(Throughput::Bytes(template.len() as u64));
        group.bench_function(format!("{}_paragraphs", paragraphs), |b| {
            b.iter(|| {
                let document = generator
                    .render(black_box(&record), black_box(&template))
                    .expect("render");
                black_box(document);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_extract, benchmark_render);
criterion_main!(benches);
