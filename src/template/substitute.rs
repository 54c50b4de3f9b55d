//! Placeholder Substitution
//!
//! WordprocessingML のパート（`word/document.xml`など）を quick-xml で読み込み、
//! 段落（`<w:p>`）ごとにテキストラン（`<w:t>`）を連結してプレースホルダーを置換します。
//!
//! Wordは1つのプレースホルダーを複数のランに分割して保存することがあるため、
//! 置換値はタグが始まるランに書き込み、他のランからはタグの文字だけを取り除きます。
//! ランの書式（`<w:rPr>`）はそのまま残ります。

use std::collections::{HashMap, HashSet};

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use thiserror::Error;

use crate::error::PolicyDocError;
use crate::template::TemplateOptions;
use crate::types::TemplateData;

const PARAGRAPH: &[u8] = b"w:p";
const TEXT: &[u8] = b"w:t";
const BREAK: &str = "w:br";

/// プレースホルダーの構文エラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub(crate) enum TagError {
    /// 開始区切り文字に対応する終了区切り文字がない
    #[error("Unclosed tag '{0}'")]
    Unclosed(String),

    /// 開始区切り文字のない終了区切り文字
    #[error("Unopened tag near '{0}'")]
    Unopened(String),

    /// タグ名が空
    #[error("Empty tag")]
    Empty,
}

/// 1つのパートを置換してシリアライズする
///
/// # 戻り値
///
/// * `Ok(Vec<u8>)` - 置換後のXML
/// * `Err(PolicyDocError::Xml)` - XMLとして不正な場合
/// * `Err(PolicyDocError::Template)` - プレースホルダーの構文エラー
pub(crate) fn render_part(
    part: &str,
    xml: &[u8],
    data: &TemplateData,
    options: &TemplateOptions,
) -> Result<Vec<u8>, PolicyDocError> {
    let mut reader = Reader::from_reader(xml);

    let mut events: Vec<Event<'_>> = Vec::new();
    let mut open_paragraphs: Vec<Vec<usize>> = Vec::new();
    let mut paragraphs: Vec<Vec<usize>> = Vec::new();
    // テキストイベント -> 親の<w:t>開始イベント
    let mut text_parent: HashMap<usize, usize> = HashMap::new();
    let mut open_text: Option<usize> = None;

    loop {
        let event = reader.read_event().map_err(xml_error)?;
        let idx = events.len();
        match &event {
            Event::Eof => break,
            Event::Start(e) if e.name().as_ref() == PARAGRAPH => open_paragraphs.push(Vec::new()),
            Event::End(e) if e.name().as_ref() == PARAGRAPH => {
                if let Some(runs) = open_paragraphs.pop() {
                    paragraphs.push(runs);
                }
            }
            Event::Start(e) if e.name().as_ref() == TEXT => open_text = Some(idx),
            Event::End(e) if e.name().as_ref() == TEXT => open_text = None,
            Event::Text(_) => {
                if let (Some(parent), Some(runs)) = (open_text, open_paragraphs.last_mut()) {
                    runs.push(idx);
                    text_parent.insert(idx, parent);
                }
            }
            _ => {}
        }
        events.push(event);
    }

    let mut replaced: HashMap<usize, String> = HashMap::new();
    for runs in paragraphs.iter().filter(|runs| !runs.is_empty()) {
        let texts = runs
            .iter()
            .map(|&idx| match &events[idx] {
                Event::Text(text) => text.unescape().map(|s| s.into_owned()).map_err(xml_error),
                _ => Ok(String::new()),
            })
            .collect::<Result<Vec<String>, PolicyDocError>>()?;

        let substituted =
            substitute_runs(&texts, data, &options.start_delimiter, &options.end_delimiter)
                .map_err(|e| PolicyDocError::Template {
                    part: part.to_string(),
                    message: e.to_string(),
                })?;

        if let Some(new_texts) = substituted {
            for ((idx, old), new) in runs.iter().zip(&texts).zip(new_texts) {
                if *old != new {
                    replaced.insert(*idx, new);
                }
            }
        }
    }

    if replaced.is_empty() {
        return Ok(xml.to_vec());
    }

    let preserve: HashSet<usize> = replaced
        .keys()
        .filter_map(|idx| text_parent.get(idx).copied())
        .collect();

    tracing::debug!(part, runs = replaced.len(), "substituted placeholders");

    let mut writer = Writer::new(Vec::with_capacity(xml.len()));
    for (idx, event) in events.into_iter().enumerate() {
        if let Some(text) = replaced.get(&idx) {
            write_text(&mut writer, text, options.linebreaks)?;
            continue;
        }
        match event {
            Event::Start(e) if preserve.contains(&idx) => {
                writer
                    .write_event(Event::Start(preserve_space(&e)?))
                    .map_err(xml_error)?;
            }
            other => writer.write_event(other).map_err(xml_error)?,
        }
    }

    Ok(writer.into_inner())
}

/// 段落内のラン群のテキストを置換する
///
/// # 戻り値
///
/// * `Ok(Some(Vec<String>))` - 置換後の各ランのテキスト
/// * `Ok(None)` - タグが1つも含まれていない場合
/// * `Err(TagError)` - 構文エラー
pub(crate) fn substitute_runs(
    texts: &[String],
    data: &TemplateData,
    start: &str,
    end: &str,
) -> Result<Option<Vec<String>>, TagError> {
    let chars: Vec<(char, usize)> = texts
        .iter()
        .enumerate()
        .flat_map(|(run, text)| text.chars().map(move |c| (c, run)))
        .collect();
    let start: Vec<char> = start.chars().collect();
    let end: Vec<char> = end.chars().collect();

    let matches_at = |pos: usize, pattern: &[char]| {
        pos + pattern.len() <= chars.len()
            && pattern
                .iter()
                .enumerate()
                .all(|(k, c)| chars[pos + k].0 == *c)
    };
    let collect = |from: usize, to: usize| -> String { chars[from..to].iter().map(|(c, _)| c).collect() };

    let mut out = vec![String::new(); texts.len()];
    let mut found = false;
    let mut pos = 0;

    while pos < chars.len() {
        if matches_at(pos, &start) {
            let tag_start = pos;
            let mut cursor = pos + start.len();
            let close = loop {
                if cursor >= chars.len() || matches_at(cursor, &start) {
                    return Err(TagError::Unclosed(collect(tag_start, cursor)));
                }
                if matches_at(cursor, &end) {
                    break cursor;
                }
                cursor += 1;
            };

            let name = collect(tag_start + start.len(), close);
            let name = name.trim();
            if name.is_empty() {
                return Err(TagError::Empty);
            }

            let value = data.get(name).unwrap_or("");
            out[chars[tag_start].1].push_str(value);
            found = true;
            pos = close + end.len();
        } else if matches_at(pos, &end) {
            return Err(TagError::Unopened(collect(pos.saturating_sub(16), pos + end.len())));
        } else {
            let (c, run) = chars[pos];
            out[run].push(c);
            pos += 1;
        }
    }

    Ok(found.then_some(out))
}

/// 置換後のテキストを書き出す（改行は`<w:br/>`に変換）
fn write_text(
    writer: &mut Writer<Vec<u8>>,
    text: &str,
    linebreaks: bool,
) -> Result<(), PolicyDocError> {
    if !linebreaks || !text.contains('\n') {
        return writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(xml_error);
    }

    let normalized = text.replace("\r\n", "\n");
    for (i, line) in normalized.split('\n').enumerate() {
        if i > 0 {
            // 現在の<w:t>を閉じ、改行を挟んで新しい<w:t>を開く
            writer
                .write_event(Event::End(BytesEnd::new("w:t")))
                .map_err(xml_error)?;
            writer
                .write_event(Event::Empty(BytesStart::new(BREAK)))
                .map_err(xml_error)?;
            let mut reopened = BytesStart::new("w:t");
            reopened.push_attribute(("xml:space", "preserve"));
            writer
                .write_event(Event::Start(reopened))
                .map_err(xml_error)?;
        }
        writer
            .write_event(Event::Text(BytesText::new(line)))
            .map_err(xml_error)?;
    }
    Ok(())
}

/// `<w:t>`に`xml:space="preserve"`を付与する
fn preserve_space(start: &BytesStart<'_>) -> Result<BytesStart<'static>, PolicyDocError> {
    let name = std::str::from_utf8(start.name().as_ref())?.to_string();
    let mut rewritten = BytesStart::new(name);
    for attr in start.attributes() {
        let attr = attr.map_err(xml_error)?;
        if attr.key.as_ref() != b"xml:space" {
            rewritten.push_attribute(attr);
        }
    }
    rewritten.push_attribute(("xml:space", "preserve"));
    Ok(rewritten)
}

fn xml_error<E: std::fmt::Display>(e: E) -> PolicyDocError {
    PolicyDocError::Xml(e.to_string())
}
