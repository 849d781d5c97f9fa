//! Sentence Extractor
//!
//! Turns a document's raw line stream into sentence records. The input
//! micro-format is one sentence per line:
//!
//! ```text
//! <s docid="AP880911-0016" num="3" wdcount="21">Sentence text ...</s>
//! ```
//!
//! Lines that don't have this shape are reported as skipped, never as
//! errors. Source order is preserved because it encodes document position.

use crate::error::{Result, SummarizerError};
use crate::types::*;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use std::io::BufRead;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

const CLOSING_TAG: &str = "</s>";

/// Strip every markup tag and trim surrounding whitespace.
///
/// Idempotent: a `<` left behind has no `>` after it, so a second pass
/// finds nothing to remove.
pub fn clean_sentence(raw: &str) -> String {
    TAG_REGEX.replace_all(raw, "").trim().to_string()
}

/// True when the trimmed line opens with an `s` tag and ends with `</s>`.
pub fn is_sentence_line(line: &str) -> bool {
    let line = line.trim();
    let opens = match line.strip_prefix("<s") {
        Some(rest) => rest.starts_with('>') || rest.starts_with(char::is_whitespace),
        None => false,
    };
    opens && line.ends_with(CLOSING_TAG)
}

/// Attributes carried on the opening `<s>` tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct SentenceTag {
    docid: Option<String>,
    num: Option<u32>,
    wdcount: Option<u32>,
}

fn parse_opening_tag(line: &str) -> Result<SentenceTag> {
    let mut reader = Reader::from_str(line);
    let start = match reader.read_event() {
        Ok(Event::Start(start)) => start,
        Ok(other) => {
            return Err(SummarizerError::MalformedSentence(format!(
                "expected opening <s> tag, found {other:?}"
            )))
        }
        Err(e) => return Err(SummarizerError::MalformedSentence(e.to_string())),
    };

    let mut tag = SentenceTag::default();
    for attribute in start.attributes() {
        let attribute =
            attribute.map_err(|e| SummarizerError::MalformedSentence(e.to_string()))?;
        let value = attribute
            .unescape_value()
            .map_err(|e| SummarizerError::MalformedSentence(e.to_string()))?;

        match attribute.key.as_ref() {
            b"docid" => tag.docid = Some(value.trim().to_string()),
            b"num" => tag.num = Some(parse_count("num", &value)?),
            b"wdcount" => tag.wdcount = Some(parse_count("wdcount", &value)?),
            _ => {}
        }
    }

    Ok(tag)
}

fn parse_count(name: &str, value: &str) -> Result<u32> {
    value.trim().parse::<u32>().map_err(|_| {
        SummarizerError::MalformedSentence(format!("{name}=\"{value}\" is not a count"))
    })
}

/// Build a sentence record from a line that already passed `is_sentence_line`.
pub fn parse_sentence_line(
    line: &str,
    position: usize,
    fallback_document_id: &str,
) -> Result<SentenceRecord> {
    let raw_markup = line.trim();
    let tag = parse_opening_tag(raw_markup)?;

    Ok(SentenceRecord {
        raw_markup: raw_markup.to_string(),
        normalized_text: clean_sentence(raw_markup),
        position,
        document_id: tag
            .docid
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| fallback_document_id.to_string()),
        num: tag.num,
        word_count: tag.wdcount,
    })
}

/// Classify each line of a stream. Positions count accepted sentences only.
pub fn parse_lines<I, S>(lines: I, fallback_document_id: &str) -> Extraction
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parsed = Vec::new();
    let mut position = 0usize;

    for (index, line) in lines.into_iter().enumerate() {
        let line = line.as_ref();
        let line_number = index + 1;

        let outcome = if line.trim().is_empty() {
            ParsedLine::Skipped {
                line_number,
                reason: SkipReason::Blank,
            }
        } else if !is_sentence_line(line) {
            ParsedLine::Skipped {
                line_number,
                reason: SkipReason::NotSentenceTag,
            }
        } else {
            match parse_sentence_line(line, position, fallback_document_id) {
                Ok(record) => {
                    position += 1;
                    ParsedLine::Sentence(record)
                }
                Err(e) => {
                    debug!(line_number, error = %e, "skipping malformed sentence line");
                    ParsedLine::Skipped {
                        line_number,
                        reason: SkipReason::MalformedTag(e.to_string()),
                    }
                }
            }
        };
        parsed.push(outcome);
    }

    Extraction {
        document_id: fallback_document_id.to_string(),
        lines: parsed,
    }
}

/// Read a sentence stream. Only I/O failures (including invalid UTF-8) are errors.
pub fn read_sentences<R: BufRead>(
    source: R,
    fallback_document_id: &str,
) -> std::io::Result<Extraction> {
    let lines = source.lines().collect::<std::io::Result<Vec<String>>>()?;
    Ok(parse_lines(lines, fallback_document_id))
}

/// Read a sentence file from disk.
pub fn read_sentence_file(path: &Path, fallback_document_id: &str) -> Result<Extraction> {
    let file = std::fs::File::open(path).map_err(|e| SummarizerError::io(path, e))?;
    read_sentences(std::io::BufReader::new(file), fallback_document_id)
        .map_err(|e| SummarizerError::io(path, e))
}
