//! NZB index parsing
//!
//! Streams the XML once with quick-xml: collects one message-id per
//! `<segment>` element and, per `<file>`, compares the number of listed
//! segments against the count announced by the yEnc subject suffix
//! `(n/total)`. Segments the index promises but does not list are counted
//! missing before any network activity.

use crate::types::MessageId;
use anyhow::{Context, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

/// What the index declares: the work to check plus its own bookkeeping gaps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NzbContents {
    /// One id per `<segment>`, in document order
    pub articles: Vec<MessageId>,
    /// Segments announced by subjects but absent from the index itself
    pub missing_in_index: u64,
}

fn yenc_subject_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // yEnc subjects end with "(part/total)"; only the total matters here
    RE.get_or_init(|| Regex::new(r"\(\d+/(\d+)\)\s*$").expect("subject regex is valid"))
}

/// Expected segment count from a file's subject, if it carries one
fn expected_segments(subject: &str) -> Option<u64> {
    yenc_subject_regex()
        .captures(subject)
        .and_then(|caps| caps[1].parse().ok())
}

/// Parse an NZB document from disk
///
/// `quiet` suppresses the per-file stdout notices about index-level gaps.
pub fn parse_nzb(path: &Path, quiet: bool) -> Result<NzbContents> {
    let mut reader = Reader::from_file(path)
        .with_context(|| format!("Failed to open nzb file '{}'", path.display()))?;
    reader.config_mut().trim_text(true);

    let mut articles = Vec::new();
    let mut missing_in_index: u64 = 0;

    let mut subject = String::new();
    let mut segments_listed: u64 = 0;
    let mut in_segment = false;
    let mut segment_text = String::new();

    let mut buf = Vec::new();
    loop {
        let event = reader
            .read_event_into(&mut buf)
            .with_context(|| format!("nzb parse error in '{}'", path.display()))?;
        match event {
            Event::Start(e) => match e.local_name().as_ref() {
                b"file" => {
                    subject = e
                        .try_get_attribute("subject")
                        .context("bad attribute in <file>")?
                        .map(|a| a.unescape_value().map(|v| v.into_owned()))
                        .transpose()
                        .context("bad subject attribute in <file>")?
                        .unwrap_or_default();
                    segments_listed = 0;
                }
                b"segment" => {
                    in_segment = true;
                    segment_text.clear();
                }
                _ => {}
            },
            Event::Text(t) if in_segment => {
                segment_text.push_str(&t.unescape().context("bad segment text")?);
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"segment" => {
                    in_segment = false;
                    articles.push(MessageId::from_unbracketed(segment_text.trim()));
                    segments_listed += 1;
                }
                b"file" => {
                    let expected = expected_segments(&subject).unwrap_or(0);
                    debug!(
                        "File '{}' lists {} segments (subject announces {})",
                        subject, segments_listed, expected
                    );
                    if segments_listed < expected {
                        let gap = expected - segments_listed;
                        if !quiet {
                            println!("- {} missing Article(s) in nzb for '{}'", gap, subject);
                        }
                        missing_in_index += gap;
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(NzbContents {
        articles,
        missing_in_index,
    })
}
