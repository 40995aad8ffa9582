//! Best-effort parser for the markdown analysis report.
//!
//! The analysis API returns one markdown document. Three pieces are sliced
//! out of it for separate display:
//!
//! - the **timeline block**: from a heading containing `Case Timeline` up to
//!   the next numbered heading (`### 4. ...`), holding event bullets
//!   `- **<date>:** <title>` each followed by an indented
//!   `- **Details:** <details>` line;
//! - the **score section**: from an `Argument Strength Score:` marker to the
//!   end of the report, holding a `SCORE: N/M` line followed by the
//!   justification;
//! - the **main analysis**: whatever is left, trimmed.
//!
//! Nothing here fails. A piece that is not found comes back empty or `None`
//! and the text it would have consumed stays in the main analysis. When a
//! marker appears more than once, the first usable occurrence wins.

use tracing::debug;

use crate::report::{ParsedReport, ScoreResult, TimelineEvent};

const TIMELINE_MARKER: &str = "Case Timeline";
const SCORE_MARKER: &str = "Argument Strength Score:";
const SCORE_LINE_MARKER: &str = "SCORE:";
const DETAILS_PREFIX: &str = "- **Details:**";
const EVENT_PREFIX: &str = "- **";
const EVENT_SEPARATOR: &str = ":** ";

/// Split a report into timeline events, score, and main analysis.
///
/// # Algorithm
///
/// 1. Find the timeline block and collect its event/details bullet pairs.
/// 2. Delete the block, keeping the heading that ends it.
/// 3. In the remaining text, find the score section, capture the fraction and
///    everything after its line as justification, and cut the report there.
/// 4. Trim, then strip one trailing `**` left over from cut emphasis.
pub fn parse_report(text: &str) -> ParsedReport {
    let (timeline, rest) = match find_timeline_block(text) {
        Some(block) => {
            let lines = split_lines(&text[block.body_start..block.end]);
            let events = parse_events(&lines);
            let mut rest = String::with_capacity(text.len());
            rest.push_str(&text[..block.start]);
            rest.push_str(&text[block.end..]);
            (events, rest)
        }
        None => (Vec::new(), text.to_string()),
    };

    let (score, rest) = match find_score_section(&rest) {
        Some(section) => {
            let mut remaining = String::with_capacity(rest.len());
            remaining.push_str(&rest[..section.start]);
            remaining.push_str(&rest[section.end..]);
            (Some(section.result), remaining)
        }
        None => (None, rest),
    };

    let main_analysis = strip_trailing_emphasis(rest.trim()).to_string();

    debug!(
        events = timeline.len(),
        score = score.as_ref().map(|s| s.score.as_str()).unwrap_or("-"),
        main_len = main_analysis.len(),
        "parsed analysis report"
    );

    ParsedReport {
        timeline,
        score,
        main_analysis,
    }
}

// ── Line scanning ──

/// A line of the source together with its byte offset.
#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    start: usize,
    /// Line text without its `\n` / `\r\n` terminator.
    text: &'a str,
}

fn split_lines(text: &str) -> Vec<Line<'_>> {
    let mut lines = Vec::new();
    let mut offset = 0;
    for raw in text.split_inclusive('\n') {
        lines.push(Line {
            start: offset,
            text: raw.trim_end_matches(['\n', '\r']),
        });
        offset += raw.len();
    }
    lines
}

/// Heading title with the leading `#` run removed, or `None` for non-headings.
fn heading_title(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    if !trimmed.starts_with('#') {
        return None;
    }
    Some(trimmed.trim_start_matches('#').trim())
}

fn is_heading(line: &str) -> bool {
    heading_title(line).is_some()
}

/// `### 4. Critical Analysis` style heading: title begins with `<digits>.`.
fn is_numbered_heading(line: &str) -> bool {
    let Some(title) = heading_title(line) else {
        return false;
    };
    let digits = title.bytes().take_while(|b| b.is_ascii_digit()).count();
    digits > 0 && title[digits..].starts_with('.')
}

fn is_indented(line: &str) -> bool {
    line.starts_with([' ', '\t'])
}

// ── Timeline ──

struct TimelineBlock {
    /// Start of the timeline heading line.
    start: usize,
    /// Start of the line after the timeline heading.
    body_start: usize,
    /// Start of the numbered heading that closes the block.
    end: usize,
}

fn find_timeline_block(text: &str) -> Option<TimelineBlock> {
    let lines = split_lines(text);
    let open = lines.iter().position(|l| {
        heading_title(l.text).is_some_and(|title| title.contains(TIMELINE_MARKER))
    })?;
    let close = lines[open + 1..]
        .iter()
        .find(|l| is_numbered_heading(l.text))?;
    let body_start = lines.get(open + 1).map_or(text.len(), |l| l.start);

    Some(TimelineBlock {
        start: lines[open].start,
        body_start,
        end: close.start,
    })
}

/// `- **<date>:** <title>`, indentation allowed. Details lines never match.
fn event_line(line: &str) -> Option<(&str, &str)> {
    let trimmed = line.trim_start();
    if trimmed.starts_with(DETAILS_PREFIX) {
        return None;
    }
    let rest = trimmed.strip_prefix(EVENT_PREFIX)?;
    let sep = rest.find(EVENT_SEPARATOR)?;
    let date = &rest[..sep];
    if date.trim().is_empty() {
        return None;
    }
    let title = rest[sep + EVENT_SEPARATOR.len()..].trim_end();
    Some((date, title))
}

/// Text following `- **Details:**`, or `None` if the line is not a details line.
fn details_line(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix(DETAILS_PREFIX)?;
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(rest.trim_start())
}

fn parse_events(lines: &[Line<'_>]) -> Vec<TimelineEvent> {
    let mut events = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let Some((date, title)) = event_line(lines[i].text) else {
            i += 1;
            continue;
        };

        // The details line may follow after blank lines, and must otherwise be indented.
        let mut j = i + 1;
        while j < lines.len() && lines[j].text.trim().is_empty() {
            j += 1;
        }
        let blank_gap = j > i + 1;
        let first = lines
            .get(j)
            .filter(|l| blank_gap || is_indented(l.text))
            .and_then(|l| details_line(l.text));

        let Some(first) = first else {
            i += 1;
            continue;
        };

        let mut details = String::from(first);
        let mut k = j + 1;
        while k < lines.len() && event_line(lines[k].text).is_none() && !is_heading(lines[k].text)
        {
            details.push('\n');
            details.push_str(lines[k].text);
            k += 1;
        }

        events.push(TimelineEvent {
            date: date.to_string(),
            title: title.to_string(),
            details: details.trim().to_string(),
        });
        i = k;
    }

    events
}

// ── Score ──

struct ScoreSection {
    start: usize,
    end: usize,
    result: ScoreResult,
}

fn find_score_section(text: &str) -> Option<ScoreSection> {
    text.match_indices(SCORE_MARKER)
        .find_map(|(pos, _)| score_section_at(text, pos))
}

fn score_section_at(text: &str, marker: usize) -> Option<ScoreSection> {
    let line_start = text[..marker].rfind('\n').map_or(0, |i| i + 1);

    // Drop bullet/emphasis/heading markup sitting in front of the marker.
    let prefix = &text[line_start..marker];
    let start = if prefix.chars().all(is_markup_char) {
        line_start
    } else {
        marker
    };

    // The justification runs to the end of the report.
    let end = text.len();
    let body = &text[marker + SCORE_MARKER.len()..end];
    let (score, justification) = body
        .match_indices(SCORE_LINE_MARKER)
        .find_map(|(pos, _)| score_line(&body[pos + SCORE_LINE_MARKER.len()..]))?;

    Some(ScoreSection {
        start,
        end,
        result: ScoreResult {
            score: score.to_string(),
            justification: justification.trim().to_string(),
        },
    })
}

fn is_markup_char(c: char) -> bool {
    c.is_whitespace() || c.is_ascii_digit() || matches!(c, '-' | '*' | '#' | '>' | '.')
}

/// Parse `\s*N/M` followed by the end of its line. Returns the fraction and
/// the text after that line.
fn score_line(after_marker: &str) -> Option<(&str, &str)> {
    let value = after_marker.trim_start();
    let numerator = value.bytes().take_while(|b| b.is_ascii_digit()).count();
    if numerator == 0 || value.as_bytes().get(numerator) != Some(&b'/') {
        return None;
    }
    let denominator = value[numerator + 1..]
        .bytes()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if denominator == 0 {
        return None;
    }
    let fraction_len = numerator + 1 + denominator;
    let fraction = &value[..fraction_len];

    let tail = &value[fraction_len..];
    let (line_rest, following) = match tail.find('\n') {
        Some(nl) => (&tail[..nl], &tail[nl + 1..]),
        None => (tail, ""),
    };
    if !line_rest.trim().is_empty() {
        return None;
    }
    Some((fraction, following))
}

// ── Cleanup ──

/// Strip one trailing `**` (and the whitespace before it). A trailing `***`
/// is a horizontal rule and stays.
fn strip_trailing_emphasis(text: &str) -> &str {
    match text.strip_suffix("**") {
        Some(stripped) if !stripped.ends_with('*') => stripped.trim_end(),
        _ => text,
    }
}
