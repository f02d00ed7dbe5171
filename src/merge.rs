//! Projection of active groups onto hosts-file text. Pure, no I/O.
//!
//! The hosts file is handled as bytes: only group content is known to be
//! UTF-8, and bytes outside the managed block are copied through untouched.

use crate::config::HostsMode;
use crate::group::HostGroup;

/// First line of the managed block.
pub const BEGIN_MARKER: &str = "# --- HOSTSWITCH BEGIN ---";
/// Last line of the managed block.
pub const END_MARKER: &str = "# --- HOSTSWITCH END ---";

/// Merge the active groups (in the given order) into `current` according to `mode`.
pub fn merge<'a, I>(current: &[u8], groups: I, mode: HostsMode) -> Vec<u8>
where
    I: IntoIterator<Item = &'a HostGroup>,
{
    let active = groups.into_iter().filter(|g| g.is_active);
    match mode {
        HostsMode::Exclusive => render_exclusive(active).into_bytes(),
        HostsMode::Append => splice(current, render_block(active).as_bytes()),
    }
}

/// Active group contents only, blank line between groups, no headers.
fn render_exclusive<'a>(groups: impl Iterator<Item = &'a HostGroup>) -> String {
    let parts: Vec<String> = groups
        .filter_map(|g| normalized(&g.content))
        .collect();
    parts.join("\n")
}

/// Marker-delimited block with a `# title` header per group.
fn render_block<'a>(groups: impl Iterator<Item = &'a HostGroup>) -> String {
    let parts: Vec<String> = groups
        .map(|g| {
            let body: Vec<&str> = g
                .content
                .lines()
                .filter(|l| !is_any_marker(l.as_bytes()))
                .collect();
            let mut part = format!("# {}\n", header_title(&g.title));
            if let Some(body) = normalized(&body.join("\n")) {
                part.push_str(&body);
            }
            part
        })
        .collect();
    format!("{BEGIN_MARKER}\n{}{END_MARKER}\n", parts.join("\n"))
}

/// Content with trailing whitespace lines dropped and exactly one final newline;
/// `None` when nothing is left.
fn normalized(content: &str) -> Option<String> {
    let trimmed = content.trim_end_matches(['\n', '\r', ' ', '\t']);
    if trimmed.trim().is_empty() {
        None
    } else {
        Some(format!("{trimmed}\n"))
    }
}

/// First line of the title. A title whose header would read as a marker
/// line is quoted.
fn header_title(title: &str) -> String {
    let t = title.lines().next().unwrap_or("").trim();
    if t.is_empty() {
        "(untitled)".to_string()
    } else if is_any_marker(format!("# {t}").as_bytes()) {
        format!("\"{t}\"")
    } else {
        t.to_string()
    }
}

fn is_marker(line: &[u8], marker: &str) -> bool {
    let mut end = line.len();
    while end > 0 && matches!(line[end - 1], b'\r' | b'\n') {
        end -= 1;
    }
    &line[..end] == marker.as_bytes()
}

fn is_any_marker(line: &[u8]) -> bool {
    is_marker(line, BEGIN_MARKER) || is_marker(line, END_MARKER)
}

/// Replace the managed block in `current` with `block`, or append it.
fn splice(current: &[u8], block: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(current.len() + block.len() + 1);
    match managed_range(current) {
        Some((start, end)) => {
            out.extend_from_slice(&current[..start]);
            out.extend_from_slice(block);
            out.extend_from_slice(&current[end..]);
        }
        None => {
            out.extend_from_slice(current);
            if current.last().is_some_and(|&b| b != b'\n') {
                out.push(b'\n');
            }
            out.extend_from_slice(block);
        }
    }
    out
}

/// Byte range from the start of the first BEGIN line through the end of the
/// next END line (line break included). A BEGIN with no END runs to EOF.
fn managed_range(text: &[u8]) -> Option<(usize, usize)> {
    let mut start = None;
    let mut offset = 0;
    for line in text.split_inclusive(|&b| b == b'\n') {
        let next = offset + line.len();
        match start {
            None if is_marker(line, BEGIN_MARKER) => start = Some(offset),
            Some(s) if is_marker(line, END_MARKER) => return Some((s, next)),
            _ => {}
        }
        offset = next;
    }
    start.map(|s| (s, text.len()))
}
