use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::system::lookup::CommandLine;

const MAX_CMDLINE_WIDTH: usize = 80;
const KEY_CONTEXT: usize = 100;
const ELLIPSIS: &str = "...";

/// Cuts `s` to at most `max_width` display columns, ending in `...` when
/// anything was dropped.
pub fn truncate_unicode(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let budget = max_width.saturating_sub(ELLIPSIS.len());
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > budget {
            break;
        }
        result.push(ch);
        width += ch_width;
    }
    result.push_str(ELLIPSIS);
    result
}

/// Shortens a long command line, keeping the text around the first
/// occurrence of `key` visible when there is one.
pub fn cmdline_excerpt(cmdline: &str, key: &str) -> String {
    if cmdline.width() <= MAX_CMDLINE_WIDTH {
        return cmdline.to_string();
    }
    let hit = if key.is_empty() {
        None
    } else {
        cmdline.find(key)
    };
    let Some(idx) = hit else {
        return truncate_unicode(cmdline, MAX_CMDLINE_WIDTH);
    };

    let mut start = idx.saturating_sub(KEY_CONTEXT);
    while !cmdline.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = (idx + KEY_CONTEXT).min(cmdline.len());
    while !cmdline.is_char_boundary(end) {
        end += 1;
    }

    let pre = if start > 0 { ELLIPSIS } else { "" };
    let post = if end < cmdline.len() { ELLIPSIS } else { "" };
    format!("{pre}{}{post}", &cmdline[start..end])
}

/// `comm   cmdline` label for a process, as shown in prompts and headers.
pub fn describe(process: &CommandLine, key: &str) -> String {
    format!("{}   {}", process.name, cmdline_excerpt(&process.joined(), key))
}
