//! Terminal output utilities: ANSI formatting and table rendering.

pub const RESET: &str = "\x1b[0m";
pub const BOLD: &str = "\x1b[1m";
pub const RED: &str = "\x1b[31m";
pub const CYAN: &str = "\x1b[36m";

/// Check if the terminal supports color output.
pub fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
        && (std::env::var("COLORTERM").is_ok()
            || std::env::var("TERM")
                .map(|t| t != "dumb")
                .unwrap_or(false))
}

/// Strip ANSI escape codes from a string.
pub fn strip_ansi(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            // Skip until 'm'
            for next in chars.by_ref() {
                if next == 'm' { break; }
            }
        } else {
            result.push(c);
        }
    }
    result
}

/// Print a formatted ERROR note to stderr.
pub fn note_error(msg: &str) {
    if supports_color() {
        eprintln!("{RED}{BOLD}✗{RESET} {msg}");
    } else {
        eprintln!("ERROR: {msg}");
    }
}

/// Format one bot reply line: `[channel] text`. Multi-line replies are
/// indented under the channel tag.
pub fn format_reply(channel: &str, text: &str, color: bool) -> String {
    let tag = if color {
        format!("{CYAN}[{channel}]{RESET}")
    } else {
        format!("[{channel}]")
    };
    let indent = " ".repeat(channel.chars().count() + 3);
    let mut lines = text.lines();
    let mut out = format!("{tag} {}", lines.next().unwrap_or_default());
    for line in lines {
        out.push('\n');
        out.push_str(&indent);
        out.push_str(line);
    }
    out
}

/// Render a left-aligned table with a bold header row.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(strip_ansi(cell).chars().count());
        }
    }

    let pad = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| {
                let visible = strip_ansi(cell).chars().count();
                format!("{cell}{}", " ".repeat(width.saturating_sub(visible)))
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    out.push_str(&format!("{BOLD}{}{RESET}\n", pad(headers.to_vec())));
    let sep: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&sep.join("  "));
    out.push('\n');
    for row in rows {
        out.push_str(&pad(row.iter().map(String::as_str).collect()));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_ansi() {
        let colored = format!("{CYAN}hello{RESET}");
        assert_eq!(strip_ansi(&colored), "hello");
    }

    #[test]
    fn formats_multiline_reply() {
        let out = format_reply("dm", "Insufficient permissions\nRequired: owner", false);
        assert_eq!(out, "[dm] Insufficient permissions\n     Required: owner");
    }

    #[test]
    fn table_pads_columns() {
        let table = render_table(
            &["name", "permission"],
            &[vec!["ban".into(), "moderator".into()], vec!["ping".into(), "user".into()]],
        );
        let lines: Vec<_> = table.lines().map(strip_ansi).collect();
        assert_eq!(lines[0], "name  permission");
        assert_eq!(lines[1], "----  ----------");
        assert_eq!(lines[2], "ban   moderator");
        assert_eq!(lines[3], "ping  user");
    }
}
