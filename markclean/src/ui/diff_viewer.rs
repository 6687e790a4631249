// markclean/src/ui/diff_viewer.rs
//! Unified diff between the input markup and the cleaned output.

use diffy::{create_patch, Line as DiffLine};
use owo_colors::OwoColorize;
use std::io::{self, Write};

/// Prints the changes from `original` to `cleaned`. Removed lines are red and
/// added lines green when `supports_color` is set.
pub fn print_diff<W: Write>(original: &str, cleaned: &str, writer: &mut W, supports_color: bool) -> io::Result<()> {
    let patch = create_patch(original, cleaned);
    let header = "--- Diff View ---";
    if supports_color {
        writeln!(writer, "{}", header.yellow().bold())?;
    } else {
        writeln!(writer, "{}", header)?;
    }

    let mut changed = false;
    for hunk in patch.hunks() {
        for line in hunk.lines() {
            match line {
                DiffLine::Delete(s) => {
                    changed = true;
                    let text = format!("-{}", s.trim_end_matches('\n'));
                    if supports_color {
                        writeln!(writer, "{}", text.red())?;
                    } else {
                        writeln!(writer, "{}", text)?;
                    }
                }
                DiffLine::Insert(s) => {
                    changed = true;
                    let text = format!("+{}", s.trim_end_matches('\n'));
                    if supports_color {
                        writeln!(writer, "{}", text.green())?;
                    } else {
                        writeln!(writer, "{}", text)?;
                    }
                }
                DiffLine::Context(s) => writeln!(writer, " {}", s.trim_end_matches('\n'))?,
            }
        }
    }

    if !changed {
        writeln!(writer, "No changes.")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removed_and_added_lines_are_marked() {
        let mut out = Vec::new();
        print_diff("<div class=\"x\">a</div>\n", "<p>a</p>\n", &mut out, false).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("-<div class=\"x\">a</div>"));
        assert!(text.contains("+<p>a</p>"));
    }

    #[test]
    fn identical_input_reports_no_changes() {
        let mut out = Vec::new();
        print_diff("<p>a</p>", "<p>a</p>", &mut out, false).unwrap();
        assert!(String::from_utf8(out).unwrap().ends_with("No changes.\n"));
    }
}
