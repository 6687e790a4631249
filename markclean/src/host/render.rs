// markclean/src/host/render.rs
//! Markdown rendering with `comrak`.
//!
//! A note is rendered one heading-delimited section at a time, each section
//! appended as its own pass, so the export pipeline sees the same incremental
//! output an editor preview produces. Link reference definitions are scoped to the
//! whole note, so every section is rendered with all of them in front of it.

use anyhow::Result;
use async_trait::async_trait;
use comrak::{markdown_to_html, Options};
use log::debug;

use markclean_core::{MarkdownRenderer, RenderRequest, ScratchWriter};

pub struct ComrakRenderer {
    options: Options<'static>,
}

impl ComrakRenderer {
    pub fn new() -> Self {
        let mut options = Options::default();
        options.extension.table = true;
        options.extension.strikethrough = true;
        options.extension.tasklist = true;
        options.extension.autolink = true;
        options.extension.wikilinks_title_after_pipe = true;
        Self { options }
    }

    pub fn render_section(&self, markdown: &str) -> String {
        markdown_to_html(markdown, &self.options)
    }

    /// Renders `markdown` into the passes [`MarkdownRenderer::render`] appends.
    pub fn render_passes(&self, markdown: &str) -> Vec<String> {
        let definitions = reference_definitions(markdown);
        split_sections(markdown)
            .into_iter()
            .map(|section| {
                if definitions.is_empty() {
                    self.render_section(section)
                } else {
                    self.render_section(&format!("{}\n{}", definitions, section))
                }
            })
            .filter(|html| !html.is_empty())
            .collect()
    }
}

impl Default for ComrakRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarkdownRenderer for ComrakRenderer {
    async fn render(&self, request: RenderRequest, writer: ScratchWriter) -> Result<()> {
        let passes = self.render_passes(&request.markdown);
        debug!("Rendering export {} in {} pass(es).", writer.generation(), passes.len());
        for html in passes {
            writer.append(html).await?;
            tokio::task::yield_now().await;
        }
        Ok(())
    }
}

fn fence_marker(line: &str) -> Option<&'static str> {
    let trimmed = line.trim_start();
    if trimmed.starts_with("```") {
        Some("```")
    } else if trimmed.starts_with("~~~") {
        Some("~~~")
    } else {
        None
    }
}

fn is_atx_heading(line: &str) -> bool {
    let hashes = line.chars().take_while(|c| *c == '#').count();
    (1..=6).contains(&hashes) && line[hashes..].chars().next().is_none_or(|c| c == ' ' || c == '\t')
}

/// Whether `line` opens a link reference definition: `[label]: destination`,
/// indented at most three spaces. Footnote definitions (`[^label]:`) are not.
fn is_reference_definition(line: &str) -> bool {
    let indent = line.len() - line.trim_start_matches(' ').len();
    let rest = &line[indent..];
    if indent > 3 || !rest.starts_with('[') || rest.starts_with("[^") {
        return false;
    }
    let Some(close) = rest.find("]:") else {
        return false;
    };
    let label = &rest[1..close];
    !label.trim().is_empty() && !label.contains('[') && !rest[close + 2..].trim().is_empty()
}

/// Collects the link reference definitions of the whole note, in order, as one
/// block ending in a blank line. Empty when the note has none.
pub fn reference_definitions(markdown: &str) -> String {
    let mut out = String::new();
    let mut fence: Option<&'static str> = None;
    // definitions cannot interrupt a paragraph
    let mut may_start_block = true;

    for line in markdown.lines() {
        match (fence, fence_marker(line)) {
            (Some(open), Some(marker)) if open == marker => {
                fence = None;
                may_start_block = false;
                continue;
            }
            (Some(_), _) => continue,
            (None, Some(marker)) => {
                fence = Some(marker);
                continue;
            }
            (None, None) => {}
        }

        if line.trim().is_empty() {
            may_start_block = true;
        } else if may_start_block && is_reference_definition(line) {
            out.push_str(line.trim_end());
            out.push('\n');
            may_start_block = true;
        } else {
            may_start_block = is_atx_heading(line);
        }
    }

    if !out.is_empty() {
        out.push('\n');
    }
    out
}

/// Splits `markdown` before every ATX heading that is not inside a code fence.
pub fn split_sections(markdown: &str) -> Vec<&str> {
    let mut sections = Vec::new();
    let mut start = 0;
    let mut offset = 0;
    let mut fence: Option<&'static str> = None;

    for line in markdown.split_inclusive('\n') {
        match (fence, fence_marker(line)) {
            (Some(open), Some(marker)) if open == marker => fence = None,
            (None, Some(marker)) => fence = Some(marker),
            (None, None) if offset > start && is_atx_heading(line) => {
                sections.push(&markdown[start..offset]);
                start = offset;
            }
            _ => {}
        }
        offset += line.len();
    }
    if start < markdown.len() {
        sections.push(&markdown[start..]);
    }
    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_start_at_headings() {
        let md = "intro\n# One\ntext\n## Two\nmore\n";
        assert_eq!(split_sections(md), vec!["intro\n", "# One\ntext\n", "## Two\nmore\n"]);
    }

    #[test]
    fn headings_inside_fences_do_not_split() {
        let md = "# Code\n```sh\n# comment\n```\n#tag is not a heading\n";
        assert_eq!(split_sections(md).len(), 1);
    }

    #[test]
    fn empty_note_has_no_sections() {
        assert!(split_sections("").is_empty());
    }

    #[test]
    fn reference_definitions_are_collected_outside_fences_and_paragraphs() {
        let md = "[a]: https://a.example\n\ntext\n[b]: not-a-definition\n\n```\n[c]: /in/fence\n```\n\n# H\n[d]: /d \"Title\"\n[^note]: footnote\n";
        assert_eq!(reference_definitions(md), "[a]: https://a.example\n[d]: /d \"Title\"\n\n");
        assert_eq!(reference_definitions("no links here\n"), "");
    }

    #[test]
    fn references_resolve_across_sections() {
        let md = "See [docs][d].\n\n# Later\n\n[d]: https://example.com\n";
        let passes = ComrakRenderer::new().render_passes(md);
        assert_eq!(passes.len(), 2);
        assert!(passes[0].contains(r#"<a href="https://example.com">docs</a>"#), "{}", passes[0]);
        assert!(!passes[0].contains("[docs]"));
        assert!(passes[1].contains("Later"));
    }

    #[test]
    fn wikilinks_are_marked() {
        let html = ComrakRenderer::new().render_section("See [[Other Note#Part|there]].");
        assert!(html.contains("data-wikilink=\"true\""));
        assert!(html.contains("there"));
    }
}
