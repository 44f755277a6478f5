//! Structured rich text to plain text and HTML

use crate::helpers::{external_link_open, html_escape, image_tag, push_escaped};
use crate::source::{NodeKind, RichTextNode, Span, SpanKind};

/// Plain text of a rich-text body, nodes joined by a space
pub fn as_text(nodes: &[RichTextNode]) -> String {
    nodes
        .iter()
        .map(|n| n.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render a rich-text body to HTML
///
/// Consecutive list items are grouped into a single `<ul>` or `<ol>`.
pub fn as_html(nodes: &[RichTextNode]) -> String {
    let mut out = String::new();
    let mut open_list: Option<NodeKind> = None;

    for node in nodes {
        let list = matches!(node.kind, NodeKind::ListItem | NodeKind::OrderedListItem);
        if open_list.is_some() && open_list != Some(node.kind) {
            out.push_str(list_close(open_list));
            open_list = None;
        }
        if list && open_list.is_none() {
            out.push_str(if node.kind == NodeKind::ListItem {
                "<ul>"
            } else {
                "<ol>"
            });
            open_list = Some(node.kind);
        }

        match node.kind {
            NodeKind::Paragraph | NodeKind::Unknown => wrap(&mut out, "p", node),
            NodeKind::Heading1 => wrap(&mut out, "h1", node),
            NodeKind::Heading2 => wrap(&mut out, "h2", node),
            NodeKind::Heading3 => wrap(&mut out, "h3", node),
            NodeKind::Heading4 => wrap(&mut out, "h4", node),
            NodeKind::Heading5 => wrap(&mut out, "h5", node),
            NodeKind::Heading6 => wrap(&mut out, "h6", node),
            NodeKind::Preformatted => wrap(&mut out, "pre", node),
            NodeKind::ListItem | NodeKind::OrderedListItem => wrap(&mut out, "li", node),
            NodeKind::Image => {
                if let Some(url) = &node.url {
                    out.push_str(r#"<p class="block-img">"#);
                    out.push_str(&image_tag(url, node.alt.as_deref()));
                    out.push_str("</p>");
                }
            }
            NodeKind::Embed => {
                if let Some(embed) = &node.oembed {
                    let url = embed.embed_url.as_deref().unwrap_or("");
                    out.push_str(&format!(r#"<div data-oembed="{}">"#, html_escape(url)));
                    // oEmbed markup comes from the provider and is emitted as-is
                    out.push_str(embed.html.as_deref().unwrap_or(""));
                    out.push_str("</div>");
                }
            }
        }
    }

    if open_list.is_some() {
        out.push_str(list_close(open_list));
    }

    out
}

fn list_close(kind: Option<NodeKind>) -> &'static str {
    match kind {
        Some(NodeKind::OrderedListItem) => "</ol>",
        _ => "</ul>",
    }
}

fn wrap(out: &mut String, tag: &str, node: &RichTextNode) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    out.push_str(&render_spans(&node.text, &node.spans, tag != "pre"));
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

/// A span with its offsets converted to char positions
struct Placed<'a> {
    start: usize,
    end: usize,
    span: &'a Span,
}

/// Apply spans, re-opening spans that cross a closing one
///
/// Span offsets count UTF-16 code units, as the content API writes them.
fn render_spans(text: &str, spans: &[Span], break_lines: bool) -> String {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();

    // UTF-16 offset of every char boundary
    let bounds: Vec<usize> = std::iter::once(0)
        .chain(chars.iter().scan(0, |acc, c| {
            *acc += c.len_utf16();
            Some(*acc)
        }))
        .collect();
    let to_char = |offset: usize| bounds.partition_point(|&b| b < offset).min(len);

    let mut sorted: Vec<Placed> = spans
        .iter()
        .map(|span| Placed {
            start: to_char(span.start),
            end: to_char(span.end),
            span,
        })
        .filter(|p| p.start < p.end)
        .collect();
    sorted.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut out = String::with_capacity(text.len());
    let mut open: Vec<&Placed> = Vec::new();
    let mut next = 0;

    for i in 0..=len {
        while let Some(pos) = open.iter().rposition(|p| p.end == i) {
            let reopen: Vec<&Placed> = open.drain(pos + 1..).collect();
            for placed in reopen.iter().rev() {
                out.push_str(close_tag(placed.span));
            }
            if let Some(placed) = open.pop() {
                out.push_str(close_tag(placed.span));
            }
            for placed in reopen {
                out.push_str(&open_tag(placed.span));
                open.push(placed);
            }
        }

        while next < sorted.len() && sorted[next].start == i {
            out.push_str(&open_tag(sorted[next].span));
            open.push(&sorted[next]);
            next += 1;
        }

        if let Some(&c) = chars.get(i) {
            if c == '\n' && break_lines {
                out.push_str("<br />");
            } else {
                push_escaped(&mut out, c);
            }
        }
    }

    out
}

fn open_tag(span: &Span) -> String {
    let data = span.data.as_ref();
    match span.kind {
        SpanKind::Strong => "<strong>".to_string(),
        SpanKind::Em => "<em>".to_string(),
        SpanKind::Hyperlink => external_link_open(
            data.and_then(|d| d.url.as_deref()).unwrap_or("#"),
            data.and_then(|d| d.target.as_deref()),
        ),
        SpanKind::Label => match data.and_then(|d| d.label.as_deref()) {
            Some(label) => format!(r#"<span class="{}">"#, html_escape(label)),
            None => "<span>".to_string(),
        },
        SpanKind::Unknown => "<span>".to_string(),
    }
}

fn close_tag(span: &Span) -> &'static str {
    match span.kind {
        SpanKind::Strong => "</strong>",
        SpanKind::Em => "</em>",
        SpanKind::Hyperlink => "</a>",
        SpanKind::Label | SpanKind::Unknown => "</span>",
    }
}
