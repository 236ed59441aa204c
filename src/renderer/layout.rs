//! Text layout - Live tree to styled terminal lines.
//!
//! # Rules
//!
//! - Block elements start and end their own line
//! - `ul` / `ol` indent their items and prefix `•` or `n.`
//! - Buttons draw as `[label]`, text inputs as a fixed-width field
//! - `pre` keeps its newlines; elsewhere whitespace runs collapse
//! - Hidden subtrees are skipped, and so is everything inside them

use bitflags::bitflags;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::config::RenderOptions;
use crate::dom::{ElementTraits, Node};

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct SpanStyle: u8 {
        const BOLD = 1 << 0;
        const UNDERLINE = 1 << 1;
        /// Drawn inverted: the focused control.
        const FOCUSED = 1 << 2;
        const CROSSED_OUT = 1 << 3;
        const BUTTON = 1 << 4;
        const INPUT = 1 << 5;
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub style: SpanStyle,
    /// The control this span draws, if any.
    pub node: Option<Node>,
}

impl Span {
    fn plain(text: impl Into<String>) -> Self {
        Self { text: text.into(), style: SpanStyle::empty(), node: None }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Line {
    pub spans: Vec<Span>,
}

impl Line {
    pub fn text(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }

    /// Display width in terminal cells.
    pub fn width(&self) -> usize {
        self.spans.iter().map(|span| span.text.width()).sum()
    }
}

/// Lay out `root` and everything under it.
pub fn layout(root: Node, options: &RenderOptions, focused: Option<Node>) -> Vec<Line> {
    let mut layouter = Layouter {
        options,
        focused,
        lines: Vec::new(),
        current: Line::default(),
        has_content: false,
        depth: 0,
        marker: None,
    };
    layouter.node(root, SpanStyle::empty(), false);
    layouter.break_line();
    layouter.lines
}

/// Lines joined with `\n`, trailing spaces trimmed.
pub fn to_plain_text(lines: &[Line]) -> String {
    lines
        .iter()
        .map(|line| line.text().trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Nodes reachable by Tab, in document order.
///
/// A stop is a visible, enabled element that is focusable or has a click handler.
pub fn focus_stops(root: Node) -> Vec<Node> {
    let mut stops = Vec::new();
    collect_stops(root, &mut stops);
    stops
}

fn collect_stops(node: Node, out: &mut Vec<Node>) {
    if node.is_element() {
        if node.hidden() {
            return;
        }
        if !node.disabled() && (node.tab_index() >= 0 || node.has_listener("click")) {
            out.push(node);
        }
    } else if !node.is_fragment() {
        return;
    }
    for child in node.child_nodes() {
        collect_stops(child, out);
    }
}

/// Last characters of `value` that fit in `width` cells, padded with `_`.
pub fn fit_tail(value: &str, width: usize) -> String {
    let mut used = 0;
    let mut start = value.len();
    for (index, c) in value.char_indices().rev() {
        let w = c.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        start = index;
    }
    let mut out = value[start..].to_string();
    out.extend(std::iter::repeat_n('_', width - used));
    out
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

// =============================================================================
// Layouter
// =============================================================================

struct Layouter<'a> {
    options: &'a RenderOptions,
    focused: Option<Node>,
    lines: Vec<Line>,
    current: Line,
    has_content: bool,
    depth: usize,
    /// List marker waiting for the first content of the next line.
    marker: Option<(String, SpanStyle)>,
}

impl Layouter<'_> {
    fn break_line(&mut self) {
        if !self.current.spans.is_empty() {
            self.hard_break();
        }
    }

    fn hard_break(&mut self) {
        self.lines.push(std::mem::take(&mut self.current));
        self.has_content = false;
    }

    fn start_line(&mut self) {
        if self.has_content {
            return;
        }
        if self.current.spans.is_empty() && self.depth > 0 {
            self.current.spans.push(Span::plain(" ".repeat(self.depth * self.options.indent)));
        }
        if let Some((marker, style)) = self.marker.take() {
            self.current.spans.push(Span { text: marker, style, node: None });
        }
        self.has_content = true;
    }

    fn push_text(&mut self, text: &str, style: SpanStyle) {
        if text.is_empty() {
            return;
        }
        let text = if self.has_content { text } else { text.trim_start() };
        if text.is_empty() {
            return;
        }
        self.start_line();
        self.current.spans.push(Span { text: text.to_string(), style, node: None });
    }

    /// Controls are separated from whatever precedes them on the line.
    fn push_control(&mut self, text: String, style: SpanStyle, node: Node) {
        let needs_gap = self.has_content
            && !self.current.spans.last().is_some_and(|span| span.text.ends_with(' '));
        self.start_line();
        if needs_gap {
            self.current.spans.push(Span::plain(" "));
        }
        self.current.spans.push(Span { text, style, node: Some(node) });
    }

    fn node(&mut self, node: Node, style: SpanStyle, pre: bool) {
        if node.is_text() {
            let text = node.text_content();
            if pre {
                for (index, line) in text.split('\n').enumerate() {
                    if index > 0 {
                        self.hard_break();
                    }
                    if !line.is_empty() {
                        self.start_line();
                        self.current.spans.push(Span { text: line.to_string(), style, node: None });
                    }
                }
            } else {
                self.push_text(&collapse_whitespace(&text), style);
            }
            return;
        }
        if node.is_fragment() {
            for child in node.child_nodes() {
                self.node(child, style, pre);
            }
            return;
        }
        if !node.is_element() || node.hidden() {
            return;
        }

        let tag = node.tag_name().unwrap_or_default();
        let traits = node.traits();
        let mut style = style;
        if node.class_list().contains("done") {
            style |= SpanStyle::CROSSED_OUT;
        }
        if self.focused == Some(node) {
            style |= SpanStyle::FOCUSED;
        }

        match tag.as_str() {
            "input" | "textarea" => {
                let field = format!("[{}]", fit_tail(&node.value(), self.options.input_width));
                self.push_control(field, style | SpanStyle::INPUT | SpanStyle::UNDERLINE, node);
                return;
            }
            "button" => {
                let label = collapse_whitespace(&node.text_content());
                self.push_control(format!("[{}]", label.trim()), style | SpanStyle::BUTTON, node);
                return;
            }
            "br" => {
                self.hard_break();
                return;
            }
            "hr" => {
                self.break_line();
                self.push_text(&"─".repeat(self.options.input_width), style);
                self.break_line();
                return;
            }
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => style |= SpanStyle::BOLD,
            _ => {}
        }

        if traits.contains(ElementTraits::LIST) {
            self.list(node, tag == "ol", style, pre);
            return;
        }

        let block = traits.contains(ElementTraits::BLOCK) || tag == "label";
        if block {
            self.break_line();
        }
        let pre = pre || tag == "pre";
        for child in node.child_nodes() {
            self.node(child, style, pre);
        }
        if block {
            self.break_line();
        }
    }

    fn list(&mut self, node: Node, ordered: bool, style: SpanStyle, pre: bool) {
        self.break_line();
        self.depth += 1;
        let mut number = 0;
        for child in node.child_nodes() {
            let is_item =
                child.is_element() && !child.hidden() && child.tag_name().as_deref() == Some("li");
            if is_item {
                number += 1;
                self.break_line();
                let marker = if ordered { format!("{number}. ") } else { "• ".to_string() };
                self.marker = Some((marker, style));
            }
            self.node(child, style, pre);
            self.marker = None;
        }
        self.break_line();
        self.depth -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{create_element, reset_document};
    use crate::jsx::{render, Attrs};

    fn plain(root: Node) -> String {
        to_plain_text(&layout(root, &RenderOptions { input_width: 6, indent: 2 }, None))
    }

    #[test]
    fn test_blocks_and_inline() {
        reset_document();

        let output = render(
            "div",
            Attrs::new()
                .child(render("h1", Attrs::new().child("Todo")).unwrap())
                .child(render("p", Attrs::new().child("Hello,   ").child(render("b", Attrs::new().child("world")).unwrap())).unwrap())
                .child(render("p", Attrs::new().hidden(true).child("secret")).unwrap()),
        )
        .unwrap();

        assert_eq!(plain(output.root), "Todo\nHello, world");
        let lines = layout(output.root, &RenderOptions::default(), None);
        assert!(lines[0].spans[0].style.contains(SpanStyle::BOLD));
    }

    #[test]
    fn test_lists_and_controls() {
        reset_document();

        let item = |text: &str| {
            render(
                "li",
                Attrs::new().child(text).child(render("button", Attrs::new().child("x")).unwrap()),
            )
            .unwrap()
        };
        let output = render(
            "div",
            Attrs::new()
                .child(render("ol", Attrs::new().child(item("milk")).child(item("eggs"))).unwrap())
                .child(render("ul", Attrs::new().child(item("bread"))).unwrap())
                .child(render("input", Attrs::new().attr("value", "abcdefgh")).unwrap()),
        )
        .unwrap();

        assert_eq!(
            plain(output.root),
            "  1. milk [x]\n  2. eggs [x]\n  • bread [x]\n[cdefgh]"
        );
    }

    #[test]
    fn test_pre_keeps_newlines() {
        reset_document();

        let pre = create_element("pre").unwrap();
        pre.set_inner_text("[\n    {}\n]");
        assert_eq!(plain(pre), "[\n    {}\n]");
    }

    #[test]
    fn test_fit_tail() {
        assert_eq!(fit_tail("", 3), "___");
        assert_eq!(fit_tail("ab", 3), "ab_");
        assert_eq!(fit_tail("abcdef", 3), "def");
        // Wide characters never overflow the field
        assert_eq!(fit_tail("世界", 3), "界_");
        assert_eq!(Line { spans: vec![Span::plain("世界")] }.width(), 4);
    }

    #[test]
    fn test_focus_stops_skip_hidden_and_disabled() {
        reset_document();

        let output = render(
            "div",
            Attrs::new()
                .child(render("input", Attrs::new().reference("visible")).unwrap())
                .child(render("span", Attrs::new().reference("clickable").on("click", |_| Ok(()))).unwrap())
                .child(render("span", Attrs::new().child("plain")).unwrap())
                .child(render("button", Attrs::new().attr("disabled", true)).unwrap())
                .child(
                    render("span", Attrs::new().hidden(true).child(render("button", Attrs::new()).unwrap()))
                        .unwrap(),
                ),
        )
        .unwrap();

        let stops = focus_stops(output.root);
        assert_eq!(
            stops,
            vec![output.refs.node("visible").unwrap(), output.refs.node("clickable").unwrap()]
        );
    }

    #[test]
    fn test_focused_and_done_styles() {
        reset_document();

        let output = render(
            "li",
            Attrs::new()
                .class("done")
                .child("milk")
                .child(render("button", Attrs::new().reference("finish").child("finish")).unwrap()),
        )
        .unwrap();
        let finish = output.refs.node("finish").unwrap();

        let lines = layout(output.root, &RenderOptions::default(), Some(finish));
        let spans = &lines[0].spans;
        assert!(spans.iter().all(|s| s.text.trim().is_empty() || s.style.contains(SpanStyle::CROSSED_OUT)));
        let button = spans.iter().find(|s| s.node == Some(finish)).unwrap();
        assert!(button.style.contains(SpanStyle::FOCUSED | SpanStyle::BUTTON));
    }
}
