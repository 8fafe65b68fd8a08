//! Indented markup buffer and text escaping.

use quick_xml::escape::escape;
use std::borrow::Cow;

const INDENT: &str = "  ";

/// Line-oriented output buffer that tracks nesting depth.
#[derive(Debug, Default)]
pub struct Markup {
    depth: usize,
    buffer: String,
}

impl Markup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one line at the current depth.
    pub fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.buffer.push_str(INDENT);
        }
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }

    /// Append a multi-line block at the current depth, dropping blank lines.
    pub fn block(&mut self, text: &str) {
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            self.line(line);
        }
    }

    /// Append `open`, run `body` one level deeper, then append `close`.
    pub fn nest(&mut self, open: &str, close: &str, body: impl FnOnce(&mut Self)) {
        self.line(open);
        self.indent();
        body(self);
        self.dedent();
        self.line(close);
    }

    pub fn indent(&mut self) {
        self.depth += 1;
    }

    pub fn dedent(&mut self) {
        if self.depth > 0 {
            self.depth -= 1;
        }
    }

    pub fn finish(self) -> String {
        self.buffer
    }
}

/// Escape text for element content or a quoted attribute value.
pub fn text(raw: &str) -> Cow<'_, str> {
    escape(raw)
}

/// Escape multi-line text, turning line breaks into `<br>`.
pub fn multiline(raw: &str) -> String {
    escape(raw).replace("\r\n", "\n").replace('\n', "<br>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nesting() {
        let mut out = Markup::new();
        out.nest("<ul>", "</ul>", |out| out.line("<li>A</li>"));
        assert_eq!(out.finish(), "<ul>\n  <li>A</li>\n</ul>\n");
    }

    #[test]
    fn test_dedent_stops_at_zero() {
        let mut out = Markup::new();
        out.dedent();
        out.line("x");
        assert_eq!(out.finish(), "x\n");
    }

    #[test]
    fn test_escaping() {
        assert_eq!(text("Fase <1> & \"2\""), "Fase &lt;1&gt; &amp; &quot;2&quot;");
        assert_eq!(multiline("a\nb <c>"), "a<br>b &lt;c&gt;");
    }
}
