//! Line-oriented description builder.

use std::fmt::Display;

#[derive(Debug, Default)]
pub(crate) struct Body {
    lines: Vec<String>,
}

impl Body {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// `label: value`, always emitted.
    pub(crate) fn line(&mut self, label: &str, value: impl Display) -> &mut Self {
        self.lines.push(format!("{}: {}", label, value));
        self
    }

    /// `label: value`, emitted only when the value is present.
    pub(crate) fn optional(&mut self, label: &str, value: Option<impl Display>) -> &mut Self {
        if let Some(value) = value {
            self.line(label, value);
        }
        self
    }

    pub(crate) fn raw(&mut self, text: impl Into<String>) -> &mut Self {
        self.lines.push(text.into());
        self
    }

    pub(crate) fn blank(&mut self) -> &mut Self {
        self.raw(String::new())
    }

    pub(crate) fn finish(&self) -> String {
        self.lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_lines_are_skipped() {
        let mut body = Body::new();
        body.line("A", 1)
            .optional("B", None::<&str>)
            .optional("C", Some("c"))
            .blank()
            .raw("tail");
        assert_eq!(body.finish(), "A: 1\nC: c\n\ntail");
    }
}
