//! Inline style declarations (`style="..."` attributes).
//!
//! Declarations keep their source order. Setting a property to the empty
//! string removes it, matching how `element.style.foo = ""` behaves in a
//! browser, so a value read before a mutation can always be written back to
//! restore the original declaration list.

use cssparser::{Delimiter, ParseError, Parser, ParserInput};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineStyle {
    declarations: Vec<(String, String)>,
}

impl InlineStyle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the contents of a `style` attribute. Malformed declarations
    /// (missing `:` or a name that is not an identifier) are skipped up to
    /// the next `;`. Values keep their source text.
    pub fn parse(css_text: &str) -> Self {
        let mut input = ParserInput::new(css_text);
        let mut parser = Parser::new(&mut input);
        let mut style = Self::new();

        while !parser.is_exhausted() {
            let declaration = parser.parse_until_after(Delimiter::Semicolon, |p| {
                let name = p.expect_ident()?.to_string();
                p.expect_colon()?;
                let value_start = p.position();
                // Nested blocks are skipped as a whole, so `;` inside
                // functions or strings never ends the value
                while p.next().is_ok() {}
                Ok::<_, ParseError<()>>((name, p.slice_from(value_start).trim().to_string()))
            });
            if let Ok((name, value)) = declaration {
                style.set_property(&name, &value);
            }
        }
        style
    }

    /// Value of `name`, or the empty string when unset
    pub fn get_property(&self, name: &str) -> &str {
        let name = name.to_ascii_lowercase();
        self.declarations
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }

    /// Set `name` to `value`, replacing in place if already present.
    /// An empty value removes the declaration.
    pub fn set_property(&mut self, name: &str, value: &str) {
        let name = name.trim().to_ascii_lowercase();
        let value = value.trim();
        if value.is_empty() {
            self.remove_property(&name);
            return;
        }
        match self.declarations.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value.to_string(),
            None => self.declarations.push((name, value.to_string())),
        }
    }

    /// Remove `name`, returning its previous value
    pub fn remove_property(&mut self, name: &str) -> Option<String> {
        let name = name.to_ascii_lowercase();
        let idx = self.declarations.iter().position(|(n, _)| *n == name)?;
        Some(self.declarations.remove(idx).1)
    }

    /// Replace every declaration, like assigning `style.cssText`
    pub fn set_css_text(&mut self, css_text: &str) {
        *self = Self::parse(css_text);
    }

    pub fn css_text(&self) -> String {
        self.declarations
            .iter()
            .map(|(n, v)| format!("{}: {};", n, v))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.declarations.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_serialize() {
        let s = InlineStyle::parse("Overflow: auto;color:red;; bogus; background: url('a;b')");
        assert_eq!(s.get_property("overflow"), "auto");
        assert_eq!(s.get_property("OVERFLOW"), "auto");
        assert_eq!(s.get_property("background"), "url('a;b')");
        assert_eq!(s.css_text(), "overflow: auto; color: red; background: url('a;b');");
    }

    #[test]
    fn semicolons_inside_values_do_not_split() {
        let s = InlineStyle::parse(
            "content: \"a;b\"; background-image: url(data:image/png;base64,AA==); color: rgb(1 2 3) !important",
        );
        assert_eq!(s.get_property("content"), "\"a;b\"");
        assert_eq!(s.get_property("background-image"), "url(data:image/png;base64,AA==)");
        assert_eq!(s.get_property("color"), "rgb(1 2 3) !important");
    }

    #[test]
    fn malformed_declarations_are_skipped() {
        let s = InlineStyle::parse("1px: red; : blue; width 10px; height: 4px");
        assert_eq!(s.css_text(), "height: 4px;");
        assert!(InlineStyle::parse("  ").is_empty());
    }

    #[test]
    fn empty_value_removes_declaration() {
        let mut s = InlineStyle::parse("overflow: auto; white-space: nowrap");
        s.set_property("white-space", "");
        assert_eq!(s.get_property("white-space"), "");
        assert_eq!(s.css_text(), "overflow: auto;");
    }

    #[test]
    fn set_then_restore_is_identity() {
        let original = InlineStyle::parse("color: red; overflow: scroll");
        let mut s = original.clone();
        let prior_overflow = s.get_property("overflow").to_string();
        let prior_ws = s.get_property("white-space").to_string();
        s.set_property("overflow", "visible");
        s.set_property("white-space", "pre-wrap");
        s.set_property("overflow", &prior_overflow);
        s.set_property("white-space", &prior_ws);
        assert_eq!(s, original);
    }
}
