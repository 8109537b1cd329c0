/// Sections of a compiled document, in output order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SectionKind {
    Primary,
    OwnedWork,
    ImmutableContext,
    Context,
    References,
}

/// Joins items within owned-work, context and reference sections
pub const RULE_SEPARATOR: &str = "\n\n---\n\n";
/// Joins immutable-context items so identity material reads unbroken
pub const BLANK_LINE_SEPARATOR: &str = "\n\n";

impl SectionKind {
    pub const ORDER: [Self; 5] = [
        Self::Primary,
        Self::OwnedWork,
        Self::ImmutableContext,
        Self::Context,
        Self::References,
    ];

    #[must_use]
    pub fn heading(self) -> Option<&'static str> {
        match self {
            Self::Primary => None,
            Self::OwnedWork => Some("## Owned Work"),
            Self::ImmutableContext => Some("## Immutable Context"),
            Self::Context => Some("## Context"),
            Self::References => Some("## References"),
        }
    }

    #[must_use]
    pub fn separator(self) -> &'static str {
        match self {
            Self::ImmutableContext => BLANK_LINE_SEPARATOR,
            _ => RULE_SEPARATOR,
        }
    }
}

/// A present section: at least one item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub kind: SectionKind,
    /// Root-relative source path of each item
    pub sources: Vec<String>,
    pub items: Vec<String>,
}

impl Section {
    #[must_use]
    pub fn render(&self) -> String {
        let joined = self.items.join(self.kind.separator());
        match self.kind.heading() {
            Some(heading) => format!("{heading}\n\n{joined}"),
            None => joined,
        }
    }
}

/// Collects section items and assembles them in fixed order
#[derive(Debug, Default)]
pub struct SectionBuilder {
    sections: Vec<Section>,
}

impl SectionBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item; blank items are dropped
    pub fn push(&mut self, kind: SectionKind, source: &str, item: &str) {
        let item = item.trim();
        if item.is_empty() {
            return;
        }
        match self.sections.iter_mut().find(|s| s.kind == kind) {
            Some(section) => {
                section.sources.push(source.to_string());
                section.items.push(item.to_string());
            }
            None => self.sections.push(Section {
                kind,
                sources: vec![source.to_string()],
                items: vec![item.to_string()],
            }),
        }
    }

    /// Present sections in output order; absent ones are simply missing
    #[must_use]
    pub fn finish(mut self) -> Vec<Section> {
        self.sections.sort_by_key(|s| s.kind);
        self.sections
    }
}

/// Join rendered sections with blank lines
#[must_use]
pub fn render_sections(sections: &[Section]) -> String {
    sections
        .iter()
        .map(Section::render)
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_is_fixed_regardless_of_push_order() {
        let mut b = SectionBuilder::new();
        b.push(SectionKind::References, "r.md", "ref");
        b.push(SectionKind::Context, "c.md", "ctx");
        b.push(SectionKind::Primary, "doc.md", "body");
        b.push(SectionKind::ImmutableContext, "i.md", "who");
        b.push(SectionKind::OwnedWork, "o.md", "work");

        let kinds: Vec<SectionKind> = b.finish().iter().map(|s| s.kind).collect();
        assert_eq!(kinds, SectionKind::ORDER.to_vec());
    }

    #[test]
    fn test_separators_differ_by_section() {
        let mut b = SectionBuilder::new();
        b.push(SectionKind::OwnedWork, "a.md", "A");
        b.push(SectionKind::OwnedWork, "b.md", "B");
        b.push(SectionKind::ImmutableContext, "x.md", "X");
        b.push(SectionKind::ImmutableContext, "y.md", "Y");

        let rendered = render_sections(&b.finish());
        assert_eq!(
            rendered,
            "## Owned Work\n\nA\n\n---\n\nB\n\n## Immutable Context\n\nX\n\nY"
        );
    }

    #[test]
    fn test_blank_items_leave_section_absent() {
        let mut b = SectionBuilder::new();
        b.push(SectionKind::Context, "empty.md", "  \n ");
        assert!(b.finish().is_empty());
    }
}
