//! Selector matching against a [`Document`].
//!
//! Matching walks the selector from right to left. The subject part must
//! match the node itself; every combinator then moves the candidate to a
//! parent, an ancestor or a preceding sibling. Descendant and general-sibling
//! steps backtrack, so `div p + p` finds the right `div` even when a nearer
//! ancestor only matches part of the chain.
//!
//! The document root is not an element and never matches anything.

use twyg_core::{Document, NodeId};

use super::{AttributeSelector, Combinator, PseudoClass, Selector, SelectorList, SelectorPart, TypeSelector};

/// Sibling position information.
#[derive(Debug, Clone, Copy)]
pub struct SiblingInfo {
    /// Zero-based index among siblings.
    pub index: usize,
    /// Total number of siblings (including self).
    pub count: usize,
}

impl SiblingInfo {
    /// Position of `node` below its parent, `None` for detached nodes.
    pub fn of(document: &Document, node: NodeId) -> Option<Self> {
        let index = document.sibling_index(node).ok().flatten()?;
        let count = document.sibling_count(node).ok()?;
        Some(Self { index, count })
    }

    /// Returns true if this is the first sibling.
    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    /// Returns true if this is the last sibling.
    pub fn is_last(&self) -> bool {
        self.index + 1 == self.count
    }

    /// Returns true if this is the only child.
    pub fn is_only(&self) -> bool {
        self.count == 1
    }
}

/// Selector matching engine.
pub struct SelectorMatcher;

impl SelectorList {
    /// Whether `node` matches any selector of the list.
    pub fn matches(&self, document: &Document, node: NodeId) -> bool {
        SelectorMatcher::matches_list(self, document, node)
    }
}

impl SelectorMatcher {
    /// Whether `node` matches any selector of the list.
    pub fn matches_list(list: &SelectorList, document: &Document, node: NodeId) -> bool {
        list.iter()
            .any(|selector| Self::matches(selector, document, node))
    }

    /// Whether `node` matches the full selector, combinators included.
    pub fn matches(selector: &Selector, document: &Document, node: NodeId) -> bool {
        if selector.parts.is_empty() {
            return false;
        }
        Self::matches_from(selector, selector.parts.len() - 1, document, node)
    }

    fn matches_from(selector: &Selector, index: usize, document: &Document, node: NodeId) -> bool {
        if !Self::part_matches(&selector.parts[index], document, node) {
            return false;
        }
        if index == 0 {
            return true;
        }

        let next = index - 1;
        let Some(&combinator) = selector.combinators.get(next) else {
            return false;
        };
        match combinator {
            Combinator::Descendant => document
                .ancestors(node)
                .unwrap_or_default()
                .into_iter()
                .any(|ancestor| Self::matches_from(selector, next, document, ancestor)),
            Combinator::Child => document
                .parent(node)
                .ok()
                .flatten()
                .is_some_and(|parent| Self::matches_from(selector, next, document, parent)),
            Combinator::AdjacentSibling => document
                .previous_siblings(node)
                .unwrap_or_default()
                .first()
                .is_some_and(|&sibling| Self::matches_from(selector, next, document, sibling)),
            Combinator::GeneralSibling => document
                .previous_siblings(node)
                .unwrap_or_default()
                .into_iter()
                .any(|sibling| Self::matches_from(selector, next, document, sibling)),
        }
    }

    /// Check if a compound selector matches a single node.
    pub fn part_matches(part: &SelectorPart, document: &Document, node: NodeId) -> bool {
        if node == document.root() {
            return false;
        }
        let Ok(tag) = document.tag(node) else {
            return false;
        };

        if let Some(TypeSelector::Type(name)) = &part.type_selector {
            if !name.eq_ignore_ascii_case(tag) {
                return false;
            }
        }

        if let Some(id) = &part.id {
            if document.element_id(node) != Some(id.as_str()) {
                return false;
            }
        }

        if !part.classes.iter().all(|class| document.has_class(node, class)) {
            return false;
        }

        if !part
            .attributes
            .iter()
            .all(|attribute| Self::attribute_matches(attribute, document, node))
        {
            return false;
        }

        part.pseudo_classes
            .iter()
            .all(|pseudo| Self::pseudo_matches(pseudo, document, node))
    }

    fn attribute_matches(attribute: &AttributeSelector, document: &Document, node: NodeId) -> bool {
        if attribute.name == "class" {
            let classes = document.classes(node).unwrap_or_default();
            return match &attribute.value {
                Some(value) => classes.join(" ") == *value,
                None => !classes.is_empty(),
            };
        }

        match (document.attribute(node, &attribute.name), &attribute.value) {
            (Some(actual), Some(expected)) => actual == expected,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    fn pseudo_matches(pseudo: &PseudoClass, document: &Document, node: NodeId) -> bool {
        let sibling_info = SiblingInfo::of(document, node);
        match pseudo {
            PseudoClass::FirstChild => sibling_info.is_some_and(|s| s.is_first()),
            PseudoClass::LastChild => sibling_info.is_some_and(|s| s.is_last()),
            PseudoClass::OnlyChild => sibling_info.is_some_and(|s| s.is_only()),
            PseudoClass::NthChild(expr) => sibling_info.is_some_and(|s| expr.matches(s.index)),
            PseudoClass::Empty => {
                document.children(node).is_ok_and(|c| c.is_empty())
                    && document.text(node).is_ok_and(|t| t.is_empty())
            }
            PseudoClass::Not(inner) => !Self::part_matches(inner, document, node),
        }
    }

    /// All descendants of `scope` that match the list, in document order.
    pub fn query_all(list: &SelectorList, document: &Document, scope: NodeId) -> Vec<NodeId> {
        document
            .descendants(scope)
            .unwrap_or_default()
            .into_iter()
            .filter(|&node| Self::matches_list(list, document, node))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selector::NthExpr;

    struct Chat {
        doc: Document,
        room: NodeId,
        stream: NodeId,
        rows: Vec<NodeId>,
        input_p: NodeId,
    }

    fn chat() -> Chat {
        let mut doc = Document::new();
        let room = doc.create_element("div");
        doc.add_class(room, "chat-room").unwrap();
        doc.append_child(doc.root(), room).unwrap();

        let stream = doc.create_element("div");
        doc.add_class(stream, "chat-stream").unwrap();
        doc.append_child(room, stream).unwrap();

        let mut rows = Vec::new();
        for i in 0..3 {
            let row = doc.create_element("div");
            doc.add_class(row, "chat-row").unwrap();
            doc.set_attribute(row, "data-index", i.to_string()).unwrap();
            doc.append_child(stream, row).unwrap();
            rows.push(row);
        }

        let input = doc.create_element("div");
        doc.add_class(input, "chat-input").unwrap();
        doc.append_child(room, input).unwrap();
        let input_p = doc.create_element("P");
        doc.append_child(input, input_p).unwrap();

        Chat {
            doc,
            room,
            stream,
            rows,
            input_p,
        }
    }

    #[test]
    fn part_matching() {
        let c = chat();
        assert!(SelectorMatcher::part_matches(&SelectorPart::type_only("p"), &c.doc, c.input_p));
        assert!(SelectorMatcher::part_matches(&SelectorPart::type_only("DIV"), &c.doc, c.room));
        assert!(SelectorMatcher::part_matches(&SelectorPart::universal(), &c.doc, c.room));
        assert!(!SelectorMatcher::part_matches(&SelectorPart::universal(), &c.doc, c.doc.root()));
        assert!(SelectorMatcher::part_matches(
            &SelectorPart::class_only("chat-row")
                .with_attribute(AttributeSelector::equals("data-index", "1")),
            &c.doc,
            c.rows[1]
        ));
        assert!(!SelectorMatcher::part_matches(
            &SelectorPart::class_only("chat-row")
                .with_attribute(AttributeSelector::equals("data-index", "1")),
            &c.doc,
            c.rows[0]
        ));
    }

    #[test]
    fn structural_pseudo_classes() {
        let c = chat();
        let first = SelectorPart::new().with_pseudo(PseudoClass::FirstChild);
        let last = SelectorPart::new().with_pseudo(PseudoClass::LastChild);
        let only = SelectorPart::new().with_pseudo(PseudoClass::OnlyChild);
        let even = SelectorPart::new().with_pseudo(PseudoClass::NthChild(NthExpr::even()));
        let empty = SelectorPart::new().with_pseudo(PseudoClass::Empty);
        let not_row = SelectorPart::universal()
            .with_pseudo(PseudoClass::Not(Box::new(SelectorPart::class_only("chat-row"))));

        assert!(SelectorMatcher::part_matches(&first, &c.doc, c.rows[0]));
        assert!(SelectorMatcher::part_matches(&last, &c.doc, c.rows[2]));
        assert!(SelectorMatcher::part_matches(&only, &c.doc, c.input_p));
        assert!(SelectorMatcher::part_matches(&even, &c.doc, c.rows[1]));
        assert!(!SelectorMatcher::part_matches(&even, &c.doc, c.rows[2]));
        assert!(SelectorMatcher::part_matches(&empty, &c.doc, c.input_p));
        assert!(!SelectorMatcher::part_matches(&empty, &c.doc, c.stream));
        assert!(SelectorMatcher::part_matches(&not_row, &c.doc, c.stream));
        assert!(!SelectorMatcher::part_matches(&not_row, &c.doc, c.rows[0]));
    }

    #[test]
    fn combinators() {
        let c = chat();
        let descendant = Selector::class("chat-room").descendant(SelectorPart::type_only("p"));
        assert!(SelectorMatcher::matches(&descendant, &c.doc, c.input_p));

        let child = Selector::class("chat-room").child(SelectorPart::type_only("p"));
        assert!(!SelectorMatcher::matches(&child, &c.doc, c.input_p));

        let adjacent = Selector::class("chat-row")
            .combine(Combinator::AdjacentSibling, SelectorPart::class_only("chat-row"));
        assert!(!SelectorMatcher::matches(&adjacent, &c.doc, c.rows[0]));
        assert!(SelectorMatcher::matches(&adjacent, &c.doc, c.rows[1]));

        let general = Selector::class("chat-stream")
            .combine(Combinator::GeneralSibling, SelectorPart::class_only("chat-input"));
        let input = c.doc.parent(c.input_p).unwrap().unwrap();
        assert!(SelectorMatcher::matches(&general, &c.doc, input));
    }

    #[test]
    fn descendant_backtracks_past_partial_match() {
        let mut c = chat();
        let wrap = c.doc.create_element("div");
        c.doc.append_child(c.stream, wrap).unwrap();
        c.doc.append_child(wrap, c.rows[2]).unwrap();

        // The nearest `div` ancestor (wrap) is not a child of the room; the
        // stream is.
        let selector = Selector::class("chat-room")
            .child(SelectorPart::type_only("div"))
            .descendant(SelectorPart::class_only("chat-row"));
        assert!(SelectorMatcher::matches(&selector, &c.doc, c.rows[2]));

        let strict = Selector::class("chat-room")
            .child(SelectorPart::type_only("div"))
            .child(SelectorPart::class_only("chat-row"));
        assert!(!SelectorMatcher::matches(&strict, &c.doc, c.rows[2]));
        assert!(SelectorMatcher::matches(&strict, &c.doc, c.rows[0]));
    }

    #[test]
    fn query_all_in_document_order() {
        let c = chat();
        let list = SelectorList::single(Selector::class("chat-row"));
        assert_eq!(SelectorMatcher::query_all(&list, &c.doc, c.doc.root()), c.rows);
    }

    #[test]
    fn missing_combinator_does_not_match() {
        let c = chat();
        let selector = Selector {
            parts: vec![SelectorPart::class_only("chat-stream"), SelectorPart::class_only("chat-row")],
            combinators: Vec::new(),
        };
        assert!(!SelectorMatcher::matches(&selector, &c.doc, c.rows[0]));
    }
}
