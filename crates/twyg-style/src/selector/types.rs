//! Selector type definitions.

use std::fmt;

/// A comma-separated list of selectors (e.g., "*, .twyg").
///
/// A node matches the list when it matches any member.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectorList {
    /// The member selectors in source order.
    pub selectors: Vec<Selector>,
}

impl SelectorList {
    /// Create a list from already-built selectors.
    pub fn new(selectors: Vec<Selector>) -> Self {
        Self { selectors }
    }

    /// A list with a single selector.
    pub fn single(selector: Selector) -> Self {
        Self {
            selectors: vec![selector],
        }
    }

    /// Number of member selectors.
    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    /// Whether the list has no members.
    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    /// Iterate over the member selectors.
    pub fn iter(&self) -> std::slice::Iter<'_, Selector> {
        self.selectors.iter()
    }
}

impl fmt::Display for SelectorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, selector) in self.selectors.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", selector)?;
        }
        Ok(())
    }
}

/// A complete selector (e.g., "div.chat-input > p:first-child").
///
/// A selector consists of one or more selector parts connected by combinators.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selector {
    /// Chain of compound selectors, leftmost first.
    pub parts: Vec<SelectorPart>,
    /// Combinators between parts (length = parts.len() - 1).
    pub combinators: Vec<Combinator>,
}

impl Selector {
    /// Create a simple type selector.
    pub fn type_selector(tag: impl Into<String>) -> Self {
        Self {
            parts: vec![SelectorPart::type_only(tag)],
            combinators: vec![],
        }
    }

    /// Create a universal selector (*).
    pub fn universal() -> Self {
        Self {
            parts: vec![SelectorPart::universal()],
            combinators: vec![],
        }
    }

    /// Create a class selector.
    pub fn class(class_name: impl Into<String>) -> Self {
        Self {
            parts: vec![SelectorPart::class_only(class_name)],
            combinators: vec![],
        }
    }

    /// Create an ID selector.
    pub fn id(id: impl Into<String>) -> Self {
        Self {
            parts: vec![SelectorPart::id_only(id)],
            combinators: vec![],
        }
    }

    /// Add a descendant selector part.
    pub fn descendant(self, part: SelectorPart) -> Self {
        self.combine(Combinator::Descendant, part)
    }

    /// Add a child selector part.
    pub fn child(self, part: SelectorPart) -> Self {
        self.combine(Combinator::Child, part)
    }

    /// Add a part joined by the given combinator.
    pub fn combine(mut self, combinator: Combinator, part: SelectorPart) -> Self {
        if !self.parts.is_empty() {
            self.combinators.push(combinator);
        }
        self.parts.push(part);
        self
    }

    /// Get the rightmost (subject) selector part.
    pub fn subject(&self) -> Option<&SelectorPart> {
        self.parts.last()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                match &self.combinators[i - 1] {
                    Combinator::Descendant => write!(f, " ")?,
                    Combinator::Child => write!(f, " > ")?,
                    Combinator::AdjacentSibling => write!(f, " + ")?,
                    Combinator::GeneralSibling => write!(f, " ~ ")?,
                }
            }
            write!(f, "{}", part)?;
        }
        Ok(())
    }
}

/// A single compound selector (e.g., "p.chat-row[data-id]:first-child").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SelectorPart {
    /// Type selector (tag name or universal).
    pub type_selector: Option<TypeSelector>,
    /// ID selector (#id).
    pub id: Option<String>,
    /// Class selectors (.class).
    pub classes: Vec<String>,
    /// Attribute selectors ([name] or [name=value]).
    pub attributes: Vec<AttributeSelector>,
    /// Pseudo-class selectors (:first-child, :not(..), etc.).
    pub pseudo_classes: Vec<PseudoClass>,
}

impl SelectorPart {
    /// Create a new empty selector part.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a type-only selector. Tag names are stored lowercase.
    pub fn type_only(tag: impl Into<String>) -> Self {
        Self {
            type_selector: Some(TypeSelector::Type(tag.into().to_ascii_lowercase())),
            ..Default::default()
        }
    }

    /// Create a universal selector part.
    pub fn universal() -> Self {
        Self {
            type_selector: Some(TypeSelector::Universal),
            ..Default::default()
        }
    }

    /// Create a class-only selector.
    pub fn class_only(class_name: impl Into<String>) -> Self {
        Self {
            classes: vec![class_name.into()],
            ..Default::default()
        }
    }

    /// Create an ID-only selector.
    pub fn id_only(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Default::default()
        }
    }

    /// Add a class selector.
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// Add an attribute selector.
    pub fn with_attribute(mut self, attribute: AttributeSelector) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Add a pseudo-class selector.
    pub fn with_pseudo(mut self, pseudo: PseudoClass) -> Self {
        self.pseudo_classes.push(pseudo);
        self
    }

    /// Whether the part constrains nothing at all.
    pub fn is_empty(&self) -> bool {
        self.type_selector.is_none()
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attributes.is_empty()
            && self.pseudo_classes.is_empty()
    }

    /// Check if this is a universal selector with no other constraints.
    pub fn is_universal_only(&self) -> bool {
        matches!(self.type_selector, Some(TypeSelector::Universal))
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attributes.is_empty()
            && self.pseudo_classes.is_empty()
    }
}

impl fmt::Display for SelectorPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.type_selector {
            Some(TypeSelector::Universal) => write!(f, "*")?,
            Some(TypeSelector::Type(t)) => write!(f, "{}", t)?,
            None => {}
        }

        if let Some(id) = &self.id {
            write!(f, "#{}", id)?;
        }

        for class in &self.classes {
            write!(f, ".{}", class)?;
        }

        for attribute in &self.attributes {
            write!(f, "{}", attribute)?;
        }

        for pseudo in &self.pseudo_classes {
            write!(f, ":{}", pseudo)?;
        }

        Ok(())
    }
}

/// Type selector - matches the element tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeSelector {
    /// Universal selector (*) - matches any element.
    Universal,
    /// Named tag (e.g., "p", "div"), lowercase.
    Type(String),
}

/// Attribute selector: presence or exact value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributeSelector {
    /// Attribute name.
    pub name: String,
    /// Required value; `None` only requires presence.
    pub value: Option<String>,
}

impl AttributeSelector {
    /// `[name]`
    pub fn present(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    /// `[name=value]`
    pub fn equals(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }
}

impl fmt::Display for AttributeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "[{}=\"{}\"]", self.name, value),
            None => write!(f, "[{}]", self.name),
        }
    }
}

/// Combinator between selector parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combinator {
    /// Descendant combinator (space): matches any descendant.
    Descendant,
    /// Child combinator (>): matches direct child only.
    Child,
    /// Adjacent sibling (+): matches immediately following sibling.
    AdjacentSibling,
    /// General sibling (~): matches any following sibling.
    GeneralSibling,
}

/// Structural pseudo-classes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PseudoClass {
    /// :first-child - first among siblings.
    FirstChild,
    /// :last-child - last among siblings.
    LastChild,
    /// :nth-child(An+B) - position among siblings.
    NthChild(NthExpr),
    /// :only-child - only child of parent.
    OnlyChild,
    /// :empty - no children and no text.
    Empty,
    /// :not(compound) - negation.
    Not(Box<SelectorPart>),
}

impl fmt::Display for PseudoClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PseudoClass::FirstChild => write!(f, "first-child"),
            PseudoClass::LastChild => write!(f, "last-child"),
            PseudoClass::NthChild(expr) => write!(f, "nth-child({})", expr),
            PseudoClass::OnlyChild => write!(f, "only-child"),
            PseudoClass::Empty => write!(f, "empty"),
            PseudoClass::Not(inner) => write!(f, "not({})", inner),
        }
    }
}

impl PseudoClass {
    /// Parse an argument-less pseudo-class name.
    pub fn from_css(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "first-child" => Some(Self::FirstChild),
            "last-child" => Some(Self::LastChild),
            "only-child" => Some(Self::OnlyChild),
            "empty" => Some(Self::Empty),
            _ => None,
        }
    }
}

/// Expression for :nth-child (An+B).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NthExpr {
    /// Coefficient (A in An+B).
    pub a: i32,
    /// Offset (B in An+B).
    pub b: i32,
}

impl NthExpr {
    /// Create a new nth expression.
    pub fn new(a: i32, b: i32) -> Self {
        Self { a, b }
    }

    /// Check if a 0-indexed position matches this expression.
    pub fn matches(&self, index: usize) -> bool {
        let n = index as i32 + 1;
        if self.a == 0 {
            n == self.b
        } else {
            let diff = n - self.b;
            if self.a > 0 {
                diff >= 0 && diff % self.a == 0
            } else {
                diff <= 0 && diff % self.a == 0
            }
        }
    }

    /// :nth-child(odd) = 2n+1.
    pub fn odd() -> Self {
        Self { a: 2, b: 1 }
    }

    /// :nth-child(even) = 2n.
    pub fn even() -> Self {
        Self { a: 2, b: 0 }
    }
}

impl fmt::Display for NthExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.a, self.b) {
            (2, 1) => write!(f, "odd"),
            (2, 0) => write!(f, "even"),
            (0, b) => write!(f, "{}", b),
            (1, 0) => write!(f, "n"),
            (a, 0) => write!(f, "{}n", a),
            (1, b) if b > 0 => write!(f, "n+{}", b),
            (1, b) => write!(f, "n{}", b),
            (a, b) if b > 0 => write!(f, "{}n+{}", a, b),
            (a, b) => write!(f, "{}n{}", a, b),
        }
    }
}
