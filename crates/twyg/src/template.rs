//! Controller templates and their priority buckets.
//!
//! A template is an unbound description of a kind of controller: which nodes
//! it claims (a selector list) and the default flags of the controllers it
//! produces. Templates live in priority buckets; lookup walks the buckets in
//! ascending numeric order and each bucket in registration order, so the
//! first match is fully determined by `(priority, registration order)`.

use std::collections::BTreeMap;

use twyg_core::logging::targets;
use twyg_core::{Document, NodeId};
use twyg_style::{StyleError, selector::{Selector, SelectorList, SelectorMatcher}};

use crate::options::TemplateOptions;

/// Priority the stock paragraph and division templates are registered at.
pub const BUILTIN_PRIORITY: u32 = 100;

/// Priority used when none is given and no configuration says otherwise.
pub const DEFAULT_PRIORITY: u32 = 50;

/// A named controller template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    name: String,
    selector: SelectorList,
    options: TemplateOptions,
}

impl Template {
    /// Create a template from an already-built selector list.
    pub fn new(name: impl Into<String>, selector: SelectorList) -> Self {
        Self {
            name: name.into(),
            selector,
            options: TemplateOptions::default(),
        }
    }

    /// Create a template from selector text.
    pub fn parse(name: impl Into<String>, selector: &str) -> Result<Self, StyleError> {
        Ok(Self::new(name, SelectorList::parse(selector)?))
    }

    /// The generic template: claims every element (`*, .twyg`).
    pub fn generic() -> Self {
        Self::new(
            "twyg",
            SelectorList::new(vec![Selector::universal(), Selector::class("twyg")]),
        )
    }

    /// Paragraphs, edited in place as content-editable text.
    pub fn paragraph() -> Self {
        Self::new("paragraph", SelectorList::single(Selector::type_selector("p"))).with_options(
            TemplateOptions {
                content_editable: true,
                ..Default::default()
            },
        )
    }

    /// Plain division containers.
    pub fn division() -> Self {
        Self::new("division", SelectorList::single(Selector::type_selector("div")))
    }

    /// Unordered lists, active as soon as they are created.
    pub fn list() -> Self {
        Self::new("list", SelectorList::single(Selector::type_selector("ul"))).with_options(TemplateOptions {
            auto_activate: true,
            ..Default::default()
        })
    }

    /// The `.twyg-wydgyt1` widget, active as soon as it is created.
    pub fn widget() -> Self {
        Self::new(
            "wydgyt1",
            SelectorList::single(Selector::class("twyg-wydgyt1")),
        )
        .with_options(TemplateOptions {
            auto_activate: true,
            ..Default::default()
        })
    }

    /// Replace the default flags.
    pub fn with_options(mut self, options: TemplateOptions) -> Self {
        self.options = options;
        self
    }

    /// The template name, used in logs and debug output.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The selector list deciding which nodes this template claims.
    pub fn selector(&self) -> &SelectorList {
        &self.selector
    }

    /// Default flags of controllers built from this template.
    pub fn options(&self) -> TemplateOptions {
        self.options
    }

    /// Whether this template claims the node.
    pub fn matches(&self, document: &Document, node: NodeId) -> bool {
        SelectorMatcher::matches_list(&self.selector, document, node)
    }
}

/// Templates grouped into ordered priority buckets.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    buckets: BTreeMap<u32, Vec<Template>>,
    default_priority: u32,
}

impl Default for TemplateRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateRegistry {
    /// An empty registry with the standard default priority.
    pub fn new() -> Self {
        Self::with_default_priority(DEFAULT_PRIORITY)
    }

    /// An empty registry using `priority` for templates registered without one.
    pub fn with_default_priority(priority: u32) -> Self {
        Self {
            buckets: BTreeMap::new(),
            default_priority: priority,
        }
    }

    /// A registry holding the paragraph and division templates at
    /// [`BUILTIN_PRIORITY`].
    pub fn with_builtin_templates() -> Self {
        let mut registry = Self::new();
        registry.register(Template::paragraph(), Some(BUILTIN_PRIORITY));
        registry.register(Template::division(), Some(BUILTIN_PRIORITY));
        registry
    }

    /// Register a template. Returns the priority it was filed under.
    pub fn register(&mut self, template: Template, priority: Option<u32>) -> u32 {
        let priority = priority.unwrap_or(self.default_priority);
        tracing::debug!(
            target: targets::FACTORY,
            template = template.name(),
            selector = %template.selector(),
            priority,
            "registered template"
        );
        self.buckets.entry(priority).or_default().push(template);
        priority
    }

    /// Priority used for templates registered without one.
    pub fn default_priority(&self) -> u32 {
        self.default_priority
    }

    /// Change the priority used for templates registered without one.
    pub fn set_default_priority(&mut self, priority: u32) {
        self.default_priority = priority;
    }

    /// Total number of registered templates.
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Whether no templates are registered.
    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(Vec::is_empty)
    }

    /// Iterate over `(priority, template)` in lookup order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &Template)> {
        self.buckets
            .iter()
            .flat_map(|(&priority, templates)| templates.iter().map(move |template| (priority, template)))
    }

    /// The first template, in lookup order, that claims the node.
    pub fn find(&self, document: &Document, node: NodeId) -> Option<(u32, &Template)> {
        let found = self.iter().find(|(_, template)| template.matches(document, node));
        match &found {
            Some((priority, template)) => tracing::trace!(
                target: targets::FACTORY,
                ?node,
                template = template.name(),
                priority,
                "template matched"
            ),
            None => tracing::trace!(target: targets::FACTORY, ?node, "no template matched"),
        }
        found
    }
}
