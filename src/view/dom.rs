//! Arena-backed element tree
//!
//! Just enough of a DOM for table projection: elements with classes,
//! attributes, inline styles and layout boxes, hit testing, and a mutation
//! log so the host can tell our own writes apart from user edits.
//!
//! Removed elements give their slot back to a free list, so an [`ElementId`]
//! may be handed out again once the element it named is gone.

use std::collections::BTreeMap;

/// A box in window coordinates (CSS pixels)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px < self.x + self.width && py >= self.y && py < self.y + self.height
    }
}

/// Handle to an element in a [`Dom`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

#[derive(Debug, Clone, Default)]
pub struct Element {
    pub tag: String,
    pub classes: Vec<String>,
    pub attributes: BTreeMap<String, String>,
    pub style: BTreeMap<String, String>,
    pub text: Option<String>,
    pub children: Vec<ElementId>,
    pub parent: Option<ElementId>,
    /// Layout box, assigned by the host's layout pass
    pub rect: Option<Rect>,
}

/// Kind of a recorded DOM change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationKind {
    /// Attribute, class or inline style change
    Attributes { name: String },
    ChildList,
    CharacterData,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub kind: MutationKind,
    pub target: ElementId,
}

#[derive(Debug, Clone, Default)]
pub struct Dom {
    slots: Vec<Option<Element>>,
    free: Vec<ElementId>,
    mutations: Vec<MutationRecord>,
}

impl Dom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_element(&mut self, tag: &str) -> ElementId {
        let element = Element {
            tag: tag.to_string(),
            ..Element::default()
        };
        match self.free.pop() {
            Some(id) => {
                self.slots[id.0] = Some(element);
                id
            }
            None => {
                self.slots.push(Some(element));
                ElementId(self.slots.len() - 1)
            }
        }
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.slots.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Number of live elements
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slots ever allocated, live or free
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn tag(&self, id: ElementId) -> Option<&str> {
        self.get(id).map(|el| el.tag.as_str())
    }

    fn record(&mut self, target: ElementId, kind: MutationKind) {
        self.mutations.push(MutationRecord { kind, target });
    }

    /// Drain the mutation log
    pub fn take_mutations(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.mutations)
    }

    // ------------------------------------------------------------------------
    // Tree
    // ------------------------------------------------------------------------

    pub fn append_child(&mut self, parent: ElementId, child: ElementId) -> ElementId {
        if let Some(old_parent) = self.get(child).and_then(|el| el.parent) {
            self.remove_child(old_parent, child);
        }
        if let Some(el) = self.get_mut(parent) {
            el.children.push(child);
        }
        if let Some(el) = self.get_mut(child) {
            el.parent = Some(parent);
        }
        self.record(parent, MutationKind::ChildList);
        child
    }

    pub fn remove_child(&mut self, parent: ElementId, child: ElementId) {
        let Some(el) = self.get_mut(parent) else {
            return;
        };
        let before = el.children.len();
        el.children.retain(|&c| c != child);
        if el.children.len() == before {
            return;
        }
        if let Some(el) = self.get_mut(child) {
            el.parent = None;
        }
        self.record(parent, MutationKind::ChildList);
    }

    /// Detach `id` and free it along with its whole subtree.
    /// Removing an element that is already gone does nothing.
    pub fn remove(&mut self, id: ElementId) {
        if let Some(parent) = self.parent(id) {
            self.remove_child(parent, id);
        }
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            let Some(el) = self.slots.get_mut(next.0).and_then(Option::take) else {
                continue;
            };
            pending.extend(el.children);
            self.free.push(next);
        }
    }

    /// Free every child subtree of `parent`
    pub fn remove_children(&mut self, parent: ElementId) {
        for child in self.children(parent).to_vec() {
            self.remove(child);
        }
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.get(id).map_or(&[], |el| el.children.as_slice())
    }

    pub fn first_child(&self, id: ElementId) -> Option<ElementId> {
        self.children(id).first().copied()
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.get(id).and_then(|el| el.parent)
    }

    /// Whether `node` is `ancestor` or lies inside it
    pub fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Nearest inclusive ancestor matching `pred`
    pub fn closest(&self, id: ElementId, pred: impl Fn(&Element) -> bool) -> Option<ElementId> {
        let mut current = Some(id);
        while let Some(cur) = current {
            let el = self.get(cur)?;
            if pred(el) {
                return Some(cur);
            }
            current = el.parent;
        }
        None
    }

    pub fn closest_tag(&self, id: ElementId, tag: &str) -> Option<ElementId> {
        self.closest(id, |el| el.tag.eq_ignore_ascii_case(tag))
    }

    pub fn closest_class(&self, id: ElementId, class: &str) -> Option<ElementId> {
        self.closest(id, |el| el.classes.iter().any(|c| c == class))
    }

    // ------------------------------------------------------------------------
    // Attributes, classes, styles
    // ------------------------------------------------------------------------

    pub fn set_attribute(&mut self, id: ElementId, name: &str, value: &str) {
        let Some(el) = self.get_mut(id) else {
            return;
        };
        if el.attributes.get(name).map(String::as_str) == Some(value) {
            return;
        }
        el.attributes.insert(name.to_string(), value.to_string());
        self.record(id, MutationKind::Attributes { name: name.into() });
    }

    pub fn remove_attribute(&mut self, id: ElementId, name: &str) {
        let removed = self
            .get_mut(id)
            .is_some_and(|el| el.attributes.remove(name).is_some());
        if removed {
            self.record(id, MutationKind::Attributes { name: name.into() });
        }
    }

    pub fn attribute(&self, id: ElementId, name: &str) -> Option<&str> {
        self.get(id)?.attributes.get(name).map(String::as_str)
    }

    pub fn has_attribute(&self, id: ElementId, name: &str) -> bool {
        self.attribute(id, name).is_some()
    }

    pub fn add_class(&mut self, id: ElementId, class: &str) {
        let Some(el) = self.get_mut(id) else {
            return;
        };
        if el.classes.iter().any(|c| c == class) {
            return;
        }
        el.classes.push(class.to_string());
        self.record(id, MutationKind::Attributes { name: "class".into() });
    }

    pub fn remove_class(&mut self, id: ElementId, class: &str) {
        let Some(el) = self.get_mut(id) else {
            return;
        };
        let before = el.classes.len();
        el.classes.retain(|c| c != class);
        if el.classes.len() != before {
            self.record(id, MutationKind::Attributes { name: "class".into() });
        }
    }

    pub fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.get(id)
            .is_some_and(|el| el.classes.iter().any(|c| c == class))
    }

    /// Set an inline style property; an empty value removes it
    pub fn set_style(&mut self, id: ElementId, property: &str, value: &str) {
        let Some(el) = self.get_mut(id) else {
            return;
        };
        let changed = if value.is_empty() {
            el.style.remove(property).is_some()
        } else if el.style.get(property).map(String::as_str) == Some(value) {
            false
        } else {
            el.style.insert(property.to_string(), value.to_string());
            true
        };
        if changed {
            self.record(id, MutationKind::Attributes { name: "style".into() });
        }
    }

    /// Inline style property, `""` when unset
    pub fn style(&self, id: ElementId, property: &str) -> &str {
        self.get(id)
            .and_then(|el| el.style.get(property))
            .map_or("", String::as_str)
    }

    /// Replace all inline styles from a `prop: value; ...` declaration list
    pub fn set_css_text(&mut self, id: ElementId, css: &str) {
        let Some(el) = self.get_mut(id) else {
            return;
        };
        el.style.clear();
        for decl in css.split(';') {
            if let Some((prop, value)) = decl.split_once(':') {
                let (prop, value) = (prop.trim(), value.trim());
                if !prop.is_empty() && !value.is_empty() {
                    el.style.insert(prop.to_ascii_lowercase(), value.to_string());
                }
            }
        }
        self.record(id, MutationKind::Attributes { name: "style".into() });
    }

    pub fn set_text(&mut self, id: ElementId, text: &str) {
        if let Some(el) = self.get_mut(id) {
            el.text = Some(text.to_string());
            self.record(id, MutationKind::CharacterData);
        }
    }

    // ------------------------------------------------------------------------
    // Layout
    // ------------------------------------------------------------------------

    /// Layout boxes are host bookkeeping and are not recorded as mutations
    pub fn set_rect(&mut self, id: ElementId, rect: Rect) {
        if let Some(el) = self.get_mut(id) {
            el.rect = Some(rect);
        }
    }

    pub fn rect(&self, id: ElementId) -> Option<Rect> {
        self.get(id).and_then(|el| el.rect)
    }

    /// Deepest element under (`x`, `y`), searching from `root`.
    ///
    /// Later children are treated as painted on top.
    pub fn element_at(&self, root: ElementId, x: f64, y: f64) -> Option<ElementId> {
        let el = self.get(root)?;
        for &child in el.children.iter().rev() {
            if let Some(hit) = self.element_at(child, x, y) {
                return Some(hit);
            }
        }
        match el.rect {
            Some(rect) if rect.contains(x, y) => Some(root),
            _ => None,
        }
    }
}

/// Parse a CSS pixel length such as `"120px"` or `"120"`
pub fn parse_px(value: &str) -> Option<f64> {
    let value = value.trim();
    let number = value.strip_suffix("px").unwrap_or(value).trim();
    number.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Format a pixel length the way style declarations expect
pub fn px(value: f64) -> String {
    format!("{}px", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_and_contains() {
        let mut dom = Dom::new();
        let root = dom.create_element("div");
        let table = dom.create_element("table");
        let col = dom.create_element("col");
        dom.append_child(root, table);
        dom.append_child(table, col);
        assert!(dom.contains(root, col));
        assert!(dom.contains(col, col));
        assert!(!dom.contains(table, root));
        assert_eq!(dom.closest_tag(col, "TABLE"), Some(table));
    }

    #[test]
    fn test_reappend_moves_child() {
        let mut dom = Dom::new();
        let a = dom.create_element("div");
        let b = dom.create_element("div");
        let c = dom.create_element("span");
        dom.append_child(a, c);
        dom.append_child(b, c);
        assert!(dom.children(a).is_empty());
        assert_eq!(dom.parent(c), Some(b));
    }

    #[test]
    fn test_removed_subtree_slots_are_reused() {
        let mut dom = Dom::new();
        let root = dom.create_element("div");
        let row = dom.create_element("tr");
        let cell = dom.create_element("td");
        dom.append_child(root, row);
        dom.append_child(row, cell);
        dom.take_mutations();

        dom.remove(row);
        assert_eq!(dom.len(), 1);
        assert!(dom.children(root).is_empty());
        assert!(dom.get(cell).is_none());
        assert_eq!(dom.take_mutations().len(), 1);

        // Double removal is a no-op
        dom.remove(row);
        assert_eq!(dom.len(), 1);

        let a = dom.create_element("p");
        let b = dom.create_element("p");
        assert!([a, b].contains(&row) && [a, b].contains(&cell));
        assert_eq!(dom.capacity(), 3);
        assert!(dom.children(a).is_empty());
        assert_eq!(dom.parent(b), None);
    }

    #[test]
    fn test_remove_children_keeps_parent() {
        let mut dom = Dom::new();
        let tbody = dom.create_element("tbody");
        for _ in 0..3 {
            let row = dom.create_element("tr");
            dom.append_child(tbody, row);
        }
        dom.remove_children(tbody);
        assert_eq!(dom.len(), 1);
        assert!(dom.children(tbody).is_empty());
        assert_eq!(dom.tag(tbody), Some("tbody"));
    }

    #[test]
    fn test_style_writes_are_logged_once() {
        let mut dom = Dom::new();
        let col = dom.create_element("col");
        dom.set_style(col, "width", "100px");
        dom.set_style(col, "width", "100px");
        assert_eq!(dom.style(col, "width"), "100px");
        let log = dom.take_mutations();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].kind, MutationKind::Attributes { name: "style".into() });

        dom.set_style(col, "width", "");
        assert_eq!(dom.style(col, "width"), "");
        assert_eq!(dom.take_mutations().len(), 1);
    }

    #[test]
    fn test_css_text_parsing() {
        let mut dom = Dom::new();
        let table = dom.create_element("table");
        dom.set_css_text(table, "Width: 50%; border:none;;");
        assert_eq!(dom.style(table, "width"), "50%");
        assert_eq!(dom.style(table, "border"), "none");
    }

    #[test]
    fn test_element_at_prefers_deepest() {
        let mut dom = Dom::new();
        let root = dom.create_element("div");
        let cell = dom.create_element("td");
        dom.append_child(root, cell);
        dom.set_rect(root, Rect::new(0.0, 0.0, 500.0, 500.0));
        dom.set_rect(cell, Rect::new(10.0, 10.0, 100.0, 20.0));
        assert_eq!(dom.element_at(root, 50.0, 15.0), Some(cell));
        assert_eq!(dom.element_at(root, 300.0, 300.0), Some(root));
        assert_eq!(dom.element_at(root, 900.0, 15.0), None);
    }

    #[test]
    fn test_parse_px() {
        assert_eq!(parse_px("120px"), Some(120.0));
        assert_eq!(parse_px(" 80.5 "), Some(80.5));
        assert_eq!(parse_px("50%"), None);
        assert_eq!(parse_px(""), None);
        assert_eq!(px(190.0), "190px");
    }
}
