//! Page document: the element collection with undo history.

use crate::elements::{Element, ElementId, ElementUpdate};
use kurbo::{Rect, Size};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use uuid::Uuid;

/// Maximum number of undo states to keep.
pub const MAX_UNDO_HISTORY: usize = 50;

/// A snapshot of the element collection for undo/redo.
#[derive(Debug, Clone, PartialEq)]
struct PageSnapshot {
    elements: HashMap<ElementId, Element>,
    order: Vec<ElementId>,
}

/// A comic page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageDocument {
    pub id: String,
    pub name: String,
    pub page_size: Size,
    elements: HashMap<ElementId, Element>,
    /// Insertion order, used to break z-index ties.
    order: Vec<ElementId>,
    #[serde(skip)]
    undo_stack: VecDeque<PageSnapshot>,
    #[serde(skip)]
    redo_stack: Vec<PageSnapshot>,
}

impl Default for PageDocument {
    fn default() -> Self {
        Self::new(Size::new(800.0, 1200.0))
    }
}

impl PageDocument {
    pub fn new(page_size: Size) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: "Untitled".to_string(),
            page_size,
            elements: HashMap::new(),
            order: Vec::new(),
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
        }
    }

    fn snapshot(&self) -> PageSnapshot {
        PageSnapshot {
            elements: self.elements.clone(),
            order: self.order.clone(),
        }
    }

    fn restore(&mut self, snapshot: PageSnapshot) {
        self.elements = snapshot.elements;
        self.order = snapshot.order;
    }

    /// Record the current state (call before making changes).
    pub fn push_undo(&mut self) {
        self.undo_stack.push_back(self.snapshot());
        self.redo_stack.clear();
        if self.undo_stack.len() > MAX_UNDO_HISTORY {
            self.undo_stack.pop_front();
        }
    }

    /// Returns true if something was undone.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.undo_stack.pop_back() else {
            return false;
        };
        self.redo_stack.push(self.snapshot());
        self.restore(snapshot);
        true
    }

    /// Returns true if something was redone.
    pub fn redo(&mut self) -> bool {
        let Some(snapshot) = self.redo_stack.pop() else {
            return false;
        };
        self.undo_stack.push_back(self.snapshot());
        self.restore(snapshot);
        true
    }

    /// Drop the most recent undo state without restoring it.
    pub fn discard_last_undo(&mut self) -> bool {
        self.undo_stack.pop_back().is_some()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Insert an element, replacing any element with the same id.
    pub fn add(&mut self, element: Element) {
        let id = element.id();
        if self.elements.insert(id, element).is_none() {
            self.order.push(id);
        }
    }

    pub fn remove(&mut self, id: ElementId) -> Option<Element> {
        let removed = self.elements.remove(&id)?;
        self.order.retain(|&other| other != id);
        Some(removed)
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(&id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    /// Merge a partial update. Returns false if the element does not exist.
    pub fn apply_update(&mut self, id: ElementId, update: &ElementUpdate) -> bool {
        match self.elements.get_mut(&id) {
            Some(element) => {
                element.apply_update(update);
                true
            }
            None => false,
        }
    }

    /// Elements in insertion order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.order.iter().filter_map(|id| self.elements.get(id))
    }

    pub fn ids(&self) -> &[ElementId] {
        &self.order
    }

    /// Elements back to front: by z-index, then insertion order.
    pub fn elements_by_z(&self) -> Vec<&Element> {
        let mut out: Vec<&Element> = self.elements().collect();
        // Stable sort keeps insertion order among equal z-indices.
        out.sort_by_key(|el| el.z_index());
        out
    }

    /// Union of all element bounds.
    pub fn bounds(&self) -> Option<Rect> {
        self.elements()
            .map(Element::bounds)
            .reduce(|acc, b| acc.union(b))
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn clear(&mut self) {
        self.elements.clear();
        self.order.clear();
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a page. Order entries without an element are dropped and
    /// elements missing from the order are appended.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut doc: Self = serde_json::from_str(json)?;
        let PageDocument {
            elements, order, ..
        } = &mut doc;
        order.retain(|id| elements.contains_key(id));
        let mut missing: Vec<ElementId> = elements
            .keys()
            .filter(|id| !order.contains(id))
            .copied()
            .collect();
        missing.sort();
        order.extend(missing);
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Bubble, BubbleKind, Panel, Transform};

    fn panel(x: f64) -> Element {
        Element::Panel(Panel::new(Rect::new(x, 0.0, x + 100.0, 100.0)))
    }

    #[test]
    fn test_add_remove() {
        let mut doc = PageDocument::default();
        let p = panel(0.0);
        let id = p.id();
        doc.add(p);
        assert_eq!(doc.len(), 1);
        assert!(doc.contains(id));
        assert!(doc.remove(id).is_some());
        assert!(doc.remove(id).is_none());
        assert!(doc.is_empty());
        assert!(doc.ids().is_empty());
    }

    #[test]
    fn test_add_same_id_replaces() {
        let mut doc = PageDocument::default();
        let mut p = panel(0.0);
        doc.add(p.clone());
        p.transform_mut().x = 50.0;
        doc.add(p.clone());
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.ids().len(), 1);
        assert_eq!(doc.get(p.id()).map(|e| e.transform().x), Some(50.0));
    }

    #[test]
    fn test_elements_by_z() {
        let mut doc = PageDocument::default();
        let mut a = panel(0.0);
        a.transform_mut().z_index = 1010;
        let mut b = panel(10.0);
        b.transform_mut().z_index = 110;
        let mut c = panel(20.0);
        c.transform_mut().z_index = 110;
        let (ia, ib, ic) = (a.id(), b.id(), c.id());
        doc.add(a);
        doc.add(b);
        doc.add(c);
        let ids: Vec<_> = doc.elements_by_z().iter().map(|e| e.id()).collect();
        assert_eq!(ids, vec![ib, ic, ia]);
    }

    #[test]
    fn test_apply_update() {
        let mut doc = PageDocument::default();
        let p = panel(0.0);
        let id = p.id();
        doc.add(p);
        let t = Transform::new(5.0, 6.0, 70.0, 80.0);
        assert!(doc.apply_update(id, &ElementUpdate::transform(t)));
        assert_eq!(doc.get(id).map(|e| e.transform().width), Some(70.0));
        assert!(!doc.apply_update(Uuid::new_v4(), &ElementUpdate::transform(t)));
    }

    #[test]
    fn test_undo_redo() {
        let mut doc = PageDocument::default();
        doc.push_undo();
        let p = panel(0.0);
        let id = p.id();
        doc.add(p);
        assert!(doc.undo());
        assert!(doc.is_empty());
        assert!(doc.redo());
        assert!(doc.get(id).is_some());
        assert!(!doc.redo());
    }

    #[test]
    fn test_undo_clears_redo() {
        let mut doc = PageDocument::default();
        doc.push_undo();
        doc.add(panel(0.0));
        assert!(doc.undo());
        doc.push_undo();
        doc.add(panel(10.0));
        assert!(!doc.can_redo());
    }

    #[test]
    fn test_undo_history_bounded() {
        let mut doc = PageDocument::default();
        for i in 0..(MAX_UNDO_HISTORY + 10) {
            doc.push_undo();
            doc.add(panel(i as f64));
        }
        assert_eq!(doc.undo_depth(), MAX_UNDO_HISTORY);
        while doc.undo() {}
        // The oldest states fell off the history.
        assert_eq!(doc.len(), 10);
    }

    #[test]
    fn test_json_roundtrip() {
        let mut doc = PageDocument::default();
        doc.name = "Chapter 1, page 3".to_string();
        doc.add(panel(0.0));
        doc.add(Element::Dialogue(
            Bubble::new(Rect::new(10.0, 10.0, 160.0, 90.0), BubbleKind::Shout).with_text("WAIT!"),
        ));
        let json = doc.to_json().unwrap();
        let back = PageDocument::from_json(&json).unwrap();
        assert_eq!(back.name, doc.name);
        assert_eq!(back.ids(), doc.ids());
        for el in doc.elements() {
            assert_eq!(back.get(el.id()), Some(el));
        }
        assert!(!back.can_undo());
    }

    #[test]
    fn test_from_json_repairs_order() {
        let mut doc = PageDocument::default();
        let p = panel(0.0);
        let id = p.id();
        doc.add(p);
        let mut value: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        value["order"] = serde_json::json!([Uuid::new_v4()]);
        let back = PageDocument::from_json(&value.to_string()).unwrap();
        assert_eq!(back.ids(), &[id]);
    }
}
