//! Owned XML element tree for KML documents.
//!
//! The tree owns its nodes exclusively: moving an element between parents is
//! always an explicit detach followed by an append, and cloning a subtree
//! produces an independently mutable deep copy.

/// A child of an [`Element`]: either a nested element or a run of text.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An XML element: tag name (prefix preserved as written), attributes in
/// document order, and an ordered list of children.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Tag name without any namespace prefix (`kml:Folder` -> `Folder`).
    pub fn local_name(&self) -> &str {
        self.name
            .rsplit_once(':')
            .map(|(_, local)| local)
            .unwrap_or(&self.name)
    }

    pub fn append_child(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    /// Concatenated text content of this element's direct text children.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for node in &self.children {
            if let Node::Text(t) = node {
                out.push_str(t);
            }
        }
        out
    }

    /// Replace this element's content with a single text node.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children.clear();
        self.children.push(Node::Text(text.into()));
    }

    /// First *direct* child element with the given local name.
    pub fn child(&self, local: &str) -> Option<&Element> {
        self.children.iter().find_map(|node| match node {
            Node::Element(el) if el.local_name() == local => Some(el),
            _ => None,
        })
    }

    pub fn child_mut(&mut self, local: &str) -> Option<&mut Element> {
        self.children.iter_mut().find_map(|node| match node {
            Node::Element(el) if el.local_name() == local => Some(el),
            _ => None,
        })
    }

    /// First descendant element with the given local name, depth-first in
    /// document order. Does not match `self`.
    pub fn find(&self, local: &str) -> Option<&Element> {
        for node in &self.children {
            if let Node::Element(el) = node {
                if el.local_name() == local {
                    return Some(el);
                }
                if let Some(found) = el.find(local) {
                    return Some(found);
                }
            }
        }
        None
    }

    pub fn find_mut(&mut self, local: &str) -> Option<&mut Element> {
        for node in &mut self.children {
            if let Node::Element(el) = node {
                if el.local_name() == local {
                    return Some(el);
                }
                if let Some(found) = el.find_mut(local) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// All descendant elements with the given local name, in document order.
    pub fn find_all(&self, local: &str) -> Vec<&Element> {
        let mut out = Vec::new();
        self.collect_all(local, &mut out);
        out
    }

    fn collect_all<'a>(&'a self, local: &str, out: &mut Vec<&'a Element>) {
        for node in &self.children {
            if let Node::Element(el) = node {
                if el.local_name() == local {
                    out.push(el);
                }
                el.collect_all(local, out);
            }
        }
    }

    /// Detach every descendant element with the given local name, returning
    /// the detached subtrees in document order. Matching elements are not
    /// searched for nested matches; they leave the tree whole.
    pub fn take_all(&mut self, local: &str) -> Vec<Element> {
        let mut taken = Vec::new();
        self.take_all_into(local, &mut taken);
        taken
    }

    fn take_all_into(&mut self, local: &str, taken: &mut Vec<Element>) {
        let children = std::mem::take(&mut self.children);
        for node in children {
            match node {
                Node::Element(el) if el.local_name() == local => taken.push(el),
                Node::Element(mut el) => {
                    el.take_all_into(local, taken);
                    self.children.push(Node::Element(el));
                }
                node => self.children.push(node),
            }
        }
    }

    /// Text of the first descendant element with the given local name.
    pub fn find_text(&self, local: &str) -> Option<String> {
        self.find(local).map(Element::text)
    }

    /// Set the text of the direct child with the given name, creating the
    /// child when absent. The created child uses the unprefixed name.
    pub fn set_child_text(&mut self, local: &str, text: impl Into<String>) {
        if let Some(child) = self.child_mut(local) {
            child.set_text(text);
        } else {
            let mut child = Element::new(local);
            child.set_text(text);
            self.append_child(child);
        }
    }
}
