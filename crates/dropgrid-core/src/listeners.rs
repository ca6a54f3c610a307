//! Bookkeeping for event listeners attached during a drag session.

use serde::{Deserialize, Serialize};

/// An event subscription a drag session needs while it is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListenerKind {
    /// Pointer moves over the drag surface.
    PointerMove,
    /// Pointer released over the drag surface.
    PointerUp,
    /// Pointer enters the drag surface.
    PointerOver,
    /// Pointer exits the drag surface.
    PointerOut,
    PointerLeave,
    /// Scroll on the nearest scrollable ancestor.
    Scroll,
    /// Pointer released anywhere in the document.
    DocumentPointerUp,
    /// Pointer released anywhere in the window.
    WindowPointerUp,
}

impl ListenerKind {
    /// Everything a session attaches when it is armed.
    pub const SESSION: [ListenerKind; 8] = [
        ListenerKind::PointerMove,
        ListenerKind::PointerUp,
        ListenerKind::Scroll,
        ListenerKind::PointerOver,
        ListenerKind::PointerOut,
        ListenerKind::PointerLeave,
        ListenerKind::DocumentPointerUp,
        ListenerKind::WindowPointerUp,
    ];
}

/// Tracks which listeners are currently attached.
#[derive(Debug, Clone, Default)]
pub struct ListenerRegistry {
    attached: Vec<ListenerKind>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a listener. Returns false if it was already attached.
    pub fn attach(&mut self, kind: ListenerKind) -> bool {
        if self.is_attached(kind) {
            log::warn!("Listener {:?} already attached", kind);
            return false;
        }
        self.attached.push(kind);
        true
    }

    /// Detach a listener. Detaching one that is not attached is a no-op.
    pub fn detach(&mut self, kind: ListenerKind) -> bool {
        match self.attached.iter().position(|&k| k == kind) {
            Some(index) => {
                self.attached.remove(index);
                true
            }
            None => {
                log::debug!("Listener {:?} already removed", kind);
                false
            }
        }
    }

    /// Detach everything. Returns what was attached.
    pub fn detach_all(&mut self) -> Vec<ListenerKind> {
        std::mem::take(&mut self.attached)
    }

    pub fn is_attached(&self, kind: ListenerKind) -> bool {
        self.attached.contains(&kind)
    }

    pub fn attached(&self) -> &[ListenerKind] {
        &self.attached
    }

    pub fn is_empty(&self) -> bool {
        self.attached.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_and_detach() {
        let mut registry = ListenerRegistry::new();
        for kind in ListenerKind::SESSION {
            assert!(registry.attach(kind));
        }
        assert!(!registry.attach(ListenerKind::Scroll));
        assert_eq!(registry.attached().len(), 8);
        assert!(registry.is_attached(ListenerKind::WindowPointerUp));

        for kind in ListenerKind::SESSION {
            assert!(registry.detach(kind));
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_double_detach_is_tolerated() {
        let mut registry = ListenerRegistry::new();
        registry.attach(ListenerKind::PointerMove);
        assert!(registry.detach(ListenerKind::PointerMove));
        assert!(!registry.is_attached(ListenerKind::PointerMove));
        assert!(!registry.detach(ListenerKind::PointerMove));
        assert!(registry.detach_all().is_empty());
    }
}
