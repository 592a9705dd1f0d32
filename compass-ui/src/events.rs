//! Document-level click delivery.
//!
//! Hosts forward clicks into an [`EventBus`]; components subscribe by
//! installing named delegates. A delegate name can only be installed once per
//! bus, which is how global wiring stays idempotent.

use std::collections::BTreeMap;

/// Attributes of one element on a click path.
pub type Attributes = BTreeMap<String, String>;

/// Identifies an installed listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// A click, described by the attributes of the clicked element and its
/// ancestors (innermost first).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Click {
    path: Vec<Attributes>,
}

impl Click {
    pub fn new(path: Vec<Attributes>) -> Self {
        Self { path }
    }

    /// A click on a single element with the given attributes.
    pub fn on<K, V>(attrs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            path: vec![attrs.into_iter().map(|(k, v)| (k.into(), v.into())).collect()],
        }
    }

    /// Add an ancestor element to the path.
    pub fn within<K, V>(mut self, attrs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.path
            .push(attrs.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    /// The innermost element on the path carrying `attr`.
    pub fn closest(&self, attr: &str) -> Option<&Attributes> {
        self.path.iter().find(|attrs| attrs.contains_key(attr))
    }
}

/// Listener invoked for every click.
pub type ClickListener = Box<dyn FnMut(&Click)>;

/// Something that delivers clicks to delegates.
pub trait ClickSource {
    /// Install a named delegate. Returns `None` when `name` is already
    /// installed on this source.
    fn delegate(&mut self, name: &'static str, listener: ClickListener) -> Option<ListenerId>;

    /// Remove a listener. Returns false if it was not installed.
    fn remove(&mut self, id: ListenerId) -> bool;
}

/// In-process click source.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    listeners: Vec<(ListenerId, &'static str, ClickListener)>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver a click to every listener in installation order.
    pub fn click(&mut self, click: &Click) {
        for (_, _, listener) in self.listeners.iter_mut() {
            listener(click);
        }
    }

    pub fn is_installed(&self, name: &str) -> bool {
        self.listeners.iter().any(|(_, n, _)| *n == name)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl ClickSource for EventBus {
    fn delegate(&mut self, name: &'static str, listener: ClickListener) -> Option<ListenerId> {
        if self.is_installed(name) {
            return None;
        }
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, name, listener));
        Some(id)
    }

    fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _, _)| *lid != id);
        self.listeners.len() != before
    }
}
