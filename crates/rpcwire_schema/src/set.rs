//! The closed set of interface documents supplied by the resolver.

use rpcwire_types::Interface;
use std::collections::BTreeMap;

/// Interface documents keyed by name.
///
/// The resolver that fetches and links interface files fills this in;
/// validation and registry loading only read from it.
#[derive(Debug, Clone, Default)]
pub struct InterfaceSet {
    interfaces: BTreeMap<String, Interface>,
}

impl InterfaceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document, returning the one it replaced (if any).
    pub fn insert(&mut self, interface: Interface) -> Option<Interface> {
        self.interfaces.insert(interface.name.clone(), interface)
    }

    pub fn with(mut self, interface: Interface) -> Self {
        self.insert(interface);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Interface> {
        self.interfaces.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.interfaces.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.interfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Interface> {
        self.interfaces.values()
    }
}

impl FromIterator<Interface> for InterfaceSet {
    fn from_iter<I: IntoIterator<Item = Interface>>(iter: I) -> Self {
        let mut set = InterfaceSet::new();
        for interface in iter {
            set.insert(interface);
        }
        set
    }
}
