//! Interface registry - the cross-interface name table.
//!
//! The registry is populated before compilation and only read during it.
//! It answers three kinds of question for the compiler:
//!
//! - is a name an interface, a callback, or a dictionary?
//! - does interface `A` inherit from `B`?
//! - what does interface `A` declare (for `[PutForwards]` lookups)?

use idlbind_core::{Attribute, Interface, RegistrationError};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::inheritance::InheritanceGraph;

#[derive(Debug, Clone, Default)]
pub struct InterfaceRegistry {
    interfaces: FxHashMap<String, Interface>,
    callbacks: FxHashSet<String>,
    dictionaries: FxHashSet<String>,
    inheritance: InheritanceGraph,
}

impl InterfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an interface definition. Callback interfaces are also
    /// recorded as callback types.
    pub fn register_interface(&mut self, interface: Interface) -> Result<(), RegistrationError> {
        if self.interfaces.contains_key(&interface.name) {
            return Err(RegistrationError::DuplicateInterface {
                name: interface.name,
            });
        }
        if self.dictionaries.contains(&interface.name) {
            return Err(RegistrationError::NameConflict {
                name: interface.name,
                existing: "dictionary",
            });
        }
        if interface.is_callback {
            self.callbacks.insert(interface.name.clone());
        }
        self.inheritance
            .add(&interface.name, interface.parent.as_deref());
        self.interfaces.insert(interface.name.clone(), interface);
        Ok(())
    }

    /// Register a callback function type by name.
    pub fn register_callback(&mut self, name: impl Into<String>) -> Result<(), RegistrationError> {
        let name = name.into();
        if self.dictionaries.contains(&name) {
            return Err(RegistrationError::NameConflict {
                name,
                existing: "dictionary",
            });
        }
        if let Some(existing) = self.interfaces.get(&name)
            && !existing.is_callback
        {
            return Err(RegistrationError::NameConflict {
                name,
                existing: "interface",
            });
        }
        self.callbacks.insert(name);
        Ok(())
    }

    /// Register a dictionary type by name.
    pub fn register_dictionary(&mut self, name: impl Into<String>) -> Result<(), RegistrationError> {
        let name = name.into();
        if self.interfaces.contains_key(&name) {
            return Err(RegistrationError::NameConflict {
                name,
                existing: "interface",
            });
        }
        if self.callbacks.contains(&name) {
            return Err(RegistrationError::NameConflict {
                name,
                existing: "callback",
            });
        }
        self.dictionaries.insert(name);
        Ok(())
    }

    pub fn with_interface(mut self, interface: Interface) -> Result<Self, RegistrationError> {
        self.register_interface(interface)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&Interface> {
        self.interfaces.get(name)
    }

    pub fn is_interface(&self, name: &str) -> bool {
        self.interfaces.contains_key(name)
    }

    pub fn is_callback(&self, name: &str) -> bool {
        self.callbacks.contains(name)
    }

    pub fn is_dictionary(&self, name: &str) -> bool {
        self.dictionaries.contains(name)
    }

    /// `name` is `ancestor` or derives from it.
    pub fn inherits_interface(&self, name: &str, ancestor: &str) -> bool {
        self.inheritance.inherits(name, ancestor)
    }

    pub fn ancestors(&self, name: &str) -> Vec<&str> {
        self.inheritance.ancestors(name)
    }

    /// Attribute `attribute` declared directly on interface `interface`.
    pub fn find_attribute(&self, interface: &str, attribute: &str) -> Option<&Attribute> {
        self.get(interface)?.attribute(attribute)
    }

    /// Registered interfaces sorted by name.
    pub fn interfaces(&self) -> Vec<&Interface> {
        let mut all: Vec<&Interface> = self.interfaces.values().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    pub fn len(&self) -> usize {
        self.interfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }
}
