use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use crate::object::Object;

/// Name bindings. Function calls get an enclosed environment whose `outer`
/// is the environment the function was defined in.
#[derive(Clone, Default)]
pub struct Environment {
    store: BTreeMap<String, Object>,
    outer: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    pub fn new() -> Self {
        Environment { store: BTreeMap::new(), outer: None }
    }

    pub fn enclosed(outer: Rc<RefCell<Environment>>) -> Environment {
        Environment { store: BTreeMap::new(), outer: Some(outer) }
    }

    pub fn get(&self, key: &str) -> Option<Object> {
        match self.store.get(key) {
            Some(obj) => Some(obj.clone()),
            None => match &self.outer {
                Some(env) => env.borrow().get(key),
                None      => None,
            },
        }
    }

    pub fn set(&mut self, key: String, value: Object) {
        self.store.insert(key, value);
    }

    pub fn outer(&self) -> Option<&Rc<RefCell<Environment>>> {
        self.outer.as_ref()
    }

    pub fn values(&self) -> impl Iterator<Item = &Object> {
        self.store.values()
    }

    /// Removes every binding. Closures bound here hold the environment
    /// themselves, so this is how such cycles get broken.
    pub fn take_bindings(&mut self) -> BTreeMap<String, Object> {
        std::mem::take(&mut self.store)
    }
}
