//! Member tables for bridged objects
//!
//! A bridged type declares its script-visible surface once, in
//! `HybridObject::register_members`, by filling a `MemberTable`. Methods,
//! getters and setters are independent namespaces: the same name may appear
//! once in each.

use std::sync::Arc;

use hybrid_sdk::{HostResult, RuntimeContext, Value};
use indexmap::IndexMap;

/// Method body: receiver, calling runtime, positional arguments
pub type MethodFn<T> = Arc<dyn Fn(&T, &dyn RuntimeContext, &[Value]) -> HostResult<Value> + Send + Sync>;

/// Getter body: receiver, calling runtime
pub type GetterFn<T> = Arc<dyn Fn(&T, &dyn RuntimeContext) -> HostResult<Value> + Send + Sync>;

/// Setter body: receiver, calling runtime, assigned value
pub type SetterFn<T> = Arc<dyn Fn(&T, &dyn RuntimeContext, Value) -> HostResult<()> + Send + Sync>;

/// Category of a registered member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// Callable, materialized as a function object and cached per runtime
    Method,
    /// Read hook, invoked on every access
    Getter,
    /// Write hook, invoked on every assignment
    Setter,
}

/// A registered member. Immutable once registered.
pub enum MemberDescriptor<T> {
    /// Method with its declared arity
    Method {
        /// Declared parameter count
        arity: usize,
        /// Native body
        func: MethodFn<T>,
    },
    /// Property getter
    Getter(GetterFn<T>),
    /// Property setter
    Setter(SetterFn<T>),
}

impl<T> MemberDescriptor<T> {
    /// Which table this descriptor belongs to
    pub fn kind(&self) -> MemberKind {
        match self {
            MemberDescriptor::Method { .. } => MemberKind::Method,
            MemberDescriptor::Getter(_) => MemberKind::Getter,
            MemberDescriptor::Setter(_) => MemberKind::Setter,
        }
    }
}

impl<T> Clone for MemberDescriptor<T> {
    fn clone(&self) -> Self {
        match self {
            MemberDescriptor::Method { arity, func } => MemberDescriptor::Method {
                arity: *arity,
                func: func.clone(),
            },
            MemberDescriptor::Getter(func) => MemberDescriptor::Getter(func.clone()),
            MemberDescriptor::Setter(func) => MemberDescriptor::Setter(func.clone()),
        }
    }
}

impl<T> std::fmt::Debug for MemberDescriptor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MemberDescriptor::Method { arity, .. } => write!(f, "Method(arity={})", arity),
            MemberDescriptor::Getter(_) => write!(f, "Getter"),
            MemberDescriptor::Setter(_) => write!(f, "Setter"),
        }
    }
}

/// Members of one bridged object, in registration order per category.
pub struct MemberTable<T> {
    /// Owning object's display name (for diagnostics)
    owner: String,
    methods: IndexMap<String, MemberDescriptor<T>>,
    getters: IndexMap<String, MemberDescriptor<T>>,
    setters: IndexMap<String, MemberDescriptor<T>>,
}

impl<T> MemberTable<T> {
    /// Create an empty table for the object named `owner`
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            methods: IndexMap::new(),
            getters: IndexMap::new(),
            setters: IndexMap::new(),
        }
    }

    /// Register a method
    pub fn method<F>(&mut self, name: &str, arity: usize, func: F) -> &mut Self
    where
        F: Fn(&T, &dyn RuntimeContext, &[Value]) -> HostResult<Value> + Send + Sync + 'static,
    {
        self.insert(
            name,
            MemberDescriptor::Method {
                arity,
                func: Arc::new(func),
            },
        );
        self
    }

    /// Register a property getter
    pub fn getter<F>(&mut self, name: &str, func: F) -> &mut Self
    where
        F: Fn(&T, &dyn RuntimeContext) -> HostResult<Value> + Send + Sync + 'static,
    {
        self.insert(name, MemberDescriptor::Getter(Arc::new(func)));
        self
    }

    /// Register a property setter
    pub fn setter<F>(&mut self, name: &str, func: F) -> &mut Self
    where
        F: Fn(&T, &dyn RuntimeContext, Value) -> HostResult<()> + Send + Sync + 'static,
    {
        self.insert(name, MemberDescriptor::Setter(Arc::new(func)));
        self
    }

    /// Register a prebuilt descriptor
    pub fn insert(&mut self, name: &str, descriptor: MemberDescriptor<T>) {
        let kind = descriptor.kind();
        let table = match kind {
            MemberKind::Method => &mut self.methods,
            MemberKind::Getter => &mut self.getters,
            MemberKind::Setter => &mut self.setters,
        };
        if table.contains_key(name) {
            debug_assert!(
                false,
                "{:?} `{}` registered twice on {}",
                kind, name, self.owner
            );
            tracing::warn!(
                object = %self.owner,
                member = name,
                ?kind,
                "duplicate member registration ignored"
            );
            return;
        }
        table.insert(name.to_string(), descriptor);
    }

    fn table(&self, kind: MemberKind) -> &IndexMap<String, MemberDescriptor<T>> {
        match kind {
            MemberKind::Method => &self.methods,
            MemberKind::Getter => &self.getters,
            MemberKind::Setter => &self.setters,
        }
    }

    /// Look up `name` in one category
    pub fn lookup(&self, kind: MemberKind, name: &str) -> Option<&MemberDescriptor<T>> {
        self.table(kind).get(name)
    }

    /// Look up a getter body
    pub fn getter_fn(&self, name: &str) -> Option<&GetterFn<T>> {
        match self.getters.get(name) {
            Some(MemberDescriptor::Getter(func)) => Some(func),
            _ => None,
        }
    }

    /// Look up a setter body
    pub fn setter_fn(&self, name: &str) -> Option<&SetterFn<T>> {
        match self.setters.get(name) {
            Some(MemberDescriptor::Setter(func)) => Some(func),
            _ => None,
        }
    }

    /// Look up a method body and its arity
    pub fn method_fn(&self, name: &str) -> Option<(usize, &MethodFn<T>)> {
        match self.methods.get(name) {
            Some(MemberDescriptor::Method { arity, func }) => Some((*arity, func)),
            _ => None,
        }
    }

    /// All member names: methods, then getters, then setters.
    ///
    /// A name registered in several categories appears once per category.
    pub fn names(&self) -> Vec<String> {
        self.iter().map(|(name, _)| name.to_string()).collect()
    }

    /// Iterate `(name, descriptor)` in enumeration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MemberDescriptor<T>)> {
        self.methods
            .iter()
            .chain(self.getters.iter())
            .chain(self.setters.iter())
            .map(|(name, descriptor)| (name.as_str(), descriptor))
    }

    /// Total number of registered members across categories
    pub fn len(&self) -> usize {
        self.methods.len() + self.getters.len() + self.setters.len()
    }

    /// Check if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Re-target every member at a containing type.
    ///
    /// Lets a wrapper embed a reusable component (like a pointer holder) and
    /// expose the component's members as its own.
    pub fn project_into<W>(self, target: &mut MemberTable<W>, project: fn(&W) -> &T)
    where
        T: 'static,
        W: 'static,
    {
        for (name, descriptor) in self.into_entries() {
            let projected = match descriptor {
                MemberDescriptor::Method { arity, func } => MemberDescriptor::Method {
                    arity,
                    func: Arc::new(move |w: &W, rt: &dyn RuntimeContext, args: &[Value]| {
                        func(project(w), rt, args)
                    }) as MethodFn<W>,
                },
                MemberDescriptor::Getter(func) => MemberDescriptor::Getter(Arc::new(
                    move |w: &W, rt: &dyn RuntimeContext| func(project(w), rt),
                )
                    as GetterFn<W>),
                MemberDescriptor::Setter(func) => MemberDescriptor::Setter(Arc::new(
                    move |w: &W, rt: &dyn RuntimeContext, value: Value| func(project(w), rt, value),
                )
                    as SetterFn<W>),
            };
            target.insert(&name, projected);
        }
    }

    fn into_entries(self) -> impl Iterator<Item = (String, MemberDescriptor<T>)> {
        self.methods
            .into_iter()
            .chain(self.getters)
            .chain(self.setters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        value: i32,
    }

    fn table() -> MemberTable<Counter> {
        let mut members = MemberTable::new("Counter");
        members
            .method("add", 1, |this: &Counter, _rt, args| {
                let n: f64 = hybrid_sdk::arg(args, 0)?;
                Ok(Value::Number(this.value as f64 + n))
            })
            .getter("value", |this: &Counter, _rt| Ok(Value::Number(this.value as f64)))
            .setter("value", |_this: &Counter, _rt, _value| Ok(()));
        members
    }

    #[test]
    fn test_enumeration_order() {
        let mut members = table();
        members.method("reset", 0, |_this, _rt, _args| Ok(Value::Undefined));

        assert_eq!(members.names(), vec!["add", "reset", "value", "value"]);
        assert_eq!(members.len(), 4);
    }

    #[test]
    fn test_lookup_by_kind() {
        let members = table();

        assert_eq!(members.lookup(MemberKind::Method, "add").map(|d| d.kind()), Some(MemberKind::Method));
        assert!(members.lookup(MemberKind::Getter, "add").is_none());
        assert!(members.getter_fn("value").is_some());
        assert!(members.setter_fn("value").is_some());
        assert_eq!(members.method_fn("add").map(|(arity, _)| arity), Some(1));
        assert!(members.method_fn("value").is_none());
    }

    #[test]
    fn test_empty_table() {
        let members: MemberTable<Counter> = MemberTable::new("Empty");
        assert!(members.is_empty());
        assert!(members.names().is_empty());
    }

    #[test]
    #[cfg_attr(debug_assertions, should_panic(expected = "registered twice"))]
    fn test_duplicate_registration_is_a_contract_violation() {
        let mut members = table();
        members.getter("value", |_this, _rt| Ok(Value::Null));
        // Release builds keep the first registration
        assert_eq!(members.len(), 3);
    }

    struct Wrapper {
        counter: Counter,
    }

    #[test]
    fn test_project_into_wrapper() {
        let mut outer: MemberTable<Wrapper> = MemberTable::new("Wrapper");
        table().project_into(&mut outer, |w: &Wrapper| &w.counter);

        assert_eq!(outer.names(), vec!["add", "value", "value"]);

        let wrapper = Wrapper {
            counter: Counter { value: 40 },
        };
        let getter = outer.getter_fn("value").unwrap();
        let registry = std::sync::Arc::new(hybrid_sdk::RuntimeRegistry::new());
        let rt = crate::testing::TestRuntime::new(&registry);
        assert_eq!(getter(&wrapper, &*rt).unwrap(), Value::Number(40.0));
    }
}
