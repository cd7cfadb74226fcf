mod common;

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

use common::{setup, ScriptRuntime};
use hybrid_engine::{
    arg, BridgedObject, HostError, HostObject, HybridObject, MemberTable, RuntimeContext,
    RuntimeRegistry, Value,
};

struct Foo {
    baz: AtomicU32,
}

impl Foo {
    fn new() -> Self {
        Self {
            baz: AtomicU32::new(42),
        }
    }
}

impl HybridObject for Foo {
    fn name(&self) -> &str {
        "Foo"
    }

    fn register_members(&self, members: &mut MemberTable<Self>) {
        members
            .method("bar", 1, |_this, _rt, args| {
                let x: f64 = arg(args, 0)?;
                Ok(Value::Number(x * 2.0))
            })
            .getter("baz", |this, _rt| {
                Ok(Value::Number(this.baz.load(Ordering::SeqCst) as f64))
            });
    }
}

// ============================================================================
// Member Resolution
// ============================================================================

#[test]
fn test_foo_scenario() {
    let (_registry, rt) = setup();
    let foo = BridgedObject::new(Foo::new());

    let bar = foo.get(&*rt, "bar").unwrap();
    let result = bar.as_function().unwrap().call(&*rt, &[Value::Number(3.0)]).unwrap();
    assert_eq!(result, Value::Number(6.0));

    assert_eq!(foo.get(&*rt, "baz").unwrap(), Value::Number(42.0));
    foo.baz.store(43, Ordering::SeqCst);
    assert_eq!(foo.get(&*rt, "baz").unwrap(), Value::Number(43.0));

    assert_eq!(foo.property_names(&*rt), vec!["bar", "baz"]);
}

#[test]
fn test_cached_method_is_not_rematerialized() {
    let (_registry, rt) = setup();
    let foo = BridgedObject::new(Foo::new());

    let first = foo.get(&*rt, "bar").unwrap();
    let second = foo.get(&*rt, "bar").unwrap();

    assert_eq!(rt.materialized(), 1);
    assert_eq!(first, second);

    let args = [Value::Number(5.0)];
    let a = first.as_function().unwrap().call(&*rt, &args).unwrap();
    let b = second.as_function().unwrap().call(&*rt, &args).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_each_runtime_gets_its_own_handle() {
    let registry = Arc::new(RuntimeRegistry::new());
    let main = ScriptRuntime::new(&registry);
    let worker = ScriptRuntime::new(&registry);
    let foo = BridgedObject::new(Foo::new());

    let a = foo.get(&*main, "bar").unwrap();
    let b = foo.get(&*worker, "bar").unwrap();

    assert_ne!(a, b);
    assert_eq!(main.materialized(), 1);
    assert_eq!(worker.materialized(), 1);
    assert_eq!(foo.creation_runtime(), Some(main.id()));
}

#[test]
fn test_unknown_name_falls_through() {
    let (_registry, rt) = setup();
    let foo = BridgedObject::new(Foo::new());

    assert!(foo.get_member(&*rt, "qux").unwrap().is_none());
    assert_eq!(foo.get(&*rt, "qux").unwrap(), Value::Undefined);
    foo.set(&*rt, "qux", Value::Number(1.0)).unwrap();
}

#[test]
fn test_to_string() {
    let (_registry, rt) = setup();
    let foo = BridgedObject::new(Foo::new());

    let to_string = foo.get(&*rt, "toString").unwrap();
    let text = to_string.as_function().unwrap().call(&*rt, &[]).unwrap();
    assert_eq!(text, Value::from(r#"Foo { "bar", "baz" }"#));
}

struct Empty;

impl HybridObject for Empty {
    fn name(&self) -> &str {
        "Empty"
    }

    fn register_members(&self, _members: &mut MemberTable<Self>) {}
}

#[test]
fn test_to_string_without_members() {
    let (_registry, rt) = setup();
    let empty = BridgedObject::new(Empty);

    assert!(empty.property_names(&*rt).is_empty());
    assert_eq!(empty.describe(&*rt), "Empty { }");
}

// ============================================================================
// Name Collisions
// ============================================================================

struct Collider {
    writes: AtomicUsize,
}

impl HybridObject for Collider {
    fn name(&self) -> &str {
        "Collider"
    }

    fn register_members(&self, members: &mut MemberTable<Self>) {
        members
            .method("value", 0, |_this, _rt, _args| Ok(Value::from("method")))
            .getter("value", |_this, _rt| Ok(Value::from("getter")))
            .setter("value", |this, _rt, _value| {
                this.writes.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .setter("writeOnly", |this, _rt, _value| {
                this.writes.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
    }
}

#[test]
fn test_getter_wins_over_method() {
    let (_registry, rt) = setup();
    let collider = BridgedObject::new(Collider {
        writes: AtomicUsize::new(0),
    });

    assert_eq!(collider.get(&*rt, "value").unwrap(), Value::from("getter"));
    assert_eq!(rt.materialized(), 0);
    assert_eq!(
        collider.property_names(&*rt),
        vec!["value", "value", "value", "writeOnly"]
    );
}

#[test]
fn test_setters_are_write_only() {
    let (_registry, rt) = setup();
    let collider = BridgedObject::new(Collider {
        writes: AtomicUsize::new(0),
    });

    collider.set(&*rt, "value", Value::Number(1.0)).unwrap();
    collider.set(&*rt, "writeOnly", Value::Number(2.0)).unwrap();
    assert_eq!(collider.writes.load(Ordering::SeqCst), 2);

    assert_eq!(collider.get(&*rt, "writeOnly").unwrap(), Value::Undefined);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_wrong_argument_type() {
    let (_registry, rt) = setup();
    let foo = BridgedObject::new(Foo::new());

    let bar = foo.get(&*rt, "bar").unwrap();
    let err = bar
        .as_function()
        .unwrap()
        .call(&*rt, &[Value::from("three")])
        .unwrap_err();
    assert!(matches!(err, HostError::TypeMismatch { .. }));
}

#[test]
fn test_missing_argument() {
    let (_registry, rt) = setup();
    let foo = BridgedObject::new(Foo::new());

    let bar = foo.get(&*rt, "bar").unwrap();
    let err = bar.as_function().unwrap().call(&*rt, &[]).unwrap_err();
    assert_eq!(err.to_string(), "bar: expected 1 argument(s), got 0");
}

// ============================================================================
// Runtime Liveness
// ============================================================================

#[test]
fn test_owning_runtime_dies() {
    let (_registry, rt) = setup();
    let foo = BridgedObject::new(Foo::new());

    assert!(!foo.is_owning_runtime_alive());
    foo.ensure_registered(&*rt);
    assert!(foo.is_owning_runtime_alive());

    rt.destroy();
    assert!(!foo.is_owning_runtime_alive());
}

#[test]
fn test_dead_runtime_cache_is_discarded() {
    let (_registry, rt) = setup();
    let foo = BridgedObject::new(Foo::new());

    foo.get(&*rt, "bar").unwrap();
    assert_eq!(foo.function_cache().len_for(rt.id()), 1);

    rt.destroy();
    assert_eq!(foo.get(&*rt, "bar").unwrap(), Value::Undefined);
    assert_eq!(foo.function_cache().len_for(rt.id()), 0);
    assert_eq!(rt.materialized(), 1);
}

#[test]
fn test_destroyed_runtime_never_comes_back() {
    let (registry, rt) = setup();
    rt.destroy();

    assert!(!registry.register_runtime(rt.id()));
    assert!(!registry.is_alive(rt.id()));
}
