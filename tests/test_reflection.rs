extern crate klass;

use klass::runtime::ds::identity::live_identity_count;
use klass::{
    call, class_of, define, identity_display, is_class, is_instance, is_instance_of,
    is_subclass_of, name_of, new_function, new_table, of, set_identity_display, to_display,
    ModelConfig,
};
use klass::{ClassHandle, KErrorType, KValue};

fn chain() -> (ClassHandle, ClassHandle, ClassHandle) {
    let a = define("A", Some(new_table(vec![("x", KValue::from(1))]))).unwrap();
    let b = define("B", Some(KValue::Class(a.clone()))).unwrap();
    let c = define("C", Some(KValue::Class(b.clone()))).unwrap();
    (a, b, c)
}

fn class_value(class: &ClassHandle) -> KValue {
    KValue::Class(class.clone())
}

// ── Predicates ───────────────────────────────────────────────────────

#[test]
fn test_is_class_and_is_instance() {
    let (a, _, _) = chain();
    let instance = call(&class_value(&a), vec![]).unwrap();
    assert!(is_class(&class_value(&a)));
    assert!(!is_class(&instance));
    assert!(is_instance(&instance));
    assert!(!is_instance(&class_value(&a)));
    assert!(!is_class(&KValue::from(1)));
    assert!(!is_instance(&new_table(vec![("x", KValue::from(1))])));
}

#[test]
fn test_is_subclass_of() {
    let (a, b, c) = chain();
    let other = define("Other", None).unwrap();
    assert!(is_subclass_of(&class_value(&c), &class_value(&a)));
    assert!(is_subclass_of(&class_value(&c), &class_value(&b)));
    assert!(is_subclass_of(&class_value(&b), &class_value(&a)));
    assert!(is_subclass_of(&class_value(&a), &class_value(&a)));
    assert!(!is_subclass_of(&class_value(&a), &class_value(&c)));
    assert!(!is_subclass_of(&class_value(&c), &class_value(&other)));
}

#[test]
fn test_is_subclass_of_non_classes() {
    let (a, _, _) = chain();
    let instance = call(&class_value(&a), vec![]).unwrap();
    assert!(!is_subclass_of(&instance, &class_value(&a)));
    assert!(!is_subclass_of(&class_value(&a), &instance));
    assert!(!is_subclass_of(&KValue::Nil, &KValue::Nil));
}

#[test]
fn test_class_of_and_is_instance_of_agree() {
    let (a, b, c) = chain();
    let other = define("Other", None).unwrap();
    let instance = call(&class_value(&b), vec![]).unwrap();

    assert_eq!(class_of(&instance), Some(b.clone()));
    assert_eq!(of(&instance), Some(b.clone()));
    for class in &[&a, &b, &c, &other] {
        let expected = match class_of(&instance) {
            Some(k) => is_subclass_of(&class_value(&k), &class_value(class)),
            None => false,
        };
        assert_eq!(is_instance_of(&instance, class), expected, "{}", class);
    }
    assert!(is_instance_of(&instance, &a));
    assert!(!is_instance_of(&instance, &c));
}

#[test]
fn test_class_of_non_instances() {
    let (a, _, _) = chain();
    assert_eq!(class_of(&class_value(&a)), None);
    assert_eq!(class_of(&KValue::from("A")), None);
    assert!(!is_instance_of(&KValue::Nil, &a));
}

#[test]
fn test_name_of() {
    let (a, b, _) = chain();
    let instance = call(&class_value(&b), vec![]).unwrap();
    let anon = define(KValue::Nil, None).unwrap();
    assert_eq!(name_of(&class_value(&a)), Some("A".to_string()));
    assert_eq!(name_of(&class_value(&b)), Some("B".to_string()));
    assert_eq!(name_of(&instance), Some("B".to_string()));
    assert_eq!(name_of(&class_value(&anon)), Some("Anonymous".to_string()));
    assert_eq!(name_of(&KValue::from(1)), None);
}

fn instance_of_unnamed_greeter() -> KValue {
    let greeter = define(
        KValue::Nil,
        Some(new_table(vec![(
            "greet",
            new_function("greet", |this, _| Ok(KValue::from(format!("hello from {}", this)))),
        )])),
    )
    .unwrap();
    call(&class_value(&greeter), vec![]).unwrap()
}

#[test]
fn test_instance_keeps_dropped_class_alive() {
    let instance = instance_of_unnamed_greeter();
    let handle = instance.as_instance().unwrap();
    assert_eq!(
        handle.send("greet", vec![]).unwrap(),
        KValue::from("hello from Instance<Anonymous>")
    );
    assert!(matches!(handle.get("greet"), KValue::Function(_)));
    let class = class_of(&instance).unwrap();
    assert_eq!(class.name(), "Anonymous");
    assert_eq!(name_of(&instance), Some("Anonymous".to_string()));
}

#[test]
fn test_instance_of_dropped_subclass_is_instance_of_base() {
    let base = define("Base", None).unwrap();
    let instance = {
        let sub = define(KValue::Nil, Some(class_value(&base))).unwrap();
        call(&class_value(&sub), vec![]).unwrap()
    };
    assert!(is_instance_of(&instance, &base));
    assert_eq!(class_of(&instance).unwrap().parent(), Some(base.clone()));
    assert_eq!(instance.as_instance().unwrap().get("super"), class_value(&base));
}

// ── Virtual super ────────────────────────────────────────────────────

#[test]
fn test_super_reads() {
    let (a, b, c) = chain();
    assert_eq!(a.get("super"), KValue::Nil);
    assert_eq!(b.get("super"), class_value(&a));
    assert_eq!(c.get("super"), class_value(&b));

    let on_c = call(&class_value(&c), vec![]).unwrap();
    let on_a = call(&class_value(&a), vec![]).unwrap();
    assert_eq!(on_c.as_instance().unwrap().get("super"), class_value(&b));
    assert_eq!(on_a.as_instance().unwrap().get("super"), KValue::Nil);
}

#[test]
fn test_super_writes_rejected() {
    let (a, b, _) = chain();
    let other = define("Other", None).unwrap();

    let err = b.set("super", class_value(&other)).unwrap_err();
    assert!(matches!(err, KErrorType::ImmutableRelation(_)));
    assert_eq!(b.get("super"), class_value(&a));
    assert!(!b.has_own("super"));

    let err = a.set("super", class_value(&other)).unwrap_err();
    assert!(matches!(err, KErrorType::ImmutableRelation(_)));
    assert_eq!(a.get("super"), KValue::Nil);

    let instance = call(&class_value(&b), vec![]).unwrap();
    let instance = instance.as_instance().unwrap();
    let err = instance.set("super", KValue::from(1)).unwrap_err();
    assert!(matches!(err, KErrorType::ImmutableRelation(_)));
    assert_eq!(instance.field_count(), 0);
    assert_eq!(instance.get("super"), class_value(&a));
}

#[test]
fn test_constructor_writing_super_fails_construction() {
    let bad = define(
        "Bad",
        Some(new_table(vec![(
            "new",
            new_function("Bad.new", |this, _| {
                this.as_instance().unwrap().set("super", KValue::from(1))?;
                Ok(KValue::Nil)
            }),
        )])),
    )
    .unwrap();
    let err = call(&class_value(&bad), vec![]).unwrap_err();
    assert!(matches!(err, KErrorType::ImmutableRelation(_)));
}

// ── Instance fields ──────────────────────────────────────────────────

#[test]
fn test_instance_reads_fall_back_to_class_chain() {
    let (a, _, c) = chain();
    let instance = call(&class_value(&c), vec![]).unwrap();
    let instance = instance.as_instance().unwrap();
    assert_eq!(instance.get("x"), KValue::from(1));

    instance.set("x", KValue::from(2)).unwrap();
    assert_eq!(instance.get("x"), KValue::from(2));
    assert_eq!(a.get("x"), KValue::from(1));

    instance.set("x", KValue::Nil).unwrap();
    assert_eq!(instance.get("x"), KValue::from(1));
    assert_eq!(instance.get("missing"), KValue::Nil);
}

// ── Identity display ─────────────────────────────────────────────────

#[test]
fn test_identity_display_off_by_default() {
    let (a, _, _) = chain();
    assert!(!identity_display());
    let instance = call(&class_value(&a), vec![]).unwrap();
    assert_eq!(to_display(&instance), "Instance<A>");
    assert_eq!(instance.as_instance().unwrap().identity(), None);
}

#[test]
fn test_identity_display_numbers_per_class() {
    set_identity_display(true);
    let (a, b, _) = chain();
    let first = call(&class_value(&a), vec![]).unwrap();
    let second = call(&class_value(&a), vec![]).unwrap();
    let other = call(&class_value(&b), vec![]).unwrap();
    assert_eq!(to_display(&first), "Instance<A#1>");
    assert_eq!(to_display(&second), "Instance<A#2>");
    assert_eq!(to_display(&other), "Instance<B#1>");
    assert_eq!(a.last_identity_sequence(), 2);

    set_identity_display(false);
    assert_eq!(to_display(&first), "Instance<A>");
    set_identity_display(true);
    assert_eq!(to_display(&first), "Instance<A#1>");
}

#[test]
fn test_instances_built_while_display_off_get_no_number() {
    let (a, _, _) = chain();
    let early = call(&class_value(&a), vec![]).unwrap();
    set_identity_display(true);
    let late = call(&class_value(&a), vec![]).unwrap();
    assert_eq!(to_display(&early), "Instance<A>");
    assert_eq!(to_display(&late), "Instance<A#1>");
}

#[test]
fn test_identity_records_do_not_keep_instances_alive() {
    set_identity_display(true);
    let (a, _, _) = chain();
    let kept = call(&class_value(&a), vec![]).unwrap();
    {
        let _dropped = call(&class_value(&a), vec![]).unwrap();
        assert_eq!(live_identity_count(), 2);
    }
    assert_eq!(live_identity_count(), 1);
    assert_eq!(to_display(&kept), "Instance<A#1>");
}

#[test]
fn test_config_apply_enables_identity_display() {
    let config = ModelConfig::parse("[model]\nidentity_display = true\n").unwrap();
    config.apply();
    let (a, _, _) = chain();
    let instance = call(&class_value(&a), vec![]).unwrap();
    assert_eq!(to_display(&instance), "Instance<A#1>");
}
