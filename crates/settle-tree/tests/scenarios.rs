use std::sync::Arc;

use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use settle_schema::{TypeCheckResult, Value};
use settle_test_utils::{decimal_value, init_tracing, leaf, sample_tree, stepped};
use settle_tree::{ConfigBranch, ConfigNode, NodePath, TreeError};

#[test]
fn stepped_decimal_leaf_end_to_end() {
    init_tracing();
    let level = leaf("level", stepped(0, 100, 10), Some(decimal_value(50)));

    assert!(level.set_value(decimal_value(47)));
    let stored = level.value().unwrap();
    assert!(stored == decimal_value(40) || stored == decimal_value(50));
    assert_eq!(level.test(&stored), TypeCheckResult::Accepted);

    assert!(!level.set_value(decimal_value(200)));
    assert_eq!(level.value(), Some(stored));
}

#[test]
fn reattached_branch_moves_between_roots() {
    init_tracing();
    let tree = sample_tree();
    let root2 = ConfigBranch::new("root2");
    let mode_path: NodePath = "child.mode".parse().unwrap();

    assert!(tree.root.lookup_leaf(&mode_path).unwrap().ptr_eq(&tree.mode));

    tree.child.detach();
    assert!(tree.root.lookup(&mode_path).is_none());
    assert!(!tree.root.children().contains_name("child"));
    assert!(tree.child.parent().is_none());

    root2.children().add(tree.child.clone().into(), false).unwrap();
    assert!(tree.root.lookup(&mode_path).is_none());
    assert!(root2.lookup_leaf(&mode_path).unwrap().ptr_eq(&tree.mode));
    assert!(tree.child.parent().unwrap().ptr_eq(&root2));
    assert_eq!(tree.mode.path().to_string(), "root2.child.mode");

    // the untouched leaf stays where it was
    assert!(tree.name.parent().unwrap().ptr_eq(&tree.root));
}

#[test]
fn attached_branch_cannot_be_added_elsewhere() {
    let tree = sample_tree();
    let other = ConfigBranch::new("other");

    let err = other.children().add(tree.child.clone().into(), false).unwrap_err();
    assert_eq!(
        err,
        TreeError::AlreadyAttached {
            name: "child".into(),
            parent: "root".into()
        }
    );
    assert!(other.children().is_empty());
}

#[test]
fn duplicate_child_leaves_branch_unchanged() {
    let tree = sample_tree();
    let before = tree.root.children().names();
    let impostor: ConfigNode = leaf("name", settle_test_utils::non_empty_string(), None).into();

    assert!(matches!(
        tree.root.children().add(impostor.clone(), false),
        Err(TreeError::DuplicateChild { .. })
    ));
    assert_eq!(tree.root.children().names(), before);
    assert!(tree.root.children().get("name").unwrap().as_leaf().unwrap().ptr_eq(&tree.name));
    assert!(impostor.parent().is_none());
}

#[test]
fn listeners_see_same_pair_in_order() {
    let tree = sample_tree();
    let calls = Arc::new(Mutex::new(Vec::new()));

    for tag in ["L1", "L2"] {
        let calls = Arc::clone(&calls);
        tree.mode.add_change_listener(move |old, new| {
            calls.lock().push((tag, old.cloned(), new.cloned()));
        });
    }

    assert!(tree.mode.set_value(Value::from("b")));
    assert_eq!(
        *calls.lock(),
        vec![
            ("L1", Some(Value::from("A")), Some(Value::from("B"))),
            ("L2", Some(Value::from("A")), Some(Value::from("B"))),
        ]
    );
}

#[test]
fn empty_name_write_is_rejected() {
    let tree = sample_tree();
    assert!(!tree.name.set_value(Value::from("")));
    assert_eq!(tree.name.value(), Some(Value::from("settle")));
}
