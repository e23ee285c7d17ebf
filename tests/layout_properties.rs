//! Resolver properties over generated containers and expressions.

use proptest::prelude::*;

use spark_layout::{
    resolve, resolve_toplevel, Dim, ElementId, ElementProps, ElementTree, LayoutError, Pos,
    Rect, Size,
};

/// A fixed, initialized root of the given size with one child.
fn single_child(width: i32, height: i32, child: ElementProps) -> (ElementTree, ElementId, ElementId) {
    let mut tree = ElementTree::new();
    let root = tree.create(ElementProps {
        name: Some("root".into()),
        ..Default::default()
    });
    tree.set_frame(root, Rect::new(0, 0, width, height)).unwrap();
    let id = tree.create(child);
    tree.add_child(root, id).unwrap();
    tree.initialize(root).unwrap();
    resolve_toplevel(&mut tree, root, Size::new(width, height)).unwrap();
    (tree, root, id)
}

proptest! {
    #[test]
    fn prop_dimensions_never_negative(
        container in 0i32..200,
        x in -50i32..250,
        a in -100i32..100,
        b in -100i32..100,
        margin in -20i32..250,
    ) {
        let (tree, _, id) = single_child(container, 10, ElementProps {
            x: Some(Pos::at(x)),
            width: Some(Dim::sized(a) - Dim::sized(b)),
            height: Some(Dim::fill(margin)),
            ..Default::default()
        });
        let frame = tree.frame(id).unwrap();
        prop_assert!(frame.width >= 0);
        prop_assert!(frame.height >= 0);
    }

    #[test]
    fn prop_centered_fixed_width(container in 1i32..300, ratio in 0.0f64..=1.0) {
        let width = (f64::from(container) * ratio) as i32;
        let (tree, _, id) = single_child(container, 10, ElementProps {
            x: Some(Pos::center()),
            width: Some(Dim::sized(width)),
            ..Default::default()
        });
        prop_assert_eq!(tree.frame(id).unwrap().x, (container - width) / 2);
    }

    #[test]
    fn prop_fill_reaches_the_edge(container in 0i32..300, x in 0i32..300, margin in 0i32..50) {
        let (tree, _, id) = single_child(container, 10, ElementProps {
            x: Some(Pos::at(x)),
            width: Some(Dim::fill(margin)),
            ..Default::default()
        });
        prop_assert_eq!(tree.frame(id).unwrap().width, (container - x - margin).max(0));
    }

    #[test]
    fn prop_auto_size_floors_the_whole_expression(
        container in 0i32..100,
        cut in 0i32..40,
        text in "[a-z]{1,30}",
    ) {
        let (tree, _, id) = single_child(container, 10, ElementProps {
            text: Some(text.clone()),
            auto_size: Some(true),
            width: Some(Dim::fill(0) - cut),
            ..Default::default()
        });
        let expected = (container - cut).max(text.len() as i32);
        prop_assert_eq!(tree.frame(id).unwrap().width, expected);
    }

    #[test]
    fn prop_anchor_end_with_fill_touches_the_edge(container in 0i32..200, offset in 0i32..50) {
        let (tree, _, id) = single_child(container, 10, ElementProps {
            x: Some(Pos::anchor_end(offset)),
            width: Some(Dim::fill(0)),
            ..Default::default()
        });
        let frame = tree.frame(id).unwrap();
        prop_assert_eq!(frame.x, container - offset);
        prop_assert_eq!(frame.width, offset);
    }

    #[test]
    fn prop_resolve_is_idempotent(container in 1i32..200, percent in 0.0f32..=100.0) {
        let (mut tree, root, id) = single_child(container, 10, ElementProps {
            x: Some(Pos::percent(percent)),
            width: Some(Dim::fill(0)),
            ..Default::default()
        });
        let first = tree.frame(id);
        tree.take_redraw();

        resolve(&mut tree, root).unwrap();
        prop_assert_eq!(tree.frame(id), first);
        prop_assert!(tree.take_redraw().is_empty());
    }

    /// Siblings chained left to right, declared in a shuffled order: every
    /// element still lands right after the one it references.
    #[test]
    fn prop_chain_resolves_in_dependency_order(
        widths in prop::collection::vec(1i32..10, 2..8),
        seed in any::<u64>(),
    ) {
        let mut tree = ElementTree::new();
        let root = tree.create(ElementProps::default());
        tree.set_frame(root, Rect::new(0, 0, 200, 10)).unwrap();

        let mut declared: Vec<usize> = (0..widths.len()).collect();
        // Deterministic shuffle from the seed
        let mut state = seed;
        for i in (1..declared.len()).rev() {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            declared.swap(i, (state >> 33) as usize % (i + 1));
        }

        let mut ids = vec![None; widths.len()];
        for &n in &declared {
            let id = tree.create(ElementProps {
                width: Some(Dim::sized(widths[n])),
                height: Some(Dim::sized(1)),
                ..Default::default()
            });
            tree.add_child(root, id).unwrap();
            ids[n] = Some(id);
        }
        let ids: Vec<ElementId> = ids.into_iter().flatten().collect();
        for pair in ids.windows(2) {
            tree.set_x(pair[1], Pos::right(pair[0])).unwrap();
        }

        tree.initialize(root).unwrap();
        resolve_toplevel(&mut tree, root, Size::new(200, 10)).unwrap();

        let mut expected = 0;
        for (n, id) in ids.iter().enumerate() {
            let frame = tree.frame(*id).unwrap();
            prop_assert_eq!(frame.x, expected);
            expected += widths[n];
        }
    }
}

#[test]
fn test_fill_from_offset() {
    let (tree, _, id) = single_child(20, 10, ElementProps {
        x: Some(Pos::at(5)),
        width: Some(Dim::fill(0)),
        ..Default::default()
    });
    assert_eq!(tree.frame(id).unwrap().width, 15);
}

#[test]
fn test_cross_branch_cycle_names_both_elements() {
    let mut tree = ElementTree::new();
    let root = tree.create(ElementProps {
        name: Some("root".into()),
        ..Default::default()
    });
    tree.set_frame(root, Rect::new(0, 0, 40, 10)).unwrap();
    let mut named = |name: &str, parent: ElementId| {
        let id = tree.create(ElementProps {
            name: Some(name.into()),
            ..Default::default()
        });
        tree.add_child(parent, id).unwrap();
        id
    };
    let left = named("left", root);
    let right = named("right", root);
    let a = named("alpha", left);
    let b = named("beta", right);
    tree.set_x(a, Pos::right(b)).unwrap();
    tree.set_x(b, Pos::right(a)).unwrap();
    tree.initialize(root).unwrap();

    let err = resolve_toplevel(&mut tree, root, Size::new(40, 10)).unwrap_err();
    assert!(matches!(err, LayoutError::UnresolvedReference { .. }));
    let message = err.to_string();
    assert!(message.contains("alpha"), "{message}");
    assert!(message.contains("beta"), "{message}");
}

#[test]
fn test_stale_handle_is_reported() {
    let mut tree = ElementTree::new();
    let root = tree.create(ElementProps::default());
    let gone = tree.create(ElementProps::default());
    tree.release(gone);

    assert_eq!(
        resolve(&mut tree, gone),
        Err(LayoutError::InvalidElement(gone))
    );
    assert!(resolve(&mut tree, root).is_ok());
}
