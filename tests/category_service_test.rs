//! Tests for CategoryService over the in-memory store

use std::sync::Arc;

use rstest::{fixture, rstest};

use popcat::application::services::CategoryService;
use popcat::application::ApplicationError;
use popcat::domain::{
    CategoryId, CategoryUpdate, DomainError, NewCategory, SiblingSlot, TreeEngine,
};
use popcat::infrastructure::store::MemoryStore;
use popcat::util::testing;

#[fixture]
fn service() -> CategoryService {
    testing::init_test_setup();
    CategoryService::new(Arc::new(MemoryStore::new()), TreeEngine::default())
}

fn domain(err: ApplicationError) -> DomainError {
    match err {
        ApplicationError::Domain(e) => e,
        other => panic!("expected domain error, got {other:?}"),
    }
}

fn names(categories: &[popcat::domain::Category]) -> Vec<&str> {
    categories.iter().map(|c| c.name.as_str()).collect()
}

#[rstest]
fn given_valid_input_when_creating_then_get_returns_same_record(service: CategoryService) {
    // Arrange
    let parent = service.create(NewCategory::named("Fashion")).unwrap();
    let input = NewCategory::named("Women's Wear")
        .under(parent.id)
        .with_description("Dresses, tops and more")
        .with_sort_order(2.5);

    // Act
    let created = service.create(input.clone()).unwrap();
    let found = service.get(created.id).unwrap();

    // Assert
    assert_eq!(found, created);
    assert_eq!(found.name, input.name);
    assert_eq!(found.description, input.description);
    assert_eq!(found.parent_id, input.parent_id);
    assert_eq!(found.sort_order, 2.5);
    assert!(found.active);
}

#[rstest]
fn given_no_sort_order_when_creating_then_defaults_to_zero(service: CategoryService) {
    let created = service.create(NewCategory::named("Fashion")).unwrap();
    assert_eq!(created.sort_order, 0.0);
    assert!(created.is_root());
}

#[rstest]
fn given_padded_name_when_creating_then_name_is_trimmed(service: CategoryService) {
    let created = service.create(NewCategory::named("  Food  ")).unwrap();
    assert_eq!(created.name, "Food");
    assert_eq!(service.get_by_name("Food").unwrap().id, created.id);
}

#[rstest]
fn given_existing_food_root_when_creating_second_food_then_duplicate_name(
    service: CategoryService,
) {
    service.create(NewCategory::named("Food")).unwrap();

    let err = service.create(NewCategory::named("Food")).unwrap_err();

    assert_eq!(domain(err), DomainError::DuplicateName("Food".into()));
    assert_eq!(service.get_tree(false).unwrap().len(), 1);
}

#[rstest]
fn given_unknown_parent_when_creating_then_parent_not_found(service: CategoryService) {
    let missing = CategoryId::new();
    let err = service
        .create(NewCategory::named("Orphan").under(missing))
        .unwrap_err();
    assert_eq!(domain(err), DomainError::ParentNotFound(missing));
}

#[rstest]
#[case::empty_name(NewCategory::named("   "), "name")]
#[case::long_name(NewCategory::named("x".repeat(101)), "name")]
#[case::long_description(NewCategory::named("Food").with_description("d".repeat(501)), "description")]
#[case::negative_sort(NewCategory::named("Food").with_sort_order(-1.0), "sort_order")]
fn given_invalid_fields_when_creating_then_invalid_field(
    service: CategoryService,
    #[case] input: NewCategory,
    #[case] expected_field: &str,
) {
    let err = service.create(input).unwrap_err();
    match domain(err) {
        DomainError::InvalidField { field, .. } => assert_eq!(field, expected_field),
        other => panic!("expected InvalidField, got {other:?}"),
    }
}

#[rstest]
fn given_fashion_scenario_then_cycle_and_delete_rules_hold(service: CategoryService) {
    // create root "Fashion" and child "Women's Wear"
    let fashion = service.create(NewCategory::named("Fashion")).unwrap();
    assert_eq!(fashion.sort_order, 0.0);
    let womens = service
        .create(NewCategory::named("Women's Wear").under(fashion.id))
        .unwrap();

    // move Fashion under its own child
    let err = service.move_to(fashion.id, Some(womens.id)).unwrap_err();
    assert!(matches!(domain(err), DomainError::Cycle { .. }));

    // delete parent while child exists
    let err = service.delete(fashion.id).unwrap_err();
    assert_eq!(
        domain(err),
        DomainError::HasChildren {
            id: fashion.id,
            count: 1
        }
    );

    service.delete(womens.id).unwrap();
    service.delete(fashion.id).unwrap();
    assert!(service.get_tree(false).unwrap().is_empty());
}

#[rstest]
fn given_parent_with_child_when_child_reparented_then_delete_succeeds(service: CategoryService) {
    let a = service.create(NewCategory::named("A")).unwrap();
    let b = service.create(NewCategory::named("B")).unwrap();
    let child = service.create(NewCategory::named("C").under(a.id)).unwrap();
    assert!(service.delete(a.id).is_err());

    service.move_to(child.id, Some(b.id)).unwrap();

    service.delete(a.id).unwrap();
    assert_eq!(service.get(child.id).unwrap().parent_id, Some(b.id));
}

#[rstest]
fn given_deep_chain_when_moving_root_under_any_descendant_then_cycle(service: CategoryService) {
    let root = service.create(NewCategory::named("L0")).unwrap();
    let mut parent = root.id;
    let mut chain = Vec::new();
    for level in 1..=5 {
        let c = service
            .create(NewCategory::named(format!("L{level}")).under(parent))
            .unwrap();
        parent = c.id;
        chain.push(c.id);
    }

    for descendant in chain {
        let err = service.move_to(root.id, Some(descendant)).unwrap_err();
        assert!(matches!(domain(err), DomainError::Cycle { .. }));
    }
}

#[rstest]
fn given_category_when_moving_under_itself_then_self_parent(service: CategoryService) {
    let a = service.create(NewCategory::named("A")).unwrap();
    let err = service.move_to(a.id, Some(a.id)).unwrap_err();
    assert_eq!(domain(err), DomainError::SelfParent(a.id));
}

#[rstest]
fn given_child_when_moving_to_root_then_parent_cleared(service: CategoryService) {
    let a = service.create(NewCategory::named("A")).unwrap();
    let b = service.create(NewCategory::named("B").under(a.id)).unwrap();

    let moved = service.move_to(b.id, None).unwrap();

    assert!(moved.is_root());
    assert_eq!(names(&service.get_tree(true).unwrap()).len(), 2);
}

#[rstest]
fn given_unknown_ids_when_moving_then_not_found_or_parent_not_found(service: CategoryService) {
    let a = service.create(NewCategory::named("A")).unwrap();
    let missing = CategoryId::new();

    let err = service.move_to(missing, Some(a.id)).unwrap_err();
    assert!(matches!(domain(err), DomainError::NotFound(_)));

    let err = service.move_to(a.id, Some(missing)).unwrap_err();
    assert_eq!(domain(err), DomainError::ParentNotFound(missing));
}

#[rstest]
fn given_tree_when_computing_levels_then_child_is_parent_plus_one(service: CategoryService) {
    let root = service.create(NewCategory::named("Fashion")).unwrap();
    let child = service
        .create(NewCategory::named("Women's Wear").under(root.id))
        .unwrap();
    let grandchild = service
        .create(NewCategory::named("Dresses").under(child.id))
        .unwrap();

    let level = |id| service.describe(id).unwrap().level;
    assert_eq!(level(root.id), 0);
    assert_eq!(level(child.id), level(root.id) + 1);
    assert_eq!(level(grandchild.id), level(child.id) + 1);

    let view = service.describe(child.id).unwrap();
    assert_eq!(view.parent_name.as_deref(), Some("Fashion"));
    assert_eq!(view.child_count, 1);
    assert!(!view.deletable);
    assert!(service.describe(grandchild.id).unwrap().deletable);
}

#[rstest]
fn given_active_category_when_activating_twice_then_still_active(service: CategoryService) {
    let a = service.create(NewCategory::named("A")).unwrap();

    assert!(service.activate(a.id).unwrap().active);
    assert!(service.activate(a.id).unwrap().active);
    assert_eq!(service.get(a.id).unwrap().updated_at, a.updated_at);
}

#[rstest]
fn given_inactive_category_when_deactivating_again_then_no_error(service: CategoryService) {
    let a = service.create(NewCategory::named("A")).unwrap();

    assert!(!service.deactivate(a.id).unwrap().active);
    assert!(!service.deactivate(a.id).unwrap().active);
    assert!(service.list_active().unwrap().is_empty());
}

#[rstest]
fn given_unknown_id_when_activating_then_not_found(service: CategoryService) {
    let err = service.activate(CategoryId::new()).unwrap_err();
    assert!(matches!(domain(err), DomainError::NotFound(_)));
}

#[rstest]
fn given_category_when_updating_then_fields_replaced_and_parent_kept(service: CategoryService) {
    let root = service.create(NewCategory::named("Fashion")).unwrap();
    let child = service
        .create(NewCategory::named("Womens").under(root.id).with_description("old"))
        .unwrap();

    let mut update = CategoryUpdate::from_current(&child);
    update.name = "Women's Wear".into();
    update.description = None;
    update.sort_order = Some(4.0);
    let updated = service.update(child.id, update).unwrap();

    assert_eq!(updated.name, "Women's Wear");
    assert_eq!(updated.description, None);
    assert_eq!(updated.sort_order, 4.0);
    assert_eq!(updated.parent_id, Some(root.id));
    assert!(service.get_by_name("Womens").is_err());
}

#[rstest]
fn given_taken_name_when_updating_then_duplicate_name(service: CategoryService) {
    service.create(NewCategory::named("Food")).unwrap();
    let drinks = service.create(NewCategory::named("Drinks")).unwrap();

    let mut update = CategoryUpdate::from_current(&drinks);
    update.name = "Food".into();

    let err = service.update(drinks.id, update).unwrap_err();
    assert_eq!(domain(err), DomainError::DuplicateName("Food".into()));
}

#[rstest]
fn given_unknown_id_when_updating_then_not_found(service: CategoryService) {
    let update = CategoryUpdate {
        name: "X".into(),
        description: None,
        sort_order: None,
    };
    let err = service.update(CategoryId::new(), update).unwrap_err();
    assert!(matches!(domain(err), DomainError::NotFound(_)));
}

#[rstest]
fn given_siblings_when_reordering_then_listing_follows_sort_order(service: CategoryService) {
    let a = service.create(NewCategory::named("A").with_sort_order(0.0)).unwrap();
    service.create(NewCategory::named("B").with_sort_order(1.0)).unwrap();
    service.create(NewCategory::named("C").with_sort_order(2.0)).unwrap();

    service.reorder(a.id, 5.0).unwrap();

    assert_eq!(names(&service.get_tree(true).unwrap()), vec!["B", "C", "A"]);
    assert!(service.reorder(a.id, f64::NAN).is_err());
}

#[rstest]
fn given_siblings_when_placing_between_then_midpoint(service: CategoryService) {
    let a = service.create(NewCategory::named("A").with_sort_order(1.0)).unwrap();
    let b = service.create(NewCategory::named("B").with_sort_order(3.0)).unwrap();
    let c = service.create(NewCategory::named("C").with_sort_order(9.0)).unwrap();

    let placed = service
        .place(
            c.id,
            SiblingSlot::Between {
                before: a.id,
                after: b.id,
            },
        )
        .unwrap();

    assert_eq!(placed.sort_order, 2.0);
    assert_eq!(names(&service.get_tree(true).unwrap()), vec!["A", "C", "B"]);
}

#[rstest]
fn given_siblings_when_placing_last_then_max_plus_one(service: CategoryService) {
    let a = service.create(NewCategory::named("A").with_sort_order(1.0)).unwrap();
    service.create(NewCategory::named("B").with_sort_order(2.0)).unwrap();

    let placed = service.place(a.id, SiblingSlot::Last).unwrap();

    assert_eq!(placed.sort_order, 3.0);
}

#[rstest]
fn given_non_sibling_when_placing_between_then_invalid_slot(service: CategoryService) {
    let a = service.create(NewCategory::named("A")).unwrap();
    let b = service.create(NewCategory::named("B").with_sort_order(1.0)).unwrap();
    let nested = service.create(NewCategory::named("N").under(a.id)).unwrap();

    let err = service
        .place(
            b.id,
            SiblingSlot::Between {
                before: a.id,
                after: nested.id,
            },
        )
        .unwrap_err();

    match domain(err) {
        DomainError::InvalidField { field, .. } => assert_eq!(field, "slot"),
        other => panic!("expected InvalidField, got {other:?}"),
    }
}

#[rstest]
fn given_fractional_siblings_when_renumbering_then_consecutive_in_same_order(
    service: CategoryService,
) {
    let parent = service.create(NewCategory::named("P")).unwrap();
    for (name, sort) in [("X", 0.125), ("Y", 0.0625), ("Z", 7.5)] {
        service
            .create(NewCategory::named(name).under(parent.id).with_sort_order(sort))
            .unwrap();
    }

    let renumbered = service.renumber_children(Some(parent.id)).unwrap();

    assert_eq!(names(&renumbered), vec!["Y", "X", "Z"]);
    let orders: Vec<f64> = renumbered.iter().map(|c| c.sort_order).collect();
    assert_eq!(orders, vec![0.0, 1.0, 2.0]);
    assert_eq!(
        names(&service.list_children(Some(parent.id)).unwrap()),
        vec!["Y", "X", "Z"]
    );
}

#[rstest]
fn given_tree_when_listing_relatives_then_ancestors_and_descendants(service: CategoryService) {
    let fashion = service.create(NewCategory::named("Fashion")).unwrap();
    let womens = service
        .create(NewCategory::named("Women's Wear").under(fashion.id))
        .unwrap();
    let mens = service
        .create(NewCategory::named("Men's Wear").under(fashion.id).with_sort_order(1.0))
        .unwrap();
    let dresses = service
        .create(NewCategory::named("Dresses").under(womens.id))
        .unwrap();

    let ancestors = service.ancestors(dresses.id).unwrap();
    assert_eq!(names(&ancestors), vec!["Women's Wear", "Fashion"]);
    assert!(service.ancestors(fashion.id).unwrap().is_empty());

    let descendants = service.descendants(fashion.id).unwrap();
    assert_eq!(descendants.len(), 3);
    // breadth first: both children before the grandchild
    assert_eq!(descendants[2].id, dresses.id);
    assert!(descendants[..2].iter().any(|c| c.id == mens.id));
}

#[rstest]
fn given_roots_and_children_when_getting_tree_then_roots_only_filters(service: CategoryService) {
    let a = service.create(NewCategory::named("A")).unwrap();
    service.create(NewCategory::named("A1").under(a.id)).unwrap();
    service.create(NewCategory::named("B").with_sort_order(1.0)).unwrap();

    assert_eq!(names(&service.get_tree(true).unwrap()), vec!["A", "B"]);
    assert_eq!(service.get_tree(false).unwrap().len(), 3);

    let forest = service.forest(false).unwrap();
    assert_eq!(forest.roots().len(), 2);
    assert_eq!(forest.depth(), 2);
}

#[rstest]
fn given_inactive_branch_when_building_active_forest_then_subtree_hidden(
    service: CategoryService,
) {
    let fashion = service.create(NewCategory::named("Fashion")).unwrap();
    let womens = service
        .create(NewCategory::named("Women's Wear").under(fashion.id))
        .unwrap();
    service
        .create(NewCategory::named("Dresses").under(womens.id))
        .unwrap();
    service
        .create(NewCategory::named("Food").with_sort_order(1.0))
        .unwrap();
    service.deactivate(womens.id).unwrap();

    let forest = service.forest(true).unwrap();

    let shown: Vec<String> = forest
        .iter()
        .map(|(_, node)| node.data.name.clone())
        .collect();
    assert_eq!(shown, vec!["Fashion", "Food"]);
    assert_eq!(service.forest(false).unwrap().len(), 4);
}

#[rstest]
fn given_inactive_root_when_listing_active_roots_then_only_active_roots(
    service: CategoryService,
) {
    let fashion = service.create(NewCategory::named("Fashion")).unwrap();
    service
        .create(NewCategory::named("Women's Wear").under(fashion.id))
        .unwrap();
    let food = service
        .create(NewCategory::named("Food").with_sort_order(1.0))
        .unwrap();
    service
        .create(NewCategory::named("Toys").with_sort_order(2.0))
        .unwrap();
    service.deactivate(food.id).unwrap();

    let roots = service.list_active_roots().unwrap();

    assert_eq!(names(&roots), vec!["Fashion", "Toys"]);
}

fn shallow_service() -> CategoryService {
    testing::init_test_setup();
    CategoryService::new(Arc::new(MemoryStore::new()), TreeEngine::new(2))
}

#[test]
fn given_parent_at_depth_limit_when_creating_child_then_rejected_and_tree_stays_readable() {
    // Arrange
    let service = shallow_service();
    let a = service.create(NewCategory::named("A")).unwrap();
    let b = service.create(NewCategory::named("B").under(a.id)).unwrap();
    let c = service.create(NewCategory::named("C").under(b.id)).unwrap();

    // Act
    let err = service
        .create(NewCategory::named("D").under(c.id))
        .unwrap_err();

    // Assert
    assert_eq!(err.http_status(), 400);
    assert!(matches!(
        domain(err),
        DomainError::InvalidField { field: "parent", .. }
    ));
    assert!(service.get_by_name("D").is_err());
    assert_eq!(service.describe(c.id).unwrap().level, 2);
    assert_eq!(names(&service.ancestors(c.id).unwrap()), vec!["B", "A"]);
}

#[test]
fn given_subtree_when_moving_past_depth_limit_then_rejected_and_unchanged() {
    // Arrange: A -> B -> C and X -> Y
    let service = shallow_service();
    let a = service.create(NewCategory::named("A")).unwrap();
    let b = service.create(NewCategory::named("B").under(a.id)).unwrap();
    let c = service.create(NewCategory::named("C").under(b.id)).unwrap();
    let x = service.create(NewCategory::named("X")).unwrap();
    let y = service.create(NewCategory::named("Y").under(x.id)).unwrap();

    // Act
    let under_b = service.move_to(x.id, Some(b.id)).unwrap_err();
    let leaf_under_c = service.move_to(y.id, Some(c.id)).unwrap_err();
    let under_a = service.move_to(x.id, Some(a.id));

    // Assert
    assert!(matches!(
        domain(under_b),
        DomainError::InvalidField { field: "parent", .. }
    ));
    assert!(matches!(
        domain(leaf_under_c),
        DomainError::InvalidField { field: "parent", .. }
    ));
    assert_eq!(under_a.unwrap().parent_id, Some(a.id));
    assert_eq!(service.describe(y.id).unwrap().level, 2);
    assert_eq!(service.get(y.id).unwrap().parent_id, Some(x.id));
}

#[rstest]
fn given_unknown_name_when_getting_by_name_then_not_found(service: CategoryService) {
    let err = service.get_by_name("Nope").unwrap_err();
    assert_eq!(err.http_status(), 404);
}

#[test]
fn given_shared_service_when_used_from_threads_then_names_stay_unique() {
    testing::init_test_setup();
    let service = Arc::new(CategoryService::new(
        Arc::new(MemoryStore::new()),
        TreeEngine::default(),
    ));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let service = Arc::clone(&service);
            std::thread::spawn(move || service.create(NewCategory::named("Food")).is_ok())
        })
        .collect();
    let successes = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();

    assert_eq!(successes, 1);
    assert_eq!(service.get_tree(false).unwrap().len(), 1);
}
