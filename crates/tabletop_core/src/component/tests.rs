//! Component and container behavior: ownership, ordering, layout and events.

use super::*;
use crate::constants::{CARD_PILE_STRATEGY_ID, CARD_STRATEGY_ID};
use crate::layout::ContainerLayout;
use crate::test_support::{
    boxed, observe, test_environment, test_table, unit, Recorded, RecordingListener,
};

struct PanickingListener;

impl ContainerListener for PanickingListener {
    fn component_added(&self, _event: &ContainerContentChangedEvent) {
        panic!("listener failure");
    }
}

fn card(env: &TableEnvironment) -> Component {
    env.create_component_by_id(CARD_STRATEGY_ID).expect("card")
}

fn pile(env: &TableEnvironment) -> Container {
    env.create_component_by_id(CARD_PILE_STRATEGY_ID)
        .expect("pile")
        .as_container()
        .expect("pile is a container")
}

#[test]
fn adding_to_empty_tabletop_fires_added_then_bounds_and_bumps_once() {
    let (env, table) = test_table();
    let tabletop = table.tabletop();
    let recorder = RecordingListener::new();
    observe(tabletop, &recorder);

    let a = unit(&env);
    tabletop.add_component(&a).expect("add a");
    assert_eq!(table.revision_number(), 1);
    assert_eq!(tabletop.bounds(), a.bounds());
    env.await_pending_events();
    assert_eq!(
        recorder.take(),
        vec![
            Recorded::Added(a.clone(), 0),
            Recorded::BoundsChanged(tabletop.as_component().clone()),
        ]
    );

    let b = unit(&env);
    tabletop.add_component_at(&b, 0).expect("add b at bottom");
    assert_eq!(table.revision_number(), 2);
    assert_eq!(tabletop.components(), vec![b.clone(), a.clone()]);
    assert_eq!(tabletop.component_index(&a), Some(1));
    env.await_pending_events();
    assert_eq!(recorder.take(), vec![Recorded::Added(b, 0)]);
}

#[test]
fn remove_all_fires_removed_events_from_the_top_down() {
    let (env, table) = test_table();
    let container = boxed(&env);
    table.tabletop().add_component(&container).expect("place box");
    let (a, b, c) = (unit(&env), unit(&env), unit(&env));
    container
        .add_components(&[a.clone(), b.clone(), c.clone()])
        .expect("fill box");
    let before = table.revision_number();

    let recorder = RecordingListener::new();
    observe(&container, &recorder);
    let removed = container.remove_all_components();

    assert_eq!(removed, vec![a.clone(), b.clone(), c.clone()]);
    assert_eq!(container.component_count(), 0);
    assert_eq!(table.revision_number(), before + 1);
    assert!(a.container().is_none());
    env.await_pending_events();
    assert_eq!(
        recorder.events(),
        vec![
            Recorded::Removed(c, 2),
            Recorded::Removed(b, 1),
            Recorded::Removed(a, 0),
        ]
    );
}

#[test]
fn remove_range_fires_in_descending_index_order() {
    let env = test_environment();
    let container = boxed(&env);
    let children: Vec<Component> = (0..5).map(|_| unit(&env)).collect();
    container.add_components(&children).expect("fill");
    let recorder = RecordingListener::new();
    observe(&container, &recorder);

    let removed = container.remove_components(1..4).expect("remove middle");

    assert_eq!(removed, children[1..4].to_vec());
    assert_eq!(
        container.components(),
        vec![children[0].clone(), children[4].clone()]
    );
    env.await_pending_events();
    let indices: Vec<usize> = recorder
        .events()
        .into_iter()
        .map(|event| match event {
            Recorded::Removed(_, index) => index,
            other => panic!("unexpected event {:?}", other),
        })
        .collect();
    assert_eq!(indices, vec![3, 2, 1]);
}

#[test]
fn a_component_has_at_most_one_container() {
    let env = test_environment();
    let first = boxed(&env);
    let second = boxed(&env);
    let component = unit(&env);
    first.add_component(&component).expect("first add");

    let err = second.add_component(&component).expect_err("second owner");
    assert!(matches!(err, TableError::ArgumentInvalid(_)));
    assert_eq!(component.container(), Some(first.clone()));
    assert_eq!(second.component_count(), 0);

    first.remove_component(&component).expect("detach");
    second.add_component(&component).expect("re-add after detach");
    assert_eq!(component.container(), Some(second));
}

#[test]
fn batch_add_is_validated_before_anything_changes() {
    let (env, table) = test_table();
    let container = boxed(&env);
    table.tabletop().add_component(&container).expect("place box");
    let owned = unit(&env);
    table.tabletop().add_component(&owned).expect("owned elsewhere");
    let fresh = unit(&env);
    let revision = table.revision_number();

    let err = container
        .add_components(&[fresh.clone(), owned])
        .expect_err("owned component in batch");
    assert!(matches!(err, TableError::ArgumentInvalid(_)));
    assert_eq!(container.component_count(), 0);
    assert!(fresh.container().is_none());
    assert_eq!(table.revision_number(), revision);

    let err = container
        .add_components(&[fresh.clone(), fresh.clone()])
        .expect_err("duplicate in batch");
    assert!(matches!(err, TableError::ArgumentInvalid(_)));
    assert!(fresh.container().is_none());
}

#[test]
fn invalid_insertions_are_rejected() {
    let (env, table) = test_table();
    let outer = boxed(&env);
    let inner = boxed(&env);
    outer.add_component(&inner).expect("nest");

    assert!(matches!(
        inner.add_component(&outer),
        Err(TableError::ArgumentInvalid(_))
    ));
    assert!(matches!(
        outer.add_component(outer.as_component()),
        Err(TableError::ArgumentInvalid(_))
    ));
    assert!(matches!(
        outer.add_component(table.tabletop().as_component()),
        Err(TableError::ArgumentInvalid(_))
    ));
    assert!(matches!(
        outer.add_component_at(&unit(&env), 5),
        Err(TableError::ArgumentInvalid(_))
    ));

    let other_env = test_environment();
    let foreign = unit(&other_env);
    assert!(matches!(
        outer.add_component(&foreign),
        Err(TableError::ArgumentInvalid(_))
    ));
}

#[test]
fn lookups_by_index_and_location() {
    let env = test_environment();
    let container = boxed(&env);
    let bottom = unit(&env);
    let top = unit(&env);
    bottom.set_location(Point::new(3, 3));
    top.set_location(Point::new(3, 3));
    container
        .add_components(&[bottom.clone(), top.clone()])
        .expect("fill");

    assert_eq!(container.component_at(0).expect("index 0"), bottom);
    assert!(matches!(
        container.component_at(2),
        Err(TableError::ArgumentInvalid(_))
    ));
    assert_eq!(container.component_at_location(Point::new(3, 3)), Some(top));
    assert_eq!(container.component_at_location(Point::new(4, 4)), None);
    assert!(matches!(
        container.remove_component(&unit(&env)),
        Err(TableError::ArgumentInvalid(_))
    ));
    assert!(matches!(
        container.remove_component_at(7),
        Err(TableError::ArgumentInvalid(_))
    ));
}

#[test]
fn revision_tracks_every_observable_change() {
    let (env, table) = test_table();
    let container = boxed(&env);
    let component = unit(&env);
    let mut last = table.revision_number();
    let mut assert_bumped = |what: &str| {
        let now = table.revision_number();
        assert!(now > last, "{} must bump the revision", what);
        last = now;
    };

    table.tabletop().add_component(&container).expect("place");
    assert_bumped("adding a container");
    container.add_component(&component).expect("nest");
    assert_bumped("adding a nested component");
    component.translate(Dimension::new(1, 0));
    assert_bumped("moving a nested component");
    container.set_layout(ContainerLayout::AccordianDown);
    assert_bumped("changing a layout");
    container.set_layout(ContainerLayout::AccordianDown);
    assert_bumped("re-applying the same layout");
    container.remove_component(&component).expect("remove");
    assert_bumped("removing a component");

    container.set_location(container.location());
    assert_eq!(table.revision_number(), last, "no-op move must not bump");
}

#[test]
fn set_layout_with_same_layout_relays_out_without_reordering() {
    let env = test_environment();
    let cards = pile(&env);
    let children: Vec<Component> = (0..12).map(|_| card(&env)).collect();
    cards.add_components(&children).expect("deal");
    assert_eq!(children[9].location(), Point::new(0, 0));
    assert_eq!(children[10].location(), Point::new(2, 1));

    children[0].set_location(Point::new(50, 50));
    cards.set_layout(ContainerLayout::Stacked);

    assert_eq!(children[0].location(), Point::ORIGIN);
    assert_eq!(cards.components(), children);
}

#[test]
fn accordian_layouts_spread_children() {
    let env = test_environment();
    let container = boxed(&env);
    container.set_location(Point::new(100, 100));
    let children: Vec<Component> = (0..3).map(|_| unit(&env)).collect();
    container.add_components(&children).expect("fill");

    container.set_layout(ContainerLayout::AccordianLeft);
    let xs: Vec<i32> = children.iter().map(|child| child.location().x).collect();
    assert_eq!(xs, vec![100, 84, 68]);

    container.set_layout(ContainerLayout::AccordianUp);
    let ys: Vec<i32> = children.iter().map(|child| child.location().y).collect();
    assert_eq!(ys, vec![100, 84, 68]);
}

#[test]
fn moving_a_container_moves_and_notifies_its_subtree() {
    let (env, table) = test_table();
    let container = boxed(&env);
    let child = unit(&env);
    child.set_location(Point::new(2, 3));
    container.add_component(&child).expect("nest");
    table.tabletop().add_component(&container).expect("place");
    let recorder = RecordingListener::new();
    observe(&container, &recorder);
    child
        .add_component_listener(Arc::clone(&recorder) as Arc<dyn ComponentListener>)
        .expect("child listener");
    let revision = table.revision_number();

    container.set_location(Point::new(10, 10));

    assert_eq!(child.location(), Point::new(12, 13));
    assert_eq!(container.bounds(), Rectangle::new(10, 10, 10, 10));
    assert_eq!(table.revision_number(), revision + 1);
    env.await_pending_events();
    assert_eq!(
        recorder.events(),
        vec![
            Recorded::BoundsChanged(container.as_component().clone()),
            Recorded::BoundsChanged(child),
        ]
    );
}

#[test]
fn container_bounds_cover_descendants() {
    let env = test_environment();
    let outer = boxed(&env);
    let inner = boxed(&env);
    let far = unit(&env);
    far.set_location(Point::new(30, -5));
    inner.add_component(&far).expect("nest far");
    outer.add_component(&inner).expect("nest inner");

    assert_eq!(outer.bounds(), Rectangle::new(0, -5, 31, 15));
}

#[test]
fn cards_at_the_coordinate_limit_keep_bounds_clamped() {
    let (env, table) = test_table();
    let far = card(&env);
    far.set_location(Point::new(i32::MAX - 10, 0));
    table.tabletop().add_component(&far).expect("place far card");

    assert_eq!(far.bounds(), Rectangle::new(i32::MAX - 10, 0, 71, 96));
    assert_eq!(table.tabletop().bounds(), Rectangle::new(0, 0, i32::MAX, 96));
    assert_eq!(
        table.tabletop().component_at_location(Point::new(i32::MAX, 50)),
        Some(far.clone())
    );

    far.translate(Dimension::new(100, 0));
    assert_eq!(far.location(), Point::new(i32::MAX, 0));
}

#[test]
fn orientation_changes_are_validated_and_notified() {
    let env = test_environment();
    let card = card(&env);
    let recorder = RecordingListener::new();
    card.add_component_listener(Arc::clone(&recorder) as Arc<dyn ComponentListener>)
        .expect("listener");

    let face = ComponentOrientation::Card(CardOrientation::Face);
    assert_eq!(card.flip().expect("flip"), face);
    assert_eq!(card.orientation(), face);
    assert!(matches!(
        card.set_orientation(ComponentOrientation::Null(
            crate::orientation::NullOrientation::Default
        )),
        Err(TableError::ArgumentInvalid(_))
    ));
    assert!(matches!(unit(&env).flip(), Err(TableError::IllegalState(_))));

    env.await_pending_events();
    assert_eq!(
        recorder.events(),
        vec![Recorded::OrientationChanged(card.clone())]
    );
}

#[test]
fn surface_design_changes_resize_the_component() {
    let env = test_environment();
    let component = unit(&env);
    let null = ComponentOrientation::Null(crate::orientation::NullOrientation::Default);
    let large = ComponentSurfaceDesign::new(
        crate::design::ComponentSurfaceDesignId::new("test.large"),
        Dimension::new(40, 20),
    )
    .expect("design");
    let recorder = RecordingListener::new();
    component
        .add_component_listener(Arc::clone(&recorder) as Arc<dyn ComponentListener>)
        .expect("listener");

    component
        .set_surface_design(null, large.clone())
        .expect("set design");

    assert_eq!(component.size(), Dimension::new(40, 20));
    assert_eq!(component.surface_design(null).expect("design"), large);
    env.await_pending_events();
    assert_eq!(
        recorder.events(),
        vec![
            Recorded::SurfaceDesignChanged(component.clone()),
            Recorded::BoundsChanged(component.clone()),
        ]
    );

    let back = ComponentOrientation::Card(CardOrientation::Back);
    assert!(matches!(
        component.set_surface_design(back, large),
        Err(TableError::ArgumentInvalid(_))
    ));
}

#[test]
fn listener_registration_is_checked() {
    let env = test_environment();
    let container = boxed(&env);
    let listener: Arc<dyn ContainerListener> = RecordingListener::new();
    container
        .add_container_listener(Arc::clone(&listener))
        .expect("first registration");
    assert!(matches!(
        container.add_container_listener(Arc::clone(&listener)),
        Err(TableError::ArgumentInvalid(_))
    ));
    container
        .remove_container_listener(&listener)
        .expect("unregister");
    assert!(matches!(
        container.remove_container_listener(&listener),
        Err(TableError::ArgumentInvalid(_))
    ));
}

#[test]
fn removed_listener_receives_nothing() {
    let env = test_environment();
    let container = boxed(&env);
    let recorder = RecordingListener::new();
    let listener: Arc<dyn ContainerListener> = Arc::clone(&recorder) as Arc<dyn ContainerListener>;
    container
        .add_container_listener(Arc::clone(&listener))
        .expect("register");
    container
        .remove_container_listener(&listener)
        .expect("unregister");

    container.add_component(&unit(&env)).expect("add");
    env.await_pending_events();
    assert!(recorder.events().is_empty());
}

#[test]
fn panicking_listener_does_not_stop_delivery() {
    let env = test_environment();
    let container = boxed(&env);
    container
        .add_container_listener(Arc::new(PanickingListener))
        .expect("panicking listener");
    let recorder = RecordingListener::new();
    container
        .add_container_listener(Arc::clone(&recorder) as Arc<dyn ContainerListener>)
        .expect("recorder");

    let first = unit(&env);
    let second = unit(&env);
    container.add_component(&first).expect("first");
    container.add_component(&second).expect("second");
    env.await_pending_events();

    assert_eq!(
        recorder.events(),
        vec![Recorded::Added(first, 0), Recorded::Added(second, 1)]
    );
}

#[test]
fn navigation_reaches_container_and_table() {
    let (env, table) = test_table();
    let container = boxed(&env);
    let component = unit(&env);
    container.add_component(&component).expect("nest");
    assert!(component.table().is_none());

    table.tabletop().add_component(&container).expect("place");
    assert_eq!(component.table(), Some(table.clone()));
    assert_eq!(component.container(), Some(container.clone()));
    assert_eq!(container.container(), Some(table.tabletop().clone()));
    assert!(table.tabletop().container().is_none());
}

#[test]
fn component_identity_is_node_identity() {
    let env = test_environment();
    let a = unit(&env);
    let b = unit(&env);
    assert_ne!(a, b);
    assert_eq!(a, a.clone());

    let container = boxed(&env);
    let as_component = container.as_component().clone();
    assert_eq!(as_component.as_container(), Some(container.clone()));
    assert!(container == as_component);
    assert!(a.as_container().is_none());
}

mod memento {
    use super::*;
    use crate::error::MementoError;
    use crate::memento::{Memento, MementoValue};

    fn populated_table() -> (TableEnvironment, crate::table::Table) {
        let (env, table) = test_table();
        let group = boxed(&env);
        group.set_location(Point::new(20, 20));
        let first = unit(&env);
        first.set_location(Point::new(21, 22));
        let second = unit(&env);
        second.set_location(Point::new(25, 27));
        group
            .add_components(&[first, second])
            .expect("fill group");

        let cards = pile(&env);
        cards.set_location(Point::new(100, 0));
        let dealt: Vec<Component> = (0..3).map(|_| card(&env)).collect();
        dealt[1].flip().expect("flip");
        cards.add_components(&dealt).expect("deal");

        let spread = boxed(&env);
        spread.set_layout(ContainerLayout::AccordianRight);
        spread.add_component(&card(&env)).expect("spread card");

        table
            .tabletop()
            .add_components(&[group.into_component(), cards.into_component(), spread.into_component()])
            .expect("place");
        (env, table)
    }

    #[test]
    fn table_memento_round_trips() {
        let (env, table) = populated_table();
        let memento = table.create_memento().expect("snapshot");

        let restored = env.create_table().expect("second table");
        restored.set_memento(&memento).expect("restore");

        assert_eq!(restored.create_memento().expect("snapshot"), memento);
        let tabletop = restored.tabletop();
        assert_eq!(tabletop.component_count(), 3);
        let group = tabletop
            .component_at(0)
            .expect("group")
            .as_container()
            .expect("group container");
        assert_eq!(group.location(), Point::new(20, 20));
        assert_eq!(
            group
                .components()
                .iter()
                .map(Component::location)
                .collect::<Vec<_>>(),
            vec![Point::new(21, 22), Point::new(25, 27)]
        );
        let cards = tabletop
            .component_at(1)
            .expect("pile")
            .as_container()
            .expect("pile container");
        assert_eq!(cards.layout(), ContainerLayout::Stacked);
        assert_eq!(
            cards.component_at(1).expect("flipped card").orientation(),
            ComponentOrientation::Card(CardOrientation::Face)
        );
        let spread = tabletop
            .component_at(2)
            .expect("spread")
            .as_container()
            .expect("spread container");
        assert_eq!(spread.layout(), ContainerLayout::AccordianRight);
    }

    #[test]
    fn memento_survives_json() {
        let (_env, table) = populated_table();
        let memento = table.create_memento().expect("snapshot");
        let json = serde_json::to_string(&memento).expect("serialize");
        let parsed: Memento = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, memento);
    }

    #[test]
    fn factory_dispatches_on_memento_type() {
        let env = test_environment();
        let container = boxed(&env);
        container.add_component(&unit(&env)).expect("fill");

        let rebuilt = env
            .create_component_from_memento(&container.create_memento())
            .expect("rebuild container");
        let rebuilt = rebuilt.as_container().expect("still a container");
        assert_eq!(rebuilt.component_count(), 1);
        assert!(rebuilt.container().is_none());

        let plain = ComponentFactory::create_component(&env, &unit(&env).create_memento())
            .expect("rebuild component");
        assert!(!plain.is_container());
        assert!(Component::is_memento(&plain.create_memento()));
        assert!(!Container::is_memento(&plain.create_memento()));

        let copy = ComponentFactory::clone_component(&rebuilt).expect("clone");
        assert_ne!(copy, *rebuilt.as_component());
        assert_eq!(copy.create_memento(), rebuilt.create_memento());
    }

    #[test]
    fn malformed_mementos_are_rejected() {
        let env = test_environment();
        let valid = unit(&env).create_memento();

        let mut unknown = valid.clone();
        unknown.insert("strategyId", "no.such.strategy");
        assert!(matches!(
            Component::from_memento(&env, &unknown),
            Err(TableError::MementoFormat(MementoError::UnknownStrategy(_)))
        ));

        let mut missing = Memento::new();
        for (name, value) in valid.iter().filter(|(name, _)| *name != "location") {
            missing.insert(name, value.clone());
        }
        assert!(matches!(
            Component::from_memento(&env, &missing),
            Err(TableError::MementoFormat(MementoError::MissingAttribute(name))) if name == "location"
        ));

        let mut wrong = valid.clone();
        wrong.insert("orientation", 7);
        assert!(matches!(
            Component::from_memento(&env, &wrong),
            Err(TableError::MementoFormat(MementoError::WrongType { .. }))
        ));

        assert!(matches!(
            Container::from_memento(&env, &valid),
            Err(TableError::MementoFormat(MementoError::UnknownKind(_)))
        ));
        assert!(matches!(
            env.create_component_from_memento(&Memento::new()),
            Err(TableError::MementoFormat(MementoError::UnknownKind(_)))
        ));
    }

    #[test]
    fn broken_child_is_reported_as_nested_cause() {
        let env = test_environment();
        let container = boxed(&env);
        container.add_component(&unit(&env)).expect("fill");
        let mut memento = container.create_memento();
        let mut child = unit(&env).create_memento();
        child.insert("orientation", "sideways");
        memento.insert("components", vec![MementoValue::Map(child)]);

        let err = Container::from_memento(&env, &memento).expect_err("bad child");
        match err {
            TableError::MementoFormat(MementoError::Component(nested)) => assert!(matches!(
                *nested,
                TableError::MementoFormat(MementoError::UnknownOrientation(_))
            )),
            other => panic!("expected nested child failure, got {:?}", other),
        }
    }

    #[test]
    fn set_memento_rejects_other_strategies_and_keeps_state() {
        let env = test_environment();
        let container = boxed(&env);
        let child = unit(&env);
        container.add_component(&child).expect("fill");
        let pile_memento = pile(&env).create_memento();

        let err = container.set_memento(&pile_memento).expect_err("mismatch");
        assert!(matches!(
            err,
            TableError::MementoFormat(MementoError::StrategyMismatch { .. })
        ));
        assert_eq!(container.components(), vec![child]);
    }

    #[test]
    fn set_memento_replaces_children_and_notifies() {
        let env = test_environment();
        let source = boxed(&env);
        source.set_location(Point::new(5, 5));
        let moved = unit(&env);
        moved.set_location(Point::new(6, 6));
        source.add_component(&moved).expect("fill source");
        let memento = source.create_memento();

        let target = boxed(&env);
        let old_child = unit(&env);
        target.add_component(&old_child).expect("fill target");
        let recorder = RecordingListener::new();
        observe(&target, &recorder);

        target.set_memento(&memento).expect("apply");

        assert_eq!(target.location(), Point::new(5, 5));
        assert_eq!(target.component_count(), 1);
        let new_child = target.component_at(0).expect("new child");
        assert_ne!(new_child, old_child);
        assert_eq!(new_child.location(), Point::new(6, 6));
        assert!(old_child.container().is_none());
        env.await_pending_events();
        let events = recorder.events();
        assert_eq!(events.first(), Some(&Recorded::Removed(old_child, 0)));
        assert!(events.contains(&Recorded::Added(new_child, 0)));
    }
}
