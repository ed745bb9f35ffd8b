mod common;

use archviz::{
    context::{Context, ContextConfig},
    host::{HostEvent, ListenerKind, PointerPosition},
    lifecycle::{SceneManager, Visual, VisualOptions, VisualState, mount_visual},
    render::HeadlessRendererFactory,
    scenes::{
        VisualKind,
        grid::ArchitectureGrid,
        wireframe::{Wireframe, WireframeConfig},
    },
};

use crate::common::{assert_close, container, headless};

#[test]
fn should_register_listeners_per_scene() {
    let (mut ctx, _) = headless(1280, 800);
    let key = container(&mut ctx, 800.0, 600.0);

    let wireframe = mount_visual(&mut ctx, VisualKind::Wireframe, Some(key), &VisualOptions::default());
    assert_eq!(wireframe.state(), VisualState::Running);
    assert_eq!(ctx.subscriptions.count(ListenerKind::Resize), 1);
    assert_eq!(ctx.subscriptions.count(ListenerKind::AnimationFrame), 1);
    // the wireframe ignores the pointer
    assert_eq!(ctx.subscriptions.count(ListenerKind::PointerMove), 0);

    let other = container(&mut ctx, 800.0, 600.0);
    let _grid = mount_visual(
        &mut ctx,
        VisualKind::ArchitectureGrid,
        Some(other),
        &VisualOptions::default(),
    );
    assert_eq!(ctx.subscriptions.count(ListenerKind::PointerMove), 1);
    assert_eq!(ctx.subscriptions.len(), 5);
}

#[test]
fn should_leave_nothing_behind_after_double_dispose() {
    let (mut ctx, factory) = headless(1280, 800);
    let key = container(&mut ctx, 800.0, 600.0);
    let mut visual = mount_visual(
        &mut ctx,
        VisualKind::ArchitectureGrid,
        Some(key),
        &VisualOptions::default(),
    );
    let surface = visual.surface().unwrap();
    assert!(ctx.containers.get(key).unwrap().contains(surface));

    visual.frame(&mut ctx);
    visual.dispose(&mut ctx);
    visual.dispose(&mut ctx);

    assert_eq!(visual.state(), VisualState::Disposed);
    assert!(ctx.subscriptions.is_empty());
    assert!(ctx.containers.get(key).unwrap().surfaces().is_empty());
    let scene = visual.scene().unwrap();
    assert!(scene.is_empty());
    assert_eq!(scene.live_resources(), 0);
    assert!(factory.stats(surface).unwrap().disposed);
}

#[test]
fn should_release_every_resource_to_the_renderer() {
    let (mut ctx, factory) = headless(1280, 800);
    let key = container(&mut ctx, 400.0, 400.0);
    let mut manager = SceneManager::mount(Wireframe::new(WireframeConfig::default()), &mut ctx, key);
    // ten drawables, one geometry and one material each
    assert_eq!(manager.scene().unwrap().live_resources(), 20);

    manager.dispose(&mut ctx);

    let released = manager.released();
    assert_eq!(released.nodes, 10);
    assert_eq!(released.resources(), 20);
    let stats = factory.stats(manager.surface().unwrap()).unwrap();
    assert_eq!(stats.released, 20);
    assert!(stats.disposed);
}

#[test]
fn should_dispose_right_after_mount() {
    let (mut ctx, _) = headless(1280, 800);
    let key = container(&mut ctx, 256.0, 256.0);
    let mut visual = mount_visual(&mut ctx, VisualKind::Particles, Some(key), &VisualOptions::default());
    visual.dispose(&mut ctx);

    assert!(ctx.subscriptions.is_empty());
    assert!(ctx.timers.is_empty());
    assert_eq!(visual.render_stats().unwrap().frames, 0);
}

#[test]
fn should_stop_rendering_after_dispose() {
    let (mut ctx, _) = headless(1280, 800);
    let key = container(&mut ctx, 400.0, 300.0);
    let mut visual = mount_visual(&mut ctx, VisualKind::Wireframe, Some(key), &VisualOptions::default());
    for _ in 0..3 {
        visual.frame(&mut ctx);
    }
    assert_eq!(visual.render_stats().unwrap().frames, 3);

    visual.dispose(&mut ctx);
    visual.frame(&mut ctx);
    assert_eq!(visual.render_stats().unwrap().frames, 3);
}

#[test]
fn should_tolerate_a_container_removed_before_dispose() {
    let (mut ctx, _) = headless(1280, 800);
    let key = container(&mut ctx, 400.0, 300.0);
    let mut visual = mount_visual(&mut ctx, VisualKind::FloorPlan, Some(key), &VisualOptions::default());
    ctx.containers.remove(key);

    visual.handle_event(&mut ctx, &HostEvent::Resize);
    visual.dispose(&mut ctx);

    assert_eq!(visual.state(), VisualState::Disposed);
    assert!(ctx.subscriptions.is_empty());
}

#[test]
fn should_mount_nothing_without_a_container() {
    let (mut ctx, factory) = headless(1280, 800);
    let mut visual = mount_visual(&mut ctx, VisualKind::Wireframe, None, &VisualOptions::default());
    assert_eq!(visual.name(), "none");
    assert_eq!(visual.surface(), None);

    let stale = container(&mut ctx, 100.0, 100.0);
    ctx.containers.remove(stale);
    let mut stale_visual = mount_visual(&mut ctx, VisualKind::Particles, Some(stale), &VisualOptions::default());
    assert_eq!(stale_visual.state(), VisualState::Unmounted);

    visual.frame(&mut ctx);
    visual.dispose(&mut ctx);
    stale_visual.dispose(&mut ctx);
    assert_eq!(factory.created(), 0);
    assert!(ctx.subscriptions.is_empty());
}

#[test]
fn should_resize_idempotently_and_keep_aspect() {
    let (mut ctx, _) = headless(1280, 800);
    let key = container(&mut ctx, 800.0, 600.0);
    let mut visual = mount_visual(
        &mut ctx,
        VisualKind::ArchitectureGrid,
        Some(key),
        &VisualOptions::default(),
    );
    assert_close(visual.camera().unwrap().projection.aspect(), 4.0 / 3.0);

    ctx.containers.get_mut(key).unwrap().rect.width = 400.0;
    ctx.containers.get_mut(key).unwrap().rect.height = 300.0;
    visual.handle_event(&mut ctx, &HostEvent::Resize);
    let once = visual.camera().unwrap().projection;
    visual.handle_event(&mut ctx, &HostEvent::Resize);
    let twice = visual.camera().unwrap().projection;

    assert_eq!(once, twice);
    assert_close(twice.aspect(), 4.0 / 3.0);
    let stats = visual.render_stats().unwrap();
    assert_eq!(stats.resizes, 1);
    assert_eq!(stats.buffer_size, (400, 300));

    ctx.containers.get_mut(key).unwrap().rect.height = 200.0;
    visual.handle_event(&mut ctx, &HostEvent::Resize);
    assert_close(visual.camera().unwrap().projection.aspect(), 2.0);
}

#[test]
fn should_resize_orthographic_extents() {
    let (mut ctx, _) = headless(1280, 800);
    let key = container(&mut ctx, 400.0, 200.0);
    let mut visual = mount_visual(&mut ctx, VisualKind::FloorPlan, Some(key), &VisualOptions::default());
    assert_close(visual.camera().unwrap().projection.aspect(), 2.0);

    ctx.containers.get_mut(key).unwrap().rect.width = 200.0;
    visual.handle_event(&mut ctx, &HostEvent::Resize);
    match visual.camera().unwrap().projection {
        archviz::camera::Projection::Orthographic {
            left, right, top, bottom, ..
        } => {
            assert_close(left, -1.0);
            assert_close(right, 1.0);
            assert_close(top, 1.0);
            assert_close(bottom, -1.0);
        }
        other => panic!("expected an orthographic camera, got {:?}", other),
    }
}

#[test]
fn should_cap_the_pixel_ratio() {
    let factory = HeadlessRendererFactory::new();
    let mut ctx = Context::new(
        ContextConfig {
            viewport: (1280, 800),
            device_pixel_ratio: 3.0,
            ..Default::default()
        },
        Box::new(factory.clone()),
    );
    let key = container(&mut ctx, 300.0, 200.0);
    let visual = mount_visual(&mut ctx, VisualKind::Wireframe, Some(key), &VisualOptions::default());
    let stats = factory.stats(visual.surface().unwrap()).unwrap();
    assert_eq!(stats.pixel_ratio, 2.0);
    assert_eq!(stats.buffer_size, (600, 400));
}

#[test]
fn should_size_the_accent_container() {
    let (mut ctx, _) = headless(1280, 800);
    let key = container(&mut ctx, 1000.0, 50.0);
    let visual = mount_visual(&mut ctx, VisualKind::Wireframe, Some(key), &VisualOptions::accent());
    let rect = ctx.containers.get(key).unwrap().rect;
    assert_eq!((rect.width, rect.height), (256.0, 256.0));
    assert_close(visual.camera().unwrap().projection.aspect(), 1.0);
}

#[test]
fn should_apply_pointer_targets_on_the_next_frame() {
    let (mut ctx, _) = headless(1280, 800);
    let key = container(&mut ctx, 800.0, 600.0);
    let mut manager = SceneManager::mount(ArchitectureGrid::default(), &mut ctx, key);

    // 1000 px right of the window centre
    let pointer = PointerPosition { x: 1640.0, y: 400.0 };
    manager.handle_event(&mut ctx, &HostEvent::PointerMove(pointer));
    assert_close(manager.builder().target_rotation().1, 0.5);
    assert_eq!(manager.builder().rotation(), (0.0, 0.0));

    manager.frame(&mut ctx);
    assert_close(manager.builder().rotation().1, 0.025);
    manager.frame(&mut ctx);
    assert_close(manager.builder().rotation().1, 0.025 + (0.5 - 0.025) * 0.05);
}

#[test]
fn should_ignore_events_after_dispose() {
    let (mut ctx, _) = headless(1280, 800);
    let key = container(&mut ctx, 800.0, 600.0);
    let mut manager = SceneManager::mount(ArchitectureGrid::default(), &mut ctx, key);
    manager.dispose(&mut ctx);

    let pointer = PointerPosition { x: 1640.0, y: 400.0 };
    manager.handle_event(&mut ctx, &HostEvent::PointerMove(pointer));
    assert_eq!(manager.builder().target_rotation(), (0.0, 0.0));
}

#[test]
fn should_not_construct_twice() {
    let (mut ctx, factory) = headless(1280, 800);
    let key = container(&mut ctx, 800.0, 600.0);
    let mut manager = SceneManager::mount(ArchitectureGrid::default(), &mut ctx, key);
    assert!(!manager.construct(&mut ctx));
    assert_eq!(factory.created(), 1);
    assert_eq!(ctx.subscriptions.len(), 3);
    manager.dispose(&mut ctx);
}
