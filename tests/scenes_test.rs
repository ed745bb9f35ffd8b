mod common;

use archviz::{
    data_structures::{
        geometry::{BLACK, Topology, WHITE},
        scene_graph::NodeKind,
    },
    labels::{LabelPainter, LabelStyle},
    lifecycle::{SceneManager, Visual},
    scenes::{
        VisualKind,
        floor_plan::{FloorPlan, FloorPlanConfig, ROOM_LABELS},
        grid::ArchitectureGrid,
        particles::{ParticleField, ParticleFieldConfig, ParticleSet, connection_opacity, connections},
        wireframe::{Wireframe, WireframeConfig},
    },
};
use cgmath::{InnerSpace, Vector3};

use crate::common::{assert_close, container, headless};

fn seeded() -> ParticleFieldConfig {
    ParticleFieldConfig {
        seed: Some(7),
        ..Default::default()
    }
}

#[test]
fn should_build_the_wireframe_building() {
    let (mut ctx, _) = headless(1280, 800);
    let key = container(&mut ctx, 256.0, 256.0);
    let mut manager = SceneManager::mount(Wireframe::new(WireframeConfig::default()), &mut ctx, key);

    let scene = manager.scene().unwrap();
    assert_eq!(manager.builder().structures().len(), 9);
    for name in ["base", "tower-1", "tower-4", "beam-1-2", "beam-2-4", "grid"] {
        assert!(scene.find(name).is_some(), "missing {}", name);
    }
    assert_eq!(scene.count_by_topology(Topology::LineList), 10);
    let grid = &scene.get(scene.find("grid").unwrap()).unwrap().drawable().unwrap().material;
    assert_eq!(grid.color, WHITE);
    assert_close(grid.opacity, 0.2);
    let base = &scene.get(scene.find("base").unwrap()).unwrap().drawable().unwrap().material;
    assert_eq!(base.color, BLACK);

    manager.frame(&mut ctx);
    let stats = manager.render_stats().unwrap();
    assert_eq!(stats.draw_calls, 10);
    // 18 distinct triangle edges per box, 11 + 11 grid lines
    assert_eq!(stats.line_segments, 9 * 18 + 22);
}

#[test]
fn should_spin_structures_and_grid_independently() {
    let (mut ctx, _) = headless(1280, 800);
    let key = container(&mut ctx, 256.0, 256.0);
    let mut manager = SceneManager::mount(Wireframe::new(WireframeConfig::default()), &mut ctx, key);
    for _ in 0..10 {
        manager.frame(&mut ctx);
    }

    let scene = manager.scene().unwrap();
    let tower = scene.find("tower-1").unwrap();
    let grid = manager.builder().grid().unwrap();
    assert_close(scene.transform(tower).unwrap().rotation.y, 0.03);
    assert_close(scene.transform(grid).unwrap().rotation.y, 0.01);
}

#[test]
fn should_build_the_architecture_grid() {
    let (mut ctx, _) = headless(1280, 800);
    let key = container(&mut ctx, 1280.0, 800.0);
    let mut manager = SceneManager::mount(ArchitectureGrid::default(), &mut ctx, key);
    manager.frame(&mut ctx);

    let stats = manager.render_stats().unwrap();
    assert_eq!(stats.draw_calls, 6);
    assert_eq!(stats.line_segments, 42 + 4 * 12);
    assert_eq!(stats.triangles, 2);
    let floor = manager.scene().unwrap().find("floor").unwrap();
    let node = manager.scene().unwrap().get(floor).unwrap();
    assert_eq!(node.kind, NodeKind::Mesh);
    assert!(node.drawable().unwrap().material.double_sided);
}

#[test]
fn should_keep_particles_inside_the_bound() {
    let (mut ctx, _) = headless(1280, 800);
    let key = container(&mut ctx, 800.0, 600.0);
    let mut manager = SceneManager::mount(ParticleField::new(seeded()), &mut ctx, key);
    for _ in 0..600 {
        manager.frame(&mut ctx);
    }

    let particles = manager.builder().particles();
    assert_eq!(particles.len(), 150);
    for p in particles.positions() {
        for axis in 0..3 {
            assert!(p[axis].abs() <= 5.0, "particle escaped: {:?}", p);
        }
    }
    let stats = manager.render_stats().unwrap();
    assert_eq!(stats.points, 150);
}

#[test]
fn should_connect_only_close_particles() {
    let (mut ctx, _) = headless(1280, 800);
    let key = container(&mut ctx, 800.0, 600.0);
    let mut manager = SceneManager::mount(ParticleField::new(seeded()), &mut ctx, key);
    for _ in 0..30 {
        manager.frame(&mut ctx);
    }

    let field = manager.builder();
    let positions = field.particles().positions();
    for c in field.connections() {
        assert!(c.a < c.b);
        assert!(c.distance < 1.5);
        assert!(c.opacity > 0.0 && c.opacity <= 0.2);
        assert_close(c.distance, (positions[c.a] - positions[c.b]).magnitude());
    }
    assert_eq!(manager.render_stats().unwrap().line_segments, field.connections().len());
}

#[test]
fn should_fade_connections_with_distance() {
    assert_close(connection_opacity(0.75, 1.5, 0.2), 0.1);
    assert_close(connection_opacity(0.0, 1.5, 0.2), 0.2);
    assert_eq!(connection_opacity(2.0, 1.5, 0.2), 0.0);

    let positions = [
        Vector3::new(0.0, 0.0, 0.0),
        Vector3::new(0.75, 0.0, 0.0),
        Vector3::new(3.0, 0.0, 0.0),
    ];
    let found = connections(&positions, 1.5, 0.2);
    assert_eq!(found.len(), 1);
    assert_eq!((found[0].a, found[0].b), (0, 1));
    assert_close(found[0].opacity, 0.1);
}

#[test]
fn should_bounce_off_the_walls() {
    let particles = ParticleSet::from_parts(
        vec![Vector3::new(4.99, 0.0, -4.99)],
        vec![Vector3::new(0.02, 0.0, -0.02)],
        5.0,
    );
    let (mut ctx, _) = headless(1280, 800);
    let key = container(&mut ctx, 800.0, 600.0);
    let mut manager = SceneManager::mount(
        ParticleField::with_particles(ParticleFieldConfig::default(), particles),
        &mut ctx,
        key,
    );
    manager.frame(&mut ctx);

    let set = manager.builder().particles();
    assert_close(set.positions()[0].x, 4.99);
    assert_close(set.positions()[0].z, -4.99);
    assert_close(set.velocities()[0].x, -0.02);
    assert_close(set.velocities()[0].z, 0.02);
}

#[test]
fn should_fold_runaway_particles_back_inside() {
    let mut particles = ParticleSet::from_parts(
        vec![Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0)],
        vec![Vector3::new(1e10, 0.0, 0.0), Vector3::new(f32::MAX, f32::NAN, 0.0)],
        5.0,
    );
    for _ in 0..3 {
        particles.step();
    }

    for p in particles.positions() {
        for axis in 0..3 {
            assert!(p[axis].is_finite() && p[axis].abs() <= 5.0, "particle escaped: {:?}", p);
        }
    }
    assert_eq!(particles.velocities()[0].x.abs(), 1e10);
    assert_eq!(particles.velocities()[1].y, 0.0);
}

#[test]
fn should_follow_the_pointer_with_the_camera() {
    let (mut ctx, _) = headless(1280, 800);
    let key = container(&mut ctx, 800.0, 600.0);
    let mut manager = SceneManager::mount(ParticleField::new(seeded()), &mut ctx, key);
    let pointer = archviz::host::PointerPosition { x: 1640.0, y: 400.0 };
    manager.handle_event(&mut ctx, &archviz::host::HostEvent::PointerMove(pointer));
    for _ in 0..500 {
        manager.frame(&mut ctx);
    }
    // pointer 1000 px right, scaled by 0.001
    assert_close(manager.camera().unwrap().position.x, 1.0);
}

#[test]
fn should_label_every_room() {
    let (mut ctx, _) = headless(1280, 800);
    let key = container(&mut ctx, 600.0, 400.0);
    let plan = FloorPlan::new(FloorPlanConfig::default(), &LabelPainter::without_fonts());
    let mut manager = SceneManager::mount(plan, &mut ctx, key);
    manager.frame(&mut ctx);

    let scene = manager.scene().unwrap();
    assert_eq!(scene.count_by_topology(Topology::TriangleList), 1 + ROOM_LABELS.len());
    for (text, _) in ROOM_LABELS {
        let id = scene.find(text).unwrap();
        let node = scene.get(id).unwrap();
        assert_eq!(node.kind, NodeKind::Sprite);
        let map = node.drawable().unwrap().material.map.as_ref().unwrap();
        assert_eq!(map.dimensions(), (256, 128));
    }

    let stats = manager.render_stats().unwrap();
    assert_eq!(stats.sprites, 3);
    assert_eq!(stats.triangles, 2);
    // walls 4 + 2 + 2, furniture 4 + 4
    assert_eq!(stats.line_segments, 16);
}

#[test]
fn should_release_the_floor_plan_through_its_group() {
    let (mut ctx, factory) = headless(1280, 800);
    let key = container(&mut ctx, 600.0, 400.0);
    let plan = FloorPlan::new(FloorPlanConfig::default(), &LabelPainter::without_fonts());
    let mut manager = SceneManager::mount(plan, &mut ctx, key);
    manager.dispose(&mut ctx);

    let released = manager.released();
    // group, floor, three walls, two pieces of furniture, three labels
    assert_eq!(released.nodes, 10);
    assert_eq!(released.textures, 3);
    let stats = factory.stats(manager.surface().unwrap()).unwrap();
    assert_eq!(stats.released, released.resources());
}

#[test]
fn should_leave_blank_labels_without_fonts() {
    let painter = LabelPainter::without_fonts();
    assert!(!painter.has_fonts());
    let canvas = painter.paint("Kitchen", &LabelStyle::default());
    assert!(canvas.pixels().all(|p| p.0[3] == 0));
}

#[test]
fn should_paint_labels_centred_at_the_label_alpha() {
    let painter = LabelPainter::system();
    if !painter.has_fonts() {
        return;
    }
    let style = LabelStyle::default();
    let canvas = painter.paint("Living Room", &style);
    assert_eq!(canvas.dimensions(), (256, 128));

    let inked: Vec<(u32, u32)> = canvas
        .enumerate_pixels()
        .filter(|(_, _, p)| p.0[3] > 0)
        .map(|(x, y, _)| (x, y))
        .collect();
    assert!(!inked.is_empty());
    // black at most 0.7 opaque
    assert!(canvas.pixels().all(|p| p.0[3] <= 179));
    assert!(canvas.pixels().filter(|p| p.0[3] > 0).all(|p| p.0[..3] == [0, 0, 0]));

    // glyphs sit on the middle baseline and straddle the vertical centre line
    assert!(inked.iter().all(|&(_, y)| y < 64 + 12));
    assert!(inked.iter().any(|&(x, _)| x < 128) && inked.iter().any(|&(x, _)| x > 128));
}

#[test]
fn should_parse_visual_kinds() {
    assert_eq!("wireframe".parse::<VisualKind>().unwrap(), VisualKind::Wireframe);
    assert_eq!("grid".parse::<VisualKind>().unwrap(), VisualKind::ArchitectureGrid);
    assert_eq!("floor-plan".parse::<VisualKind>().unwrap(), VisualKind::FloorPlan);
    assert_eq!("particles".parse::<VisualKind>().unwrap(), VisualKind::Particles);
    assert!("teapot".parse::<VisualKind>().is_err());
    assert_eq!(VisualKind::default(), VisualKind::Wireframe);
}
