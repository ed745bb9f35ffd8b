mod common;

use archviz::{
    data_structures::geometry::Geometry,
    gpu::{
        compositor::{is_visible, quad},
        renderer::{billboard_points, sprite_quad},
    },
    host::Rect,
};
use cgmath::{Matrix4, SquareMatrix, Vector3};

use crate::common::assert_close;

#[test]
fn should_map_a_full_window_layer_to_clip_space() {
    let vertices = quad(Rect::new(0.0, 0.0, 800.0, 600.0), (800, 600), 0.5);
    let top_left = vertices[0];
    assert_eq!(top_left.position, [-1.0, 1.0]);
    assert_eq!(top_left.tex_coords, [0.0, 0.0]);
    // bottom right
    assert_eq!(vertices[2].position, [1.0, -1.0]);
    assert_eq!(vertices[2].tex_coords, [1.0, 1.0]);
    assert_eq!(vertices[5].position, [1.0, 1.0]);
    assert!(vertices.iter().all(|v| v.opacity == 0.5));
}

#[test]
fn should_place_a_corner_layer() {
    let vertices = quad(Rect::new(600.0, 450.0, 200.0, 150.0), (800, 600), 1.0);
    assert_close(vertices[0].position[0], 0.5);
    assert_close(vertices[0].position[1], -0.5);
    assert_close(vertices[4].position[0], 1.0);
    assert_close(vertices[4].position[1], -1.0);
}

#[test]
fn should_skip_layers_outside_the_window() {
    let viewport = (800, 600);
    assert!(is_visible(&Rect::new(0.0, 0.0, 800.0, 600.0), viewport));
    assert!(is_visible(&Rect::new(-100.0, 590.0, 200.0, 100.0), viewport));
    assert!(!is_visible(&Rect::new(0.0, -600.0, 800.0, 600.0), viewport));
    assert!(!is_visible(&Rect::new(0.0, 600.0, 800.0, 600.0), viewport));
    assert!(!is_visible(&Rect::new(10.0, 10.0, 0.0, 50.0), viewport));
}

#[test]
fn should_expand_points_into_camera_facing_quads() {
    let geometry = Geometry::points(&[Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 2.0, 3.0)]);
    let world = Matrix4::from_translation(Vector3::new(0.0, 0.0, -1.0));
    let vertices = billboard_points(
        &geometry,
        world,
        Vector3::unit_x(),
        Vector3::unit_y(),
        0.05,
    );
    assert_eq!(vertices.len(), 12);

    for (corner, vertex) in vertices[..6].iter().enumerate() {
        let [x, y, z] = vertex.position;
        assert_close(x.abs(), 0.025);
        assert_close(y.abs(), 0.025);
        assert_close(z, -1.0);
        assert_eq!(vertex.color, [1.0, 1.0, 1.0, 1.0], "corner {}", corner);
    }
    let [x, y, z] = vertices[6].position;
    assert_close(x, 0.975);
    assert_close(y, 1.975);
    assert_close(z, 2.0);
}

#[test]
fn should_scale_sprites_with_their_node() {
    let geometry = Geometry::plane(1.0, 1.0);
    let world = Matrix4::from_translation(Vector3::new(2.0, 0.0, 0.0))
        * Matrix4::from_nonuniform_scale(2.0, 1.0, 1.0);
    let vertices = sprite_quad(&geometry, world, Vector3::unit_x(), Vector3::unit_y());
    assert_eq!(vertices.len(), 6);

    // first corner is the plane's bottom left
    assert_close(vertices[0].position[0], 1.0);
    assert_close(vertices[0].position[1], -0.5);
    assert_eq!(vertices[0].tex_coords, [0.0, 1.0]);
    // fifth is its top right
    assert_close(vertices[4].position[0], 3.0);
    assert_close(vertices[4].position[1], 0.5);
    assert_eq!(vertices[4].tex_coords, [1.0, 0.0]);

    let identity = sprite_quad(&geometry, Matrix4::identity(), Vector3::unit_x(), Vector3::unit_y());
    assert_close(identity[0].position[0], -0.5);
}
