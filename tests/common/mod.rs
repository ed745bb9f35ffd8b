#![allow(dead_code)]

use archviz::{
    context::Context,
    host::{Container, ContainerKey, Rect},
    render::HeadlessRendererFactory,
};
use instant::Duration;

/// One display refresh at 60 Hz.
pub const FRAME: Duration = Duration::from_micros(16_667);

/// Headless context plus a handle on every renderer it creates.
pub fn headless(width: u32, height: u32) -> (Context, HeadlessRendererFactory) {
    let factory = HeadlessRendererFactory::new();
    let ctx = Context::headless_with(width, height, factory.clone());
    (ctx, factory)
}

pub fn container(ctx: &mut Context, width: f32, height: f32) -> ContainerKey {
    ctx.containers
        .insert(Container::new(Rect::new(0.0, 0.0, width, height)))
}

pub fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-4,
        "expected {} but got {}",
        expected,
        actual
    );
}
