mod common;

use archviz::{
    animation::splash::SplashConfig,
    context::Context,
    host::{ListenerKind, PointerPosition, Rect},
    page::{Page, PageLayout},
    render::LayerSource,
};
use instant::Duration;

use crate::common::{FRAME, assert_close, headless};

const TICK: Duration = Duration::from_millis(100);

fn open(page: &mut Page, ctx: &mut Context) {
    for _ in 0..25 {
        page.frame(ctx, TICK);
    }
}

fn assert_rect(actual: Rect, expected: Rect) {
    assert_close(actual.x, expected.x);
    assert_close(actual.y, expected.y);
    assert_close(actual.width, expected.width);
    assert_close(actual.height, expected.height);
}

#[test]
fn should_lay_out_sections_one_viewport_tall() {
    let layout = PageLayout::new(1280.0, 800.0);
    assert_eq!(layout.hero, Rect::new(0.0, 0.0, 1280.0, 800.0));
    assert_eq!(layout.interior.y, 800.0);
    assert_eq!(layout.work.y, 1600.0);
    assert_eq!(layout.height(), 2400.0);
    assert_eq!(layout.accent, Rect::new(992.0, 512.0, 256.0, 256.0));
}

#[test]
fn should_show_only_the_splash_before_the_gate() {
    let (mut ctx, factory) = headless(1280, 800);
    let mut page = Page::mount(&mut ctx, &SplashConfig::default());

    for _ in 0..24 {
        page.frame(&mut ctx, TICK);
    }
    assert!(!page.content_visible());
    assert_eq!(page.visuals().count(), 0);
    assert_eq!(factory.created(), 0);

    let layers = page.layers(&ctx);
    assert_eq!(layers.len(), 1);
    assert_eq!(layers[0].source, LayerSource::Overlay);
    assert_rect(layers[0].rect, Rect::new(0.0, 0.0, 1280.0, 800.0));

    // nothing scrolls under the splash
    page.scroll_by(&mut ctx, 500.0);
    assert_eq!(ctx.sequencer.scroll(), 0.0);
}

#[test]
fn should_mount_every_section_when_the_gate_opens() {
    let (mut ctx, factory) = headless(1280, 800);
    let mut page = Page::mount(&mut ctx, &SplashConfig::default());
    open(&mut page, &mut ctx);

    assert!(page.content_visible());
    assert!(page.splash().screen().is_none());
    let names: Vec<_> = page.visuals().map(|v| v.name()).collect();
    assert_eq!(names, ["architecture-grid", "wireframe", "floor-plan", "particles"]);
    assert_eq!(factory.created(), 4);
    assert_eq!(ctx.subscriptions.count(ListenerKind::AnimationFrame), 4);
    assert_eq!(ctx.subscriptions.count(ListenerKind::Scroll), 1);
    // the first frame ran on the tick that mounted them
    for visual in page.visuals() {
        assert_eq!(visual.render_stats().unwrap().frames, 1);
    }
}

#[test]
fn should_flatten_visible_sections_into_layers() {
    let (mut ctx, _) = headless(1280, 800);
    let mut page = Page::mount(&mut ctx, &SplashConfig::default());
    open(&mut page, &mut ctx);

    let layers = page.layers(&ctx);
    assert_eq!(layers.len(), 4);
    assert!(layers.iter().all(|l| matches!(l.source, LayerSource::Surface(_))));
    assert_rect(layers[0].rect, Rect::new(0.0, 0.0, 1280.0, 800.0));
    assert_rect(layers[1].rect, Rect::new(992.0, 512.0, 256.0, 256.0));
    assert_rect(layers[2].rect, Rect::new(640.0, 880.0, 576.0, 640.0));
    assert_eq!(layers[2].opacity, 1.0);
    // the particle field waits for its reveal, 30 px low
    assert_rect(layers[3].rect, Rect::new(128.0, 1710.0, 1024.0, 640.0));
    assert_eq!(layers[3].opacity, 0.0);
}

#[test]
fn should_clamp_scrolling_to_the_page() {
    let (mut ctx, _) = headless(1280, 800);
    let mut page = Page::mount(&mut ctx, &SplashConfig::default());
    open(&mut page, &mut ctx);
    assert_eq!(page.max_scroll(&ctx), 1600.0);

    page.scroll_by(&mut ctx, 1.0e6);
    assert_eq!(ctx.sequencer.scroll(), 1600.0);
    page.scroll_by(&mut ctx, -1.0e7);
    assert_eq!(ctx.sequencer.scroll(), 0.0);
}

#[test]
fn should_reveal_the_work_section_when_scrolled_to() {
    let (mut ctx, _) = headless(1280, 800);
    let mut page = Page::mount(&mut ctx, &SplashConfig::default());
    open(&mut page, &mut ctx);

    page.scroll_by(&mut ctx, 1600.0);
    for _ in 0..60 {
        page.frame(&mut ctx, FRAME);
    }
    let layers = page.layers(&ctx);
    let work = layers[3];
    assert_close(work.opacity, 1.0);
    assert_rect(work.rect, Rect::new(128.0, 80.0, 1024.0, 640.0));
    // the interior visual has drifted all the way up by now
    assert_close(layers[2].rect.y, 880.0 - 1600.0 - 50.0);
}

#[test]
fn should_judge_reveals_against_the_resized_layout() {
    let (mut ctx, _) = headless(1280, 800);
    let mut page = Page::mount(&mut ctx, &SplashConfig::default());
    open(&mut page, &mut ctx);

    // the reveal starts at 1520 for an 800 px viewport
    page.scroll_by(&mut ctx, 1500.0);
    assert_eq!(page.layers(&ctx)[3].opacity, 0.0);

    // and at 1900 once the viewport is 1000 px tall
    page.resize(&mut ctx, 1280, 1000);
    assert_eq!(ctx.sequencer.scroll(), 1500.0);
    for _ in 0..120 {
        page.frame(&mut ctx, FRAME);
    }
    assert_eq!(page.layers(&ctx)[3].opacity, 0.0);

    page.scroll_by(&mut ctx, 400.0);
    for _ in 0..60 {
        page.frame(&mut ctx, FRAME);
    }
    assert_close(page.layers(&ctx)[3].opacity, 1.0);
}

#[test]
fn should_move_the_hero_with_parallax() {
    let (mut ctx, _) = headless(1280, 800);
    let mut page = Page::mount(&mut ctx, &SplashConfig::default());
    open(&mut page, &mut ctx);

    page.scroll_by(&mut ctx, 400.0);
    let hero = page.layers(&ctx)[0];
    assert_close(hero.rect.y, -400.0 + 400.0 * 0.15);
}

#[test]
fn should_follow_window_resizes() {
    let (mut ctx, _) = headless(1280, 800);
    let mut page = Page::mount(&mut ctx, &SplashConfig::default());
    page.resize(&mut ctx, 640, 400);
    assert_rect(page.layers(&ctx)[0].rect, Rect::new(0.0, 0.0, 640.0, 400.0));

    open(&mut page, &mut ctx);
    assert_eq!(page.layout().hero, Rect::new(0.0, 0.0, 640.0, 400.0));
    let hero = page.visuals().next().unwrap();
    assert_close(hero.camera().unwrap().projection.aspect(), 1.6);

    page.resize(&mut ctx, 1600, 800);
    assert_eq!(ctx.viewport(), (1600, 800));
    let hero = page.visuals().next().unwrap();
    assert_close(hero.camera().unwrap().projection.aspect(), 2.0);
    assert_rect(page.layers(&ctx)[1].rect, Rect::new(1312.0, 512.0, 256.0, 256.0));
    assert_eq!(page.max_scroll(&ctx), 1600.0);
}

#[test]
fn should_forward_pointer_moves_to_visuals() {
    let (mut ctx, _) = headless(1280, 800);
    let mut page = Page::mount(&mut ctx, &SplashConfig::default());
    open(&mut page, &mut ctx);

    let before = page.visuals().nth(3).unwrap().camera().unwrap().position;
    page.pointer_moved(&mut ctx, PointerPosition { x: 1280.0, y: 0.0 });
    page.frame(&mut ctx, FRAME);
    let after = page.visuals().nth(3).unwrap().camera().unwrap().position;
    assert!(after.x > before.x);
    assert!(after.y > before.y);
}

#[test]
fn should_release_everything_on_dispose() {
    let (mut ctx, factory) = headless(1280, 800);
    let mut page = Page::mount(&mut ctx, &SplashConfig::default());
    open(&mut page, &mut ctx);
    page.scroll_by(&mut ctx, 700.0);
    page.dispose(&mut ctx);

    assert!(ctx.subscriptions.is_empty());
    assert!(ctx.timers.is_empty());
    assert_eq!(ctx.sequencer.element_count(), 0);
    assert_eq!(ctx.sequencer.active_triggers(), 0);
    assert_eq!(ctx.containers.iter().count(), 0);
    assert!(factory.all_stats().iter().all(|s| s.disposed));
    assert!(page.layers(&ctx).is_empty());
}

#[test]
fn should_cancel_the_gate_when_disposed_under_the_splash() {
    let (mut ctx, factory) = headless(1280, 800);
    let mut page = Page::mount(&mut ctx, &SplashConfig::default());
    page.frame(&mut ctx, TICK);
    page.dispose(&mut ctx);

    assert!(ctx.timers.is_empty());
    assert_eq!(ctx.sequencer.element_count(), 0);
    open(&mut page, &mut ctx);
    assert!(!page.content_visible());
    assert_eq!(factory.created(), 0);
}
