mod common;

use archviz::{
    animation::{
        ElementKey,
        easing::Ease,
        parallax::{DEFAULT_SPEED, InteriorSection, ParallaxLayer},
        props::Prop,
        reveal::{RevealConfig, RevealKind, reveal, reveal_staggered},
        scroll::{Edge, TriggerPosition},
        sequencer::Sequencer,
        splash::{Splash, SplashConfig, SplashScreen, splash_timeline},
        timeline::{Position, Timeline},
        tween::Tween,
    },
    host::{ListenerKind, Rect},
};
use instant::Duration;

use crate::common::{assert_close, headless};

#[test]
fn should_ease_with_power_curves() {
    assert_close(Ease::POWER2_OUT.apply(0.5), 1.0 - 0.125);
    assert_close(Ease::POWER2_IN.apply(0.5), 0.125);
    assert_close(Ease::Linear.apply(0.3), 0.3);
    assert_eq!(Ease::POWER3_OUT.apply(2.0), 1.0);
}

#[test]
fn should_parse_timeline_positions() {
    assert_eq!("-=0.5".parse::<Position>().unwrap(), Position::Relative(-0.5));
    assert_eq!("+=1".parse::<Position>().unwrap(), Position::Relative(1.0));
    assert_eq!("<".parse::<Position>().unwrap(), Position::WithPrevious);
    assert_eq!("2".parse::<Position>().unwrap(), Position::Absolute(2.0));
    assert_eq!("".parse::<Position>().unwrap(), Position::End);
    assert!("soon".parse::<Position>().is_err());
}

#[test]
fn should_parse_trigger_positions() {
    let p: TriggerPosition = "top 80%".parse().unwrap();
    assert_eq!(p, TriggerPosition::new(Edge::TOP, Edge::Fraction(0.8)));
    let p: TriggerPosition = "center".parse().unwrap();
    assert_eq!(p, TriggerPosition::new(Edge::CENTER, Edge::CENTER));
    let p: TriggerPosition = "100px top".parse().unwrap();
    assert_eq!(p, TriggerPosition::new(Edge::Pixels(100.0), Edge::TOP));
    assert!("".parse::<TriggerPosition>().is_err());
    assert!("top bottom center".parse::<TriggerPosition>().is_err());

    let element = Rect::new(0.0, 1000.0, 100.0, 100.0);
    assert_close(p.scroll_offset(&element, 800.0), 1100.0);
    // element top at the 80% line of an 800 px viewport
    let p: TriggerPosition = "top 80%".parse().unwrap();
    assert_close(p.scroll_offset(&element, 800.0), 360.0);
}

#[test]
fn should_parse_reveal_kinds() {
    assert_eq!("fade-left".parse::<RevealKind>().unwrap(), RevealKind::FadeLeft);
    assert_eq!("scale-in".parse::<RevealKind>().unwrap(), RevealKind::ScaleIn);
    assert!("explode".parse::<RevealKind>().is_err());
}

#[test]
fn should_place_tweens_on_the_timeline() {
    let mut sequencer = Sequencer::new(800.0);
    let a = sequencer.add_element(Rect::default());
    let b = sequencer.add_element(Rect::default());
    let mut timeline = Timeline::new();
    assert_eq!(timeline.add(Tween::to(a, &[(Prop::Opacity, 0.0)], 1.0), Position::End), 0.0);
    assert_close(timeline.add(Tween::to(b, &[(Prop::X, 10.0)], 1.0), Position::Relative(-0.25)), 0.75);
    assert_close(timeline.add(Tween::to(a, &[(Prop::Y, 5.0)], 0.5), Position::WithPrevious), 0.75);
    assert_close(timeline.add(Tween::to(b, &[(Prop::Y, 5.0)], 0.5), Position::Absolute(3.0)), 3.0);
    assert_close(timeline.duration(), 3.5);
    assert_eq!(timeline.len(), 4);
}

#[test]
fn should_schedule_the_splash_sequence() {
    let mut sequencer = Sequencer::new(800.0);
    let screen = SplashScreen::mount(&mut sequencer, Rect::new(0.0, 0.0, 1280.0, 800.0));
    let elements = *screen.elements();
    let timeline = splash_timeline(&elements);
    assert_close(timeline.duration(), 4.2);

    let schedule = timeline.schedule();
    let starts = |target: ElementKey| -> Vec<(f32, f32, f32)> {
        schedule
            .iter()
            .filter(|(t, ..)| *t == target)
            .map(|(_, start, begin, end)| (*start, *begin, *end))
            .collect()
    };
    let logo = starts(elements.logo);
    assert_close(logo[0].0, 0.0);
    assert_close(logo[0].2, 1.0);
    let text = starts(elements.text);
    assert_close(text[0].0, 0.5);
    assert_close(text[0].2, 1.3);
    for (line, expected) in elements.lines.iter().zip([1.0, 1.1, 1.2]) {
        assert_close(starts(*line)[0].0, expected);
    }
    // fade out after a one second hold
    for target in [elements.logo, elements.text, elements.rules] {
        let out = *starts(target).last().unwrap();
        assert_close(out.1, 3.0);
        assert_close(out.2, 3.6);
    }
    let overlay = starts(elements.overlay);
    assert_close(overlay[0].0, 3.4);
    assert_close(overlay[0].2, 4.2);
}

#[test]
fn should_play_the_splash_to_the_end() {
    let mut sequencer = Sequencer::new(800.0);
    let screen = SplashScreen::mount(&mut sequencer, Rect::new(0.0, 0.0, 1280.0, 800.0));
    let elements = *screen.elements();
    let logo = sequencer.props(elements.logo).unwrap();
    assert_eq!((logo.opacity, logo.scale), (0.0, 0.8));

    sequencer.advance(1.0);
    let logo = sequencer.props(elements.logo).unwrap();
    assert_close(logo.opacity, 1.0);
    assert_close(logo.scale, 1.0);

    sequencer.advance(1.0);
    for line in elements.lines {
        assert_close(sequencer.props(line).unwrap().width_percent, 100.0);
    }

    sequencer.advance(2.5);
    assert_close(sequencer.props(elements.overlay).unwrap().y_percent, -100.0);
    let logo = sequencer.props(elements.logo).unwrap();
    assert_close(logo.opacity, 0.0);
    assert_close(logo.y, -20.0);
    assert_eq!(sequencer.active_timelines(), 0);

    screen.unmount(&mut sequencer);
    assert_eq!(sequencer.element_count(), 0);
}

#[test]
fn should_open_the_splash_gate_at_exactly_two_and_a_half_seconds() {
    let (mut ctx, _) = headless(1280, 800);
    let mut splash = Splash::start(&mut ctx, &SplashConfig::default());
    assert_eq!(ctx.timers.len(), 1);

    for _ in 0..24 {
        let fired = ctx.tick(Duration::from_millis(100));
        assert!(!splash.update(&mut ctx, &fired));
    }
    assert!(!splash.content_visible());
    assert!(splash.screen().is_some());

    let fired = ctx.tick(Duration::from_millis(100));
    assert!(splash.update(&mut ctx, &fired));
    assert!(splash.content_visible());
    assert_eq!(splash.gate().opened_at(), Some(Duration::from_millis(2500)));
    assert!(splash.screen().is_none());
    assert_eq!(ctx.sequencer.element_count(), 0);
    assert!(ctx.timers.is_empty());
}

#[test]
fn should_report_the_deadline_for_coarse_ticks() {
    let (mut ctx, _) = headless(1280, 800);
    let mut splash = Splash::start(&mut ctx, &SplashConfig::default());
    let fired = ctx.tick(Duration::from_secs(4));
    assert!(splash.update(&mut ctx, &fired));
    assert_eq!(splash.gate().opened_at(), Some(Duration::from_millis(2500)));
}

#[test]
fn should_clear_the_gate_when_disposed_early() {
    let (mut ctx, _) = headless(1280, 800);
    let mut splash = Splash::start(&mut ctx, &SplashConfig::default());
    ctx.tick(Duration::from_secs(1));
    splash.dispose(&mut ctx);

    assert!(ctx.timers.is_empty());
    assert_eq!(ctx.sequencer.element_count(), 0);
    assert_eq!(ctx.sequencer.active_timelines(), 0);
    let fired = ctx.tick(Duration::from_secs(5));
    assert!(!splash.update(&mut ctx, &fired));
    assert!(!splash.content_visible());
}

#[test]
fn should_reveal_on_scroll_exactly_once() {
    let mut sequencer = Sequencer::new(800.0);
    let element = sequencer.add_element(Rect::new(0.0, 1600.0, 400.0, 200.0));
    let trigger = reveal(&mut sequencer, element, &RevealConfig::default()).unwrap();

    // hidden and displaced until the bottom edges meet at scroll 1000
    sequencer.scroll_to(500.0);
    let props = sequencer.props(element).unwrap();
    assert_eq!((props.opacity, props.y), (0.0, 30.0));
    assert_eq!(sequencer.trigger(trigger).unwrap().fired(), 0);

    sequencer.scroll_to(1100.0);
    assert_eq!(sequencer.trigger(trigger).unwrap().fired(), 1);
    sequencer.advance(1.0);
    assert!(sequencer.props(element).unwrap().is_at_rest());
    assert_eq!(sequencer.active_triggers(), 0);

    sequencer.scroll_to(0.0);
    sequencer.scroll_to(1100.0);
    sequencer.advance(1.0);
    assert!(sequencer.props(element).unwrap().is_at_rest());
    assert!(!sequencer.is_animating(element));
}

#[test]
fn should_replay_when_asked_to() {
    let mut sequencer = Sequencer::new(800.0);
    let element = sequencer.add_element(Rect::new(0.0, 1600.0, 400.0, 200.0));
    let config = RevealConfig {
        replay: true,
        ..Default::default()
    };
    let trigger = reveal(&mut sequencer, element, &config).unwrap();

    sequencer.scroll_to(1100.0);
    sequencer.advance(1.0);
    sequencer.scroll_to(0.0);
    let props = sequencer.props(element).unwrap();
    assert_eq!((props.opacity, props.y), (0.0, 30.0));

    sequencer.scroll_to(1100.0);
    assert_eq!(sequencer.trigger(trigger).unwrap().fired(), 2);
}

#[test]
fn should_start_revealing_elements_already_in_view() {
    let mut sequencer = Sequencer::new(800.0);
    let element = sequencer.add_element(Rect::new(0.0, 100.0, 400.0, 200.0));
    let trigger = reveal(&mut sequencer, element, &RevealConfig::kind(RevealKind::ScaleIn)).unwrap();
    assert_eq!(sequencer.trigger(trigger).unwrap().fired(), 1);
    sequencer.advance(0.8);
    assert!(sequencer.props(element).unwrap().is_at_rest());
}

#[test]
fn should_stagger_reveal_delays() {
    let mut sequencer = Sequencer::new(800.0);
    let elements: Vec<_> = (0..3)
        .map(|i| sequencer.add_element(Rect::new(0.0, i as f32 * 50.0, 100.0, 40.0)))
        .collect();
    let triggers = reveal_staggered(&mut sequencer, &elements, &RevealConfig::default(), 0.2);
    assert_eq!(triggers.len(), 3);

    // everything is in view; after 0.9 s only the first has finished
    sequencer.advance(0.9);
    assert!(sequencer.props(elements[0]).unwrap().is_at_rest());
    assert!(sequencer.props(elements[2]).unwrap().opacity < 1.0);
    sequencer.advance(0.5);
    assert!(sequencer.props(elements[2]).unwrap().is_at_rest());
}

#[test]
fn should_cancel_triggers_with_their_element() {
    let mut sequencer = Sequencer::new(800.0);
    let element = sequencer.add_element(Rect::new(0.0, 1600.0, 400.0, 200.0));
    reveal(&mut sequencer, element, &RevealConfig::default());
    assert_eq!(sequencer.triggers_for(element), 1);

    let cancelled = sequencer.remove_element(element);
    assert_eq!(cancelled.triggers, 1);
    assert_eq!(sequencer.active_triggers(), 0);
    assert_eq!(sequencer.remove_element(element), Default::default());
}

#[test]
fn should_scrub_the_interior_drift() {
    let mut sequencer = Sequencer::new(800.0);
    let section = Rect::new(0.0, 800.0, 1280.0, 800.0);
    let content = Rect::new(100.0, 1000.0, 500.0, 400.0);
    let visual = Rect::new(640.0, 880.0, 576.0, 640.0);
    let interior = InteriorSection::mount(&mut sequencer, section, content, visual);

    // section top meets the viewport bottom at 0, its bottom meets the top at 1600
    sequencer.scroll_to(800.0);
    assert_close(sequencer.props(interior.visual).unwrap().y, InteriorSection::DRIFT / 2.0);
    sequencer.scroll_to(1600.0);
    assert_close(sequencer.props(interior.visual).unwrap().y, InteriorSection::DRIFT);
    sequencer.scroll_to(0.0);
    assert_close(sequencer.props(interior.visual).unwrap().y, 0.0);

    interior.unmount(&mut sequencer);
    assert_eq!(sequencer.element_count(), 0);
    assert_eq!(sequencer.active_triggers(), 0);
}

#[test]
fn should_reveal_interior_content_at_eighty_percent() {
    let mut sequencer = Sequencer::new(800.0);
    let section = Rect::new(0.0, 800.0, 1280.0, 800.0);
    let content = Rect::new(100.0, 1000.0, 500.0, 400.0);
    let visual = Rect::new(640.0, 880.0, 576.0, 640.0);
    let interior = InteriorSection::mount(&mut sequencer, section, content, visual);

    let props = sequencer.props(interior.content).unwrap();
    assert_eq!((props.opacity, props.y), (0.0, 50.0));

    // section top at 640 px, 80% of the viewport
    sequencer.scroll_to(150.0);
    sequencer.advance(1.0);
    assert_eq!(sequencer.props(interior.content).unwrap().opacity, 0.0);

    sequencer.scroll_to(170.0);
    sequencer.advance(1.0);
    let props = sequencer.props(interior.content).unwrap();
    assert_close(props.opacity, 1.0);
    assert_close(props.y, 0.0);
}

#[test]
fn should_move_the_parallax_layer_while_in_view() {
    let (mut ctx, _) = headless(1280, 800);
    let section = Rect::new(0.0, 0.0, 1280.0, 800.0);
    let mut layer = ParallaxLayer::mount(&mut ctx, section, DEFAULT_SPEED);
    assert_eq!(ctx.subscriptions.count(ListenerKind::Scroll), 1);

    layer.on_scroll(400.0, 800.0);
    assert_close(layer.translate_y(), 60.0);
    // out of view keeps the last offset
    layer.on_scroll(2000.0, 800.0);
    assert_close(layer.translate_y(), 60.0);

    layer.dispose(&mut ctx);
    assert!(ctx.subscriptions.is_empty());
    layer.on_scroll(0.0, 800.0);
    assert_close(layer.translate_y(), 60.0);
}
