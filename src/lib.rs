//! archviz
//!
//! Decorative architectural scenes for a portfolio page and the animation
//! sequencer that reveals them. Four visuals (a rotating wireframe building,
//! a perspective grid, a connected particle field and a labelled floor plan)
//! each own a scene graph, a camera and a renderer. They are mounted into
//! page containers, follow the pointer and are disposed without leaking
//! listeners, timers or GPU resources.
//!
//! High-level modules
//! - `host`: containers, listener and timer registries, host events
//! - `context`: the application context that replaces page-level globals
//! - `lifecycle`: mounting, resizing and disposing a visual
//! - `scenes`: the four scene builders
//! - `animation`: easing, tweens, timelines, scroll triggers, splash, parallax
//! - `render` / `gpu` / `pipelines`: renderer abstraction, wgpu backend, shaders
//! - `page`: the demo page tying splash, sections and visuals together
//! - `flow`: the winit event loop
//!

pub mod animation;
pub mod camera;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod gpu;
pub mod host;
pub mod labels;
pub mod lifecycle;
pub mod page;
pub mod pipelines;
pub mod render;
pub mod scenes;

pub use context::{Context, ContextConfig};
pub use flow::run;
pub use lifecycle::{Visual, VisualOptions, mount_visual};
pub use scenes::VisualKind;
