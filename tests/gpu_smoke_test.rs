#[cfg(feature = "integration-tests")]
mod common;

#[cfg(feature = "integration-tests")]
fn wgpu_context(
    width: u32,
    height: u32,
) -> (
    archviz::Context,
    archviz::gpu::renderer::WgpuRendererFactory,
    tokio::runtime::Runtime,
) {
    use archviz::{
        context::{Context, ContextConfig},
        gpu::{create_instance, renderer::WgpuRendererFactory, request_device},
    };

    let instance = create_instance();
    let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
    let (_, device, queue) = runtime
        .block_on(request_device(&instance, None))
        .expect("a graphics adapter");
    let factory = WgpuRendererFactory::new(&device, &queue);
    let ctx = Context::new(
        ContextConfig {
            viewport: (width, height),
            ..Default::default()
        },
        Box::new(factory.clone()),
    );
    (ctx, factory, runtime)
}

#[test]
#[cfg(feature = "integration-tests")]
fn should_render_the_wireframe_off_screen() {
    use archviz::{VisualOptions, mount_visual, scenes::VisualKind};

    let (mut ctx, factory, runtime) = wgpu_context(320, 200);
    let key = common::container(&mut ctx, 128.0, 128.0);
    let mut visual = mount_visual(&mut ctx, VisualKind::Wireframe, Some(key), &VisualOptions::default());
    let surface = visual.surface().unwrap();
    visual.frame(&mut ctx);

    let image = runtime.block_on(factory.read_target(surface)).unwrap().unwrap();
    assert_eq!(image.dimensions(), (128, 128));
    // lines on a transparent background
    assert!(image.pixels().any(|p| p.0[3] > 0));
    assert!(image.pixels().any(|p| p.0[3] == 0));

    visual.dispose(&mut ctx);
    assert!(runtime.block_on(factory.read_target(surface)).unwrap().is_none());
}

#[test]
#[cfg(feature = "integration-tests")]
fn should_size_targets_by_the_pixel_ratio() {
    use archviz::{VisualOptions, mount_visual, scenes::VisualKind};

    let (mut ctx, factory, runtime) = wgpu_context(320, 200);
    ctx.set_device_pixel_ratio(2.0);
    let key = common::container(&mut ctx, 100.0, 50.0);
    let mut visual = mount_visual(&mut ctx, VisualKind::ArchitectureGrid, Some(key), &VisualOptions::default());
    visual.frame(&mut ctx);

    let image = runtime
        .block_on(factory.read_target(visual.surface().unwrap()))
        .unwrap().unwrap();
    assert_eq!(image.dimensions(), (200, 100));
    visual.dispose(&mut ctx);
}
