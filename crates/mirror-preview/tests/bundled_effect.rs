use std::sync::Arc;

use filter_host::{GraphicsContext, Locale, Module, Settings, DEFAULT_LOCALE};
use image::{Rgba, RgbaImage};
use mirror_filter::{MirrorFilter, SETTING_SWITCH_LEFT_TO_RIGHT};
use renderer::{FilterPass, Frame, GpuContext, GpuOptions, WgpuGraphics};

const RED: [u8; 4] = [255, 0, 0, 255];
const GREEN: [u8; 4] = [0, 255, 0, 255];
const WHITE: [u8; 4] = [255, 255, 255, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];

/// Returns early on machines without any adapter.
fn graphics() -> Option<Arc<GraphicsContext<WgpuGraphics>>> {
    let options = GpuOptions {
        allow_fallback: true,
        ..GpuOptions::default()
    };
    match GpuContext::headless(options) {
        Ok(ctx) => Some(Arc::new(GraphicsContext::new(WgpuGraphics::new(ctx)))),
        Err(err) => {
            eprintln!("skipping GPU test: {err:#}");
            None
        }
    }
}

fn strip() -> RgbaImage {
    let mut image = RgbaImage::new(4, 1);
    for (x, color) in [RED, GREEN, WHITE, BLUE].into_iter().enumerate() {
        image.put_pixel(x as u32, 0, Rgba(color));
    }
    image
}

fn row(image: &RgbaImage) -> Vec<[u8; 4]> {
    image.pixels().map(|pixel| pixel.0).collect()
}

fn render(
    graphics: &GraphicsContext<WgpuGraphics>,
    filter: &mut MirrorFilter,
    input: &RgbaImage,
) -> RgbaImage {
    let mut gfx = graphics.enter();
    let frame = Frame::from_rgba(gfx.context(), input).unwrap();
    let mut pass = FilterPass::new(&mut gfx, Some(&frame));
    filter.render(&mut pass);
    let output = pass.into_output().expect("mirror filter drew nothing");
    output.read_rgba(gfx.context()).unwrap()
}

#[test]
fn bundled_effect_mirrors_only_when_switched() {
    let Some(graphics) = graphics() else { return };
    let data_dir = mirror_filter::bundled_data_dir();
    let locale = Locale::load(&data_dir, DEFAULT_LOCALE).unwrap();
    let module = Module::new("mirror-filter", data_dir, locale, graphics.clone());

    let mut settings = Settings::new();
    settings.set_bool(SETTING_SWITCH_LEFT_TO_RIGHT, true);
    let mut filter = MirrorFilter::create(&settings, &module).unwrap();
    assert!(filter.switch_param().is_some());
    assert!(filter.pixel_size_param().is_some());

    let input = strip();
    let mirrored = render(&graphics, &mut filter, &input);
    assert_eq!(row(&mirrored), vec![BLUE, WHITE, GREEN, RED]);

    settings.set_bool(SETTING_SWITCH_LEFT_TO_RIGHT, false);
    filter.update(&settings);
    let unchanged = render(&graphics, &mut filter, &input);
    assert_eq!(row(&unchanged), row(&input));

    drop(filter);
    assert_eq!(graphics.enter().effect_count(), 0);
}
