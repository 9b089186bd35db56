#[cfg(feature = "integration-tests")]
mod common;

#[test]
#[cfg(feature = "integration-tests")]
fn should_clear_to_the_sky_colour() {
    use alpaca_viewer::{config::ViewerConfig, context::Context, flow::ImageTestResult};

    use crate::common::test_utils::{TestRender, Validate};

    let sky = ViewerConfig::default().background;
    let validate: Validate = Box::new(move |ctx, state, texture| {
        if state.frame() == 0 {
            return Ok(ImageTestResult::Waiting);
        }
        let [r, g, b] = alpaca_viewer::customize::hex_to_rgb8(sky);
        let (r, b) = match ctx.config.format {
            wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb => (b, r),
            _ => (r, b),
        };
        let close = |a: u8, e: u8| a.abs_diff(e) <= 1;
        let width = ctx.config.width;
        let height = ctx.config.height;
        for (x, y, pixel) in texture.enumerate_pixels() {
            if x >= width || y >= height {
                continue;
            }
            let [pr, pg, pb, _] = pixel.0;
            assert!(
                close(pr, r) && close(pg, g) && close(pb, b),
                "pixel ({}, {}) is {:?}",
                x,
                y,
                pixel
            );
        }
        Ok(ImageTestResult::Passed)
    });
    golden_image_test!(TestRender {
        setup: Box::new(|ctx: &mut Context| ctx.configure(&ViewerConfig::default())),
        validate,
    });
}
