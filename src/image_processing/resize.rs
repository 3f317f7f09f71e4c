use anyhow::Result;
use fast_image_resize::{images::Image, FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer};
use image::{DynamicImage, GenericImageView, ImageBuffer, Pixel};

/// Telegram sticker bounds
pub const STICKER_MAX_WIDTH: u32 = 512;
pub const STICKER_MAX_HEIGHT: u32 = 512;

/// What to do with an image of a given size
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResizePlan {
    /// Already touches the bound on one side and fits on the other
    AlreadyFeasible,
    /// Scale uniformly by `scale` to `width`x`height`
    Scale { scale: f64, width: u32, height: u32 },
}

/// True when one side equals the bound exactly and the other fits inside it
pub fn is_feasible_size(width: u32, height: u32, max_width: u32, max_height: u32) -> bool {
    (height == max_height && width <= max_width) || (width == max_width && height <= max_height)
}

/// Largest uniform factor that keeps both sides inside the bounds
pub fn fit_scale(width: u32, height: u32, max_width: u32, max_height: u32) -> f64 {
    let scale_h = max_height as f64 / height as f64;
    let scale_w = max_width as f64 / width as f64;
    scale_h.min(scale_w)
}

/// Decide between skipping and scaling an image of `width`x`height`
pub fn plan_resize(width: u32, height: u32, max_width: u32, max_height: u32) -> Result<ResizePlan> {
    if width == 0 || height == 0 {
        return Err(anyhow::anyhow!("Image has an empty dimension: {}x{}", width, height));
    }

    if is_feasible_size(width, height, max_width, max_height) {
        return Ok(ResizePlan::AlreadyFeasible);
    }

    let scale = fit_scale(width, height, max_width, max_height);
    let new_width = ((width as f64 * scale).round() as u32).clamp(1, max_width);
    let new_height = ((height as f64 * scale).round() as u32).clamp(1, max_height);

    Ok(ResizePlan::Scale {
        scale,
        width: new_width,
        height: new_height,
    })
}

/// Area averaging when shrinking, bilinear when enlarging
fn resize_alg_for(src_width: u32, dst_width: u32) -> ResizeAlg {
    if dst_width < src_width {
        ResizeAlg::Convolution(FilterType::Box)
    } else {
        ResizeAlg::Convolution(FilterType::Bilinear)
    }
}

/// Resize keeping the channel layout and bit depth of the source
/// (gray, gray+alpha, RGB, RGBA at 8 or 16 bits). Float layouts are stored as 16-bit.
pub fn resize_image(img: &DynamicImage, width: u32, height: u32) -> Result<DynamicImage> {
    let (src_width, src_height) = img.dimensions();
    if src_width == width && src_height == height {
        return Ok(img.clone());
    }

    let resized = match img {
        DynamicImage::ImageLuma8(buf) => {
            DynamicImage::ImageLuma8(resize_buffer(buf, width, height, PixelType::U8)?)
        }
        DynamicImage::ImageLumaA8(buf) => {
            DynamicImage::ImageLumaA8(resize_buffer(buf, width, height, PixelType::U8x2)?)
        }
        DynamicImage::ImageRgb8(buf) => {
            DynamicImage::ImageRgb8(resize_buffer(buf, width, height, PixelType::U8x3)?)
        }
        DynamicImage::ImageRgba8(buf) => {
            DynamicImage::ImageRgba8(resize_buffer(buf, width, height, PixelType::U8x4)?)
        }
        DynamicImage::ImageLuma16(buf) => {
            DynamicImage::ImageLuma16(resize_buffer16(buf, width, height, PixelType::U16)?)
        }
        DynamicImage::ImageLumaA16(buf) => {
            DynamicImage::ImageLumaA16(resize_buffer16(buf, width, height, PixelType::U16x2)?)
        }
        DynamicImage::ImageRgb16(buf) => {
            DynamicImage::ImageRgb16(resize_buffer16(buf, width, height, PixelType::U16x3)?)
        }
        DynamicImage::ImageRgba16(buf) => {
            DynamicImage::ImageRgba16(resize_buffer16(buf, width, height, PixelType::U16x4)?)
        }
        DynamicImage::ImageRgb32F(_) => {
            let rgb = img.to_rgb16();
            DynamicImage::ImageRgb16(resize_buffer16(&rgb, width, height, PixelType::U16x3)?)
        }
        other => {
            let rgba = other.to_rgba16();
            DynamicImage::ImageRgba16(resize_buffer16(&rgba, width, height, PixelType::U16x4)?)
        }
    };

    Ok(resized)
}

fn resize_buffer<P>(
    img: &ImageBuffer<P, Vec<u8>>,
    width: u32,
    height: u32,
    pixel_type: PixelType,
) -> Result<ImageBuffer<P, Vec<u8>>>
where
    P: Pixel<Subpixel = u8>,
{
    let (src_width, src_height) = img.dimensions();
    let resized = resize_bytes(
        img.as_raw().clone(),
        (src_width, src_height),
        (width, height),
        pixel_type,
    )?;

    ImageBuffer::from_raw(width, height, resized)
        .ok_or_else(|| anyhow::anyhow!("Resized buffer does not match {}x{}", width, height))
}

/// Same as [`resize_buffer`] for 16-bit samples, passed to the resizer in native byte order
fn resize_buffer16<P>(
    img: &ImageBuffer<P, Vec<u16>>,
    width: u32,
    height: u32,
    pixel_type: PixelType,
) -> Result<ImageBuffer<P, Vec<u16>>>
where
    P: Pixel<Subpixel = u16>,
{
    let (src_width, src_height) = img.dimensions();
    let src_bytes: Vec<u8> = img.as_raw().iter().flat_map(|v| v.to_ne_bytes()).collect();
    let resized = resize_bytes(src_bytes, (src_width, src_height), (width, height), pixel_type)?;

    let samples: Vec<u16> = resized
        .chunks_exact(2)
        .map(|pair| u16::from_ne_bytes([pair[0], pair[1]]))
        .collect();
    ImageBuffer::from_raw(width, height, samples)
        .ok_or_else(|| anyhow::anyhow!("Resized buffer does not match {}x{}", width, height))
}

fn resize_bytes(
    src: Vec<u8>,
    (src_width, src_height): (u32, u32),
    (width, height): (u32, u32),
    pixel_type: PixelType,
) -> Result<Vec<u8>> {
    if width == 0 || height == 0 {
        return Err(anyhow::anyhow!("Target size is empty: {}x{}", width, height));
    }

    let src_image = Image::from_vec_u8(src_width, src_height, src, pixel_type)?;
    let mut dst_image = Image::new(width, height, pixel_type);

    // Alpha is premultiplied by the resizer for the two- and four-channel types
    let options = ResizeOptions::new().resize_alg(resize_alg_for(src_width, width));
    let mut resizer = Resizer::new();
    resizer.resize(&src_image, &mut dst_image, &options)?;

    Ok(dst_image.buffer().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayAlphaImage, Luma, LumaA, Rgb, RgbImage, Rgba, RgbaImage};

    fn create_test_image(width: u32, height: u32) -> RgbImage {
        ImageBuffer::from_fn(width, height, |x, y| {
            Rgb([
                (x % 256) as u8,
                (y % 256) as u8,
                ((x + y) % 256) as u8,
            ])
        })
    }

    fn plan(width: u32, height: u32) -> ResizePlan {
        plan_resize(width, height, STICKER_MAX_WIDTH, STICKER_MAX_HEIGHT).unwrap()
    }

    #[test]
    fn test_feasible_sizes_are_skipped() {
        assert_eq!(plan(400, 512), ResizePlan::AlreadyFeasible);
        assert_eq!(plan(512, 400), ResizePlan::AlreadyFeasible);
        assert_eq!(plan(512, 512), ResizePlan::AlreadyFeasible);
        assert_eq!(plan(1, 512), ResizePlan::AlreadyFeasible);
    }

    #[test]
    fn test_not_feasible_when_other_side_too_large() {
        assert!(!is_feasible_size(513, 512, 512, 512));
        assert!(!is_feasible_size(512, 600, 512, 512));
        assert!(!is_feasible_size(511, 511, 512, 512));
    }

    #[test]
    fn test_scale_for_1024_by_768() {
        // height 1024, width 768
        match plan(768, 1024) {
            ResizePlan::Scale { scale, width, height } => {
                assert!((scale - 0.5).abs() < f64::EPSILON);
                assert_eq!((width, height), (384, 512));
            }
            other => panic!("unexpected plan {:?}", other),
        }
    }

    #[test]
    fn test_small_images_are_enlarged() {
        match plan(300, 200) {
            ResizePlan::Scale { scale, width, height } => {
                assert!(scale > 1.0);
                assert_eq!((width, height), (512, 341));
            }
            other => panic!("unexpected plan {:?}", other),
        }
    }

    #[test]
    fn test_scaled_sizes_stay_in_bounds() {
        let sizes = [1u32, 7, 100, 333, 511, 513, 640, 1000, 1920, 4096];
        for &width in &sizes {
            for &height in &sizes {
                if let ResizePlan::Scale { width: w, height: h, .. } = plan(width, height) {
                    assert!(w <= 512 && h <= 512, "{}x{} -> {}x{}", width, height, w, h);
                    assert!(w == 512 || h == 512, "{}x{} -> {}x{}", width, height, w, h);
                }
            }
        }
    }

    #[test]
    fn test_empty_dimension_is_an_error() {
        assert!(plan_resize(0, 10, 512, 512).is_err());
        assert!(plan_resize(10, 0, 512, 512).is_err());
    }

    #[test]
    fn test_resize_image_rgb() {
        let img = DynamicImage::ImageRgb8(create_test_image(1024, 768));
        let resized = resize_image(&img, 512, 384).unwrap();

        assert_eq!(resized.dimensions(), (512, 384));
        assert!(matches!(resized, DynamicImage::ImageRgb8(_)));
    }

    #[test]
    fn test_resize_image_keeps_alpha() {
        let rgba: RgbaImage = ImageBuffer::from_pixel(100, 50, Rgba([10, 20, 30, 0]));
        let resized = resize_image(&DynamicImage::ImageRgba8(rgba), 512, 256).unwrap();
        match resized {
            DynamicImage::ImageRgba8(buf) => {
                assert_eq!(buf.dimensions(), (512, 256));
                assert!(buf.pixels().all(|p| p[3] == 0));
            }
            other => panic!("alpha dropped: {:?}", other.color()),
        }

        let gray: GrayAlphaImage = ImageBuffer::from_pixel(40, 40, LumaA([200, 255]));
        let resized = resize_image(&DynamicImage::ImageLumaA8(gray), 512, 512).unwrap();
        assert!(matches!(resized, DynamicImage::ImageLumaA8(_)));
    }

    #[test]
    fn test_box_filter_averages_on_downscale() {
        // Alternating black/white columns average to mid gray
        let img: RgbImage = ImageBuffer::from_fn(1024, 4, |x, _| {
            if x % 2 == 0 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        });
        let resized = resize_image(&DynamicImage::ImageRgb8(img), 512, 2).unwrap();
        let buf = resized.to_rgb8();
        for pixel in buf.pixels() {
            assert!((120..=135).contains(&pixel[0]), "got {}", pixel[0]);
        }
    }

    #[test]
    fn test_resize_keeps_16_bit_depth() {
        let rgb16: ImageBuffer<Rgb<u16>, Vec<u16>> =
            ImageBuffer::from_pixel(1024, 1024, Rgb([1000, 40000, 65535]));
        let resized = resize_image(&DynamicImage::ImageRgb16(rgb16), 512, 512).unwrap();
        match resized {
            DynamicImage::ImageRgb16(buf) => {
                assert_eq!(buf.dimensions(), (512, 512));
                let [r, g, b] = buf.get_pixel(100, 100).0;
                assert!(r.abs_diff(1000) <= 1 && g.abs_diff(40000) <= 1 && b >= 65534);
            }
            other => panic!("depth changed: {:?}", other.color()),
        }

        let gray16: ImageBuffer<Luma<u16>, Vec<u16>> =
            ImageBuffer::from_pixel(600, 300, Luma([300]));
        let resized = resize_image(&DynamicImage::ImageLuma16(gray16), 512, 256).unwrap();
        assert!(matches!(resized, DynamicImage::ImageLuma16(_)));
        assert_eq!(resized.dimensions(), (512, 256));
    }

    #[test]
    fn test_resize_same_size_is_copy() {
        let img = DynamicImage::ImageRgb8(create_test_image(64, 64));
        let resized = resize_image(&img, 64, 64).unwrap();
        assert_eq!(resized, img);
    }
}
