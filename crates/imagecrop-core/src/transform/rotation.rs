//! Image rotation and EXIF orientation transforms.
//!
//! Quarter turns are exact pixel permutations. Any other angle uses inverse
//! mapping: for each output pixel the source position is found by rotating
//! back around the image center, then sampled with the requested filter.
//!
//! ```text
//! src_x = (dst_x - cx) * cos(-θ) - (dst_y - cy) * sin(-θ) + src_cx
//! src_y = (dst_x - cx) * sin(-θ) + (dst_y - cy) * cos(-θ) + src_cy
//! ```
//!
//! Angles are in degrees, positive = counter-clockwise.

use image::DynamicImage;

use crate::decode::{self, DecodedImage, FilterType, Orientation};

const ANGLE_EPSILON: f64 = 0.001;

/// Compute the bounding box of an image rotated by `angle_degrees`.
///
/// Quarter turns swap or keep the dimensions exactly; other angles expand the
/// canvas so no corner is clipped.
pub fn compute_rotated_bounds(width: u32, height: u32, angle_degrees: f64) -> (u32, u32) {
    match quarter_turns(angle_degrees) {
        Some(0) | Some(2) => return (width, height),
        Some(_) => return (height, width),
        None => {}
    }

    let angle_rad = angle_degrees.to_radians();
    let cos = angle_rad.cos().abs();
    let sin = angle_rad.sin().abs();
    let (w, h) = (width as f64, height as f64);

    let new_w = (w * cos + h * sin).round() as u32;
    let new_h = (w * sin + h * cos).round() as u32;

    (new_w.max(1), new_h.max(1))
}

/// Rotate an image around its center, expanding the canvas to fit.
///
/// Uncovered canvas areas are black.
pub fn apply_rotation(image: &DecodedImage, angle_degrees: f64, filter: FilterType) -> DecodedImage {
    if image.is_empty() {
        return image.clone();
    }

    if let Some(turns) = quarter_turns(angle_degrees) {
        return rotate_quarter_turns(image, turns);
    }

    let (dst_w, dst_h) = compute_rotated_bounds(image.width, image.height, angle_degrees);

    // Inverse rotation: negate so positive angles turn counter-clockwise on screen
    let angle_rad = -angle_degrees.to_radians();
    let (sin, cos) = angle_rad.sin_cos();

    let src_cx = image.width as f64 / 2.0;
    let src_cy = image.height as f64 / 2.0;
    let dst_cx = dst_w as f64 / 2.0;
    let dst_cy = dst_h as f64 / 2.0;

    let mut output = Vec::with_capacity(dst_w as usize * dst_h as usize * 3);

    for dst_y in 0..dst_h {
        for dst_x in 0..dst_w {
            // Sample at pixel centers
            let dx = dst_x as f64 + 0.5 - dst_cx;
            let dy = dst_y as f64 + 0.5 - dst_cy;

            let src_x = dx * cos - dy * sin + src_cx - 0.5;
            let src_y = dx * sin + dy * cos + src_cy - 0.5;

            let pixel = match filter {
                FilterType::Nearest => sample_nearest(image, src_x, src_y),
                FilterType::Bilinear => sample_bilinear(image, src_x, src_y),
                FilterType::Lanczos3 => sample_lanczos3(image, src_x, src_y),
            };
            output.extend_from_slice(&pixel);
        }
    }

    DecodedImage::new(dst_w, dst_h, output)
}

/// Apply an EXIF orientation to already-decoded pixels.
pub fn apply_orientation(image: &DecodedImage, orientation: Orientation) -> DecodedImage {
    if orientation == Orientation::Normal {
        return image.clone();
    }

    match image.to_rgb_image() {
        Some(rgb) => {
            let oriented = decode::apply_orientation(DynamicImage::ImageRgb8(rgb), orientation);
            DecodedImage::from_rgb_image(oriented.into_rgb8())
        }
        None => image.clone(),
    }
}

/// Number of counter-clockwise quarter turns if the angle is a multiple of 90°.
fn quarter_turns(angle_degrees: f64) -> Option<u8> {
    let normalized = angle_degrees.rem_euclid(360.0);
    let turns = (normalized / 90.0).round();

    if (normalized - turns * 90.0).abs() < ANGLE_EPSILON {
        Some((turns as u8) % 4)
    } else {
        None
    }
}

fn rotate_quarter_turns(image: &DecodedImage, turns: u8) -> DecodedImage {
    let Some(rgb) = image.to_rgb_image() else {
        return image.clone();
    };

    let rotated = match turns {
        0 => return image.clone(),
        1 => image::imageops::rotate270(&rgb),
        2 => image::imageops::rotate180(&rgb),
        _ => image::imageops::rotate90(&rgb),
    };
    DecodedImage::from_rgb_image(rotated)
}

#[inline]
fn get_pixel_f64(image: &DecodedImage, px: usize, py: usize) -> [f64; 3] {
    let idx = (py * image.width as usize + px) * 3;
    [
        image.pixels[idx] as f64,
        image.pixels[idx + 1] as f64,
        image.pixels[idx + 2] as f64,
    ]
}

fn sample_nearest(image: &DecodedImage, x: f64, y: f64) -> [u8; 3] {
    let (px, py) = (x.round(), y.round());
    if px < 0.0 || py < 0.0 || px >= image.width as f64 || py >= image.height as f64 {
        return [0, 0, 0];
    }

    let idx = (py as usize * image.width as usize + px as usize) * 3;
    [image.pixels[idx], image.pixels[idx + 1], image.pixels[idx + 2]]
}

/// Bilinear interpolation over the 4 nearest pixels, edges clamped.
fn sample_bilinear(image: &DecodedImage, x: f64, y: f64) -> [u8; 3] {
    let (w, h) = (image.width as f64, image.height as f64);

    // Half a pixel of slack keeps the image border from darkening
    if x < -0.5 || y < -0.5 || x > w - 0.5 || y > h - 0.5 {
        return [0, 0, 0];
    }

    let x = x.clamp(0.0, w - 1.0);
    let y = y.clamp(0.0, h - 1.0);

    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(image.width as usize - 1);
    let y1 = (y0 + 1).min(image.height as usize - 1);

    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = get_pixel_f64(image, x0, y0);
    let p10 = get_pixel_f64(image, x1, y0);
    let p01 = get_pixel_f64(image, x0, y1);
    let p11 = get_pixel_f64(image, x1, y1);

    let mut result = [0u8; 3];
    for i in 0..3 {
        let v = p00[i] * (1.0 - fx) * (1.0 - fy)
            + p10[i] * fx * (1.0 - fy)
            + p01[i] * (1.0 - fx) * fy
            + p11[i] * fx * fy;
        result[i] = v.clamp(0.0, 255.0).round() as u8;
    }

    result
}

/// Lanczos3 interpolation over a 6x6 neighborhood.
///
/// Falls back to bilinear within the kernel radius of the border.
fn sample_lanczos3(image: &DecodedImage, x: f64, y: f64) -> [u8; 3] {
    let (w, h) = (image.width as i64, image.height as i64);

    if x < 2.0 || x >= (w - 3) as f64 || y < 2.0 || y >= (h - 3) as f64 {
        return sample_bilinear(image, x, y);
    }

    let x0 = x.floor() as i64;
    let y0 = y.floor() as i64;

    let mut sum = [0.0f64; 3];
    let mut weight_sum = 0.0;

    for ky in -2..=3 {
        for kx in -2..=3 {
            let px = x0 + kx;
            let py = y0 + ky;
            let weight = lanczos_weight(x - px as f64, 3.0) * lanczos_weight(y - py as f64, 3.0);

            let pixel = get_pixel_f64(image, px as usize, py as usize);
            for i in 0..3 {
                sum[i] += pixel[i] * weight;
            }
            weight_sum += weight;
        }
    }

    let mut result = [0u8; 3];
    if weight_sum > 0.0 {
        for i in 0..3 {
            result[i] = (sum[i] / weight_sum).clamp(0.0, 255.0).round() as u8;
        }
    }

    result
}

/// `L(x) = sinc(x) * sinc(x / a)` for `|x| < a`, else 0.
fn lanczos_weight(x: f64, a: f64) -> f64 {
    if x.abs() < f64::EPSILON {
        return 1.0;
    }
    if x.abs() >= a {
        return 0.0;
    }

    let pi_x = std::f64::consts::PI * x;
    (a * pi_x.sin() * (pi_x / a).sin()) / (pi_x * pi_x)
}
