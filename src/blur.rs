//! Separable gaussian smoothing of 8-bit grayscale buffers.

use crate::kernel::Kernel;

// Weighted sums of a constant region land a hair below the integer they
// should equal: a uniform 255 buffer under the radius 3 / spread 2 kernel
// sums to 254.99999999999997. Nudge them back before truncating.
const TRUNCATION_EPSILON: f64 = 1e-6;

/// Smooth `pixels` in place.
///
/// The buffer is addressed as `height` rows of `width` pixels, each row
/// starting `stride` bytes after the previous one, so a sub-rectangle of a
/// larger image can be blurred without copying it out. Pixels outside the
/// buffer are taken from the nearest edge row/column. Results are truncated
/// toward zero.
pub fn blur_in_place(kernel: &Kernel, pixels: &mut [u8], stride: usize, width: usize, height: usize) {
    if width == 0 || height == 0 {
        return;
    }
    debug_assert!(stride >= width);
    debug_assert!(pixels.len() >= stride * (height - 1) + width);

    let padded = pad_replicate(pixels, stride, width, height, kernel.radius());
    let radius = kernel.radius();
    let padded_w = width + 2 * radius;
    let taps = kernel.weights();

    for y in 0..height {
        for x in 0..width {
            let mut acc = 0.0;
            for (ky, wy) in taps.iter().enumerate() {
                let row = &padded[(y + ky) * padded_w + x..][..taps.len()];
                for (wx, &p) in taps.iter().zip(row) {
                    acc += p as f64 * wx * wy;
                }
            }
            pixels[y * stride + x] = (acc + TRUNCATION_EPSILON) as u8;
        }
    }
}

/// Copy the buffer into a `(width + 2r) x (height + 2r)` working area whose
/// border repeats the outermost rows and columns.
fn pad_replicate(pixels: &[u8], stride: usize, width: usize, height: usize, radius: usize) -> Vec<u8> {
    let padded_w = width + 2 * radius;
    let padded_h = height + 2 * radius;
    let mut padded = vec![0u8; padded_w * padded_h];

    for py in 0..padded_h {
        let sy = py.saturating_sub(radius).min(height - 1);
        let src = &pixels[sy * stride..][..width];
        let dst = &mut padded[py * padded_w..][..padded_w];

        dst[radius..radius + width].copy_from_slice(src);
        dst[..radius].fill(src[0]);
        dst[radius + width..].fill(src[width - 1]);
    }

    padded
}
