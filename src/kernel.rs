//! 1-D gaussian kernels for the separable smoother.

use crate::{GlyphError, Result};

/// Normalized gaussian weights of length `2 * radius + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    radius: usize,
    weights: Vec<f64>,
}

impl Kernel {
    /// Build a kernel for `radius` (may be fractional) and `spread`.
    ///
    /// `spread` scales the offsets inside the exponent, so larger values give
    /// a narrower bell over the same window. 1.0 is a plain gaussian with
    /// sigma equal to the radius.
    pub fn gaussian(radius: f64, spread: f64) -> Result<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(GlyphError::InvalidArgument(format!(
                "kernel radius must be positive, got {radius}"
            )));
        }
        if !spread.is_finite() || spread <= 0.0 {
            return Err(GlyphError::InvalidArgument(format!(
                "kernel spread must be positive, got {spread}"
            )));
        }

        let reach = radius.floor() as i64;
        let two_radius_sq_recip = 1.0 / (2.0 * radius * radius);
        let scale = 1.0 / ((2.0 * std::f64::consts::PI).sqrt() * radius);

        let mut weights: Vec<f64> = (-reach..=reach)
            .map(|r| {
                let r = r as f64;
                scale * (-(r * r * spread * spread) * two_radius_sq_recip).exp()
            })
            .collect();

        let sum: f64 = weights.iter().sum();
        for w in &mut weights {
            *w /= sum;
        }

        Ok(Self { radius: reach as usize, weights })
    }

    pub fn radius(&self) -> usize {
        self.radius
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_sums_to_one() {
        for &(radius, spread) in &[(1.0, 1.0), (2.0, 2.0), (3.0, 2.0), (2.5, 0.5), (7.0, 3.0)] {
            let k = Kernel::gaussian(radius, spread).unwrap();
            let sum: f64 = k.weights().iter().sum();
            assert!((sum - 1.0).abs() < 1e-12, "radius {radius}: sum {sum}");
        }
    }

    #[test]
    fn test_kernel_is_symmetric() {
        let k = Kernel::gaussian(3.0, 2.0).unwrap();
        let w = k.weights();
        for i in 0..w.len() {
            assert_eq!(w[i], w[w.len() - 1 - i]);
        }
        // Peak sits in the middle
        assert!(w[3] > w[2] && w[2] > w[1] && w[1] > w[0]);
    }

    #[test]
    fn test_kernel_length_uses_floor_of_radius() {
        let k = Kernel::gaussian(2.7, 1.0).unwrap();
        assert_eq!(k.radius(), 2);
        assert_eq!(k.weights().len(), 5);

        let k = Kernel::gaussian(0.5, 1.0).unwrap();
        assert_eq!(k.radius(), 0);
        assert_eq!(k.weights(), &[1.0]);
    }

    #[test]
    fn test_kernel_rejects_bad_radius() {
        assert!(matches!(Kernel::gaussian(0.0, 2.0), Err(GlyphError::InvalidArgument(_))));
        assert!(matches!(Kernel::gaussian(-1.0, 2.0), Err(GlyphError::InvalidArgument(_))));
        assert!(Kernel::gaussian(f64::NAN, 2.0).is_err());
    }

    #[test]
    fn test_kernel_rejects_bad_spread() {
        assert!(Kernel::gaussian(2.0, 0.0).is_err());
        assert!(Kernel::gaussian(2.0, f64::INFINITY).is_err());
    }
}
