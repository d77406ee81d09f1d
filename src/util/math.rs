//! Math type re-exports and interpolation helpers.
//!
//! Vector and matrix values are `glam` types; [`Lerp`] is the one
//! operation the time-sample resampler needs from them.

pub use glam::{DMat4, DVec3, Mat4, Vec2, Vec3};

/// Linear interpolation with extrapolation outside `[0, 1]`.
pub trait Lerp: Sized {
    fn lerp_to(&self, other: &Self, alpha: f64) -> Self;
}

impl Lerp for f32 {
    #[inline]
    fn lerp_to(&self, other: &Self, alpha: f64) -> Self {
        let a = alpha as f32;
        self * (1.0 - a) + other * a
    }
}

impl Lerp for f64 {
    #[inline]
    fn lerp_to(&self, other: &Self, alpha: f64) -> Self {
        self * (1.0 - alpha) + other * alpha
    }
}

impl Lerp for Vec3 {
    #[inline]
    fn lerp_to(&self, other: &Self, alpha: f64) -> Self {
        self.lerp(*other, alpha as f32)
    }
}

impl Lerp for DMat4 {
    fn lerp_to(&self, other: &Self, alpha: f64) -> Self {
        *self * (1.0 - alpha) + *other * alpha
    }
}

/// Element-wise interpolation of equally sized slices.
///
/// Returns `None` when the lengths differ.
pub fn lerp_slices<T: Lerp>(a: &[T], b: &[T], alpha: f64) -> Option<Vec<T>> {
    if a.len() != b.len() {
        return None;
    }
    Some(a.iter().zip(b).map(|(x, y)| x.lerp_to(y, alpha)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_lerp() {
        assert_eq!(0.0f64.lerp_to(&10.0, 0.25), 2.5);
        assert_eq!(0.0f32.lerp_to(&10.0, 1.5), 15.0);
        assert_eq!(2.0f64.lerp_to(&4.0, -1.0), 0.0);
    }

    #[test]
    fn test_slice_lerp() {
        let a = [Vec3::ZERO, Vec3::ONE];
        let b = [Vec3::ONE, Vec3::splat(3.0)];
        let mid = lerp_slices(&a, &b, 0.5).unwrap();
        assert_eq!(mid, vec![Vec3::splat(0.5), Vec3::splat(2.0)]);
        assert!(lerp_slices(&a, &b[..1], 0.5).is_none());
    }
}
