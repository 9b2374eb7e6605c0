use num_traits::{Float, NumAssign, NumCast};
use std::fmt::Debug;

/// Floating point type a grid or spline can be defined over.
pub trait Scalar: Float + NumAssign + Debug + Send + Sync + 'static {}

impl<T> Scalar for T where T: Float + NumAssign + Debug + Send + Sync + 'static {}

/// Converts an integer into the scalar type. Yields NaN if the value is not
/// representable.
pub(crate) fn from_usize<T: Scalar>(n: usize) -> T {
    <T as NumCast>::from(n).unwrap_or_else(T::nan)
}

/// Integer power by repeated squaring.
pub(crate) fn powi<T: Scalar>(mut base: T, mut exp: usize) -> T {
    let mut result = T::one();
    while exp > 0 {
        if exp & 1 == 1 {
            result = result * base;
        }
        base = base * base;
        exp >>= 1;
    }
    result
}
