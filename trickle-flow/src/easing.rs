/// Values which can be blended linearly.
pub trait Interpolate: Clone + 'static {
    /// The value `t` of the way from `self` to `other`.
    fn lerp(&self, other: &Self, t: f64) -> Self;
}

impl Interpolate for f64 {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        self + (other - self) * t
    }
}

impl Interpolate for f32 {
    fn lerp(&self, other: &Self, t: f64) -> Self {
        self + (other - self) * t as f32
    }
}

pub fn linear<T: Interpolate>(from: &T, to: &T, t: f64) -> T {
    from.lerp(to, t)
}

pub fn ease_in<T: Interpolate>(from: &T, to: &T, t: f64) -> T {
    from.lerp(to, t * t)
}

pub fn ease_out<T: Interpolate>(from: &T, to: &T, t: f64) -> T {
    from.lerp(to, t * (2.0 - t))
}

pub fn ease_in_out<T: Interpolate>(from: &T, to: &T, t: f64) -> T {
    let t = if t < 0.5 {
        2.0 * t * t
    } else {
        -1.0 + (4.0 - 2.0 * t) * t
    };
    from.lerp(to, t)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_endpoints() {
        for easing in [linear, ease_in, ease_out, ease_in_out] {
            assert_eq!(easing(&2.0f64, &6.0, 0.0), 2.0);
            assert_eq!(easing(&2.0f64, &6.0, 1.0), 6.0);
        }
    }

    #[test]
    fn test_shape() {
        assert_eq!(linear(&0.0f64, &8.0, 0.25), 2.0);
        assert_eq!(ease_in(&0.0f64, &8.0, 0.5), 2.0);
        assert_eq!(ease_out(&0.0f64, &8.0, 0.5), 6.0);
        assert_eq!(ease_in_out(&0.0f64, &8.0, 0.5), 4.0);
        assert_eq!(linear(&1.0f32, &3.0, 0.5), 2.0);
    }
}
