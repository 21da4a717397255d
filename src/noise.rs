//! Seeded 2D gradient noise.

use crate::rng::LcgRng;

const GRADIENTS: [(f64, f64); 8] = [
    (1.0, 1.0),
    (-1.0, 1.0),
    (1.0, -1.0),
    (-1.0, -1.0),
    (1.0, 0.0),
    (-1.0, 0.0),
    (0.0, 1.0),
    (0.0, -1.0),
];

/// A gradient-noise field. Each instance owns its permutation table, so
/// fields built from different seeds never share state.
#[derive(Clone)]
pub struct NoiseField {
    perm: [u8; 512],
}

impl NoiseField {
    pub fn new(seed: u64) -> Self {
        let mut table: [u8; 256] = [0; 256];
        for (i, slot) in table.iter_mut().enumerate() {
            *slot = i as u8;
        }
        LcgRng::new(seed).shuffle(&mut table);

        let mut perm = [0u8; 512];
        for (i, slot) in perm.iter_mut().enumerate() {
            *slot = table[i & 255];
        }
        Self { perm }
    }

    /// Sample the field. Always finite and within `[-1, 1]`.
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let xf = x.floor();
        let yf = y.floor();
        let xi = (xf as i64 & 255) as usize;
        let yi = (yf as i64 & 255) as usize;
        let dx = x - xf;
        let dy = y - yf;

        let corner = |cx: usize, cy: usize, ox: f64, oy: f64| {
            let hash = self.perm[self.perm[(xi + cx) & 511] as usize + ((yi + cy) & 255)];
            let (gx, gy) = GRADIENTS[(hash & 7) as usize];
            gx * ox + gy * oy
        };

        let n00 = corner(0, 0, dx, dy);
        let n10 = corner(1, 0, dx - 1.0, dy);
        let n01 = corner(0, 1, dx, dy - 1.0);
        let n11 = corner(1, 1, dx - 1.0, dy - 1.0);

        let u = fade(dx);
        let v = fade(dy);
        let value = lerp(lerp(n00, n10, u), lerp(n01, n11, u), v);
        if value.is_finite() {
            value.clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }

    /// Borrowing closure form of [`NoiseField::sample`].
    pub fn sampler(&self) -> impl Fn(f64, f64) -> f64 + '_ {
        move |x, y| self.sample(x, y)
    }
}

fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_values() {
        let a = NoiseField::new(42);
        let b = NoiseField::new(42);
        for i in 0..100 {
            let x = i as f64 * 0.37 - 12.0;
            let y = i as f64 * 0.11 + 3.5;
            assert_eq!(a.sample(x, y), b.sample(x, y));
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let a = NoiseField::new(1);
        let b = NoiseField::new(2);
        let differs = (0..50).any(|i| {
            let x = i as f64 * 0.43 + 0.2;
            a.sample(x, 1.7) != b.sample(x, 1.7)
        });
        assert!(differs);
    }

    #[test]
    fn test_range_and_continuity() {
        let field = NoiseField::new(99);
        let sample = field.sampler();
        for i in 0..400 {
            let x = i as f64 * 0.173 - 30.0;
            let y = i as f64 * 0.291 - 50.0;
            let v = sample(x, y);
            assert!((-1.0..=1.0).contains(&v));
            let nearby = sample(x + 1e-4, y + 1e-4);
            assert!((v - nearby).abs() < 1e-2, "noise should vary smoothly");
        }
    }

    #[test]
    fn test_lattice_points_are_zero() {
        let field = NoiseField::new(5);
        assert_eq!(field.sample(3.0, -4.0), 0.0);
    }
}
