//! Background star positions
//!
//! Stars are scattered uniformly through a cube centred on the origin. A seed
//! makes the sky reproducible; without one it changes every run.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::params::StarParams;

/// `count` points uniform in `[-spread/2, spread/2)` on every axis
pub fn generate_star_positions<R: Rng>(rng: &mut R, count: u32, spread: f32) -> Vec<[f32; 3]> {
    let half = spread * 0.5;
    if half <= 0.0 {
        return vec![[0.0; 3]; count as usize];
    }
    (0..count)
        .map(|_| {
            [
                rng.random_range(-half..half),
                rng.random_range(-half..half),
                rng.random_range(-half..half),
            ]
        })
        .collect()
}

/// Star positions for `params`, seeded when a seed is configured
pub fn star_positions(params: &StarParams) -> Vec<[f32; 3]> {
    let mut rng = match params.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let positions = generate_star_positions(&mut rng, params.count, params.spread);
    log::debug!(
        "Generated {} stars (spread {}, seed {:?})",
        positions.len(),
        params.spread,
        params.seed
    );
    positions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(seed: u64, count: u32) -> StarParams {
        StarParams {
            count,
            seed: Some(seed),
            ..Default::default()
        }
    }

    #[test]
    fn test_positions_within_cube() {
        let params = seeded(3, 2000);
        let positions = star_positions(&params);
        assert_eq!(positions.len(), 2000);
        let half = params.spread / 2.0;
        assert!(positions
            .iter()
            .flatten()
            .all(|&c| (-half..half).contains(&c)));
    }

    #[test]
    fn test_same_seed_same_sky() {
        assert_eq!(star_positions(&seeded(42, 100)), star_positions(&seeded(42, 100)));
        assert_ne!(star_positions(&seeded(42, 100)), star_positions(&seeded(43, 100)));
    }

    #[test]
    fn test_distribution_fills_every_octant() {
        let positions = star_positions(&seeded(7, 4000));
        let mut octants = [0usize; 8];
        for p in &positions {
            let index = (p[0] > 0.0) as usize | ((p[1] > 0.0) as usize) << 1 | ((p[2] > 0.0) as usize) << 2;
            octants[index] += 1;
        }
        // 500 expected per octant
        assert!(octants.iter().all(|&n| n > 400 && n < 600), "{:?}", octants);
    }

    #[test]
    fn test_zero_stars() {
        assert!(star_positions(&seeded(1, 0)).is_empty());
    }
}
