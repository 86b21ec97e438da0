//! Background star points owned by the scene

use super::vertex::StarInstance;

/// A point cloud drawn as screen-facing sprites.
///
/// The renderer re-uploads the instance buffer whenever `revision` changes.
#[derive(Debug, Clone)]
pub struct Starfield {
    pub name: String,
    stars: Vec<StarInstance>,
    /// Sprite size in world units, or pixels without attenuation
    pub size: f32,
    pub color: [f32; 3],
    /// Shrink distant stars with perspective
    pub size_attenuation: bool,
    pub visible: bool,
    revision: u64,
}

impl Starfield {
    pub fn new(name: &str, positions: Vec<[f32; 3]>) -> Self {
        Self {
            name: name.to_string(),
            stars: positions
                .into_iter()
                .map(|position| StarInstance { position })
                .collect(),
            size: 1.0,
            color: [1.0, 1.0, 1.0],
            size_attenuation: true,
            visible: true,
            revision: 1,
        }
    }

    pub fn set_positions(&mut self, positions: Vec<[f32; 3]>) {
        self.stars = positions
            .into_iter()
            .map(|position| StarInstance { position })
            .collect();
        self.revision += 1;
    }

    pub fn instances(&self) -> &[StarInstance] {
        &self.stars
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_positions_bump_revision() {
        let mut stars = Starfield::new("Star Field", vec![[0.0; 3]; 4]);
        let first = stars.revision();
        assert_eq!(stars.len(), 4);

        stars.set_positions(vec![[1.0, 2.0, 3.0]]);
        assert!(stars.revision() > first);
        assert_eq!(stars.instances()[0].position, [1.0, 2.0, 3.0]);
    }
}
