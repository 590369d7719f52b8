use serde::Serialize;

use crate::error::Result;
use crate::types::{Cuboid, Dims, Item, Position};

/// One committed placement: which item, where its minimum corner sits and
/// which of its orientations was used.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement<'a> {
    pub item: &'a Item,
    pub position: Position,
    pub orientation: Dims,
}

impl Placement<'_> {
    pub fn cuboid(&self) -> Cuboid {
        Cuboid::new(self.position, self.orientation)
    }
}

/// Fixed-size container holding a stack of placements.
///
/// Validation is split from mutation: [`Container::can_place`] checks a
/// candidate and [`Container::place`] appends without re-checking.
#[derive(Debug, Clone)]
pub struct Container<'a> {
    dims: Dims,
    placements: Vec<Placement<'a>>,
}

impl<'a> Container<'a> {
    pub fn new(dims: Dims) -> Result<Self> {
        Ok(Self {
            dims: dims.validated()?,
            placements: Vec::new(),
        })
    }

    pub fn dims(&self) -> Dims {
        self.dims
    }

    pub fn volume(&self) -> u64 {
        self.dims.volume()
    }

    pub fn placements(&self) -> &[Placement<'a>] {
        &self.placements
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn can_place(&self, position: Position, orientation: Dims) -> bool {
        let candidate = Cuboid::new(position, orientation);
        if !candidate.within(&self.dims) {
            return false;
        }
        !self
            .placements
            .iter()
            .any(|p| p.cuboid().intersects(&candidate))
    }

    /// Appends a placement. The caller must have checked `can_place`.
    pub fn place(&mut self, item: &'a Item, position: Position, orientation: Dims) {
        self.placements.push(Placement {
            item,
            position,
            orientation,
        });
    }

    pub fn remove_last(&mut self) -> Option<Placement<'a>> {
        self.placements.pop()
    }

    pub fn clear(&mut self) {
        self.placements.clear();
    }

    pub fn total_value(&self) -> f64 {
        self.placements.iter().map(|p| p.item.value()).sum()
    }

    pub fn used_volume(&self) -> u64 {
        self.placements.iter().map(|p| p.orientation.volume()).sum()
    }

    pub fn utilization_percent(&self) -> f64 {
        let volume = self.volume();
        if volume == 0 {
            return 0.0;
        }
        self.used_volume() as f64 / volume as f64 * 100.0
    }
}
