use serde::{Deserialize, Serialize};

use crate::container::Container;
use crate::types::{Dims, Position};

/// Generates candidate positions for an oriented item. Every strategy
/// yields positions in raster order (z, then y, then x) and relies only on
/// the container's `can_place` contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PositionSearch {
    /// Every integer position that keeps the item in bounds.
    #[default]
    Lattice,
    /// The whole-container scan of the original heuristic: z over
    /// `0..height`, y over `0..depth`, x over `0..width`. Bounds are still
    /// checked per axis, so on containers where height and depth differ it
    /// misses or wastes positions.
    LegacyLattice,
    /// The origin and the points touching the far faces of placed items.
    CornerPoints,
}

impl PositionSearch {
    pub fn first_fit(&self, container: &Container<'_>, orientation: Dims) -> Option<Position> {
        match self {
            PositionSearch::Lattice => {
                lattice(container.dims(), orientation).find(|&p| container.can_place(p, orientation))
            }
            PositionSearch::LegacyLattice => legacy_lattice(container.dims())
                .find(|&p| container.can_place(p, orientation)),
            PositionSearch::CornerPoints => corner_points(container)
                .into_iter()
                .find(|&p| container.can_place(p, orientation)),
        }
    }
}

impl std::str::FromStr for PositionSearch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lattice" => Ok(PositionSearch::Lattice),
            "legacy-lattice" => Ok(PositionSearch::LegacyLattice),
            "corner-points" => Ok(PositionSearch::CornerPoints),
            _ => Err(format!(
                "invalid search '{}', expected: lattice, legacy-lattice, or corner-points",
                s
            )),
        }
    }
}

/// Raster scan over all in-bounds positions of `orientation` inside `bounds`.
pub fn lattice(bounds: Dims, orientation: Dims) -> impl Iterator<Item = Position> {
    let fits = orientation.fits_in(&bounds);
    let (max_x, max_y, max_z) = if fits {
        (
            bounds.width - orientation.width,
            bounds.height - orientation.height,
            bounds.depth - orientation.depth,
        )
    } else {
        (0, 0, 0)
    };

    (0..=max_z)
        .filter(move |_| fits)
        .flat_map(move |z| {
            (0..=max_y).flat_map(move |y| (0..=max_x).map(move |x| Position::new(x, y, z)))
        })
}

/// Raster scan with the height and depth ranges swapped on the z and y axes.
pub fn legacy_lattice(bounds: Dims) -> impl Iterator<Item = Position> {
    (0..bounds.height).flat_map(move |z| {
        (0..bounds.depth)
            .flat_map(move |y| (0..bounds.width).map(move |x| Position::new(x, y, z)))
    })
}

pub fn corner_points(container: &Container<'_>) -> Vec<Position> {
    let dims = container.dims();
    let mut points = vec![Position::ORIGIN];
    for p in container.placements() {
        let Position { x, y, z } = p.position;
        let o = p.orientation;
        points.push(Position::new(x + o.width, y, z));
        points.push(Position::new(x, y + o.height, z));
        points.push(Position::new(x, y, z + o.depth));
    }
    points.retain(|p| p.x < dims.width && p.y < dims.height && p.z < dims.depth);
    points.sort_by_key(Position::raster_key);
    points.dedup();
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Item;

    #[test]
    fn test_lattice_raster_order() {
        let points: Vec<_> = lattice(Dims::new(3, 2, 2), Dims::new(2, 1, 1)).collect();
        assert_eq!(points.len(), 2 * 2 * 2);
        assert_eq!(points[0], Position::new(0, 0, 0));
        assert_eq!(points[1], Position::new(1, 0, 0));
        assert_eq!(points[2], Position::new(0, 1, 0));
        assert_eq!(points[4], Position::new(0, 0, 1));
        assert!(points.windows(2).all(|w| w[0].raster_key() < w[1].raster_key()));
    }

    #[test]
    fn test_lattice_empty_when_too_large() {
        assert_eq!(lattice(Dims::new(2, 2, 2), Dims::new(3, 1, 1)).count(), 0);
        assert_eq!(lattice(Dims::new(2, 2, 2), Dims::new(2, 2, 2)).count(), 1);
    }

    #[test]
    fn test_legacy_lattice_ranges() {
        let points: Vec<_> = legacy_lattice(Dims::new(2, 1, 3)).collect();
        assert_eq!(points.len(), 6);
        assert!(points.iter().all(|p| p.z == 0 && p.y < 3 && p.x < 2));
        assert_eq!(points[1], Position::new(1, 0, 0));
        assert_eq!(points[2], Position::new(0, 1, 0));
    }

    #[test]
    fn test_legacy_lattice_misses_upper_layers() {
        let a = Item::new("a", Dims::new(1, 1, 1), 1.0, 1.0).unwrap();
        let mut c = Container::new(Dims::new(1, 1, 2)).unwrap();
        c.place(&a, Position::ORIGIN, a.dims());

        let unit = Dims::new(1, 1, 1);
        assert_eq!(
            PositionSearch::Lattice.first_fit(&c, unit),
            Some(Position::new(0, 0, 1))
        );
        assert_eq!(PositionSearch::LegacyLattice.first_fit(&c, unit), None);
    }

    #[test]
    fn test_corner_points() {
        let a = Item::new("a", Dims::new(2, 1, 1), 1.0, 1.0).unwrap();
        let mut c = Container::new(Dims::new(3, 3, 3)).unwrap();
        assert_eq!(corner_points(&c), vec![Position::ORIGIN]);

        c.place(&a, Position::ORIGIN, a.dims());
        assert_eq!(
            corner_points(&c),
            vec![
                Position::new(0, 0, 0),
                Position::new(2, 0, 0),
                Position::new(0, 1, 0),
                Position::new(0, 0, 1),
            ]
        );
    }

    #[test]
    fn test_parse_search() {
        assert_eq!(
            "legacy-lattice".parse::<PositionSearch>(),
            Ok(PositionSearch::LegacyLattice)
        );
        assert!("grid".parse::<PositionSearch>().is_err());
    }

    #[test]
    fn test_first_fit_agrees_on_simple_case() {
        let a = Item::new("a", Dims::new(2, 2, 1), 1.0, 1.0).unwrap();
        let mut c = Container::new(Dims::new(4, 2, 1)).unwrap();
        c.place(&a, Position::ORIGIN, a.dims());
        for search in [
            PositionSearch::Lattice,
            PositionSearch::LegacyLattice,
            PositionSearch::CornerPoints,
        ] {
            assert_eq!(
                search.first_fit(&c, Dims::new(2, 2, 1)),
                Some(Position::new(2, 0, 0))
            );
            assert_eq!(search.first_fit(&c, Dims::new(3, 1, 1)), None);
        }
    }
}
