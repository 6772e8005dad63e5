#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure leaf system that generates relative coverage masks per object kind.

use std::collections::HashMap;

use range_overlay_core::{MaskParameters, ObjectKind};

/// Square boolean grid describing covered tiles relative to a center anchor.
///
/// The grid has odd side `2r + 1` and is indexed by `(i, j)` cell indices in
/// `[0, side)`; the center cell `(r, r)` is never covered because an object
/// does not affect the tile it occupies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoverageMask {
    side: usize,
    cells: Vec<bool>,
}

impl CoverageMask {
    /// Side length of the square grid.
    #[must_use]
    pub fn side(&self) -> usize {
        self.side
    }

    /// Distance from the center cell to the grid edge in whole cells.
    #[must_use]
    pub fn radius(&self) -> usize {
        self.side / 2
    }

    /// Reports whether the cell at the provided indices is covered.
    ///
    /// Indices outside the grid are reported as uncovered.
    #[must_use]
    pub fn is_covered(&self, i: usize, j: usize) -> bool {
        if i >= self.side || j >= self.side {
            return false;
        }
        self.cells[i * self.side + j]
    }

    /// Number of covered cells in the grid.
    #[must_use]
    pub fn covered_count(&self) -> usize {
        self.cells.iter().filter(|covered| **covered).count()
    }

    /// Iterator over covered cells expressed as offsets from the center.
    pub fn offsets(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let side = self.side;
        let half = (side / 2) as i32;
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, covered)| **covered)
            .map(move |(index, _)| {
                let i = (index / side) as i32;
                let j = (index % side) as i32;
                (i - half, j - half)
            })
    }

    fn clear(&mut self, i: usize, j: usize) {
        if i < self.side && j < self.side {
            self.cells[i * self.side + j] = false;
        }
    }
}

/// Computes a coverage mask from a maximum distance and shape modifiers.
///
/// `radius = ceil(max_distance)` fixes the grid at side `2 * radius + 1`.
/// A cell is covered when any rule admits it:
/// - its Euclidean distance from the center is at most `max_distance`;
/// - `square_mask` is set and the cell passes the square bound. The square
///   bound is one-sided: only the high side of each axis is tested, so cells
///   at or below the radius on the low side always pass it;
/// - `inclusive_max` is set and the cell lies on the center row or column.
///
/// The center cell is forced uncovered regardless of the rules.
#[must_use]
pub fn compute_mask(max_distance: f64, square_mask: bool, inclusive_max: bool) -> CoverageMask {
    let radius = max_distance.max(0.0).ceil() as usize;
    let side = 2 * radius + 1;

    let mut cells = vec![false; side * side];
    for i in 0..side {
        for j in 0..side {
            let di = radius as f64 - i as f64;
            let dj = radius as f64 - j as f64;
            let distance = (di * di + dj * dj).sqrt();

            let covered = distance <= max_distance
                || (square_mask
                    && j as f64 - radius as f64 <= max_distance
                    && i as f64 - radius as f64 <= max_distance)
                || (inclusive_max && (radius == j || radius == i));

            cells[i * side + j] = covered;
        }
    }

    cells[radius * side + radius] = false;
    CoverageMask { side, cells }
}

/// Generates the coverage mask for the provided object kind and booster flag.
///
/// Each kind maps to fixed distance and shape parameters; only the base,
/// quality and iridium sprinklers react to `has_range_booster` (the base
/// model switches from circular to square coverage, the upgradeable tiers
/// grow by one tile of radius). The hut mask additionally blanks the tiles
/// occupied by the building body around its door.
#[must_use]
pub fn mask_for(params: MaskParameters) -> CoverageMask {
    match params.kind {
        ObjectKind::JunimoHut => {
            let mut mask = compute_mask(8.0, true, false);
            // Hut body row above the door.
            mask.clear(7, 7);
            mask.clear(7, 8);
            mask.clear(7, 9);
            // Tiles flanking the door itself.
            mask.clear(8, 7);
            mask.clear(8, 9);
            mask
        }
        ObjectKind::BeeHouse => compute_mask(4.19, false, true),
        ObjectKind::Scarecrow => compute_mask(8.9, false, false),
        ObjectKind::DeluxeScarecrow => compute_mask(16.9, false, false),
        ObjectKind::Sprinkler => compute_mask(1.0, params.has_range_booster, false),
        ObjectKind::QualitySprinkler => {
            let max_distance = if params.has_range_booster { 2.0 } else { 1.0 };
            compute_mask(max_distance, true, false)
        }
        ObjectKind::IridiumSprinkler => {
            let max_distance = if params.has_range_booster { 3.0 } else { 2.0 };
            compute_mask(max_distance, true, false)
        }
        ObjectKind::PrismaticSprinkler => compute_mask(3.0, true, false),
    }
}

/// Memoizes generated masks keyed by their parameters.
///
/// Masks depend only on `(kind, has_range_booster)`, so every recompute pass
/// after the first reuses the stored grids without regenerating them.
#[derive(Debug, Default)]
pub struct MaskCache {
    entries: HashMap<MaskParameters, CoverageMask>,
}

impl MaskCache {
    /// Creates an empty mask cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the mask for the provided parameters, generating it on first use.
    pub fn mask(&mut self, params: MaskParameters) -> &CoverageMask {
        self.entries.entry(params).or_insert_with(|| mask_for(params))
    }

    /// Number of distinct parameter sets generated so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether the cache holds no generated masks yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(kind: ObjectKind, boosted: bool) -> MaskParameters {
        MaskParameters::new(kind, boosted)
    }

    #[test]
    fn side_length_follows_distance_ceiling() {
        assert_eq!(compute_mask(1.0, false, false).side(), 3);
        assert_eq!(compute_mask(4.19, false, true).side(), 11);
        assert_eq!(compute_mask(8.9, false, false).side(), 19);
        assert_eq!(compute_mask(16.9, false, false).side(), 35);
        assert_eq!(compute_mask(0.0, false, false).side(), 1);
    }

    #[test]
    fn center_cell_is_never_covered() {
        for mask in [
            compute_mask(1.0, false, false),
            compute_mask(3.0, true, false),
            compute_mask(4.19, false, true),
            mask_for(params(ObjectKind::JunimoHut, false)),
        ] {
            let radius = mask.radius();
            assert!(!mask.is_covered(radius, radius));
        }
    }

    #[test]
    fn plain_sprinkler_covers_exactly_the_cardinal_neighbours() {
        let mask = mask_for(params(ObjectKind::Sprinkler, false));

        assert_eq!(mask.side(), 3);
        assert!(mask.is_covered(0, 1));
        assert!(mask.is_covered(2, 1));
        assert!(mask.is_covered(1, 0));
        assert!(mask.is_covered(1, 2));
        assert!(!mask.is_covered(0, 0));
        assert!(!mask.is_covered(0, 2));
        assert!(!mask.is_covered(2, 0));
        assert!(!mask.is_covered(2, 2));
        assert_eq!(mask.covered_count(), 4);
    }

    #[test]
    fn boosted_plain_sprinkler_fills_the_surrounding_square() {
        let mask = mask_for(params(ObjectKind::Sprinkler, true));
        assert_eq!(mask.side(), 3);
        assert_eq!(mask.covered_count(), 8);
    }

    #[test]
    fn quality_sprinkler_booster_grows_radius() {
        assert_eq!(
            mask_for(params(ObjectKind::QualitySprinkler, false)).covered_count(),
            8
        );
        assert_eq!(
            mask_for(params(ObjectKind::QualitySprinkler, true)).covered_count(),
            24
        );
    }

    #[test]
    fn iridium_sprinkler_booster_grows_radius() {
        assert_eq!(
            mask_for(params(ObjectKind::IridiumSprinkler, false)).covered_count(),
            24
        );
        assert_eq!(
            mask_for(params(ObjectKind::IridiumSprinkler, true)).covered_count(),
            48
        );
    }

    #[test]
    fn prismatic_sprinkler_ignores_booster() {
        let bare = mask_for(params(ObjectKind::PrismaticSprinkler, false));
        let boosted = mask_for(params(ObjectKind::PrismaticSprinkler, true));
        assert_eq!(bare, boosted);
        assert_eq!(bare.covered_count(), 48);
    }

    #[test]
    fn bee_house_includes_the_full_cardinal_ring() {
        let mask = mask_for(params(ObjectKind::BeeHouse, false));
        let radius = mask.radius();
        assert_eq!(radius, 5);

        // The center row and column reach the grid edge even though the edge
        // lies beyond the circular distance bound.
        assert!(mask.is_covered(0, radius));
        assert!(mask.is_covered(2 * radius, radius));
        assert!(mask.is_covered(radius, 0));
        assert!(mask.is_covered(radius, 2 * radius));

        // Distance 5 off-axis stays excluded: offset (3, 4) from the center.
        assert!(!mask.is_covered(radius + 3, radius + 4));
        // Offset (1, 4) is within 4.19 and stays covered.
        assert!(mask.is_covered(radius + 1, radius + 4));
    }

    #[test]
    fn hut_mask_blanks_the_building_body_and_door_flanks() {
        let mask = mask_for(params(ObjectKind::JunimoHut, false));
        assert_eq!(mask.side(), 17);

        for (i, j) in [(7, 7), (7, 8), (7, 9), (8, 7), (8, 9)] {
            assert!(!mask.is_covered(i, j), "cell ({i}, {j}) must stay blank");
        }
        assert!(!mask.is_covered(8, 8));
        assert!(mask.is_covered(9, 8));
        assert!(mask.is_covered(6, 8));
        assert!(mask.is_covered(0, 0));
    }

    #[test]
    fn circular_masks_are_symmetric_under_half_turn() {
        for mask in [
            compute_mask(8.9, false, false),
            compute_mask(4.19, false, true),
            mask_for(params(ObjectKind::IridiumSprinkler, false)),
            mask_for(params(ObjectKind::PrismaticSprinkler, false)),
        ] {
            let side = mask.side();
            for i in 0..side {
                for j in 0..side {
                    assert_eq!(
                        mask.is_covered(i, j),
                        mask.is_covered(side - 1 - i, side - 1 - j),
                        "cell ({i}, {j}) breaks half-turn symmetry",
                    );
                }
            }
        }
    }

    #[test]
    fn square_bound_is_one_sided_for_fractional_distances() {
        // With a fractional distance below the radius, the square rule admits
        // the low side of each axis but rejects the high side.
        let mask = compute_mask(1.5, true, false);
        assert_eq!(mask.side(), 5);
        assert!(mask.is_covered(0, 0));
        assert!(!mask.is_covered(4, 4));
    }

    #[test]
    fn offsets_match_covered_cells() {
        let mask = mask_for(params(ObjectKind::Sprinkler, false));
        let mut offsets: Vec<(i32, i32)> = mask.offsets().collect();
        offsets.sort_unstable();
        assert_eq!(offsets, vec![(-1, 0), (0, -1), (0, 1), (1, 0)]);
    }

    #[test]
    fn cache_generates_each_parameter_set_once() {
        let mut cache = MaskCache::new();
        assert!(cache.is_empty());

        let first = cache.mask(params(ObjectKind::Scarecrow, false)).clone();
        let second = cache.mask(params(ObjectKind::Scarecrow, false)).clone();
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);

        let _ = cache.mask(params(ObjectKind::Scarecrow, true));
        assert_eq!(
            cache.len(),
            2,
            "booster flag participates in the cache key even for kinds that ignore it",
        );
    }
}
