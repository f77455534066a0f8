use std::cmp::Ordering;

use rayon::prelude::*;

use crate::config::PackOptions;
use crate::dynamic::DynamicPacker;
use crate::error::PackError;
use crate::packer::{Layout, Packer};
use crate::strategy::Strategy;
use crate::types::{Item, Solution};

/// How a finished pass ranks against the others.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    pub unplaced: usize,
    pub sheets: usize,
    /// Sheet area not covered by parts on the last sheet.
    pub last_unused: f64,
    /// Squareness of the area actually covered on the last sheet.
    pub last_squareness: f64,
    dynamic: bool,
}

impl Score {
    pub fn of(layout: &Layout, dynamic: bool) -> Self {
        let (last_unused, last_squareness) = layout
            .sheets
            .last()
            .map(|s| {
                (
                    s.width * s.height - s.used_area(),
                    s.bounding_box().squareness(),
                )
            })
            .unwrap_or((0.0, 0.0));
        Self {
            unplaced: layout.unplaced.len(),
            sheets: layout.sheets.len(),
            last_unused,
            last_squareness,
            dynamic,
        }
    }

    /// `Less` means `self` is the better layout. Fewer unplaced parts first,
    /// then fewer sheets, then more slack on the last sheet, then a squarer
    /// last sheet. A dynamic canvas is sized by its content, so there less
    /// slack is better.
    pub fn compare(&self, other: &Self) -> Ordering {
        self.unplaced
            .cmp(&other.unplaced)
            .then(self.sheets.cmp(&other.sheets))
            .then_with(|| {
                if self.dynamic {
                    self.last_unused.total_cmp(&other.last_unused)
                } else {
                    other.last_unused.total_cmp(&self.last_unused)
                }
            })
            .then_with(|| other.last_squareness.total_cmp(&self.last_squareness))
    }
}

/// Multi-start greedy search: runs one pass per strategy combination and
/// keeps the best by [`Score::compare`]. This is a heuristic, not an optimal
/// solver. Equal scores resolve to the earliest combination in
/// [`Solver::strategies`] order, so results do not depend on thread timing.
#[derive(Debug, Clone)]
pub struct Solver {
    options: PackOptions,
}

impl Solver {
    pub fn new(options: PackOptions) -> Result<Self, PackError> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &PackOptions {
        &self.options
    }

    /// Combinations the search tries, in tie-break order.
    pub fn strategies(&self) -> Vec<Strategy> {
        if self.options.sheet.is_dynamic() {
            Strategy::dynamic(self.options.allow_rotate)
        } else {
            Strategy::all(self.options.allow_rotate)
        }
    }

    fn run<T>(&self, items: &[Item<T>], strategy: Strategy) -> Layout {
        let PackOptions { sheet, kerf, .. } = self.options;
        if sheet.is_dynamic() {
            DynamicPacker::new(sheet, kerf, strategy).pack(items)
        } else {
            Packer::new(sheet, kerf, strategy).pack(items)
        }
    }

    /// Packs with a single strategy combination, skipping the search.
    pub fn solve_with<T>(&self, items: Vec<Item<T>>, strategy: Strategy) -> Solution<T> {
        let layout = self.run(&items, strategy);
        layout.resolve(items, Some(strategy))
    }

    pub fn solve<T: Sync>(&self, items: Vec<Item<T>>) -> Solution<T> {
        if items.is_empty() {
            return Solution::empty();
        }

        let strategies = self.strategies();
        let dynamic = self.options.sheet.is_dynamic();
        tracing::debug!(
            items = items.len(),
            trials = strategies.len(),
            sheet = %self.options.sheet,
            kerf = self.options.kerf,
            "starting strategy search"
        );

        let mut trials: Vec<(Score, Layout)> = strategies
            .par_iter()
            .map(|&strategy| {
                let layout = self.run(&items, strategy);
                let score = Score::of(&layout, dynamic);
                tracing::trace!(
                    %strategy,
                    sheets = score.sheets,
                    unplaced = score.unplaced,
                    "trial finished"
                );
                (score, layout)
            })
            .collect();

        let Some(best) = trials
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.0.compare(&b.0))
            .map(|(i, _)| i)
        else {
            return Solution::empty();
        };

        let (score, layout) = trials.swap_remove(best);
        let strategy = strategies[best];
        tracing::info!(
            %strategy,
            sheets = score.sheets,
            unplaced = score.unplaced,
            "best layout selected"
        );
        layout.resolve(items, Some(strategy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packer::checks::assert_solution_valid;
    use crate::types::{SheetSize, UnplacedReason};

    fn items(sizes: &[(f64, f64)]) -> Vec<Item<usize>> {
        sizes
            .iter()
            .enumerate()
            .map(|(i, &(w, h))| Item::new(w, h, i))
            .collect()
    }

    fn solver(sheet: (f64, f64), kerf: f64, allow_rotate: bool) -> Solver {
        Solver::new(PackOptions {
            sheet: SheetSize::new(sheet.0, sheet.1),
            kerf,
            allow_rotate,
        })
        .unwrap()
    }

    fn solve(solver: &Solver, sizes: &[(f64, f64)]) -> Solution<usize> {
        let sol = solver.solve(items(sizes));
        assert_solution_valid(&sol, sizes.len(), solver.options().kerf);
        sol
    }

    #[test]
    fn test_fits_one_sheet() {
        let sol = solve(&solver((100.0, 100.0), 0.0, false), &[(40.0, 40.0); 3]);
        assert_eq!(sol.sheet_count(), 1);
        assert_eq!(sol.sheets[0].placements.len(), 3);
        assert!(sol.unplaced.is_empty());
        assert!(sol.strategy.is_some_and(|s| !s.rotation));
    }

    #[test]
    fn test_forces_second_sheet() {
        let sol = solve(&solver((50.0, 50.0), 0.0, true), &[(40.0, 40.0); 2]);
        assert_eq!(sol.sheet_count(), 2);
        assert!(sol.sheets.iter().all(|s| s.placements.len() == 1));
        assert!(sol.unplaced.is_empty());
    }

    #[test]
    fn test_oversized_is_unplaced() {
        for allow_rotate in [false, true] {
            let sol = solve(&solver((30.0, 30.0), 0.0, allow_rotate), &[(40.0, 10.0)]);
            assert_eq!(sol.placed_count(), 0);
            assert_eq!(sol.unplaced.len(), 1);
            assert_eq!(sol.unplaced[0].reason, UnplacedReason::Oversized);
        }
    }

    #[test]
    fn test_kerf_spacing() {
        let sol = solve(&solver((100.0, 10.0), 5.0, false), &[(40.0, 10.0); 2]);
        assert_eq!(sol.sheet_count(), 1);
        let mut xs: Vec<f64> = sol.sheets[0].placements.iter().map(|p| p.x).collect();
        xs.sort_by(f64::total_cmp);
        assert_eq!(xs, vec![0.0, 45.0]);
    }

    #[test]
    fn test_dynamic_canvas() {
        let sol = solve(&solver((0.0, 0.0), 0.0, true), &[(10.0, 10.0); 4]);
        assert_eq!(sol.sheet_count(), 1);
        assert_eq!(sol.placed_count(), 4);
        let sheet = &sol.sheets[0];
        assert!(sheet.area() >= 400.0);
        assert_eq!(sheet.area(), 400.0);
    }

    #[test]
    fn test_rotation_only_when_allowed() {
        let sizes = [(50.0, 100.0)];
        let sol = solve(&solver((100.0, 50.0), 0.0, true), &sizes);
        assert_eq!(sol.placed_count(), 1);
        assert!(sol.sheets[0].placements[0].rotated);

        let sol = solve(&solver((100.0, 50.0), 0.0, false), &sizes);
        assert_eq!(sol.placed_count(), 0);
    }

    #[test]
    fn test_search_never_worse_than_single_strategy() {
        let sizes = [
            (1200.0, 600.0),
            (800.0, 400.0),
            (800.0, 400.0),
            (600.0, 300.0),
            (400.0, 400.0),
            (500.0, 250.0),
            (500.0, 250.0),
            (300.0, 200.0),
            (700.0, 350.0),
            (250.0, 150.0),
            (1000.0, 700.0),
            (450.0, 200.0),
        ];
        let solver = solver((2440.0, 1220.0), 3.0, true);
        let best = solve(&solver, &sizes);
        for strategy in [Strategy::default(), solver.strategies()[0]] {
            let single = solver.solve_with(items(&sizes), strategy);
            assert_solution_valid(&single, sizes.len(), 3.0);
            assert!(best.sheet_count() <= single.sheet_count());
        }

        let total_area: f64 = sizes.iter().map(|(w, h)| w * h).sum();
        let min_sheets = (total_area / (2440.0 * 1220.0)).ceil() as usize;
        assert!(best.sheet_count() >= min_sheets);
    }

    #[test]
    fn test_search_is_deterministic() {
        let sizes = [
            (120.0, 42.0),
            (42.0, 42.0),
            (84.0, 42.0),
            (84.0, 84.0),
            (30.0, 12.5),
            (66.0, 21.0),
        ];
        let solver = solver((200.0, 150.0), 0.2, true);
        let a = solve(&solver, &sizes);
        let b = solve(&solver, &sizes);
        assert_eq!(a.strategy, b.strategy);
        let flatten = |s: &Solution<usize>| {
            s.sheets
                .iter()
                .flat_map(|sh| sh.placements.iter().map(|p| (p.payload, p.x, p.y, p.rotated)))
                .collect::<Vec<_>>()
        };
        assert_eq!(flatten(&a), flatten(&b));
    }

    #[test]
    fn test_mixed_valid_and_invalid_items() {
        let sizes = [(10.0, 10.0), (0.0, 5.0), (200.0, 200.0), (20.0, 5.0)];
        let sol = solve(&solver((100.0, 100.0), 1.0, true), &sizes);
        assert_eq!(sol.placed_count(), 2);
        let mut reasons: Vec<_> = sol.unplaced.iter().map(|u| (u.item.payload, u.reason)).collect();
        reasons.sort_by_key(|(i, _)| *i);
        assert_eq!(
            reasons,
            vec![
                (1, UnplacedReason::InvalidDimensions),
                (2, UnplacedReason::Oversized)
            ]
        );
    }

    #[test]
    fn test_empty_input() {
        let sol = solver((100.0, 100.0), 0.0, true).solve(Vec::<Item<usize>>::new());
        assert_eq!(sol.sheet_count(), 0);
        assert!(sol.strategy.is_none());
    }

    #[test]
    fn test_invalid_options_rejected() {
        let err = Solver::new(PackOptions {
            kerf: f64::NAN,
            ..PackOptions::default()
        })
        .unwrap_err();
        assert!(matches!(err, PackError::InvalidKerf(_)));
    }

    fn score(unplaced: usize, sheets: usize, last_unused: f64, last_squareness: f64) -> Score {
        Score {
            unplaced,
            sheets,
            last_unused,
            last_squareness,
            dynamic: false,
        }
    }

    #[test]
    fn test_score_order() {
        // Unplaced parts outweigh sheet count.
        assert_eq!(
            score(0, 3, 0.0, 0.0).compare(&score(1, 1, 0.0, 0.0)),
            Ordering::Less
        );
        assert_eq!(
            score(0, 1, 0.0, 0.0).compare(&score(0, 2, 500.0, 1.0)),
            Ordering::Less
        );
        assert_eq!(
            score(0, 2, 800.0, 0.1).compare(&score(0, 2, 500.0, 1.0)),
            Ordering::Less
        );
        assert_eq!(
            score(0, 2, 500.0, 0.9).compare(&score(0, 2, 500.0, 0.5)),
            Ordering::Less
        );
        assert_eq!(
            score(0, 2, 500.0, 0.5).compare(&score(0, 2, 500.0, 0.5)),
            Ordering::Equal
        );
    }

    #[test]
    fn test_dynamic_score_prefers_tighter_canvas() {
        let tight = Score {
            dynamic: true,
            ..score(0, 1, 100.0, 0.5)
        };
        let loose = Score {
            dynamic: true,
            ..score(0, 1, 900.0, 1.0)
        };
        assert_eq!(tight.compare(&loose), Ordering::Less);
    }
}
