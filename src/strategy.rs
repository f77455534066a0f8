//! Placement policies. Each trial of the search runs one [`Strategy`], a
//! combination of free-rectangle selection, guillotine split, item sort
//! order and rotation.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::guillotine::FreeRect;
use crate::types::Rect;

/// Picks the free rectangle that hosts the next item. Lowest score wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionStrategy {
    ShortSide,
    LongSide,
    Area,
}

impl SelectionStrategy {
    pub const ALL: [Self; 3] = [Self::ShortSide, Self::LongSide, Self::Area];

    pub fn score(self, free: &FreeRect, piece: Rect) -> f64 {
        let dw = free.w - piece.w;
        let dh = free.h - piece.h;
        match self {
            Self::ShortSide => dw.min(dh),
            Self::LongSide => dw.max(dh),
            Self::Area => free.w * free.h,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::ShortSide => "short-side",
            Self::LongSide => "long-side",
            Self::Area => "area",
        }
    }
}

/// Decides which guillotine cut divides a free rectangle once an item sits
/// in its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SplitStrategy {
    /// Bottom remainder spans the full width, right remainder is as tall as the item.
    Horizontally,
    /// Right remainder spans the full height, bottom remainder is as wide as the item.
    Vertically,
    ShortAxis,
    LongAxis,
    ShortRemain,
    LongRemain,
}

impl SplitStrategy {
    pub const ALL: [Self; 6] = [
        Self::Horizontally,
        Self::Vertically,
        Self::ShortAxis,
        Self::LongAxis,
        Self::ShortRemain,
        Self::LongRemain,
    ];

    /// Whether to cut horizontally, i.e. give the full width to the bottom
    /// remainder.
    pub fn cuts_horizontally(self, free: &FreeRect, piece: Rect) -> bool {
        let leftover_w = free.w - piece.w;
        let leftover_h = free.h - piece.h;
        match self {
            Self::Horizontally => true,
            Self::Vertically => false,
            Self::ShortAxis => free.w < free.h,
            Self::LongAxis => free.w > free.h,
            Self::ShortRemain => leftover_w < leftover_h,
            Self::LongRemain => leftover_w >= leftover_h,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Horizontally => "horizontally",
            Self::Vertically => "vertically",
            Self::ShortAxis => "short-axis",
            Self::LongAxis => "long-axis",
            Self::ShortRemain => "short-remain",
            Self::LongRemain => "long-remain",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortStrategy {
    Area,
    // ties broken by the long side
    ShortSide,
    // ties broken by the short side
    LongSide,
    Perimeter,
    Differences,
    Ratio,
}

impl SortStrategy {
    pub const ALL: [Self; 6] = [
        Self::Area,
        Self::ShortSide,
        Self::LongSide,
        Self::Perimeter,
        Self::Differences,
        Self::Ratio,
    ];

    pub fn compare(self, a: Rect, b: Rect) -> Ordering {
        match self {
            Self::Area => a.area().total_cmp(&b.area()),
            Self::ShortSide => {
                let (sa, sb) = (a.sides(), b.sides());
                sa.short
                    .total_cmp(&sb.short)
                    .then(sa.long.total_cmp(&sb.long))
            }
            Self::LongSide => {
                let (sa, sb) = (a.sides(), b.sides());
                sa.long
                    .total_cmp(&sb.long)
                    .then(sa.short.total_cmp(&sb.short))
            }
            Self::Perimeter => a.perimeter().total_cmp(&b.perimeter()),
            Self::Differences => (a.w - a.h).abs().total_cmp(&(b.w - b.h).abs()),
            Self::Ratio => (a.w / a.h).total_cmp(&(b.w / b.h)),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Area => "area",
            Self::ShortSide => "short-side",
            Self::LongSide => "long-side",
            Self::Perimeter => "perimeter",
            Self::Differences => "differences",
            Self::Ratio => "ratio",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const ALL: [Self; 2] = [Self::Asc, Self::Desc];

    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Strategy {
    pub selection: SelectionStrategy,
    pub split: SplitStrategy,
    pub sort: SortStrategy,
    pub direction: SortDirection,
    pub rotation: bool,
}

impl Default for Strategy {
    fn default() -> Self {
        Self {
            selection: SelectionStrategy::ShortSide,
            split: SplitStrategy::ShortRemain,
            sort: SortStrategy::Area,
            direction: SortDirection::Desc,
            rotation: true,
        }
    }
}

impl Strategy {
    /// Stable, so equal keys keep input order.
    pub fn sort_indices(&self, order: &mut [usize], rect_of: impl Fn(usize) -> Rect) {
        order.sort_by(|&a, &b| self.direction.apply(self.sort.compare(rect_of(a), rect_of(b))));
    }

    /// Full cartesian product for fixed-size sheets, in a fixed order.
    /// Rotation-on variants are only produced when `allow_rotate` is set.
    pub fn all(allow_rotate: bool) -> Vec<Self> {
        let rotations = rotation_options(allow_rotate);
        let mut out = Vec::with_capacity(
            SelectionStrategy::ALL.len()
                * SplitStrategy::ALL.len()
                * SortStrategy::ALL.len()
                * SortDirection::ALL.len()
                * rotations.len(),
        );
        for &selection in &SelectionStrategy::ALL {
            for &split in &SplitStrategy::ALL {
                for &sort in &SortStrategy::ALL {
                    for &direction in &SortDirection::ALL {
                        for &rotation in rotations {
                            out.push(Self {
                                selection,
                                split,
                                sort,
                                direction,
                                rotation,
                            });
                        }
                    }
                }
            }
        }
        out
    }

    /// Search space for dynamic canvases. The canvas packer imposes its own
    /// item order, so sort and direction are pinned to area descending.
    pub fn dynamic(allow_rotate: bool) -> Vec<Self> {
        let rotations = rotation_options(allow_rotate);
        let mut out = Vec::new();
        for &selection in &SelectionStrategy::ALL {
            for &split in &SplitStrategy::ALL {
                for &rotation in rotations {
                    out.push(Self {
                        selection,
                        split,
                        sort: SortStrategy::Area,
                        direction: SortDirection::Desc,
                        rotation,
                    });
                }
            }
        }
        out
    }
}

fn rotation_options(allow_rotate: bool) -> &'static [bool] {
    if allow_rotate { &[false, true] } else { &[false] }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{}/{}-{}/{}",
            self.selection.name(),
            self.split.name(),
            self.sort.name(),
            self.direction.name(),
            if self.rotation { "rotate" } else { "fixed" }
        )
    }
}
