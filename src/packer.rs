//! Single greedy pass over the items with one fixed [`Strategy`].
//!
//! Passes work on item indices so the search can run hundreds of them over a
//! shared item list; [`Layout::resolve`] turns the winner back into
//! payload-carrying placements.

use crate::guillotine::FreePool;
use crate::strategy::Strategy;
use crate::types::{Item, Placement, Rect, Sheet, SheetSize, Solution, Unplaced, UnplacedReason};

/// Position of one item within a layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    pub item: usize,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub rotated: bool,
}

impl Slot {
    pub fn rect(&self) -> Rect {
        Rect::new(self.w, self.h)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetLayout {
    pub width: f64,
    pub height: f64,
    pub slots: Vec<Slot>,
}

impl SheetLayout {
    pub fn used_area(&self) -> f64 {
        self.slots.iter().map(|s| s.rect().area()).sum()
    }

    pub fn bounding_box(&self) -> Rect {
        self.slots.iter().fold(Rect::new(0.0, 0.0), |bb, s| {
            Rect::new(bb.w.max(s.x + s.w), bb.h.max(s.y + s.h))
        })
    }
}

/// Outcome of one pass, by item index.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub sheets: Vec<SheetLayout>,
    pub unplaced: Vec<(usize, UnplacedReason)>,
}

impl Layout {
    /// Moves payloads out of `items` into the placements this layout
    /// describes. `items` must be the list the layout was computed from.
    pub fn resolve<T>(self, items: Vec<Item<T>>, strategy: Option<Strategy>) -> Solution<T> {
        let mut items: Vec<Option<Item<T>>> = items.into_iter().map(Some).collect();

        let sheets = self
            .sheets
            .into_iter()
            .enumerate()
            .map(|(sheet, layout)| Sheet {
                width: layout.width,
                height: layout.height,
                placements: layout
                    .slots
                    .into_iter()
                    .filter_map(|slot| {
                        let item = items[slot.item].take()?;
                        Some(Placement {
                            x: slot.x,
                            y: slot.y,
                            width: slot.w,
                            height: slot.h,
                            rotated: slot.rotated,
                            sheet,
                            payload: item.payload,
                        })
                    })
                    .collect(),
            })
            .collect();

        let unplaced = self
            .unplaced
            .into_iter()
            .filter_map(|(idx, reason)| {
                let item = items[idx].take()?;
                Some(Unplaced { item, reason })
            })
            .collect();

        Solution {
            sheets,
            unplaced,
            strategy,
        }
    }
}

/// Splits item indices into those worth attempting and those rejected up
/// front, in input order. `fits` decides whether a valid footprint can ever
/// be placed.
pub(crate) fn prefilter<T>(
    items: &[Item<T>],
    fits: impl Fn(Rect) -> bool,
) -> (Vec<usize>, Vec<(usize, UnplacedReason)>) {
    let mut accepted = Vec::with_capacity(items.len());
    let mut rejected = Vec::new();
    for (idx, item) in items.iter().enumerate() {
        let rect = item.rect();
        if !rect.is_valid() {
            rejected.push((idx, UnplacedReason::InvalidDimensions));
        } else if !fits(rect) {
            rejected.push((idx, UnplacedReason::Oversized));
        } else {
            accepted.push(idx);
        }
    }
    (accepted, rejected)
}

/// Fixed-sheet packer: opens a fresh sheet whenever no existing free space
/// can host the next item.
#[derive(Debug, Clone, Copy)]
pub struct Packer {
    sheet: Rect,
    kerf: f64,
    strategy: Strategy,
}

impl Packer {
    pub fn new(sheet: SheetSize, kerf: f64, strategy: Strategy) -> Self {
        Self {
            sheet: sheet.rect(),
            kerf,
            strategy,
        }
    }

    pub fn pack<T>(&self, items: &[Item<T>]) -> Layout {
        let strategy = self.strategy;
        let stock = self.sheet;
        let (mut order, mut unplaced) = prefilter(items, |r| {
            r.fits_in(&stock) || (strategy.rotation && r.rotated().fits_in(&stock))
        });
        strategy.sort_indices(&mut order, |i| items[i].rect());

        let mut pool = FreePool::new(self.kerf);
        let mut slots: Vec<Vec<Slot>> = Vec::new();

        for idx in order {
            let piece = items[idx].rect();
            let mut scored =
                pool.find_best(piece, strategy.rotation, strategy.selection, strategy.split);
            if scored.is_none() {
                pool.create_sheet(stock.w, stock.h);
                scored =
                    pool.find_best(piece, strategy.rotation, strategy.selection, strategy.split);
                if scored.is_none() {
                    pool.discard_last_sheet();
                }
            }

            let Some(scored) = scored else {
                tracing::warn!(item = idx, size = %piece, "item fits no free space on a fresh sheet");
                unplaced.push((idx, UnplacedReason::NoFit));
                continue;
            };

            let (rotated, footprint) = (scored.rotated, scored.piece);
            let host = pool.place(scored);
            if slots.len() <= host.sheet {
                slots.resize_with(host.sheet + 1, Vec::new);
            }
            slots[host.sheet].push(Slot {
                item: idx,
                x: host.x,
                y: host.y,
                w: footprint.w,
                h: footprint.h,
                rotated,
            });
        }

        Layout {
            sheets: slots
                .into_iter()
                .map(|slots| SheetLayout {
                    width: stock.w,
                    height: stock.h,
                    slots,
                })
                .collect(),
            unplaced,
        }
    }
}
