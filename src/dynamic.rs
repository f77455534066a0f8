//! Packing onto a canvas that grows to fit its content instead of opening
//! new sheets. Used to answer "how large a single sheet would this need".

use crate::guillotine::{FreePool, FreeRect};
use crate::packer::{Layout, SheetLayout, Slot, prefilter};
use crate::strategy::Strategy;
use crate::types::{Item, Rect, SheetSize, UnplacedReason};

#[derive(Debug, Clone, Copy)]
pub struct DynamicPacker {
    sheet: SheetSize,
    kerf: f64,
    strategy: Strategy,
}

impl DynamicPacker {
    /// `sheet` must have at least one zero (dynamic) axis; a non-zero axis
    /// stays fixed at that size.
    pub fn new(sheet: SheetSize, kerf: f64, strategy: Strategy) -> Self {
        Self {
            sheet,
            kerf,
            strategy,
        }
    }

    fn orientations(&self, piece: Rect) -> impl Iterator<Item = Rect> {
        let turned = (self.strategy.rotation && !piece.is_square()).then(|| piece.rotated());
        std::iter::once(piece).chain(turned)
    }

    fn fits_fixed_axis(&self, piece: Rect) -> bool {
        (self.sheet.dynamic_width() || piece.w <= self.sheet.width)
            && (self.sheet.dynamic_height() || piece.h <= self.sheet.height)
    }

    /// Sort key, largest first. With one fixed axis the items are ordered by
    /// their extent along that fixed axis.
    fn sort_key(&self, piece: Rect) -> f64 {
        match (self.sheet.dynamic_width(), self.sheet.dynamic_height()) {
            (true, true) => piece.area(),
            (true, false) => piece.h,
            _ => piece.w,
        }
    }

    pub fn pack<T>(&self, items: &[Item<T>]) -> Layout {
        let (mut order, mut unplaced) = prefilter(items, |r| {
            self.orientations(r).any(|o| self.fits_fixed_axis(o))
        });
        order.sort_by(|&a, &b| {
            self.sort_key(items[b].rect())
                .total_cmp(&self.sort_key(items[a].rect()))
        });

        let strategy = self.strategy;
        let mut pool = FreePool::new(self.kerf);
        let mut canvas: Option<Rect> = None;
        let mut slots = Vec::new();

        for idx in order {
            let piece = items[idx].rect();
            let current = match canvas {
                Some(c) => c,
                None => {
                    let c = self.initial_canvas(piece);
                    pool.create_sheet(c.w, c.h);
                    canvas = Some(c);
                    c
                }
            };

            let mut scored =
                pool.find_best(piece, strategy.rotation, strategy.selection, strategy.split);
            if scored.is_none() {
                canvas = Some(self.grow(&mut pool, current, piece));
                scored =
                    pool.find_best(piece, strategy.rotation, strategy.selection, strategy.split);
            }

            let Some(scored) = scored else {
                tracing::warn!(item = idx, size = %piece, "item fits no free space after growing the canvas");
                unplaced.push((idx, UnplacedReason::NoFit));
                continue;
            };

            let (rotated, footprint) = (scored.rotated, scored.piece);
            let host = pool.place(scored);
            slots.push(Slot {
                item: idx,
                x: host.x,
                y: host.y,
                w: footprint.w,
                h: footprint.h,
                rotated,
            });
        }

        let sheets = if slots.is_empty() {
            Vec::new()
        } else {
            let mut sheet = SheetLayout {
                width: 0.0,
                height: 0.0,
                slots,
            };
            let bb = sheet.bounding_box();
            sheet.width = bb.w;
            sheet.height = bb.h;
            vec![sheet]
        };

        Layout { sheets, unplaced }
    }

    /// Canvas sized to the first item, or to the fixed dimension on a fixed
    /// axis.
    fn initial_canvas(&self, piece: Rect) -> Rect {
        let first = self
            .orientations(piece)
            .find(|&o| self.fits_fixed_axis(o))
            .unwrap_or(piece);
        Rect::new(
            if self.sheet.dynamic_width() {
                first.w
            } else {
                self.sheet.width
            },
            if self.sheet.dynamic_height() {
                first.h
            } else {
                self.sheet.height
            },
        )
    }

    /// Extends the canvas to the right or downwards, whichever keeps it
    /// closer to square, and adds the new strip as free space. Returns the
    /// grown canvas.
    fn grow(&self, pool: &mut FreePool, canvas: Rect, piece: Rect) -> Rect {
        let kerf = self.kerf;
        let mut best: Option<(f64, Rect, FreeRect)> = None;
        let mut consider = |grown: Rect, strip: FreeRect| {
            let squareness = grown.squareness();
            if best.is_none_or(|(s, _, _)| squareness > s) {
                best = Some((squareness, grown, strip));
            }
        };

        for o in self.orientations(piece).filter(|&o| self.fits_fixed_axis(o)) {
            if self.sheet.dynamic_width() {
                let grown = Rect::new(canvas.w + kerf + o.w, canvas.h.max(o.h));
                consider(
                    grown,
                    FreeRect {
                        x: canvas.w + kerf,
                        y: 0.0,
                        w: o.w,
                        h: grown.h,
                        sheet: 0,
                    },
                );
            }
            if self.sheet.dynamic_height() {
                let grown = Rect::new(canvas.w.max(o.w), canvas.h + kerf + o.h);
                consider(
                    grown,
                    FreeRect {
                        x: 0.0,
                        y: canvas.h + kerf,
                        w: grown.w,
                        h: o.h,
                        sheet: 0,
                    },
                );
            }
        }

        match best {
            Some((_, grown, strip)) => {
                tracing::trace!(from = %canvas, to = %grown, "growing canvas");
                pool.insert(strip);
                grown
            }
            None => canvas,
        }
    }
}
