use crate::strategy::{SelectionStrategy, SplitStrategy};
use crate::types::Rect;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreeRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub sheet: usize,
}

impl FreeRect {
    pub fn rect(&self) -> Rect {
        Rect::new(self.w, self.h)
    }

    pub fn area(&self) -> f64 {
        self.w * self.h
    }

    pub fn fits(&self, piece: Rect) -> bool {
        piece.fits_in(&self.rect())
    }

    /// Guillotine remainders after `piece` is placed at this rectangle's
    /// origin. Both remainders start `kerf` past the piece; slivers with no
    /// positive extent are dropped.
    pub fn split(&self, piece: Rect, kerf: f64, strategy: SplitStrategy) -> Vec<FreeRect> {
        let right_w = self.w - piece.w - kerf;
        let bottom_h = self.h - piece.h - kerf;
        let (right_h, bottom_w) = if strategy.cuts_horizontally(self, piece) {
            (piece.h, self.w)
        } else {
            (self.h, piece.w)
        };

        [
            FreeRect {
                x: self.x + piece.w + kerf,
                y: self.y,
                w: right_w,
                h: right_h,
                sheet: self.sheet,
            },
            FreeRect {
                x: self.x,
                y: self.y + piece.h + kerf,
                w: bottom_w,
                h: bottom_h,
                sheet: self.sheet,
            },
        ]
        .into_iter()
        .filter(|r| r.w > 0.0 && r.h > 0.0)
        .collect()
    }
}

/// A candidate placement: the host free rectangle, the orientation and the
/// free rectangles the host would be replaced by.
#[derive(Debug, Clone)]
pub struct ScoredPlacement {
    pub free_idx: usize,
    pub rotated: bool,
    pub piece: Rect,
    pub score: f64,
    pub children: Vec<FreeRect>,
    /// Area of the largest rectangle the split leaves behind.
    pub largest_leftover: f64,
}

/// Free space across every sheet of one packing run.
#[derive(Debug, Clone)]
pub struct FreePool {
    kerf: f64,
    sheets: usize,
    pub free_rects: Vec<FreeRect>,
}

impl FreePool {
    pub fn new(kerf: f64) -> Self {
        Self {
            kerf,
            sheets: 0,
            free_rects: Vec::new(),
        }
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets
    }

    pub fn create_sheet(&mut self, w: f64, h: f64) -> usize {
        let sheet = self.sheets;
        self.sheets += 1;
        self.insert(FreeRect {
            x: 0.0,
            y: 0.0,
            w,
            h,
            sheet,
        });
        sheet
    }

    /// Drops the most recent sheet and its free space. Only valid while
    /// nothing has been placed on it.
    pub fn discard_last_sheet(&mut self) {
        if self.sheets == 0 {
            return;
        }
        self.sheets -= 1;
        let last = self.sheets;
        self.free_rects.retain(|f| f.sheet != last);
    }

    pub fn insert(&mut self, free: FreeRect) {
        if free.w > 0.0 && free.h > 0.0 {
            self.free_rects.push(free);
        }
    }

    pub fn candidates(&self, piece: Rect) -> impl Iterator<Item = (usize, &FreeRect)> {
        self.free_rects
            .iter()
            .enumerate()
            .filter(move |(_, f)| f.fits(piece))
    }

    /// Swaps the free rectangle at `idx` for its split children, keeping the
    /// pool order otherwise intact so ties resolve the same way every run.
    pub fn replace(&mut self, idx: usize, children: Vec<FreeRect>) -> FreeRect {
        let host = self.free_rects[idx];
        self.free_rects.splice(
            idx..=idx,
            children.into_iter().filter(|c| c.w > 0.0 && c.h > 0.0),
        );
        host
    }

    fn select(&self, piece: Rect, selection: SelectionStrategy) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, free) in self.candidates(piece) {
            let score = selection.score(free, piece);
            // strict: first candidate wins ties
            if best.is_none_or(|(_, s)| score < s) {
                best = Some((idx, score));
            }
        }
        best
    }

    fn evaluate(
        &self,
        free_idx: usize,
        score: f64,
        piece: Rect,
        rotated: bool,
        split: SplitStrategy,
    ) -> ScoredPlacement {
        let children = self.free_rects[free_idx].split(piece, self.kerf, split);
        let largest_leftover = children.iter().map(FreeRect::area).fold(0.0, f64::max);
        ScoredPlacement {
            free_idx,
            rotated,
            piece,
            score,
            children,
            largest_leftover,
        }
    }

    /// Finds where `piece` should go. With rotation allowed both orientations
    /// are selected independently and the one leaving the largest free
    /// rectangle behind is kept; ties keep the piece upright.
    pub fn find_best(
        &self,
        piece: Rect,
        allow_rotate: bool,
        selection: SelectionStrategy,
        split: SplitStrategy,
    ) -> Option<ScoredPlacement> {
        let upright = self
            .select(piece, selection)
            .map(|(idx, score)| self.evaluate(idx, score, piece, false, split));
        if !allow_rotate || piece.is_square() {
            return upright;
        }

        let turned = piece.rotated();
        let rotated = self
            .select(turned, selection)
            .map(|(idx, score)| self.evaluate(idx, score, turned, true, split));

        match (upright, rotated) {
            (Some(u), Some(r)) => {
                if r.largest_leftover > u.largest_leftover {
                    Some(r)
                } else {
                    Some(u)
                }
            }
            (u, r) => u.or(r),
        }
    }

    pub fn place(&mut self, scored: ScoredPlacement) -> FreeRect {
        self.replace(scored.free_idx, scored.children)
    }
}
