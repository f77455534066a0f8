use serde::{Deserialize, Serialize};

use crate::strategy::Strategy;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub w: f64,
    pub h: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sides {
    pub short: f64,
    pub long: f64,
}

impl Rect {
    pub fn new(w: f64, h: f64) -> Self {
        Self { w, h }
    }

    pub fn area(&self) -> f64 {
        self.w * self.h
    }

    pub fn perimeter(&self) -> f64 {
        2.0 * (self.w + self.h)
    }

    pub fn sides(&self) -> Sides {
        Sides {
            short: self.w.min(self.h),
            long: self.w.max(self.h),
        }
    }

    /// `min(w/h, h/w)`: 1.0 for a square, approaching 0 for a sliver.
    /// Degenerate rectangles score 0.
    pub fn squareness(&self) -> f64 {
        if self.w <= 0.0 || self.h <= 0.0 {
            return 0.0;
        }
        (self.w / self.h).min(self.h / self.w)
    }

    pub fn rotated(&self) -> Self {
        Self {
            w: self.h,
            h: self.w,
        }
    }

    pub fn is_square(&self) -> bool {
        self.w == self.h
    }

    pub fn fits_in(&self, other: &Rect) -> bool {
        other.w - self.w >= 0.0 && other.h - self.h >= 0.0
    }

    pub fn is_valid(&self) -> bool {
        self.w.is_finite() && self.h.is_finite() && self.w > 0.0 && self.h > 0.0
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.w, self.h)
    }
}

/// Stock sheet dimensions. A zero on either axis makes that axis dynamic:
/// the canvas grows along it to fit whatever is packed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SheetSize {
    pub width: f64,
    pub height: f64,
}

impl SheetSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn dynamic() -> Self {
        Self::default()
    }

    pub fn dynamic_width(&self) -> bool {
        self.width == 0.0
    }

    pub fn dynamic_height(&self) -> bool {
        self.height == 0.0
    }

    pub fn is_dynamic(&self) -> bool {
        self.dynamic_width() || self.dynamic_height()
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.width, self.height)
    }
}

impl std::fmt::Display for SheetSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let axis = |v: f64| {
            if v == 0.0 {
                "auto".to_string()
            } else {
                v.to_string()
            }
        };
        write!(f, "{}x{}", axis(self.width), axis(self.height))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item<T> {
    pub width: f64,
    pub height: f64,
    pub payload: T,
}

impl<T> Item<T> {
    pub fn new(width: f64, height: f64, payload: T) -> Self {
        Self {
            width,
            height,
            payload,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.width, self.height)
    }
}

/// A packed part. `width`/`height` are the placed footprint, already swapped
/// when `rotated` is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement<T> {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rotated: bool,
    pub sheet: usize,
    pub payload: T,
}

impl<T> Placement<T> {
    pub fn rect(&self) -> Rect {
        Rect::new(self.width, self.height)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnplacedReason {
    InvalidDimensions,
    Oversized,
    // fresh sheet or grown canvas still had no room
    NoFit,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Unplaced<T> {
    #[serde(flatten)]
    pub item: Item<T>,
    pub reason: UnplacedReason,
}

#[derive(Debug, Clone, Serialize)]
pub struct Sheet<T> {
    pub width: f64,
    pub height: f64,
    pub placements: Vec<Placement<T>>,
}

impl<T> Sheet<T> {
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn used_area(&self) -> f64 {
        self.placements.iter().map(|p| p.rect().area()).sum()
    }

    pub fn waste_area(&self) -> f64 {
        self.area() - self.used_area()
    }

    pub fn bounding_box(&self) -> Rect {
        self.placements.iter().fold(Rect::new(0.0, 0.0), |bb, p| {
            Rect::new(bb.w.max(p.right()), bb.h.max(p.bottom()))
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Solution<T> {
    pub sheets: Vec<Sheet<T>>,
    pub unplaced: Vec<Unplaced<T>>,
    pub strategy: Option<Strategy>,
}

impl<T> Solution<T> {
    pub fn empty() -> Self {
        Self {
            sheets: Vec::new(),
            unplaced: Vec::new(),
            strategy: None,
        }
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    pub fn placed_count(&self) -> usize {
        self.sheets.iter().map(|s| s.placements.len()).sum()
    }

    pub fn total_waste_percent(&self) -> f64 {
        let total_area: f64 = self.sheets.iter().map(Sheet::area).sum();
        if total_area <= 0.0 {
            return 0.0;
        }
        let used: f64 = self.sheets.iter().map(Sheet::used_area).sum();
        (total_area - used) / total_area * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_metrics() {
        let r = Rect::new(40.0, 10.0);
        assert_eq!(r.area(), 400.0);
        assert_eq!(r.perimeter(), 100.0);
        assert_eq!(r.sides(), Sides { short: 10.0, long: 40.0 });
        assert_eq!(r.squareness(), 0.25);
        assert_eq!(Rect::new(7.0, 7.0).squareness(), 1.0);
    }

    #[test]
    fn test_rotation_is_an_involution() {
        let r = Rect::new(12.5, 3.0);
        assert_eq!(r.rotated().rotated(), r);
        assert_eq!(r.rotated().area(), r.area());
        assert_eq!(r.rotated().perimeter(), r.perimeter());
        assert_eq!(r.rotated().sides(), r.sides());
        assert_eq!(r.rotated().squareness(), r.squareness());
    }

    #[test]
    fn test_degenerate_squareness() {
        assert_eq!(Rect::new(0.0, 10.0).squareness(), 0.0);
        assert_eq!(Rect::new(10.0, 0.0).squareness(), 0.0);
    }

    #[test]
    fn test_validity() {
        assert!(Rect::new(1.0, 0.5).is_valid());
        assert!(!Rect::new(0.0, 1.0).is_valid());
        assert!(!Rect::new(-1.0, 1.0).is_valid());
        assert!(!Rect::new(f64::NAN, 1.0).is_valid());
        assert!(!Rect::new(1.0, f64::INFINITY).is_valid());
    }

    #[test]
    fn test_fits_in() {
        let stock = Rect::new(100.0, 50.0);
        assert!(Rect::new(100.0, 50.0).fits_in(&stock));
        assert!(!Rect::new(50.0, 100.0).fits_in(&stock));
        assert!(Rect::new(50.0, 100.0).rotated().fits_in(&stock));
    }

    #[test]
    fn test_sheet_size_axes() {
        assert!(SheetSize::dynamic().is_dynamic());
        assert!(SheetSize::new(0.0, 300.0).dynamic_width());
        assert!(!SheetSize::new(0.0, 300.0).dynamic_height());
        assert!(!SheetSize::new(600.0, 300.0).is_dynamic());
        assert_eq!(SheetSize::new(0.0, 300.0).to_string(), "autox300");
    }

    #[test]
    fn test_sheet_metrics() {
        let sheet = Sheet {
            width: 100.0,
            height: 100.0,
            placements: vec![
                Placement {
                    x: 0.0,
                    y: 0.0,
                    width: 50.0,
                    height: 20.0,
                    rotated: false,
                    sheet: 0,
                    payload: (),
                },
                Placement {
                    x: 55.0,
                    y: 0.0,
                    width: 10.0,
                    height: 40.0,
                    rotated: true,
                    sheet: 0,
                    payload: (),
                },
            ],
        };
        assert_eq!(sheet.used_area(), 1400.0);
        assert_eq!(sheet.waste_area(), 8600.0);
        assert_eq!(sheet.bounding_box(), Rect::new(65.0, 40.0));
    }

    #[test]
    fn test_waste_percent_of_empty_solution() {
        let sol: Solution<()> = Solution::empty();
        assert_eq!(sol.total_waste_percent(), 0.0);
        assert_eq!(sol.placed_count(), 0);
    }
}
