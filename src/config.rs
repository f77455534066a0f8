use serde::{Deserialize, Serialize};

use crate::error::PackError;
use crate::types::SheetSize;

/// Options shared by the CLI, the HTTP service and library callers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackOptions {
    /// Stock size; a zero axis grows to fit.
    pub sheet: SheetSize,
    /// Blade width kept clear between neighbouring parts.
    pub kerf: f64,
    /// Lets the search try 90° rotated placements.
    pub allow_rotate: bool,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            sheet: SheetSize::dynamic(),
            kerf: 0.0,
            allow_rotate: true,
        }
    }
}

impl PackOptions {
    pub fn validate(&self) -> Result<(), PackError> {
        if !self.kerf.is_finite() || self.kerf < 0.0 {
            return Err(PackError::InvalidKerf(self.kerf));
        }
        let axis_ok = |v: f64| v.is_finite() && v >= 0.0;
        if !axis_ok(self.sheet.width) || !axis_ok(self.sheet.height) {
            return Err(PackError::InvalidSheet {
                width: self.sheet.width,
                height: self.sheet.height,
            });
        }
        Ok(())
    }
}
