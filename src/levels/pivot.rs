// =============================================================================
// Classic Floor Pivot Points
// =============================================================================
//
// From the most recent bar's high (H), low (L) and close (C):
//   P  = (H + L + C) / 3
//   R1 = 2P - L        S1 = 2P - H
//   R2 = P + (H - L)   S2 = P - (H - L)
//   R3 = H + 2(P - L)  S3 = L - 2(H - P)
//
// R1 - S1 = H - L always; R1 and S1 sit symmetric about P only when C is the
// bar midpoint.

use serde::{Deserialize, Serialize};

use crate::market_data::PriceBar;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PivotPoints {
    pub pivot: f64,
    pub r1: f64,
    pub r2: f64,
    pub r3: f64,
    pub s1: f64,
    pub s2: f64,
    pub s3: f64,
}

impl PivotPoints {
    pub fn from_bar(bar: &PriceBar) -> Self {
        let (h, l) = (bar.high, bar.low);
        let p = bar.typical_price();
        Self {
            pivot: p,
            r1: 2.0 * p - l,
            r2: p + (h - l),
            r3: h + 2.0 * (p - l),
            s1: 2.0 * p - h,
            s2: p - (h - l),
            s3: l - 2.0 * (h - p),
        }
    }

    /// `(label, price)` for the three resistance levels, nearest first.
    pub fn resistances(&self) -> [(&'static str, f64); 3] {
        [("R1", self.r1), ("R2", self.r2), ("R3", self.r3)]
    }

    /// `(label, price)` for the three support levels, nearest first.
    pub fn supports(&self) -> [(&'static str, f64); 3] {
        [("S1", self.s1), ("S2", self.s2), ("S3", self.s3)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_values() {
        let p = PivotPoints::from_bar(&PriceBar::new(110.0, 90.0, 100.0, 1.0));
        assert!((p.pivot - 100.0).abs() < 1e-10);
        assert!((p.r1 - 110.0).abs() < 1e-10);
        assert!((p.r2 - 120.0).abs() < 1e-10);
        assert!((p.r3 - 130.0).abs() < 1e-10);
        assert!((p.s1 - 90.0).abs() < 1e-10);
        assert!((p.s2 - 80.0).abs() < 1e-10);
        assert!((p.s3 - 70.0).abs() < 1e-10);
    }

    #[test]
    fn band_widths_follow_the_bar_range() {
        let bars = [
            PriceBar::new(10.0, 9.0, 9.5, 100.0),
            PriceBar::new(57.3, 41.9, 56.0, 0.0),
            PriceBar::new(1.25, 1.0, 1.01, 5.0),
            PriceBar::new(30_000.0, 29_100.0, 29_150.5, 12.0),
        ];
        for bar in &bars {
            let p = PivotPoints::from_bar(bar);
            let range = bar.high - bar.low;
            let tol = 1e-9 * bar.high.max(1.0);
            assert!(((p.r1 - p.s1) - range).abs() < tol);
            assert!(((p.r2 - p.s2) - 2.0 * range).abs() < tol);
            assert!(((p.r1 - p.pivot) - (p.pivot - bar.low)).abs() < tol);
            assert!(((p.pivot - p.s1) - (bar.high - p.pivot)).abs() < tol);
        }
    }

    #[test]
    fn r1_and_s1_symmetric_when_close_is_midpoint() {
        for (h, l) in [(10.0, 9.0), (57.3, 41.9), (30_000.0, 29_100.0)] {
            let p = PivotPoints::from_bar(&PriceBar::new(h, l, (h + l) / 2.0, 1.0));
            assert!(((p.r1 - p.pivot) - (p.pivot - p.s1)).abs() < 1e-9 * h);
        }
        // Off-midpoint closes skew the pair toward the close.
        let p = PivotPoints::from_bar(&PriceBar::new(57.3, 41.9, 56.0, 0.0));
        assert!(p.r1 - p.pivot > p.pivot - p.s1);
    }

    #[test]
    fn levels_bracket_the_close() {
        let bar = PriceBar::new(105.0, 95.0, 104.0, 1.0);
        let p = PivotPoints::from_bar(&bar);
        assert!(p.r1 >= bar.close && p.r2 >= p.r1 && p.r3 >= p.r2);
        assert!(p.s1 <= bar.close && p.s2 <= p.s1 && p.s3 <= p.s2);
    }
}
