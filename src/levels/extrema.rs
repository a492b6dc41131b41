// =============================================================================
// Swing-point clusters
// =============================================================================
//
// A swing high is a bar whose high strictly exceeds every other high within
// `window` bars on either side; swing lows mirror this on the lows. Swing
// prices lying within `tolerance_pct` of a cluster's running mean join that
// cluster. Strength blends how often price touched the level with how much
// volume traded at those touches:
//
//   strength = 0.5 * min(touches / 3, 1) + 0.5 * (volume / max_cluster_volume)

use serde::{Deserialize, Serialize};

use crate::market_data::PriceBar;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceCluster {
    pub price: f64,
    pub touches: usize,
    pub volume: f64,
    pub strength: f64,
}

struct SwingPoint {
    price: f64,
    volume: f64,
}

fn swing_points(bars: &[PriceBar], window: usize) -> Vec<SwingPoint> {
    let mut points = Vec::new();
    if window == 0 || bars.len() < 2 * window + 1 {
        return points;
    }
    for i in window..bars.len() - window {
        let neighbours = (i - window..=i + window).filter(|&j| j != i);
        let bar = &bars[i];
        if neighbours.clone().all(|j| bar.high > bars[j].high) {
            points.push(SwingPoint {
                price: bar.high,
                volume: bar.volume,
            });
        }
        if neighbours.into_iter().all(|j| bar.low < bars[j].low) {
            points.push(SwingPoint {
                price: bar.low,
                volume: bar.volume,
            });
        }
    }
    points
}

/// Cluster swing points into candidate levels, strongest first.
pub fn find_clusters(bars: &[PriceBar], window: usize, tolerance_pct: f64) -> Vec<PriceCluster> {
    let mut points = swing_points(bars, window);
    points.sort_by(|a, b| a.price.total_cmp(&b.price));

    let mut clusters: Vec<PriceCluster> = Vec::new();
    for point in points {
        let joined = clusters.last_mut().filter(|c| {
            c.price > 0.0 && ((point.price - c.price).abs() / c.price * 100.0) <= tolerance_pct
        });
        match joined {
            Some(cluster) => {
                let touches = cluster.touches as f64;
                cluster.price = (cluster.price * touches + point.price) / (touches + 1.0);
                cluster.touches += 1;
                cluster.volume += point.volume;
            }
            None => clusters.push(PriceCluster {
                price: point.price,
                touches: 1,
                volume: point.volume,
                strength: 0.0,
            }),
        }
    }

    let max_volume = clusters.iter().map(|c| c.volume).fold(0.0, f64::max);
    for cluster in &mut clusters {
        let touch_score = (cluster.touches as f64 / 3.0).min(1.0);
        let volume_score = if max_volume > 0.0 {
            cluster.volume / max_volume
        } else {
            0.0
        };
        cluster.strength = (0.5 * touch_score + 0.5 * volume_score).clamp(0.0, 1.0);
    }

    clusters.sort_by(|a, b| {
        b.strength
            .total_cmp(&a.strength)
            .then_with(|| a.price.total_cmp(&b.price))
    });
    clusters
}
