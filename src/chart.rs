//! Bar chart geometry for asteroid diameters, drawn as SVG by the `chart.html` partial.

use serde::Serialize;

use crate::feed::Asteroid;

pub const TITLE: &str = "Asteroid Diameters";
pub const Y_LABEL: &str = "Diameter (km)";

const PLOT_HEIGHT: f64 = 320.0;
const BAR_WIDTH: f64 = 24.0;
const BAR_GAP: f64 = 8.0;
const MARGIN_LEFT: f64 = 64.0;
const MARGIN_TOP: f64 = 40.0;
const MARGIN_BOTTOM: f64 = 140.0;
const MARGIN_RIGHT: f64 = 16.0;
const TICK_COUNT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Anchor for the rotated name under the bar.
    pub label_x: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tick {
    pub value: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub title: &'static str,
    pub y_label: &'static str,
    pub width: f64,
    pub height: f64,
    pub plot_left: f64,
    pub plot_top: f64,
    pub plot_bottom: f64,
    pub plot_right: f64,
    pub y_max: f64,
    pub bars: Vec<Bar>,
    pub ticks: Vec<Tick>,
}

impl BarChart {
    /// Lays out one bar per asteroid, left to right in input order.
    pub fn from_asteroids(asteroids: &[Asteroid]) -> Self {
        let y_max = nice_ceiling(
            asteroids
                .iter()
                .map(|a| a.diameter_km)
                .filter(|v| v.is_finite())
                .fold(0.0, f64::max),
        );
        let plot_top = MARGIN_TOP;
        let plot_bottom = MARGIN_TOP + PLOT_HEIGHT;
        let plot_right =
            MARGIN_LEFT + BAR_GAP + asteroids.len() as f64 * (BAR_WIDTH + BAR_GAP);
        let scale = |v: f64| PLOT_HEIGHT * (v.max(0.0) / y_max).min(1.0);

        let bars = asteroids
            .iter()
            .enumerate()
            .map(|(i, asteroid)| {
                let height = if asteroid.diameter_km.is_finite() {
                    scale(asteroid.diameter_km)
                } else {
                    0.0
                };
                let x = MARGIN_LEFT + BAR_GAP + i as f64 * (BAR_WIDTH + BAR_GAP);
                Bar {
                    label: asteroid.name.clone(),
                    value: asteroid.diameter_km,
                    x,
                    y: plot_bottom - height,
                    width: BAR_WIDTH,
                    height,
                    label_x: x + BAR_WIDTH / 2.0,
                }
            })
            .collect();

        // Three significant digits relative to the axis maximum.
        let precision = 10f64.powi(2 - y_max.log10().floor() as i32);
        let ticks = (0..=TICK_COUNT)
            .map(|i| {
                let value = y_max * i as f64 / TICK_COUNT as f64;
                Tick {
                    value: (value * precision).round() / precision,
                    y: plot_bottom - scale(value),
                }
            })
            .collect();

        Self {
            title: TITLE,
            y_label: Y_LABEL,
            width: plot_right + MARGIN_RIGHT,
            height: plot_bottom + MARGIN_BOTTOM,
            plot_left: MARGIN_LEFT,
            plot_top,
            plot_bottom,
            plot_right,
            y_max,
            bars,
            ticks,
        }
    }
}

/// Rounds up to 1, 2, 2.5 or 5 times a power of ten. Never returns zero.
fn nice_ceiling(max: f64) -> f64 {
    if max <= 0.0 {
        return 1.0;
    }
    let magnitude = 10f64.powf(max.log10().floor());
    let step = [1.0, 2.0, 2.5, 5.0, 10.0]
        .into_iter()
        .find(|m| m * magnitude >= max)
        .unwrap_or(10.0);
    step * magnitude
}
