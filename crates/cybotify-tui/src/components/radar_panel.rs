//! RadarPanel component — draws the session's chart buffer as a spider plot
//! on a braille canvas.

use std::f64::consts::{FRAC_PI_2, TAU};

use ratatui::crossterm::event::KeyEvent;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols::Marker,
    text::Span,
    widgets::canvas::{Canvas, Context, Line as CanvasLine},
    widgets::{Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    surface::{ChartLayout, FillMode, PolarSeries, SeriesRole},
    theme::{
        C_BG, C_MUTED, C_RADAR_AGGREGATE, C_RADAR_AGGREGATE_FILL, C_RADAR_GRID, C_RADAR_OVERLAY,
        C_RADAR_OVERLAY_FILL, C_SECONDARY,
    },
    widgets::pane_chrome::{pane_chrome_borders, Badge},
};

const RINGS: [f64; 4] = [0.25, 0.5, 0.75, 1.0];
const FILL_STEPS: usize = 6;

pub struct RadarPanel {
    pub borders: Borders,
}

impl RadarPanel {
    pub fn new() -> Self {
        Self {
            borders: Borders::ALL,
        }
    }
}

/// Number of distinct axes in a series; a closed loop repeats its first axis.
fn axis_count(series: &PolarSeries) -> usize {
    let n = series.radial_values.len();
    let closed = n > 1 && series.axis_labels.first() == series.axis_labels.last();
    if closed {
        n - 1
    } else {
        n
    }
}

/// Canvas position of value `r` (already scaled to [0, 1]) on axis `i` of `n`.
/// Axis 0 points up; axes advance clockwise.
fn point(r: f64, i: usize, n: usize) -> (f64, f64) {
    let theta = FRAC_PI_2 - TAU * (i % n) as f64 / n as f64;
    (r * theta.cos(), r * theta.sin())
}

fn scale(value: f64, layout: &ChartLayout) -> f64 {
    let [lo, hi] = layout.radial_range;
    if hi <= lo {
        return 0.0;
    }
    ((value - lo) / (hi - lo)).clamp(0.0, 1.0)
}

fn draw_line(ctx: &mut Context, a: (f64, f64), b: (f64, f64), color: Color) {
    ctx.draw(&CanvasLine::new(a.0, a.1, b.0, b.1, color));
}

fn paint_grid(ctx: &mut Context, n: usize) {
    for ring in RINGS {
        for i in 0..n {
            draw_line(ctx, point(ring, i, n), point(ring, i + 1, n), C_RADAR_GRID);
        }
    }
    for i in 0..n {
        draw_line(ctx, (0.0, 0.0), point(1.0, i, n), C_RADAR_GRID);
    }
}

fn paint_series(ctx: &mut Context, series: &PolarSeries, n: usize, layout: &ChartLayout) {
    let (stroke, fill) = match series.role {
        SeriesRole::Aggregate => (C_RADAR_AGGREGATE, C_RADAR_AGGREGATE_FILL),
        SeriesRole::Overlay => (C_RADAR_OVERLAY, C_RADAR_OVERLAY_FILL),
    };
    let vertices: Vec<(f64, f64)> = series
        .radial_values
        .iter()
        .enumerate()
        .map(|(i, v)| point(scale(*v, layout), i, n))
        .collect();

    if series.fill == FillMode::ToSelf {
        for edge in vertices.windows(2) {
            let (a, b) = (edge[0], edge[1]);
            for step in 0..FILL_STEPS {
                let t = step as f64 / FILL_STEPS as f64;
                let p = (a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t);
                draw_line(ctx, (0.0, 0.0), p, fill);
            }
        }
    }
    for edge in vertices.windows(2) {
        draw_line(ctx, edge[0], edge[1], stroke);
    }
}

impl Component for RadarPanel {
    fn id(&self) -> ComponentId {
        ComponentId::RadarPanel
    }

    fn handle_key(&mut self, _key: KeyEvent, _state: &AppState) -> Vec<Action> {
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let Some(session) = state.session() else {
            let block = pane_chrome_borders("features", focused, None, self.borders);
            frame.render_widget(block, area);
            return;
        };

        let overlay_name = session.radar().overlay().and_then(|id| {
            session
                .playlist()
                .tracks
                .iter()
                .find(|t| &t.id == id)
                .map(|t| t.name.clone())
        });
        let badge = overlay_name.as_deref().map(|name| Badge {
            text: name,
            color: C_RADAR_OVERLAY,
        });
        let block = pane_chrome_borders("features", focused, badge, self.borders);

        let chart = session.radar().sink();
        let Some(n) = chart.series.first().map(axis_count).filter(|&n| n >= 3) else {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            frame.render_widget(
                Paragraph::new(Span::styled("  no chart yet", Style::default().fg(C_MUTED))),
                inner,
            );
            return;
        };

        let series = chart.series.clone();
        let layout = chart.layout.clone();
        let labels: Vec<String> = series[0].axis_labels.iter().take(n).cloned().collect();

        let canvas = Canvas::default()
            .block(block)
            .marker(Marker::Braille)
            .background_color(C_BG)
            .x_bounds([-1.6, 1.6])
            .y_bounds([-1.25, 1.25])
            .paint(move |ctx| {
                paint_grid(ctx, n);
                ctx.layer();
                for s in &series {
                    paint_series(ctx, s, n, &layout);
                    ctx.layer();
                }
                for (i, label) in labels.iter().enumerate() {
                    let (x, y) = point(1.12, i, n);
                    // Left-side labels are shifted so they end at the spoke.
                    let x = if x < -0.05 {
                        x - 0.035 * label.width() as f64
                    } else {
                        x
                    };
                    ctx.print(
                        x,
                        y,
                        Span::styled(label.clone(), Style::default().fg(C_SECONDARY)),
                    );
                }
            });
        frame.render_widget(canvas, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(values: Vec<f64>, labels: Vec<&str>) -> PolarSeries {
        PolarSeries {
            radial_values: values,
            axis_labels: labels.into_iter().map(str::to_string).collect(),
            fill: FillMode::ToSelf,
            role: SeriesRole::Aggregate,
        }
    }

    #[test]
    fn test_axis_count_ignores_closing_point() {
        let closed = series(vec![0.1, 0.2, 0.3, 0.1], vec!["A", "B", "C", "A"]);
        let open = series(vec![0.1, 0.2, 0.3], vec!["A", "B", "C"]);
        assert_eq!(axis_count(&closed), 3);
        assert_eq!(axis_count(&open), 3);
    }

    #[test]
    fn test_first_axis_points_up_and_closing_point_coincides() {
        let (x, y) = point(1.0, 0, 7);
        assert!(x.abs() < 1e-9);
        assert!((y - 1.0).abs() < 1e-9);
        let (cx, cy) = point(1.0, 7, 7);
        assert!((cx - x).abs() < 1e-9 && (cy - y).abs() < 1e-9);
        // Clockwise: the second axis sits right of the vertical.
        assert!(point(1.0, 1, 7).0 > 0.0);
    }

    #[test]
    fn test_scale_uses_radial_range() {
        let layout = ChartLayout::default();
        assert_eq!(scale(0.5, &layout), 0.5);
        assert_eq!(scale(1.4, &layout), 1.0);
        assert_eq!(scale(-0.2, &layout), 0.0);
    }
}
