use crate::app::{LoopMetricsSnapshot, SceneKey};
use crate::journey::{DetailPanel, JourneyStore, Stage};

use super::text::{line_advance, text_width_px, wrap_text, Canvas};

const CAPTION_TITLE_SCALE: i32 = 4;
const CAPTION_HINT_SCALE: i32 = 2;
const CAPTION_MARGIN: i32 = 24;
const CAPTION_TITLE_COLOR: [u8; 3] = [244, 248, 252];
const CAPTION_HINT_COLOR: [u8; 3] = [176, 198, 220];

const PANEL_SCALE: i32 = 2;
const PANEL_WIDTH_CHARS: usize = 38;
const PANEL_INSET: i32 = 12;
const PANEL_MARGIN: i32 = 24;
const PANEL_BG_COLOR: [u8; 3] = [10, 12, 16];
const PANEL_BG_ALPHA: f32 = 0.82;
const PANEL_BORDER_COLOR: [u8; 3] = [92, 106, 126];
const PANEL_BORDER_REVERSED_COLOR: [u8; 3] = [200, 90, 120];
const PANEL_TITLE_COLOR: [u8; 3] = [255, 230, 160];
const PANEL_TITLE_REVERSED_COLOR: [u8; 3] = [255, 150, 170];
const PANEL_BODY_COLOR: [u8; 3] = [220, 228, 236];
const PANEL_DIM_COLOR: [u8; 3] = [150, 168, 188];
const PANEL_ACTION_COLOR: [u8; 3] = [120, 220, 255];

const OVERLAY_SCALE: i32 = 2;
const OVERLAY_INSET: i32 = 8;
const OVERLAY_TEXT_COLOR: [u8; 3] = [210, 230, 210];

#[derive(Debug, Clone)]
pub(crate) struct OverlayData {
    pub metrics: LoopMetricsSnapshot,
    pub render_fps_cap: Option<u32>,
    pub scene: SceneKey,
    pub point_count: usize,
    pub marker_count: usize,
}

pub(super) fn draw_caption(canvas: &mut Canvas<'_>, journey: &JourneyStore) {
    let stage = journey.stage();
    let title = stage.title();
    let hint = if stage == Stage::Singularity && journey.is_exploded() {
        "Keep scrolling to enter the cosmos"
    } else {
        stage.hint()
    };

    let title_y = CAPTION_MARGIN;
    canvas.text(CAPTION_MARGIN, title_y, title, CAPTION_TITLE_SCALE, CAPTION_TITLE_COLOR);

    let hint_width = text_width_px(hint, CAPTION_HINT_SCALE);
    let hint_x = ((canvas.width() as i32 - hint_width) / 2).max(CAPTION_MARGIN);
    let hint_y = canvas.height() as i32 - CAPTION_MARGIN - line_advance(CAPTION_HINT_SCALE);
    canvas.text(hint_x, hint_y, hint, CAPTION_HINT_SCALE, CAPTION_HINT_COLOR);
}

pub(super) fn detail_panel_lines(panel: &DetailPanel) -> Vec<(String, [u8; 3])> {
    let title_color = if panel.reversed {
        PANEL_TITLE_REVERSED_COLOR
    } else {
        PANEL_TITLE_COLOR
    };

    let mut lines = Vec::new();
    for line in wrap_text(panel.title, PANEL_WIDTH_CHARS) {
        lines.push((line, title_color));
    }
    lines.push((String::new(), PANEL_BODY_COLOR));
    for line in wrap_text(panel.description, PANEL_WIDTH_CHARS) {
        lines.push((line, PANEL_BODY_COLOR));
    }
    lines.push((String::new(), PANEL_BODY_COLOR));
    for line in wrap_text(panel.influence, PANEL_WIDTH_CHARS) {
        lines.push((line, PANEL_DIM_COLOR));
    }
    lines.push((String::new(), PANEL_BODY_COLOR));
    lines.push((format!("[R] {}", panel.toggle_label), PANEL_ACTION_COLOR));
    lines.push(("[Esc] Close".to_string(), PANEL_DIM_COLOR));
    lines
}

pub(super) fn draw_detail_panel(canvas: &mut Canvas<'_>, panel: &DetailPanel) {
    let lines = detail_panel_lines(panel);
    let longest = lines
        .iter()
        .map(|(line, _)| text_width_px(line, PANEL_SCALE))
        .max()
        .unwrap_or(0);
    let panel_width = longest + PANEL_INSET * 2;
    let panel_height = lines.len() as i32 * line_advance(PANEL_SCALE) + PANEL_INSET * 2;
    let left = (canvas.width() as i32 - panel_width - PANEL_MARGIN).max(0);
    let top = ((canvas.height() as i32 - panel_height) / 2).max(0);

    canvas.fill_rect(left, top, panel_width, panel_height, PANEL_BG_COLOR, PANEL_BG_ALPHA);
    let border = if panel.reversed {
        PANEL_BORDER_REVERSED_COLOR
    } else {
        PANEL_BORDER_COLOR
    };
    canvas.outline_rect(left, top, panel_width, panel_height, border);

    let mut y = top + PANEL_INSET;
    for (line, color) in &lines {
        canvas.text(left + PANEL_INSET, y, line, PANEL_SCALE, *color);
        y += line_advance(PANEL_SCALE);
    }
}

pub(super) fn overlay_lines(data: &OverlayData) -> Vec<String> {
    let cap = match data.render_fps_cap {
        Some(value) => value.to_string(),
        None => "off".to_string(),
    };
    vec![
        format!("FPS: {:.1} (cap {cap})", data.metrics.fps),
        format!("TPS: {:.1}", data.metrics.tps),
        format!("Frame: {:.2} ms", data.metrics.frame_time_ms),
        format!("Scene: {:?}", data.scene),
        format!("Points: {} Markers: {}", data.point_count, data.marker_count),
        format!(
            "Transitions: {} (+{}) Dropped wheel: {} (+{})",
            data.metrics.journey.transitions,
            data.metrics.transitions_in_window,
            data.metrics.journey.dropped_wheel_events,
            data.metrics.wheel_drops_in_window
        ),
    ]
}

pub(super) fn draw_overlay(canvas: &mut Canvas<'_>, data: &OverlayData) {
    let lines = overlay_lines(data);
    let longest = lines
        .iter()
        .map(|line| text_width_px(line, OVERLAY_SCALE))
        .max()
        .unwrap_or(0);
    let height = lines.len() as i32 * line_advance(OVERLAY_SCALE) + OVERLAY_INSET * 2;
    let top = canvas.height() as i32 - height - CAPTION_MARGIN * 3;
    let left = CAPTION_MARGIN - OVERLAY_INSET;

    canvas.fill_rect(left, top, longest + OVERLAY_INSET * 2, height, PANEL_BG_COLOR, PANEL_BG_ALPHA);
    let mut y = top + OVERLAY_INSET;
    for line in &lines {
        canvas.text(left + OVERLAY_INSET, y, line, OVERLAY_SCALE, OVERLAY_TEXT_COLOR);
        y += line_advance(OVERLAY_SCALE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journey::{FactorId, JourneyCounters};

    #[test]
    fn panel_lines_end_with_actions() {
        let mut journey = JourneyStore::default();
        journey.set_stage(1);
        journey.set_active_factor(FactorId::Gravity);
        let panel = journey.detail_panel().expect("panel");

        let lines = detail_panel_lines(&panel);

        assert_eq!(lines[0].0, "Gravity");
        assert_eq!(lines[lines.len() - 2].0, "[R] Enable Decay / Repulsion");
        assert!(lines[..lines.len() - 2]
            .iter()
            .all(|(line, _)| line.chars().count() <= PANEL_WIDTH_CHARS));
    }

    #[test]
    fn reversed_panel_uses_reversed_title_color() {
        let mut journey = JourneyStore::default();
        journey.set_stage(1);
        journey.set_active_factor(FactorId::Gravity);
        journey.toggle_active();
        let panel = journey.detail_panel().expect("panel");

        let lines = detail_panel_lines(&panel);
        assert_eq!(lines[0].1, PANEL_TITLE_REVERSED_COLOR);
    }

    #[test]
    fn overlay_lines_show_cap_and_counters() {
        let lines = overlay_lines(&OverlayData {
            metrics: LoopMetricsSnapshot {
                fps: 59.94,
                tps: 60.0,
                frame_time_ms: 16.7,
                journey: JourneyCounters {
                    transitions: 4,
                    dropped_wheel_events: 12,
                },
                transitions_in_window: 1,
                wheel_drops_in_window: 3,
            },
            render_fps_cap: None,
            scene: SceneKey::Cosmos,
            point_count: 100,
            marker_count: 10,
        });

        assert_eq!(lines[0], "FPS: 59.9 (cap off)");
        assert_eq!(lines[3], "Scene: Cosmos");
        assert_eq!(lines[5], "Transitions: 4 (+1) Dropped wheel: 12 (+3)");
    }

    #[test]
    fn caption_draws_on_tiny_canvas_without_panicking() {
        let mut buffer = vec![0u8; 8 * 8 * 4];
        let mut canvas = Canvas::new(&mut buffer, 8, 8);
        draw_caption(&mut canvas, &JourneyStore::default());
    }
}
