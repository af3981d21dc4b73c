use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::app::scene::marker_radius_px;
use crate::app::{MarkerKind, SceneWorld};
use crate::journey::JourneyStore;

use super::hud::{draw_caption, draw_detail_panel, draw_overlay, OverlayData};
use super::text::{text_width_px, Canvas};
use super::{Projector, Viewport};

const MAX_POINT_RADIUS_PX: f32 = 48.0;
const MARKER_INTENSITY: f32 = 0.85;
const MARKER_RING_COLOR: [u8; 3] = [230, 236, 245];
const ACTIVE_MARKER_RING_COLOR: [u8; 3] = [255, 220, 120];
const LABEL_SCALE: i32 = 2;
const LABEL_GAP_PX: i32 = 6;
const LABEL_COLOR: [u8; 3] = [210, 220, 235];
const LABEL_REVERSED_COLOR: [u8; 3] = [255, 150, 170];

pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
}

impl Renderer {
    pub fn new(window: Arc<Window>) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport {
                width: size.width,
                height: size.height,
            },
        })
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.viewport = Viewport { width, height };
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub(crate) fn render_frame(
        &mut self,
        world: &SceneWorld,
        journey: &JourneyStore,
        overlay: Option<&OverlayData>,
    ) -> Result<(), Error> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Ok(());
        }
        let viewport = self.viewport;
        let mut canvas = Canvas::new(self.pixels.frame_mut(), viewport.width, viewport.height);
        compose_frame(&mut canvas, viewport, world, journey, overlay);
        self.pixels.render()
    }
}

fn compose_frame(
    canvas: &mut Canvas<'_>,
    viewport: Viewport,
    world: &SceneWorld,
    journey: &JourneyStore,
    overlay: Option<&OverlayData>,
) {
    canvas.fill(world.background());
    let projector = Projector::new(journey.camera(), viewport);

    for point in world.points() {
        if point.opacity <= 0.0 {
            continue;
        }
        let Some(projected) = projector.project(point.position) else {
            continue;
        };
        let radius = (point.size * 0.5 * projected.pixels_per_unit).min(MAX_POINT_RADIUS_PX);
        canvas.additive_disc(
            projected.screen.x,
            projected.screen.y,
            radius,
            point.color,
            point.opacity,
        );
    }

    draw_markers(canvas, &projector, world, journey);
    draw_caption(canvas, journey);
    if let Some(panel) = journey.detail_panel() {
        draw_detail_panel(canvas, &panel);
    }
    if let Some(data) = overlay {
        draw_overlay(canvas, data);
    }
}

fn draw_markers(canvas: &mut Canvas<'_>, projector: &Projector, world: &SceneWorld, journey: &JourneyStore) {
    let active = journey.active_factor();
    for marker in world.markers() {
        let Some(projected) = projector.project(marker.position) else {
            continue;
        };
        let radius = marker_radius_px(marker.radius, projected.pixels_per_unit);
        let (x, y) = (projected.screen.x, projected.screen.y);
        canvas.additive_disc(x, y, radius, marker.color, MARKER_INTENSITY);

        let MarkerKind::Factor(id) = marker.kind else {
            continue;
        };
        let is_active = active == Some(id);
        let ring_color = if is_active {
            ACTIVE_MARKER_RING_COLOR
        } else {
            MARKER_RING_COLOR
        };
        canvas.ring(x, y, radius + 3.0, if is_active { 2.0 } else { 1.0 }, ring_color);

        let Some(entry) = journey.registry().lookup(id) else {
            continue;
        };
        let reversed = journey.is_reversed(id);
        let label = entry.displayed_name(reversed);
        let label_x = x.round() as i32 - text_width_px(label, LABEL_SCALE) / 2;
        let label_y = (y + radius).round() as i32 + LABEL_GAP_PX;
        let color = if reversed {
            LABEL_REVERSED_COLOR
        } else {
            LABEL_COLOR
        };
        canvas.text(label_x, label_y, label, LABEL_SCALE, color);
    }
}
