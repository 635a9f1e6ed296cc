//! Match map compositing
//!
//! Builds the draw plan for a classified match and paints it onto a
//! canvas in a fixed layer order.

use std::collections::HashMap;
use std::time::Instant;

use glam::Vec2;

use super::layers::{DisplayList, DrawCommand, MarkerKind, PathKind};
use super::path::PathEnd;
use super::raster::{Canvas, Image};
use super::shapes::clamp_origin;
use crate::error::Result;
use crate::map::{MapName, MapProjection};
use crate::model::MatchAggregate;
use crate::settings::{MarkerStyle, RenderSettings, StrokeStyle};

/// Pre-loaded images: one background per map, optional marker icons
#[derive(Debug, Clone, Default)]
pub struct MapAssets {
    maps: HashMap<MapName, Image>,
    icons: HashMap<MarkerKind, Image>,
}

impl MapAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_map(mut self, map: MapName, image: Image) -> Self {
        self.maps.insert(map, image);
        self
    }

    /// Drawn instead of the vector glyph for this marker kind
    pub fn with_icon(mut self, kind: MarkerKind, image: Image) -> Self {
        self.icons.insert(kind, image);
        self
    }

    pub fn map(&self, map: MapName) -> Option<&Image> {
        self.maps.get(&map)
    }

    pub fn icon(&self, kind: MarkerKind) -> Option<&Image> {
        self.icons.get(&kind)
    }
}

/// Renders classified matches. Holds only immutable configuration, so one
/// renderer can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct MatchRenderer {
    settings: RenderSettings,
    assets: MapAssets,
}

impl MatchRenderer {
    pub fn new(settings: RenderSettings, assets: MapAssets) -> Self {
        Self { settings, assets }
    }

    /// Pixel space for `map`: the background image's size, or a blank square
    pub fn projection(&self, map: MapName) -> MapProjection {
        match self.assets.map(map) {
            Some(image) => MapProjection::new(map, image.width(), image.height()),
            None => {
                let size = self.settings.blank_map_size;
                MapProjection::new(map, size, size)
            }
        }
    }

    /// Draw plan for a match. `None` when no tracked player has a position.
    ///
    /// The first tracked player is the primary one; only their flight line
    /// is drawn.
    pub fn plan(&self, aggregate: &MatchAggregate, projection: &MapProjection) -> Option<DisplayList> {
        if !aggregate.has_positions() {
            log::info!("No position samples for tracked players, nothing to draw");
            return None;
        }

        let mut list = DisplayList::default();
        list.background();
        list.zones(aggregate, projection);
        list.landing_markers(&aggregate.players, projection);

        for (index, bucket) in aggregate.players.iter().enumerate() {
            if bucket.positions.is_empty() {
                log::debug!("No positions for {}, skipping paths", bucket.name);
                continue;
            }
            list.parachute_path(bucket, projection);
            list.player_path(bucket, projection);
            if index == 0 {
                list.plane_path(bucket, projection);
            }
        }

        list.kill_markers(&aggregate.players, projection);
        list.death_markers(&aggregate.players, projection);
        Some(list)
    }

    /// Render a match onto its map. `Ok(None)` when there is nothing to
    /// draw; `UnsupportedMap` when the match's map has no projection.
    pub fn draw(&self, aggregate: &MatchAggregate) -> Result<Option<Canvas>> {
        self.settings.validate()?;
        let map = aggregate.map()?;
        let start = Instant::now();

        let projection = self.projection(map);
        let Some(list) = self.plan(aggregate, &projection) else {
            return Ok(None);
        };

        let mut canvas = self.background(map);
        self.paint(&list, &mut canvas);

        log::info!(
            "Rendered {} on {} ({} commands) in {:.1}ms",
            aggregate
                .players
                .iter()
                .map(|p| p.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            map,
            list.len(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(Some(canvas))
    }

    fn background(&self, map: MapName) -> Canvas {
        match self.assets.map(map) {
            Some(image) => Canvas::from_image(image),
            None => {
                log::warn!("No image for {map}, drawing on a blank background");
                let size = self.settings.blank_map_size;
                Canvas::new(size, size, self.settings.blank_map_color)
            }
        }
    }

    /// Paint a plan in order
    pub fn paint(&self, list: &DisplayList, canvas: &mut Canvas) {
        for command in list.commands() {
            match command {
                // The canvas already starts from the background
                DrawCommand::Background => {}
                DrawCommand::ZoneMask {
                    center,
                    radius,
                    opacity,
                    ..
                } => {
                    canvas.mask_outside_circle(*center, *radius, self.settings.zone_tint, *opacity);
                }
                DrawCommand::Path { kind, points, .. } => {
                    canvas.stroke_path(points, self.stroke_style(*kind), path_end(*kind));
                }
                DrawCommand::Marker { kind, center, .. } => {
                    self.paint_marker(canvas, *kind, *center);
                }
            }
        }
    }

    fn stroke_style(&self, kind: PathKind) -> &StrokeStyle {
        match kind {
            PathKind::Parachute => &self.settings.parachute_path,
            PathKind::Player => &self.settings.player_path,
            PathKind::Plane => &self.settings.plane_path,
        }
    }

    fn marker_style(&self, kind: MarkerKind) -> &MarkerStyle {
        match kind {
            MarkerKind::Landing => &self.settings.landing_marker,
            MarkerKind::PlaneLeave => &self.settings.plane_leave_marker,
            MarkerKind::Kill => &self.settings.kill_marker,
            MarkerKind::Death => &self.settings.death_marker,
        }
    }

    fn paint_marker(&self, canvas: &mut Canvas, kind: MarkerKind, center: Vec2) {
        let style = self.marker_style(kind);

        if let Some(icon) = self.assets.icon(kind) {
            // Longer edge matches the marker size
            let aspect = icon.height() as f32 / icon.width().max(1) as f32;
            let size = if aspect <= 1.0 {
                Vec2::new(style.size, style.size * aspect)
            } else {
                Vec2::new(style.size / aspect, style.size)
            };
            canvas.draw_image(icon, clamp_origin(center, size), size);
            return;
        }

        match kind {
            MarkerKind::Landing | MarkerKind::PlaneLeave => canvas.draw_disc(center, style),
            MarkerKind::Kill | MarkerKind::Death => canvas.draw_cross_glyph(center, style),
        }
    }
}

/// The walked path stops at its last curve; the others reach their final
/// point (touchdown, map edge).
fn path_end(kind: PathKind) -> PathEnd {
    match kind {
        PathKind::Player => PathEnd::LastMidpoint,
        PathKind::Parachute | PathKind::Plane => PathEnd::LastSample,
    }
}
