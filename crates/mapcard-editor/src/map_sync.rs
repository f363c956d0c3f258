//! Map widget lifecycle and synchronization with card attributes.
//!
//! The mapping SDK is opaque behind [`MapWidget`]/[`WidgetFactory`]; the
//! controller decides *when* to rebuild versus incrementally update. Style
//! changes force a full teardown and reconstruction (the SDK cannot hot-swap
//! styles while reliably preserving control state); coordinate changes
//! recenter in place; zoom changes never rebuild.

use mapcard_core::{LngLat, LocationAttributes, MapStyle, MAX_ZOOM, MIN_ZOOM};

/// Parameters for constructing a map widget.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetOptions {
    pub style: MapStyle,
    pub center: LngLat,
    pub zoom: f64,
}

/// The narrow seam to the underlying mapping SDK. One widget, one marker.
pub trait MapWidget {
    fn set_center(&mut self, center: LngLat);
    fn set_zoom(&mut self, zoom: f64);
    fn place_marker(&mut self, at: LngLat);
    fn move_marker(&mut self, at: LngLat);
    fn remove_marker(&mut self);
    fn add_nav_control(&mut self);
    /// Recomputes the widget layout after a container resize.
    fn resize(&mut self);
    /// Tears the widget down. Must tolerate being called more than once.
    fn remove(&mut self);
}

/// Builds widgets. The host supplies the real SDK binding; tests supply a
/// recording mock.
pub trait WidgetFactory {
    fn build(&mut self, opts: &WidgetOptions) -> Box<dyn MapWidget>;
}

/// Map defaults injected from stored settings, used when the card has no
/// committed location yet.
#[derive(Debug, Clone, Copy)]
pub struct MapDefaults {
    pub center: LngLat,
    pub zoom: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapPhase {
    Uninitialized,
    Ready,
    Disposed,
}

/// The view the widget currently displays, as last instructed.
#[derive(Debug, Clone, PartialEq)]
pub struct MapViewState {
    pub style: MapStyle,
    pub center: LngLat,
    pub zoom: f64,
    pub marker: Option<LngLat>,
}

/// Owns the map widget for one card and reconciles it against attribute
/// changes. No other component touches the widget directly.
pub struct MapSyncController {
    factory: Box<dyn WidgetFactory>,
    defaults: MapDefaults,
    widget: Option<Box<dyn MapWidget>>,
    phase: MapPhase,
    view: Option<MapViewState>,
}

impl MapSyncController {
    #[must_use]
    pub fn new(factory: Box<dyn WidgetFactory>, defaults: MapDefaults) -> Self {
        Self {
            factory,
            defaults,
            widget: None,
            phase: MapPhase::Uninitialized,
            view: None,
        }
    }

    #[must_use]
    pub fn phase(&self) -> MapPhase {
        self.phase
    }

    #[must_use]
    pub fn view(&self) -> Option<&MapViewState> {
        self.view.as_ref()
    }

    /// First mount: constructs the widget at the card's coordinates (or the
    /// injected default center when unset), attaches navigation controls,
    /// and places a marker only when a location is committed.
    ///
    /// Without a credential the mapping SDK cannot load tiles, so the
    /// controller stays uninitialized and logs instead of building a dead
    /// widget.
    pub fn mount(&mut self, attrs: &LocationAttributes, credential_present: bool) {
        if self.phase != MapPhase::Uninitialized {
            return;
        }
        if !credential_present {
            tracing::warn!("map credential missing; widget not initialized");
            return;
        }

        let view = Self::target_view(attrs, self.defaults);
        self.widget = Some(self.build_widget(&view));
        self.view = Some(view);
        self.phase = MapPhase::Ready;
    }

    /// Reconciles the widget against the current attributes.
    ///
    /// Style change: full teardown and rebuild with the same coordinates and
    /// zoom. Coordinate change: recenter and move (or place/remove) the
    /// marker in place. Zoom change: `set_zoom` only — a zoom change alone
    /// never forces a teardown.
    pub fn sync(&mut self, attrs: &LocationAttributes) {
        if self.phase != MapPhase::Ready {
            return;
        }
        let target = Self::target_view(attrs, self.defaults);
        let Some(current) = self.view.clone() else {
            return;
        };
        if target == current {
            return;
        }

        if target.style != current.style {
            self.teardown_widget();
            self.widget = Some(self.build_widget(&target));
            self.view = Some(target);
            return;
        }

        let widget = match self.widget.as_mut() {
            Some(w) => w,
            None => return,
        };

        if target.center != current.center {
            widget.set_center(target.center);
        }
        match (current.marker, target.marker) {
            (None, Some(at)) => widget.place_marker(at),
            (Some(from), Some(to)) if from != to => widget.move_marker(to),
            (Some(_), None) => widget.remove_marker(),
            _ => {}
        }
        if zoom_changed(current.zoom, target.zoom) {
            widget.set_zoom(target.zoom);
        }

        self.view = Some(target);
    }

    /// Two-way binding for zoom driven by widget interaction (scroll-zoom).
    ///
    /// Records the widget's new zoom so the echoed attribute sync is a
    /// no-op, and returns the clamped value for the attribute patch.
    #[must_use]
    pub fn on_widget_zoom(&mut self, zoom: f64) -> f64 {
        let clamped = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        if let Some(view) = self.view.as_mut() {
            view.zoom = clamped;
        }
        clamped
    }

    /// Forwards a container resize to the widget's layout recompute.
    pub fn handle_resize(&mut self) {
        if self.phase != MapPhase::Ready {
            return;
        }
        if let Some(widget) = self.widget.as_mut() {
            widget.resize();
        }
    }

    /// Unconditional teardown: marker, widget, and the controller's claim on
    /// resize events all go away. Safe to call repeatedly and on a
    /// controller that never mounted.
    pub fn unmount(&mut self) {
        self.teardown_widget();
        self.view = None;
        self.phase = MapPhase::Disposed;
    }

    fn build_widget(&mut self, view: &MapViewState) -> Box<dyn MapWidget> {
        let mut widget = self.factory.build(&WidgetOptions {
            style: view.style,
            center: view.center,
            zoom: view.zoom,
        });
        widget.add_nav_control();
        if let Some(at) = view.marker {
            widget.place_marker(at);
        }
        widget
    }

    fn teardown_widget(&mut self) {
        if let Some(mut widget) = self.widget.take() {
            widget.remove_marker();
            widget.remove();
        }
    }

    fn target_view(attrs: &LocationAttributes, defaults: MapDefaults) -> MapViewState {
        let marker = attrs.coordinates();
        MapViewState {
            style: attrs.map_style,
            center: marker.unwrap_or(defaults.center),
            zoom: attrs.zoom_level,
            marker,
        }
    }
}

fn zoom_changed(a: f64, b: f64) -> bool {
    (a - b).abs() > f64::EPSILON
}
