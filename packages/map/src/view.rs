//! The interactive map view.
//!
//! [`MapView`] owns the [`ViewState`] for one rendered map and turns it,
//! together with the last enriched document, into a [`MapFrame`]. All
//! operations are synchronous.

use std::sync::Arc;

use bakery_map_enrich::{EnrichedBoundaryDocument, EnrichedRegion, FailureKind};
use bakery_map_stock_models::{EnrichedRegionProperties, policy};

use crate::{
    config::{DisplayMode, MapConfig},
    frame::{self, Controls, MapFrame, Marker, Notice, RegionPaint, Tooltip},
    hit::HitIndex,
    popup::RegionDetailPopup,
    projection::{Projection, fit_scale},
    state::{StatusFilter, ViewState},
};

/// Callback fired once per click on a region.
pub type RegionClickHandler = Box<dyn FnMut(&EnrichedRegionProperties) + Send>;

#[derive(Debug, Clone, PartialEq)]
struct Hover {
    code: String,
    x: f64,
    y: f64,
}

/// Zoomable, pannable, filterable choropleth over an enriched document.
pub struct MapView {
    config: MapConfig,
    state: ViewState,
    document: Option<Arc<EnrichedBoundaryDocument>>,
    index: Option<HitIndex>,
    base_scale: f64,
    hover: Option<Hover>,
    failure: Option<FailureKind>,
    on_region_click: Option<RegionClickHandler>,
}

impl MapView {
    /// A view with no document, in the initial state.
    #[must_use]
    pub fn new(config: MapConfig) -> Self {
        let base_scale = fit_scale(
            None,
            f64::from(config.viewport.width),
            f64::from(config.viewport.height),
        );
        Self {
            state: ViewState::initial(&config),
            config,
            document: None,
            index: None,
            base_scale,
            hover: None,
            failure: None,
            on_region_click: None,
        }
    }

    /// Registers the region click callback, replacing any previous one.
    pub fn on_region_click(
        &mut self,
        handler: impl FnMut(&EnrichedRegionProperties) + Send + 'static,
    ) {
        self.on_region_click = Some(Box::new(handler));
    }

    /// The configuration the view was created with.
    #[must_use]
    pub const fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Current view state.
    #[must_use]
    pub const fn state(&self) -> &ViewState {
        &self.state
    }

    /// The document on screen.
    #[must_use]
    pub const fn document(&self) -> Option<&Arc<EnrichedBoundaryDocument>> {
        self.document.as_ref()
    }

    /// Replaces the document after a refresh.
    ///
    /// The selection is kept only if a region with the same code exists in
    /// the new document.
    pub fn set_document(&mut self, document: Arc<EnrichedBoundaryDocument>) {
        let index = HitIndex::build(&document);
        self.base_scale = fit_scale(
            index.bounds(),
            f64::from(self.config.viewport.width),
            f64::from(self.config.viewport.height),
        );

        if let Some(code) = &self.state.selected
            && document.get(code).is_none()
        {
            log::debug!("Selected region {code} is gone after refresh, clearing selection");
            self.state.selected = None;
        }
        if let Some(hover) = &self.hover
            && document.get(&hover.code).is_none()
        {
            self.hover = None;
        }

        self.index = Some(index);
        self.document = Some(document);
    }

    /// Sets or clears the refresh failure banner.
    pub const fn set_failure(&mut self, failure: Option<FailureKind>) {
        self.failure = failure;
    }

    /// Multiplies the zoom by the zoom factor, up to `max_zoom`.
    pub fn zoom_in(&mut self) {
        self.set_zoom(self.state.zoom * self.config.zoom_factor);
    }

    /// Divides the zoom by the zoom factor, down to `min_zoom`.
    pub fn zoom_out(&mut self) {
        self.set_zoom(self.state.zoom / self.config.zoom_factor);
    }

    /// Sets the zoom, clamped to the configured bounds.
    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_nan() {
            return;
        }
        self.state.zoom = zoom.clamp(self.config.min_zoom, self.config.max_zoom);
    }

    /// Moves the center to `[lon, lat]`.
    pub fn center_on(&mut self, center: [f64; 2]) {
        let [lon, lat] = center;
        if lon.is_finite() && lat.is_finite() {
            self.state.center = [
                lon.clamp(-180.0, 180.0),
                lat.clamp(-crate::projection::MAX_LATITUDE, crate::projection::MAX_LATITUDE),
            ];
        }
    }

    /// Drags the map content by `(dx, dy)` pixels.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        if dx.is_finite() && dy.is_finite() {
            self.state.center = self.projection().panned_center(dx, dy);
        }
    }

    /// Restores the initial zoom, center and filter and clears the
    /// selection.
    pub fn reset_view(&mut self) {
        self.state = ViewState::initial(&self.config);
        self.hover = None;
    }

    /// Sets the status filter. Selection and data are untouched.
    pub const fn set_status_filter(&mut self, filter: StatusFilter) {
        self.state.status_filter = filter;
    }

    /// Selects the region with `code` and fires the click callback.
    ///
    /// Returns `false`, without firing, if the document has no such region.
    pub fn click_region(&mut self, code: &str) -> bool {
        let Some(document) = self.document.clone() else {
            return false;
        };
        let Some(region) = document.get(code) else {
            log::debug!("Click on unknown region {code}");
            return false;
        };

        self.state.selected = Some(region.region.code.clone());
        if let Some(handler) = self.on_region_click.as_mut() {
            handler(&region.properties);
        }
        true
    }

    /// Clicks at screen `(x, y)`. Returns the code of the region hit.
    pub fn click_at(&mut self, x: f64, y: f64) -> Option<String> {
        let code = self.region_at(x, y)?.to_string();
        self.click_region(&code).then_some(code)
    }

    /// Moves the pointer to `(x, y)`, updating the tooltip. Never selects.
    pub fn hover(&mut self, x: f64, y: f64) {
        self.hover = self.region_at(x, y).map(|code| Hover {
            code: code.to_string(),
            x,
            y,
        });
    }

    /// Removes the tooltip.
    pub fn clear_hover(&mut self) {
        self.hover = None;
    }

    /// Clears the selection. Zoom, center and filter are untouched.
    pub fn close_popup(&mut self) {
        self.state.selected = None;
    }

    /// The selected region.
    #[must_use]
    pub fn selected_region(&self) -> Option<&EnrichedRegion> {
        let code = self.state.selected.as_deref()?;
        self.document.as_ref()?.get(code)
    }

    /// Popup for the selected region. `None` in display-only mode.
    #[must_use]
    pub fn popup(&self) -> Option<RegionDetailPopup> {
        if self.config.mode == DisplayMode::DisplayOnly {
            return None;
        }
        self.selected_region()
            .map(|region| RegionDetailPopup::new(region.properties.clone()))
    }

    /// Projection for the current zoom and center.
    #[must_use]
    pub fn projection(&self) -> Projection {
        Projection::new(
            self.state.center,
            self.base_scale * self.state.zoom,
            f64::from(self.config.viewport.width),
            f64::from(self.config.viewport.height),
        )
    }

    fn region_at(&self, x: f64, y: f64) -> Option<&str> {
        let [lon, lat] = self.projection().unproject(x, y);
        self.index.as_ref()?.lookup(lon, lat)
    }

    /// Builds the render model for the current state.
    #[must_use]
    pub fn frame(&self) -> MapFrame {
        let projection = self.projection();
        let filter = self.state.status_filter;
        let selected = self.state.selected.as_deref();
        let interactive = self.config.mode == DisplayMode::Interactive;

        let regions = self
            .document
            .iter()
            .flat_map(|doc| doc.regions())
            .map(|enriched| paint(enriched, filter, selected, &projection))
            .collect();

        let tooltip = self.hover.as_ref().and_then(|hover| {
            let region = self.document.as_ref()?.get(&hover.code)?;
            Some(Tooltip {
                x: hover.x,
                y: hover.y,
                text: region_name(region).to_string(),
            })
        });

        MapFrame {
            width: self.config.viewport.width,
            height: self.config.viewport.height,
            mode: self.config.mode,
            zoom: self.state.zoom,
            center: self.state.center,
            status_filter: filter,
            regions,
            legend: policy::legend(),
            controls: interactive.then(|| Controls {
                can_zoom_in: self.state.zoom < self.config.max_zoom,
                can_zoom_out: self.state.zoom > self.config.min_zoom,
                filters: frame::filter_buttons(filter),
            }),
            popup: self.popup().map(|popup| popup.render()),
            tooltip,
            notice: self.failure.map(Notice::for_failure),
        }
    }
}

impl std::fmt::Debug for MapView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapView")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("regions", &self.document.as_ref().map(|d| d.len()))
            .field("failure", &self.failure)
            .finish_non_exhaustive()
    }
}

fn region_name(region: &EnrichedRegion) -> &str {
    if region.properties.name.is_empty() {
        region.region.display_name()
    } else {
        &region.properties.name
    }
}

fn paint(
    enriched: &EnrichedRegion,
    filter: StatusFilter,
    selected: Option<&str>,
    projection: &Projection,
) -> RegionPaint {
    let status = enriched.properties.status;
    let admitted = filter.admits(status);

    let marker = if admitted && status.needs_attention() {
        enriched.region.centroid.map(|[lon, lat]| {
            let (x, y) = projection.project(lon, lat);
            Marker {
                x,
                y,
                color: policy::color(status),
            }
        })
    } else {
        None
    };

    RegionPaint {
        code: enriched.region.code.clone(),
        name: region_name(enriched).to_string(),
        status,
        fill: if admitted {
            policy::color(status)
        } else {
            policy::FILTERED_OUT_COLOR
        },
        filtered_out: !admitted,
        selected: selected == Some(enriched.region.code.as_str()),
        path: frame::path_data(enriched.region.geometry.as_ref(), projection),
        marker,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use bakery_map_stock_models::StockStatus;

    use super::*;
    use crate::{hit::tests::square, state::InteractionMode};

    fn region(code: &str, west: f64, status: StockStatus) -> EnrichedRegion {
        let mut region = square(code, west, -13.0, 2.0);
        region.properties.status = status;
        region.properties.display_color = policy::color(status).to_string();
        region
    }

    fn document() -> Arc<EnrichedBoundaryDocument> {
        Arc::new(EnrichedBoundaryDocument::new(vec![
            region("15", -78.0, StockStatus::Normal),
            region("08", -74.0, StockStatus::Critical),
            region("13", -70.0, StockStatus::Inactive),
        ]))
    }

    fn view() -> MapView {
        let mut view = MapView::new(MapConfig::embedded());
        view.set_document(document());
        view
    }

    fn screen_point(view: &MapView, lon: f64, lat: f64) -> (f64, f64) {
        view.projection().project(lon, lat)
    }

    #[test]
    fn zoom_is_clamped() {
        let mut view = view();
        for _ in 0..50 {
            view.zoom_in();
        }
        assert!((view.state().zoom - view.config().max_zoom).abs() < f64::EPSILON);
        for _ in 0..50 {
            view.zoom_out();
        }
        assert!((view.state().zoom - view.config().min_zoom).abs() < f64::EPSILON);
    }

    #[test]
    fn zoom_keeps_selection() {
        let mut view = view();
        assert!(view.click_region("08"));
        view.zoom_in();
        view.zoom_out();
        assert_eq!(view.state().selected.as_deref(), Some("08"));
    }

    #[test]
    fn reset_view_is_a_fixed_point() {
        let mut view = view();
        view.zoom_in();
        view.pan(40.0, -25.0);
        view.set_status_filter(StatusFilter::Only(StockStatus::Critical));
        view.click_region("15");

        view.reset_view();
        let once = view.state().clone();
        view.reset_view();
        assert_eq!(view.state(), &once);
        assert_eq!(once, ViewState::initial(view.config()));
        assert_eq!(once.mode(), InteractionMode::Idle);
    }

    #[test]
    fn filtering_keeps_regions_addressable() {
        let clicked = Arc::new(Mutex::new(Vec::new()));
        let sink = clicked.clone();

        let mut view = view();
        view.on_region_click(move |props| sink.lock().unwrap().push(props.clone()));
        view.set_status_filter(StatusFilter::Only(StockStatus::Critical));

        let frame = view.frame();
        let lima = frame.region("15").unwrap();
        assert!(lima.filtered_out);
        assert_eq!(lima.fill, policy::FILTERED_OUT_COLOR);
        assert_eq!(lima.status, StockStatus::Normal);
        assert_eq!(frame.region("08").unwrap().fill, policy::color(StockStatus::Critical));

        let (x, y) = screen_point(&view, -77.0, -12.0);
        assert_eq!(view.click_at(x, y).as_deref(), Some("15"));
        let clicked = clicked.lock().unwrap();
        assert_eq!(clicked.len(), 1);
        assert_eq!(clicked[0].status, StockStatus::Normal);
        assert_eq!(clicked[0].name, "15");
    }

    #[test]
    fn callback_fires_once_per_click() {
        let count = Arc::new(Mutex::new(0));
        let counter = count.clone();

        let mut view = view();
        view.on_region_click(move |_| *counter.lock().unwrap() += 1);
        view.click_region("08");
        view.click_region("08");
        assert!(!view.click_region("99"));
        assert_eq!(*count.lock().unwrap(), 2);
    }

    #[test]
    fn click_outside_regions_selects_nothing() {
        let mut view = view();
        let (x, y) = screen_point(&view, -75.0, -12.0);
        assert_eq!(view.click_at(x, y), None);
        assert_eq!(view.state().mode(), InteractionMode::Idle);
    }

    #[test]
    fn hover_shows_tooltip_without_selecting() {
        let mut view = view();
        let (x, y) = screen_point(&view, -73.0, -12.0);
        view.hover(x, y);
        let frame = view.frame();
        assert_eq!(frame.tooltip.as_ref().unwrap().text, "08");
        assert!(frame.popup.is_none());
        assert_eq!(view.state().selected, None);

        view.clear_hover();
        assert!(view.frame().tooltip.is_none());
    }

    #[test]
    fn close_popup_keeps_zoom_and_filter() {
        let mut view = view();
        view.zoom_in();
        view.set_status_filter(StatusFilter::Only(StockStatus::Low));
        view.click_region("08");
        assert!(view.frame().popup.is_some());
        assert_eq!(view.popup().unwrap().properties().code, "08");

        let zoom = view.state().zoom;
        view.close_popup();
        assert_eq!(view.state().mode(), InteractionMode::Idle);
        assert!((view.state().zoom - zoom).abs() < f64::EPSILON);
        assert_eq!(view.state().status_filter, StatusFilter::Only(StockStatus::Low));
        assert!(view.frame().popup.is_none());
    }

    #[test]
    fn selection_cleared_when_region_disappears() {
        let mut view = view();
        view.click_region("13");
        view.click_region("08");

        view.set_document(Arc::new(EnrichedBoundaryDocument::new(vec![region(
            "08",
            -74.0,
            StockStatus::Low,
        )])));
        assert_eq!(view.state().selected.as_deref(), Some("08"));
        assert_eq!(view.selected_region().unwrap().properties.status, StockStatus::Low);

        view.set_document(Arc::new(EnrichedBoundaryDocument::new(vec![region(
            "15",
            -78.0,
            StockStatus::Normal,
        )])));
        assert_eq!(view.state().selected, None);
    }

    #[test]
    fn markers_only_for_attention_statuses_admitted_by_filter() {
        let mut view = view();
        let frame = view.frame();
        assert!(frame.region("08").unwrap().marker.is_some());
        assert!(frame.region("15").unwrap().marker.is_none());
        assert!(frame.region("13").unwrap().marker.is_none());

        view.set_status_filter(StatusFilter::Only(StockStatus::Normal));
        assert!(view.frame().region("08").unwrap().marker.is_none());

        view.set_status_filter(StatusFilter::Only(StockStatus::Critical));
        assert!(view.frame().region("08").unwrap().marker.is_some());
    }

    #[test]
    fn display_only_hides_controls_and_popup() {
        let mut view = MapView::new(MapConfig::embedded().display_only());
        view.set_document(document());
        let fired = Arc::new(Mutex::new(false));
        let flag = fired.clone();
        view.on_region_click(move |_| *flag.lock().unwrap() = true);

        assert!(view.click_region("08"));
        let frame = view.frame();
        assert!(frame.controls.is_none());
        assert!(frame.popup.is_none());
        assert!(view.popup().is_none());
        assert!(*fired.lock().unwrap());
        assert!(frame.region("08").unwrap().selected);
    }

    #[test]
    fn controls_reflect_zoom_bounds() {
        let mut view = view();
        for _ in 0..50 {
            view.zoom_in();
        }
        let controls = view.frame().controls.unwrap();
        assert!(!controls.can_zoom_in);
        assert!(controls.can_zoom_out);
    }

    #[test]
    fn failure_banner() {
        let mut view = view();
        view.set_failure(Some(FailureKind::StatisticsUnavailable));
        let frame = view.frame();
        assert_eq!(frame.notice.unwrap().kind, FailureKind::StatisticsUnavailable);
        assert_eq!(frame.regions.len(), 3);
        view.set_failure(None);
        assert!(view.frame().notice.is_none());
    }

    #[test]
    fn view_without_document_renders_empty() {
        let mut view = MapView::new(MapConfig::embedded());
        assert!(!view.click_region("15"));
        assert_eq!(view.click_at(10.0, 10.0), None);
        assert!(view.frame().regions.is_empty());
    }
}
