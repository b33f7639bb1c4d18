//! Renders a [`MapFrame`] as a standalone SVG document.

use std::fmt::Write as _;

use crate::{
    frame::{Controls, MapFrame, Marker, Notice, RegionPaint, Tooltip},
    popup::{PopupView, escape},
};

const REGION_STROKE: &str = "#ffffff";
const SELECTED_STROKE: &str = "#111827";
const TEXT_COLOR: &str = "#111827";
const PANEL_FILL: &str = "#ffffff";
const PANEL_STROKE: &str = "#d1d5db";
const MARKER_RADIUS: f64 = 5.0;
const LEGEND_ROW: f64 = 18.0;
const BUTTON_SIZE: f64 = 28.0;
const POPUP_WIDTH: f64 = 260.0;
const POPUP_HEIGHT: f64 = 300.0;

/// Renders `frame` to an SVG string.
#[must_use]
pub fn render(frame: &MapFrame) -> String {
    let mut svg = String::with_capacity(frame.regions.len() * 512 + 2048);
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif" font-size="12">"#,
        w = frame.width,
        h = frame.height,
    );

    svg.push_str(r#"<g class="regions">"#);
    for region in frame.regions.iter().filter(|r| !r.selected) {
        write_region(&mut svg, region);
    }
    // Selected region last so its outline is not covered by neighbors.
    for region in frame.regions.iter().filter(|r| r.selected) {
        write_region(&mut svg, region);
    }
    svg.push_str("</g>");

    svg.push_str(r#"<g class="markers">"#);
    for marker in frame.regions.iter().filter_map(|r| r.marker.as_ref()) {
        write_marker(&mut svg, marker);
    }
    svg.push_str("</g>");

    write_legend(&mut svg, frame);

    if let Some(controls) = &frame.controls {
        write_controls(&mut svg, controls, frame.width);
    }
    if let Some(notice) = &frame.notice {
        write_notice(&mut svg, notice, frame.width);
    }
    if let Some(tooltip) = &frame.tooltip {
        write_tooltip(&mut svg, tooltip);
    }
    if let Some(popup) = &frame.popup {
        write_popup(&mut svg, popup, frame.width);
    }

    svg.push_str("</svg>");
    svg
}

fn write_region(svg: &mut String, region: &RegionPaint) {
    if region.path.is_empty() {
        return;
    }
    let mut class = String::from("region");
    if region.filtered_out {
        class.push_str(" filtered-out");
    }
    if region.selected {
        class.push_str(" selected");
    }
    let (stroke, stroke_width) = if region.selected {
        (SELECTED_STROKE, 2.5)
    } else {
        (REGION_STROKE, 1.0)
    };
    let _ = write!(
        svg,
        r#"<path class="{class}" data-code="{code}" data-status="{status}" d="{d}" fill="{fill}" stroke="{stroke}" stroke-width="{stroke_width}" fill-rule="evenodd"><title>{name}</title></path>"#,
        code = escape(&region.code),
        status = region.status,
        d = region.path,
        fill = region.fill,
        name = escape(&region.name),
    );
}

fn write_marker(svg: &mut String, marker: &Marker) {
    let _ = write!(
        svg,
        r#"<circle class="marker" cx="{x:.1}" cy="{y:.1}" r="{r}" fill="{color}" fill-opacity="0.9"><animate attributeName="r" values="{r};{r2};{r}" dur="1.6s" repeatCount="indefinite"/><animate attributeName="fill-opacity" values="0.9;0.3;0.9" dur="1.6s" repeatCount="indefinite"/></circle>"#,
        x = marker.x,
        y = marker.y,
        r = MARKER_RADIUS,
        r2 = MARKER_RADIUS * 2.0,
        color = marker.color,
    );
}

fn write_legend(svg: &mut String, frame: &MapFrame) {
    let rows = frame.legend.len();
    #[allow(clippy::cast_precision_loss)]
    let height = (rows as f64).mul_add(LEGEND_ROW, 12.0);
    let top = f64::from(frame.height) - height - 10.0;

    let _ = write!(
        svg,
        r#"<g class="legend" transform="translate(10,{top:.1})"><rect width="150" height="{height:.1}" rx="4" fill="{PANEL_FILL}" stroke="{PANEL_STROKE}"/>"#,
    );
    for (i, entry) in frame.legend.iter().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let y = (i as f64).mul_add(LEGEND_ROW, 6.0);
        let _ = write!(
            svg,
            r#"<rect x="8" y="{y:.1}" width="12" height="12" fill="{color}"/><text x="26" y="{ty:.1}" fill="{TEXT_COLOR}">{label}</text>"#,
            color = entry.color,
            ty = y + 10.0,
            label = escape(entry.label),
        );
    }
    svg.push_str("</g>");
}

fn write_button(svg: &mut String, x: f64, y: f64, action: &str, label: &str, enabled: bool) {
    let opacity = if enabled { 1.0 } else { 0.4 };
    let _ = write!(
        svg,
        r#"<g class="button" data-action="{action}" opacity="{opacity}"><rect x="{x:.1}" y="{y:.1}" width="{BUTTON_SIZE}" height="{BUTTON_SIZE}" rx="4" fill="{PANEL_FILL}" stroke="{PANEL_STROKE}"/><text x="{tx:.1}" y="{ty:.1}" text-anchor="middle" font-size="16" fill="{TEXT_COLOR}">{label}</text></g>"#,
        tx = x + BUTTON_SIZE / 2.0,
        ty = y + BUTTON_SIZE / 2.0 + 5.0,
        label = escape(label),
    );
}

fn write_controls(svg: &mut String, controls: &Controls, width: u32) {
    let x = f64::from(width) - BUTTON_SIZE - 10.0;
    svg.push_str(r#"<g class="controls">"#);
    write_button(svg, x, 10.0, "zoom-in", "+", controls.can_zoom_in);
    write_button(svg, x, 14.0 + BUTTON_SIZE, "zoom-out", "−", controls.can_zoom_out);
    write_button(svg, x, 2.0f64.mul_add(BUTTON_SIZE, 18.0), "reset-view", "⟲", true);

    svg.push_str(r#"<g class="filters" transform="translate(10,10)">"#);
    for (i, button) in controls.filters.iter().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let y = i as f64 * 22.0;
        let (fill, weight) = if button.active {
            ("#e0e7ff", "bold")
        } else {
            (PANEL_FILL, "normal")
        };
        let _ = write!(
            svg,
            r#"<g class="filter" data-action="filter" data-filter="{filter}"><rect y="{y:.1}" width="150" height="20" rx="3" fill="{fill}" stroke="{PANEL_STROKE}"/><text x="8" y="{ty:.1}" font-weight="{weight}" fill="{TEXT_COLOR}">{label}</text></g>"#,
            filter = button.filter,
            ty = y + 14.0,
            label = escape(button.label),
        );
    }
    svg.push_str("</g></g>");
}

fn write_notice(svg: &mut String, notice: &Notice, width: u32) {
    let w = f64::from(width) * 0.6;
    let x = (f64::from(width) - w) / 2.0;
    let _ = write!(
        svg,
        r##"<g class="notice" data-kind="{kind}"><rect x="{x:.1}" y="10" width="{w:.1}" height="44" rx="4" fill="#fef2f2" stroke="#fca5a5"/><text x="{tx:.1}" y="28" text-anchor="middle" fill="#991b1b">{message}</text><text class="retry" data-action="refresh" x="{tx:.1}" y="46" text-anchor="middle" fill="#1d4ed8" text-decoration="underline">{retry}</text></g>"##,
        kind = notice.kind.as_ref(),
        tx = x + w / 2.0,
        message = escape(notice.message),
        retry = escape(notice.retry_label),
    );
}

fn write_tooltip(svg: &mut String, tooltip: &Tooltip) {
    let _ = write!(
        svg,
        r#"<g class="tooltip" pointer-events="none"><text x="{x:.1}" y="{y:.1}" fill="{TEXT_COLOR}" stroke="{PANEL_FILL}" stroke-width="3" paint-order="stroke">{text}</text></g>"#,
        x = tooltip.x + 12.0,
        y = tooltip.y - 8.0,
        text = escape(&tooltip.text),
    );
}

fn write_popup(svg: &mut String, popup: &PopupView, width: u32) {
    let x = f64::from(width) - POPUP_WIDTH - 50.0;
    let _ = write!(
        svg,
        r#"<foreignObject class="popup" x="{x:.1}" y="10" width="{POPUP_WIDTH}" height="{POPUP_HEIGHT}"><div xmlns="http://www.w3.org/1999/xhtml">{html}</div></foreignObject>"#,
        html = popup.to_html(),
    );
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bakery_map_enrich::{EnrichedBoundaryDocument, FailureKind};
    use bakery_map_stock_models::{StockStatus, policy};

    use super::*;
    use crate::{MapView, config::MapConfig, hit::tests::square, state::StatusFilter};

    fn view(config: MapConfig) -> MapView {
        let mut lima = square("15", -78.0, -13.0, 2.0);
        lima.properties.name = "Lima".to_string();
        lima.properties.status = StockStatus::Critical;
        let mut cusco = square("08", -74.0, -15.0, 2.0);
        cusco.properties.name = "Cusco".to_string();
        cusco.properties.status = StockStatus::Normal;

        let mut view = MapView::new(config);
        view.set_document(Arc::new(EnrichedBoundaryDocument::new(vec![lima, cusco])));
        view
    }

    #[test]
    fn renders_regions_markers_and_legend() {
        let svg = render(&view(MapConfig::embedded()).frame());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches(r#"<path class="region"#).count(), 2);
        assert!(svg.contains(r##"fill="#ef4444""##));
        assert!(svg.contains("<animate"));
        assert!(svg.contains("<title>Lima</title>"));
        for entry in policy::legend() {
            assert!(svg.contains(entry.color));
        }
    }

    #[test]
    fn filtered_out_regions_use_neutral_fill() {
        let mut view = view(MapConfig::embedded());
        view.set_status_filter(StatusFilter::Only(StockStatus::Critical));
        let svg = render(&view.frame());
        assert!(svg.contains(r#"class="region filtered-out""#));
        assert!(svg.contains(policy::FILTERED_OUT_COLOR));
    }

    #[test]
    fn interactive_mode_has_controls_and_popup() {
        let mut view = view(MapConfig::embedded());
        view.click_region("15");
        let svg = render(&view.frame());
        assert!(svg.contains(r#"data-action="zoom-in""#));
        assert!(svg.contains("<foreignObject"));
        assert!(svg.contains(r#"class="region selected""#));
    }

    #[test]
    fn display_only_mode_has_no_chrome() {
        let mut view = view(MapConfig::embedded().display_only());
        view.click_region("15");
        let svg = render(&view.frame());
        assert!(!svg.contains("data-action"));
        assert!(!svg.contains("<foreignObject"));
        assert!(svg.contains(r#"class="legend""#));
    }

    #[test]
    fn notice_has_retry_affordance() {
        let mut view = view(MapConfig::embedded().display_only());
        view.set_failure(Some(FailureKind::MapUnavailable));
        let svg = render(&view.frame());
        assert!(svg.contains(r#"data-kind="map-unavailable""#));
        assert!(svg.contains(r#"data-action="refresh""#));
    }
}
