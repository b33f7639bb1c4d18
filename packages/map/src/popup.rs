//! Detail popup for a selected region.

use std::fmt::Write as _;

use bakery_map_stock_models::{EnrichedRegionProperties, policy};
use serde::Serialize;

/// Shown when a region has no branch rows at all.
pub const NO_BRANCHES_MESSAGE: &str = "Sin sucursales registradas";

/// Shown when a region has branch rows but none is active.
pub const NO_ACTIVE_BRANCHES_MESSAGE: &str = "Sin sucursales activas";

/// One active branch in the popup list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupBranch {
    /// Branch name.
    pub name: String,
    /// Branch province.
    pub province: String,
}

/// Everything the popup displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupView {
    /// Region name.
    pub title: String,
    /// Region code.
    pub code: String,
    /// Status label.
    pub status_label: &'static str,
    /// Status color.
    pub status_color: &'static str,
    /// Total branches.
    pub total_branches: u32,
    /// Active branches.
    pub active_branches: u32,
    /// Inactive branches.
    pub inactive_branches: u32,
    /// Branches that need to reorder.
    pub branches_needing_reorder: u32,
    /// Provinces with branches.
    pub province_count: u32,
    /// Open supply requests, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_requests: Option<u32>,
    /// Active branches.
    pub branches: Vec<PopupBranch>,
    /// Message shown instead of an empty branch list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<&'static str>,
}

impl PopupView {
    /// Builds the popup contents for `props`.
    #[must_use]
    pub fn from_properties(props: &EnrichedRegionProperties) -> Self {
        let branches: Vec<PopupBranch> = props
            .active_branch_details()
            .map(|b| PopupBranch {
                name: b.name.clone(),
                province: b.province.clone(),
            })
            .collect();

        let empty_message = if props.branch_details.is_empty() {
            Some(NO_BRANCHES_MESSAGE)
        } else if branches.is_empty() {
            Some(NO_ACTIVE_BRANCHES_MESSAGE)
        } else {
            None
        };

        Self {
            title: props.name.clone(),
            code: props.code.clone(),
            status_label: policy::label(props.status),
            status_color: policy::color(props.status),
            total_branches: props.total_branches,
            active_branches: props.active_branches,
            inactive_branches: props.inactive_branches,
            branches_needing_reorder: props.branches_needing_reorder,
            province_count: props.province_count,
            pending_requests: props.pending_requests,
            branches,
            empty_message,
        }
    }

    /// Renders the popup as an HTML fragment.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        let _ = write!(
            html,
            "<div class=\"region-popup\" data-code=\"{code}\">\
             <h3>{title}</h3>\
             <span class=\"status\" style=\"background:{color}\">{label}</span>\
             <dl>\
             <dt>Sucursales</dt><dd>{total}</dd>\
             <dt>Activas</dt><dd>{active}</dd>\
             <dt>Inactivas</dt><dd>{inactive}</dd>\
             <dt>Requieren reposición</dt><dd>{reorder}</dd>\
             <dt>Provincias</dt><dd>{provinces}</dd>",
            code = escape(&self.code),
            title = escape(&self.title),
            color = self.status_color,
            label = escape(self.status_label),
            total = self.total_branches,
            active = self.active_branches,
            inactive = self.inactive_branches,
            reorder = self.branches_needing_reorder,
            provinces = self.province_count,
        );
        if let Some(pending) = self.pending_requests {
            let _ = write!(html, "<dt>Solicitudes pendientes</dt><dd>{pending}</dd>");
        }
        html.push_str("</dl>");

        if let Some(message) = self.empty_message {
            let _ = write!(html, "<p class=\"empty\">{}</p>", escape(message));
        } else {
            html.push_str("<ul class=\"branches\">");
            for branch in &self.branches {
                let _ = write!(
                    html,
                    "<li>{} <small>{}</small></li>",
                    escape(&branch.name),
                    escape(&branch.province)
                );
            }
            html.push_str("</ul>");
        }

        html.push_str("<button class=\"close\" data-action=\"close-popup\">×</button></div>");
        html
    }
}

/// The popup for one selected region plus its close handler.
pub struct RegionDetailPopup {
    props: EnrichedRegionProperties,
    on_close: Option<Box<dyn FnMut() + Send>>,
}

impl RegionDetailPopup {
    /// A popup for `props` with no close handler.
    #[must_use]
    pub const fn new(props: EnrichedRegionProperties) -> Self {
        Self {
            props,
            on_close: None,
        }
    }

    /// Registers the handler run when the popup is dismissed.
    #[must_use]
    pub fn on_close(mut self, handler: impl FnMut() + Send + 'static) -> Self {
        self.on_close = Some(Box::new(handler));
        self
    }

    /// The region shown.
    #[must_use]
    pub const fn properties(&self) -> &EnrichedRegionProperties {
        &self.props
    }

    /// Display contents.
    #[must_use]
    pub fn render(&self) -> PopupView {
        PopupView::from_properties(&self.props)
    }

    /// Dismisses the popup, running the close handler.
    pub fn close(mut self) {
        if let Some(handler) = self.on_close.as_mut() {
            handler();
        }
    }
}

impl std::fmt::Debug for RegionDetailPopup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegionDetailPopup")
            .field("props", &self.props)
            .field("on_close", &self.on_close.is_some())
            .finish()
    }
}

/// Escapes text for HTML and SVG content and attributes.
pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
