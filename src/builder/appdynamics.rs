//! `appdynamics` namespace.
//!
//! Each command hides or rewrites one kind of entity (application,
//! database, dashboard, ...) across the different places the controller UI
//! renders it, so most expand into a [`Group`] of variants guarded by page
//! filters and conditions.

use std::sync::Arc;

use mnky_tree::{NodeId, Tree};

use super::{BuildError, Call, Registry};
use crate::command::{
    Command, CommandRef, Condition, ConnectionHealth, DelayLink, Group, Hide, OverwriteHtml, Recolor,
    ReplaceConnection, ReplaceNeighbor, SetStyle,
};

pub const NAMESPACE: &str = "appdynamics";

const HOME: &str = "AD_HOME_OVERVIEW";
const MOBILE_SESSION: &str = "EUM_MOBILE_SESSION_DETAILS";
const SELECTED_SESSION_VIEW: &str =
    ".ads-session-left-panel-container-grid-with-nav .x-grid-row-selected .x-grid-cell-first .x-grid-cell-inner";
const NODE_COUNT_TEXT: &str = "text.adsNodeCountText";
const NODE_COUNT_LABEL: &str = "text.adsNodeCountTextSmall";
const NODE_COUNT_IMAGE: &str = "g.adsNodeCountContainer image";
const LAMBDA_ICON: &str = "images/tierTypes/AWSLambda.svg";
const TIER_ICON: &str = "image.adsFlowNodeTypeIcon";
const DASHBOARD: &str = "CDASHBOARD_DETAIL";
const DASHBOARD_CANVAS: &str = ".ads-dashboard-canvas";

pub(crate) fn register(registry: &mut Registry) {
    registry
        .register(NAMESPACE, "hideApplication", hide_application)
        .register(NAMESPACE, "hideBrowserApplication", hide_browser_application)
        .register(NAMESPACE, "hideMobileApplication", hide_mobile_application)
        .register(NAMESPACE, "hideDB", hide_database)
        .register(NAMESPACE, "hideDatabase", hide_database)
        .register(NAMESPACE, "hideBT", hide_business_transaction)
        .register(NAMESPACE, "hideBusinessTransaction", hide_business_transaction)
        .register(NAMESPACE, "hideDashboard", hide_dashboard)
        .register(NAMESPACE, "hideBusinessJourney", hide_business_journey)
        .register(NAMESPACE, "hideAnalyticsSearch", hide_analytics_search)
        .register(NAMESPACE, "hideRemoteService", hide_remote_service)
        .register(NAMESPACE, "replaceMobileScreenshot", replace_mobile_screenshot)
        .register(NAMESPACE, "replaceNodeCount", replace_node_count)
        .register(NAMESPACE, "replaceFlowmapIcon", replace_flowmap_icon)
        .register(NAMESPACE, "replaceFlowmapConnection", replace_flowmap_connection)
        .register(NAMESPACE, "hideFlowmapConnection", hide_flowmap_connection)
        .register(NAMESPACE, "delayLink", delay_link)
        .register(NAMESPACE, "recolorDashboard", recolor_dashboard)
        .register(NAMESPACE, "recolourDashboard", recolor_dashboard)
        .register(NAMESPACE, "setDashboardBackground", set_dashboard_background);
}

fn arc(command: impl Command + 'static) -> CommandRef {
    Arc::new(command)
}

fn group(children: Vec<CommandRef>) -> Result<CommandRef, BuildError> {
    Ok(arc(Group::new(children)))
}

fn attribute_contains(tree: &dyn Tree, node: NodeId, attribute: &str, needle: &str) -> bool {
    tree.get(node, attribute)
        .map(|value| value.contains(needle))
        .unwrap_or(false)
}

/// Home screen list items open their entity through `ng-click`.
fn opens_view(view: &'static str) -> Condition {
    Condition::new(move |tree, _, parent| attribute_contains(tree, parent, "ng-click", view))
}

/// Hide on the home screen list, told apart by the view it opens.
fn home_list_item(name: &str, view: &'static str) -> CommandRef {
    arc(Hide::new(name, 2, "ads-home-list-item", "", HOME).with_condition(opens_view(view)))
}

fn hide_application(call: &Call<'_>) -> Result<CommandRef, BuildError> {
    let name = call.required(0, "application name")?;
    group(vec![
        arc(Hide::new(name, 4, "ads-application-card", "", "APPS_ALL_DASHBOARD")),
        arc(Hide::new(name, 3, "x-grid-row", "", "APPS_ALL_DASHBOARD")),
        home_list_item(name, "ViewApplicationDashboard"),
        arc(
            Hide::new(name, 3, "ads-home-list-action-item", "", HOME).with_condition(Condition::new(
                |tree, node, _| {
                    tree.parent(node)
                        .map(|p| {
                            attribute_contains(tree, p, "ad-test-id", "home-screen-application-card-application-name")
                        })
                        .unwrap_or(false)
                },
            )),
        ),
    ])
}

fn hide_browser_application(call: &Call<'_>) -> Result<CommandRef, BuildError> {
    let name = call.required(0, "application name")?;
    group(vec![
        arc(Hide::new(name, 4, "x-grid-row", "", "EUM_WEB_ALL_APPS")),
        home_list_item(name, "ViewEumWebApplication"),
    ])
}

fn hide_mobile_application(call: &Call<'_>) -> Result<CommandRef, BuildError> {
    let name = call.required(0, "application name")?;
    group(vec![
        arc(Hide::new(name, 4, "ads-mobile-app-card", "", "EUM_MOBILE_ALL_APPS")),
        arc(Hide::new(name, 4, "x-grid-row", "", "EUM_MOBILE_ALL_APPS")),
        arc(Hide::new(name, 5, "x-grid-row", "", "EUM_MOBILE_ALL_APPS")),
        home_list_item(name, "ViewEumMobileApplication"),
    ])
}

fn hide_database(call: &Call<'_>) -> Result<CommandRef, BuildError> {
    let name = call.required(0, "database name")?;
    group(vec![
        arc(Hide::new(name, 9, "ads-database-card", "", "DB_MONITORING_SERVER_LIST")),
        arc(Hide::new(name, 4, "x-grid-row", "", "DB_MONITORING_SERVER_LIST")),
        home_list_item(name, "ViewDbServer"),
    ])
}

fn hide_business_transaction(call: &Call<'_>) -> Result<CommandRef, BuildError> {
    let name = call.required(0, "business transaction name")?;
    Ok(arc(Hide::new(name, 3, "x-grid-row", "", "APP_BT_LIST")))
}

fn hide_dashboard(call: &Call<'_>) -> Result<CommandRef, BuildError> {
    let name = call.required(0, "dashboard name")?;
    // Only the name column of the dashboard list, not other cells mentioning it
    let first_cell = Condition::new(|tree, node, _| {
        tree.nth_parent(node, 2)
            .map(|cell| attribute_contains(tree, cell, "class", "x-grid-cell-first"))
            .unwrap_or(false)
    });
    group(vec![
        arc(Hide::new(name, 2, "ads-home-list-item", "", "DASHBOARDS_REPORTS_HOME")),
        arc(Hide::new(name, 3, "x-grid-row", "", "DASHBOARD_LIST").with_condition(first_cell)),
        home_list_item(name, "ViewCustomDashboard"),
    ])
}

fn hide_business_journey(call: &Call<'_>) -> Result<CommandRef, BuildError> {
    let name = call.required(0, "business journey name")?;
    Ok(arc(Hide::new(
        name,
        9,
        "ads-analytics-business-outcomes-card-size",
        "",
        "ANALYTICS_BUSINESS_OUTCOMES",
    )))
}

fn hide_analytics_search(call: &Call<'_>) -> Result<CommandRef, BuildError> {
    let name = call.required(0, "search name")?;
    Ok(arc(Hide::new(name, 7, "ui-grid-row", "", "ANALYTICS_SEARCH_LIST")))
}

fn hide_remote_service(call: &Call<'_>) -> Result<CommandRef, BuildError> {
    let name = call.required(0, "remote service name")?;
    Ok(arc(Hide::new(name, 3, "x-grid-row", "", "APP_BACKEND_LIST")))
}

/// Show the image in `value` for the session view named by the parameter.
fn replace_mobile_screenshot(call: &Call<'_>) -> Result<CommandRef, BuildError> {
    let view = call.required(0, "view name")?.to_string();
    let selected = Condition::new(move |tree, _, _| {
        tree.query_selector(tree.root(), SELECTED_SESSION_VIEW)
            .and_then(|cell| tree.get(cell, "innerHTML"))
            .map(|html| html == view)
            .unwrap_or(false)
    });

    let thumbnail = format!(
        "<img src=\"{}\" height=\"149\" style=\"margin-left: auto;margin-right: auto;display: block;\">",
        call.value
    );
    let screenshot = format!(
        "<img src=\"{}\" height=\"380\" style=\"margin-top: 10px;margin-left: auto;margin-right: auto;display: block;\">",
        call.value
    );

    group(vec![
        arc(OverwriteHtml::new(MOBILE_SESSION, ".ads-screenshot-container", &screenshot)
            .with_condition(selected.clone())),
        arc(
            OverwriteHtml::new(MOBILE_SESSION, ".ads-screenshot-tooltip-thumbnail-container", &thumbnail)
                .with_condition(selected.clone()),
        ),
        arc(OverwriteHtml::new(MOBILE_SESSION, ".ads-screenshots-thumbnail-container", &thumbnail)
            .with_condition(selected)),
    ])
}

/// Set the node count shown on a flowmap tier. `λ` or `lambda` turns the
/// tier into a serverless one instead.
fn replace_node_count(call: &Call<'_>) -> Result<CommandRef, BuildError> {
    let tier = call.required(0, "tier name")?;

    if matches!(call.value.to_lowercase().as_str(), "λ" | "lambda") {
        return group(vec![
            arc(ReplaceNeighbor::new(tier, "", 2, NODE_COUNT_TEXT, "")),
            arc(ReplaceNeighbor::new(tier, "", 2, NODE_COUNT_LABEL, "")),
            arc(ReplaceNeighbor::new(tier, LAMBDA_ICON, 2, NODE_COUNT_IMAGE, "").with_property("href")),
        ]);
    }

    let label = if leading_integer(call.value) == Some(1) {
        "Node"
    } else {
        "Nodes"
    };
    group(vec![
        arc(ReplaceNeighbor::new(tier, call.value, 2, NODE_COUNT_TEXT, "")),
        arc(ReplaceNeighbor::new(tier, label, 2, NODE_COUNT_LABEL, "")),
    ])
}

/// Swap the icon of a flowmap tier. A bare name such as `php` picks the
/// stock tier icon of that name.
fn replace_flowmap_icon(call: &Call<'_>) -> Result<CommandRef, BuildError> {
    let tier = call.required(0, "tier name")?;
    let icon = if call.value.contains(['/', '.']) {
        call.value.to_string()
    } else {
        format!("images/tierTypes/{}.svg", call.value.trim())
    };
    Ok(arc(ReplaceNeighbor::new(tier, &icon, 2, TIER_ICON, "").with_property("href")))
}

/// Draw the connection between two tiers with the health in `value`. A
/// third parameter also matches the connection in the other direction.
fn replace_flowmap_connection(call: &Call<'_>) -> Result<CommandRef, BuildError> {
    let source = call.required(0, "source tier")?;
    let target = call.required(1, "target tier")?;
    let both = !call.param(2).trim().is_empty();
    if call.value.trim().eq_ignore_ascii_case("hide") {
        return Ok(arc(ReplaceConnection::hide(source, target).with_both_directions(both)));
    }
    let health: ConnectionHealth = call.value.parse().map_err(|e: String| call.invalid(e))?;
    Ok(arc(ReplaceConnection::new(source, target, health).with_both_directions(both)))
}

fn hide_flowmap_connection(call: &Call<'_>) -> Result<CommandRef, BuildError> {
    Ok(arc(ReplaceConnection::hide(
        call.required(0, "source tier")?,
        call.required(1, "target tier")?,
    )))
}

/// Hold back a link for `value` seconds before it is followed.
fn delay_link(call: &Call<'_>) -> Result<CommandRef, BuildError> {
    let link = call.required(0, "link")?;
    let seconds: f64 = call
        .value
        .trim()
        .parse()
        .map_err(|_| call.invalid(format!("delay `{}` is not a number of seconds", call.value)))?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(call.invalid(format!("delay `{}` is out of range", call.value)));
    }
    Ok(arc(DelayLink::new(link, (seconds * 1000.0).round() as u64)))
}

/// Custom dashboard pages, optionally only the one with the given id.
fn on_dashboard(id: &str) -> Condition {
    let id = id.trim().to_string();
    Condition::new(move |tree, _, _| id.is_empty() || dashboard_id(&tree.location()) == Some(id.as_str()))
}

/// The `dashboard=<id>` parameter of a controller location.
fn dashboard_id(location: &str) -> Option<&str> {
    location
        .split(['&', '?', '#'])
        .find_map(|part| part.strip_prefix("dashboard="))
}

/// Replace the colour in the first parameter with `value` on a custom
/// dashboard.
fn recolor_dashboard(call: &Call<'_>) -> Result<CommandRef, BuildError> {
    let from = call.required(0, "colour")?;
    let command = Recolor::new(from, call.value, DASHBOARD)
        .ok_or_else(|| call.invalid(format!("`{}` and `{}` must be hex colours", from, call.value)))?;
    Ok(arc(command.with_condition(on_dashboard(call.param(1)))))
}

/// Paint the canvas of a custom dashboard with a colour or an image URL.
/// The second parameter picks another element than the canvas.
fn set_dashboard_background(call: &Call<'_>) -> Result<CommandRef, BuildError> {
    let id = call.required(0, "dashboard id")?;
    let selector = match call.param(1) {
        "" => DASHBOARD_CANVAS,
        selector => selector,
    };
    let value = call.value.trim();
    let background = if value.contains('/') || value.starts_with("data:") {
        format!("url(\"{}\") center / cover no-repeat", value)
    } else {
        value.to_string()
    };
    Ok(arc(
        SetStyle::new(DASHBOARD, selector, "background", &background).with_condition(on_dashboard(id)),
    ))
}

/// The integer a value starts with, ignoring anything after it.
fn leading_integer(value: &str) -> Option<i64> {
    let digits: String = value
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::CommandBuilder;
    use crate::command::CommandKind;
    use crate::match_rule::MatchRule;
    use mnky_tree::MemoryTree;

    fn build(key: &str, value: &str) -> CommandRef {
        CommandBuilder::new(vec![NAMESPACE.to_string()], MatchRule::default()).build(key, value)
    }

    /// Home screen: `div.ads-home-list-item[ng-click] > span > #text`.
    fn home_screen(view: &str) -> (MemoryTree, NodeId, NodeId) {
        let mut tree = MemoryTree::new("https://ctrl.example.com/controller/#/location=AD_HOME_OVERVIEW");
        let root = tree.root();
        let item = tree.append_element(root, "div", &[("class", "ads-home-list-item"), ("ng-click", view)]);
        let span = tree.append_element(item, "span", &[]);
        let text = tree.append_text(span, "Shop");
        (tree, item, text)
    }

    #[test]
    fn test_hide_application_on_home_screen() {
        let (mut tree, item, text) = home_screen("vm.ViewApplicationDashboard(app)");
        let command = build("!hideApplication(Shop)", "");
        assert_eq!(command.kind(), CommandKind::Group);
        let undo = command.apply(&mut tree, text, "value");
        assert_eq!(undo.len(), 1);
        assert_eq!(tree.get(item, "style.display").as_deref(), Some("none"));
    }

    #[test]
    fn test_hide_application_skips_other_views() {
        let (mut tree, item, text) = home_screen("vm.ViewDbServer(db)");
        let command = build("!hideApplication(Shop)", "");
        assert!(command.apply(&mut tree, text, "value").is_empty());
        assert_eq!(tree.get(item, "style.display"), None);

        let command = build("!hideDB(Shop)", "");
        assert_eq!(command.apply(&mut tree, text, "value").len(), 1);
    }

    #[test]
    fn test_hide_requires_name() {
        assert_eq!(build("!hideApplication()", "").kind(), CommandKind::Unknown);
    }

    #[test]
    fn test_replace_node_count() {
        let mut tree = MemoryTree::new("https://ctrl.example.com/");
        let root = tree.root();
        let tier = tree.append_element(root, "g", &[]);
        let name = tree.append_element(tier, "text", &[]);
        let text = tree.append_text(name, "Inventory");
        let count = tree.append_element(tier, "text", &[("class", "adsNodeCountText")]);
        tree.append_text(count, "4");
        let label = tree.append_element(tier, "text", &[("class", "adsNodeCountTextSmall")]);
        tree.append_text(label, "Nodes");

        let command = build("!replaceNodeCount(Inventory)", "1");
        let undo = command.apply(&mut tree, text, "value");
        assert_eq!(undo.len(), 2);
        assert_eq!(tree.get(count, "textContent").as_deref(), Some("1"));
        assert_eq!(tree.get(label, "textContent").as_deref(), Some("Node"));
    }

    #[test]
    fn test_replace_mobile_screenshot_condition() {
        let mut tree = MemoryTree::new("https://ctrl.example.com/#/location=EUM_MOBILE_SESSION_DETAILS");
        let root = tree.root();
        let container = tree.append_element(root, "div", &[("class", "ads-screenshot-container")]);
        let command = build("!replaceMobileScreenshot(Checkout)", "https://img.test/shot.png");

        // No selected session row yet
        assert!(command.apply(&mut tree, root, "value").is_empty());

        let panel = tree.append_element(root, "div", &[("class", "ads-session-left-panel-container-grid-with-nav")]);
        let row = tree.append_element(panel, "div", &[("class", "x-grid-row x-grid-row-selected")]);
        let cell = tree.append_element(row, "div", &[("class", "x-grid-cell-first")]);
        let inner = tree.append_element(cell, "div", &[("class", "x-grid-cell-inner")]);
        tree.append_text(inner, "Checkout");

        let undo = command.apply(&mut tree, root, "value");
        assert_eq!(undo.len(), 1);
        assert!(tree
            .get(container, "innerHTML")
            .unwrap_or_default()
            .contains("https://img.test/shot.png"));
    }

    #[test]
    fn test_flowmap_commands_registered() {
        for key in [
            "!replaceFlowmapIcon(Web) = php",
            "!replaceFlowmapConnection(Web, Orders) = Error",
            "!hideFlowmapConnection(Web, Orders)",
            "!delayLink(Troubleshoot) = 2",
            "!recolorDashboard(#f00) = #00f",
            "!recolourDashboard(#f00, 7) = #00f",
            "!setDashboardBackground(7) = #000",
        ] {
            let (key, value) = key.split_once(" = ").unwrap_or((key, ""));
            assert_ne!(build(key, value).kind(), CommandKind::Unknown, "{}", key);
        }
    }

    #[test]
    fn test_replace_flowmap_icon() {
        let mut tree = MemoryTree::new("https://ctrl.example.com/");
        let root = tree.root();
        let node = tree.append_element(root, "g", &[]);
        let label = tree.append_element(node, "text", &[]);
        let text = tree.append_text(label, "Web");
        let icon = tree.append_element(
            node,
            "image",
            &[("class", "adsFlowNodeTypeIcon"), ("href", "images/tierTypes/Java.svg")],
        );

        let command = build("!replaceFlowmapIcon(Web)", "php");
        assert_eq!(command.apply(&mut tree, text, "value").len(), 1);
        assert_eq!(tree.get(icon, "href").as_deref(), Some("images/tierTypes/php.svg"));

        let command = build("!replaceFlowmapIcon(Web)", "https://img.test/custom.svg");
        command.apply(&mut tree, text, "value");
        assert_eq!(tree.get(icon, "href").as_deref(), Some("https://img.test/custom.svg"));
    }

    fn flowmap_edge(source: &str, target: &str) -> (MemoryTree, NodeId, NodeId) {
        let mut tree = MemoryTree::new("https://ctrl.example.com/#/location=APP_DASHBOARD");
        let root = tree.root();
        let edge = tree.append_element(
            root,
            "g",
            &[("class", "adsFlowMapEdge"), ("data-source", source), ("data-target", target)],
        );
        let line = tree.append_element(edge, "path", &[]);
        (tree, edge, line)
    }

    #[test]
    fn test_replace_flowmap_connection() {
        let (mut tree, edge, line) = flowmap_edge("Web", "Orders");
        let command = build("!replaceFlowmapConnection(Web, Orders)", "warning");
        assert_eq!(command.apply(&mut tree, edge, "value").len(), 1);
        assert_eq!(
            tree.get(line, "style.stroke").as_deref(),
            Some(ConnectionHealth::Warning.color())
        );

        assert_eq!(
            build("!replaceFlowmapConnection(Web, Orders)", "purple").kind(),
            CommandKind::Unknown
        );
    }

    #[test]
    fn test_replace_flowmap_connection_reverse() {
        let (mut tree, edge, _) = flowmap_edge("Orders", "Web");
        let one_way = build("!replaceFlowmapConnection(Web, Orders)", "Hide");
        assert!(one_way.apply(&mut tree, edge, "value").is_empty());

        let both = build("!replaceFlowmapConnection(Web, Orders, true)", "Hide");
        assert_eq!(both.apply(&mut tree, edge, "value").len(), 1);
        assert_eq!(tree.get(edge, "style.display").as_deref(), Some("none"));
    }

    #[test]
    fn test_hide_flowmap_connection() {
        let (mut tree, edge, _) = flowmap_edge("Web", "Orders");
        let command = build("!hideFlowmapConnection(Web, Orders)", "");
        assert_eq!(command.kind(), CommandKind::ReplaceConnection);
        assert_eq!(command.apply(&mut tree, edge, "value").len(), 1);
        assert_eq!(tree.get(edge, "style.display").as_deref(), Some("none"));
        assert_eq!(build("!hideFlowmapConnection(Web)", "").kind(), CommandKind::Unknown);
    }

    #[test]
    fn test_delay_link_in_seconds() {
        let mut tree = MemoryTree::new("https://ctrl.example.com/");
        let root = tree.root();
        let link = tree.append_element(root, "a", &[("href", "#/location=APP_TROUBLESHOOT")]);
        tree.append_text(link, "Troubleshoot");

        let command = build("!delayLink(Troubleshoot)", "1.5");
        assert_eq!(command.kind(), CommandKind::DelayLink);
        assert_eq!(command.apply(&mut tree, link, "value").len(), 1);
        assert_eq!(tree.get(link, crate::command::DELAY_ATTRIBUTE).as_deref(), Some("1500"));

        assert_eq!(build("!delayLink(Troubleshoot)", "soon").kind(), CommandKind::Unknown);
        assert_eq!(build("!delayLink(Troubleshoot)", "-1").kind(), CommandKind::Unknown);
    }

    fn dashboard(location: &str) -> (MemoryTree, NodeId, NodeId) {
        let mut tree = MemoryTree::new(location);
        let root = tree.root();
        let canvas = tree.append_element(root, "div", &[("class", "ads-dashboard-canvas")]);
        let bar = tree.append_element(canvas, "rect", &[("fill", "#ff0000")]);
        (tree, canvas, bar)
    }

    #[test]
    fn test_recolor_dashboard_by_id() {
        let (mut tree, _, bar) =
            dashboard("https://ctrl.example.com/controller/#/location=CDASHBOARD_DETAIL&dashboard=12");
        let other = build("!recolorDashboard(#f00, 1)", "#00f");
        assert!(other.apply(&mut tree, bar, "value").is_empty());

        let command = build("!recolourDashboard(#f00, 12)", "#00f");
        assert_eq!(command.kind(), CommandKind::Recolor);
        assert_eq!(command.apply(&mut tree, bar, "value").len(), 1);
        assert_eq!(tree.get(bar, "fill").as_deref(), Some("#0000ff"));

        assert_eq!(build("!recolorDashboard(red)", "#00f").kind(), CommandKind::Unknown);
    }

    #[test]
    fn test_set_dashboard_background() {
        let (mut tree, canvas, _) =
            dashboard("https://ctrl.example.com/controller/#/location=CDASHBOARD_DETAIL&dashboard=12");
        let root = tree.root();

        let command = build("!setDashboardBackground(12)", "https://img.test/bg.png");
        assert_eq!(command.apply(&mut tree, root, "value").len(), 1);
        assert_eq!(
            tree.get(canvas, "style.background").as_deref(),
            Some("url(\"https://img.test/bg.png\") center / cover no-repeat")
        );

        let command = build("!setDashboardBackground(13)", "#222");
        assert!(command.apply(&mut tree, root, "value").is_empty());
    }

    #[test]
    fn test_dashboard_id() {
        assert_eq!(dashboard_id("https://c/#/location=CDASHBOARD_DETAIL&dashboard=12"), Some("12"));
        assert_eq!(dashboard_id("https://c/#/location=CDASHBOARD_DETAIL&dashboard=123&x=1"), Some("123"));
        assert_eq!(dashboard_id("https://c/#/location=AD_HOME_OVERVIEW"), None);
    }

    #[test]
    fn test_leading_integer() {
        assert_eq!(leading_integer("1"), Some(1));
        assert_eq!(leading_integer("12 nodes"), Some(12));
        assert_eq!(leading_integer("many"), None);
    }
}
