//! Server-side rendering of the dashboard pages.
//!
//! Pages carry their figures as inline JSON and plot them with plotly.js;
//! maps are embedded as `srcdoc` iframes. Control changes navigate to a new
//! query string so every interaction re-renders on the server.

use anyhow::Result;
use std::collections::BTreeMap;

use crate::charts::Figure;
use crate::dashboard::{AnalysisView, Component, Content, Dashboard, DeathPanel, Selection};
use crate::html::{escape, script_json};

const PLOTLY_JS: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="ko">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <script src="{plotly}"></script>
    <style>{css}</style>
</head>
<body>
{body}
</body>
</html>"#,
        title = escape(title),
        plotly = PLOTLY_JS,
        css = inline_css(),
        body = body,
    )
}

fn inline_css() -> &'static str {
    r#"
body { margin: 0; font-family: system-ui, sans-serif; background: #111111; color: #f2f5fa; }
h1, h6 { text-align: center; }
.controls { width: 100%; display: flex; justify-content: flex-end; gap: 5px; }
.controls select { width: 30%; margin: 5px; }
.toggle { position: fixed; top: 10px; right: 10px; width: 23%; z-index: 99; }
.tabs input { display: none; }
.tabs label { display: inline-block; padding: 8px 16px; cursor: pointer; border-bottom: 2px solid transparent; }
.tabs input:checked + label { border-bottom-color: #f2f5fa; }
.tab-panel { display: none; }
"#
}

fn iframe(id: &str, doc_html: &str, style: &str) -> String {
    format!(
        r#"<iframe id="{id}" srcdoc="{doc}" style="{style}; border: 0"></iframe>"#,
        id = escape(id),
        doc = escape(doc_html),
        style = style,
    )
}

fn plot_script(figures: &BTreeMap<&str, &Figure>) -> Result<String> {
    if figures.is_empty() {
        return Ok(String::new());
    }
    Ok(format!(
        r#"<script>
const figures = {json};
for (const [id, fig] of Object.entries(figures)) {{
    Plotly.newPlot(id, fig.data, fig.layout, {{ responsive: true }});
}}
</script>"#,
        json = script_json(figures)?,
    ))
}

fn select_options<'a>(
    options: impl IntoIterator<Item = (&'a str, &'a str, bool)>,
) -> String {
    options
        .into_iter()
        .map(|(value, label, selected)| {
            format!(
                r#"<option value="{}"{}>{}</option>"#,
                escape(value),
                if selected { " selected" } else { "" },
                escape(label)
            )
        })
        .collect::<Vec<_>>()
        .join("")
}

/// Renders the combined dashboard for `selection`.
pub fn render_dashboard(dashboard: &Dashboard, selection: &Selection) -> Result<String> {
    let views = select_options(
        AnalysisView::ALL
            .iter()
            .map(|v| (v.as_str(), v.label(), *v == selection.view)),
    );

    let options = dashboard.options(selection.view);
    let charts = select_options(options.iter().map(|o| {
        (
            o.value.as_str(),
            o.label.as_str(),
            selection.charts.contains(&o.value),
        )
    }));

    let components = dashboard.render(selection);
    let mut figures = BTreeMap::new();
    let children: String = components
        .iter()
        .map(|c: &Component<'_>| match c.content {
            Content::Map(doc) => iframe(&c.id, &doc.html, c.style),
            Content::Figure(figure) => {
                figures.insert(c.id.as_str(), figure);
                format!(r#"<div id="{}" style="{}"></div>"#, escape(&c.id), c.style)
            }
        })
        .collect();

    let body = format!(
        r#"<h1>{title}</h1>
<h6>{subtitle}</h6>
<div class="controls">
    <select id="analysis-type-dropdown">{views}</select>
    <select id="chart-dropdown" multiple>{charts}</select>
</div>
<div id="chart-container">{children}</div>
<script>
const view = document.getElementById("analysis-type-dropdown");
const charts = document.getElementById("chart-dropdown");
view.addEventListener("change", () => {{
    location.search = new URLSearchParams({{ view: view.value }}).toString();
}});
charts.addEventListener("change", () => {{
    const picked = Array.from(charts.selectedOptions, (o) => o.value).join(",");
    location.search = new URLSearchParams({{ view: view.value, charts: picked }}).toString();
}});
</script>
{plots}"#,
        title = escape(&dashboard.title),
        subtitle = escape(&dashboard.subtitle),
        views = views,
        charts = charts,
        children = children,
        plots = plot_script(&figures)?,
    );

    Ok(page(&dashboard.title, &body))
}

/// Renders the four death charts with a multi-select visibility toggle.
/// Hidden charts stay in the page with `display: none`.
pub fn render_death_toggle(panels: &[DeathPanel<'_>]) -> Result<String> {
    let toggle = select_options(panels.iter().map(|p| (p.toggle, p.label, p.visible)));

    let mut figures = BTreeMap::new();
    let containers: String = panels
        .iter()
        .map(|p| {
            figures.insert(p.id, p.figure);
            format!(
                r#"<div id="{id}-container" style="{style}"><div id="{id}"></div></div>"#,
                id = p.id,
                style = p.style(),
            )
        })
        .collect();

    let body = format!(
        r#"<select id="chart-toggle" class="toggle" multiple>{toggle}</select>
{containers}
<script>
const toggle = document.getElementById("chart-toggle");
toggle.addEventListener("change", () => {{
    const picked = Array.from(toggle.selectedOptions, (o) => o.value).join(",");
    location.search = new URLSearchParams({{ charts: picked }}).toString();
}});
</script>
{plots}"#,
        toggle = toggle,
        containers = containers,
        plots = plot_script(&figures)?,
    );

    Ok(page("사망자 분석", &body))
}

/// Renders one tab per map document.
pub fn render_map_tabs(dashboard: &Dashboard) -> String {
    let docs: Vec<_> = dashboard.maps().collect();

    let tabs: String = docs
        .iter()
        .enumerate()
        .map(|(i, doc)| {
            format!(
                r#"<input type="radio" name="tab" id="tab-{i}"{checked}><label for="tab-{i}">{label}</label>"#,
                checked = if i == 0 { " checked" } else { "" },
                label = escape(&doc.title),
            )
        })
        .collect();

    let panels: String = docs
        .iter()
        .enumerate()
        .map(|(i, doc)| {
            format!(
                r#"<div class="tab-panel" id="panel-{i}">{frame}</div>"#,
                frame = iframe(&format!("iframe-{}", doc.id), &doc.html, "width: 100%; height: 80vh"),
            )
        })
        .collect();

    let selectors: Vec<String> = (0..docs.len())
        .map(|i| format!("#tab-{i}:checked ~ #panel-{i}"))
        .collect();
    let visible_rule = if selectors.is_empty() {
        String::new()
    } else {
        format!("<style>{} {{ display: block; }}</style>", selectors.join(", "))
    };

    page(
        &dashboard.title,
        &format!(r#"<div class="tabs">{tabs}{panels}</div>{visible_rule}"#),
    )
}
