//! Subcommand implementations

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use dash_core::{
    field_targets, find_material, grouped_materials, materials_by_category, DesignStore, MaterialCategory,
    WidgetMaterial, WidgetType,
};
use dash_data::{MemoryTransport, PageClient, WidgetBindings, WidgetDataFetcher};

/// Catalog listing, one material per line
///
/// Without a category every group is listed under a `<category>:` heading.
pub fn list_materials(category: Option<MaterialCategory>) -> String {
    match category {
        Some(category) => material_lines(&materials_by_category(category)),
        None => grouped_materials()
            .into_iter()
            .map(|(category, materials)| format!("{}:\n{}", category_label(category), material_lines(&materials)))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn material_lines(materials: &[&WidgetMaterial]) -> String {
    materials
        .iter()
        .map(|m| {
            format!(
                "  {:<18} {:>2}x{:<2} {}\n",
                m.widget_type.as_str(),
                m.default_w,
                m.default_h,
                m.title
            )
        })
        .collect()
}

/// Mapping targets of `tag`, one `key  label` pair per line
pub fn list_targets(tag: &str) -> Result<String> {
    let widget_type = parse_widget_type(tag)?;
    Ok(field_targets(&widget_type)
        .into_iter()
        .map(|target| format!("{:<12} {}\n", target.key, target.label))
        .collect())
}

/// Build a dashboard with one widget per tag and write its export to `out`
///
/// Returns the number of widgets written.
pub fn create_dashboard(name: &str, tags: &[String], out: &Path) -> Result<usize> {
    let store = DesignStore::new(name);
    for tag in tags {
        let widget_type = parse_widget_type(tag)?;
        let material = find_material(&widget_type).with_context(|| format!("no material for `{tag}`"))?;
        store.add_widget(material, None);
    }

    write_export(&store, out)?;
    Ok(store.read(|document| document.widgets.len()))
}

/// Load canned responses from a JSON object keyed by request URL
pub fn load_fixtures(path: &Path) -> Result<MemoryTransport> {
    let raw = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&raw).with_context(|| format!("{} is not valid JSON", path.display()))?;
    let Value::Object(responses) = value else {
        bail!("{} must hold a JSON object keyed by URL", path.display());
    };

    let transport = MemoryTransport::new();
    for (url, body) in responses {
        debug!(url = %url, "loaded fixture");
        transport.set_response(url, body);
    }
    Ok(transport)
}

/// Resolve the render props of every widget in the export at `file`
///
/// The result maps widget ids to props, in document order.
pub async fn resolve_dashboard(file: &Path, fetcher: WidgetDataFetcher) -> Result<Value> {
    let store = import_file(file)?;
    let document = store.document();

    let bindings = WidgetBindings::new(fetcher);
    bindings.sync(&document).await;

    let mut resolved = Map::new();
    for widget in &document.widgets {
        match bindings.render_props(&widget.id) {
            Some(props) => {
                resolved.insert(widget.id.clone(), Value::Object(props));
            }
            None => warn!(widget_id = %widget.id, "widget was not bound"),
        }
    }
    Ok(Value::Object(resolved))
}

/// Write the dashboard stored on page `page_id` to `out`
///
/// Returns the number of widgets written.
pub async fn pull_page(client: &PageClient, page_id: &str, out: &Path) -> Result<usize> {
    let page = client
        .get_page(page_id)
        .await
        .with_context(|| format!("failed to fetch page {page_id}"))?;
    let document = page
        .document()
        .with_context(|| format!("page {page_id} holds no valid dashboard"))?;

    let store = DesignStore::default();
    store.load_document(document);
    write_export(&store, out)?;
    Ok(store.read(|document| document.widgets.len()))
}

/// Store the export at `file` as the config of page `page_id`
///
/// Returns the page version reported back.
pub async fn push_page(client: &PageClient, page_id: &str, file: &Path) -> Result<u32> {
    let store = import_file(file)?;
    let page = client
        .save_document(page_id, &store.document())
        .await
        .with_context(|| format!("failed to save page {page_id}"))?;
    Ok(page.version)
}

fn parse_widget_type(tag: &str) -> Result<WidgetType> {
    WidgetType::parse_known(tag).with_context(|| format!("unknown widget type `{tag}`"))
}

fn category_label(category: MaterialCategory) -> &'static str {
    match category {
        MaterialCategory::Chart => "chart",
        MaterialCategory::List => "list",
        MaterialCategory::Widget => "widget",
    }
}

fn import_file(file: &Path) -> Result<DesignStore> {
    let json = fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))?;
    let store = DesignStore::default();
    if !store.import_config(&json) {
        bail!("{} is not a dashboard export", file.display());
    }
    Ok(store)
}

fn write_export(store: &DesignStore, out: &Path) -> Result<()> {
    let json = store.export_config();
    if json.is_empty() {
        bail!("failed to serialize dashboard");
    }
    fs::write(out, json).with_context(|| format!("failed to write {}", out.display()))
}
