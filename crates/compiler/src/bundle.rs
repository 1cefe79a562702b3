//! Read-only view over a finished build

use indexmap::IndexMap;
use packbridge_config::TagTemplates;
use packbridge_core::{BuildData, BuildRequest, BuildStats, BuildWarning, EntryUrls};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// One emitted file with the URL it is served from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Asset {
    pub name: String,
    pub path: PathBuf,
    pub url: String,
}

impl Asset {
    fn is_css(&self) -> bool {
        has_extension(&self.name, "css")
    }

    fn is_js(&self) -> bool {
        has_extension(&self.name, "js")
    }
}

fn has_extension(name: &str, extension: &str) -> bool {
    Path::new(name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

/// Result of a build, whether fresh or read back from a cache.
///
/// Every accessor derives its answer from the stored data. Nothing here talks
/// to the build service again.
#[derive(Debug, Clone)]
pub struct BundleResult {
    request: BuildRequest,
    data: BuildData,
    warnings: Vec<BuildWarning>,
    tags: TagTemplates,
}

impl BundleResult {
    pub fn new(
        request: BuildRequest,
        data: BuildData,
        warnings: Vec<BuildWarning>,
        tags: TagTemplates,
    ) -> Self {
        Self {
            request,
            data,
            warnings,
            tags,
        }
    }

    /// Every emitted file, in the order the service listed them.
    ///
    /// URLs come from the asset itself or the service's `urls` block. Paths
    /// and URLs still missing are derived from the request's output
    /// locations.
    pub fn get_assets(&self) -> Vec<Asset> {
        self.data
            .assets
            .by_entry()
            .into_iter()
            .flat_map(|(_, assets)| assets)
            .map(|raw| self.asset(raw.name, raw.path, raw.url))
            .collect()
    }

    fn asset(&self, name: String, path: Option<PathBuf>, url: Option<String>) -> Asset {
        let path = path.unwrap_or_else(|| self.request.output_path.join(&name));
        let url = url
            .or_else(|| self.service_url(&name))
            .unwrap_or_else(|| format!("{}/{name}", self.request.public_path));
        Asset { name, path, url }
    }

    /// URL the service reported for the file called `name`
    fn service_url(&self, name: &str) -> Option<String> {
        self.data
            .urls
            .as_ref()?
            .values()
            .flat_map(|urls| urls.js.iter().chain(urls.css.iter()))
            .find(|url| url.rsplit('/').next() == Some(name))
            .cloned()
    }

    /// One URL per asset, in asset order
    pub fn get_urls(&self) -> Vec<String> {
        self.get_assets().into_iter().map(|asset| asset.url).collect()
    }

    /// URLs grouped by entry point and split into JS and CSS
    pub fn get_urls_by_entry(&self) -> IndexMap<String, EntryUrls> {
        if let Some(urls) = &self.data.urls {
            return urls.clone();
        }

        self.data
            .assets
            .by_entry()
            .into_iter()
            .map(|(entry, raw_assets)| {
                let mut urls = EntryUrls::default();
                for raw in raw_assets {
                    let asset = self.asset(raw.name, raw.path, raw.url);
                    if asset.is_css() {
                        urls.css.push(asset.url);
                    } else if asset.is_js() {
                        urls.js.push(asset.url);
                    }
                }
                (entry, urls)
            })
            .collect()
    }

    /// One tag per asset, stylesheets as links and everything else as scripts
    pub fn render(&self) -> String {
        self.get_assets()
            .iter()
            .map(|asset| {
                if asset.is_css() {
                    self.tags.render_css(&asset.url)
                } else {
                    self.tags.render_js(&asset.url)
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Stylesheet tags for every entry point
    pub fn render_css(&self) -> String {
        self.get_urls_by_entry()
            .values()
            .flat_map(|urls| urls.css.iter())
            .map(|url| self.tags.render_css(url))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Script tags for every entry point
    pub fn render_js(&self) -> String {
        self.get_urls_by_entry()
            .values()
            .flat_map(|urls| urls.js.iter())
            .map(|url| self.tags.render_js(url))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Library name the bundle exports, if it was built as a library
    pub fn get_library(&self) -> Option<String> {
        let from_config = self
            .data
            .webpack_config
            .as_ref()
            .and_then(|config| config.get("output"))
            .and_then(|output| output.get("library"));
        let from_output_options = || {
            self.data
                .output_options
                .as_ref()
                .and_then(|options| options.get("library"))
        };

        from_config
            .or_else(from_output_options)
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    pub fn get_config(&self) -> Option<&Value> {
        self.data.webpack_config.as_ref()
    }

    pub fn get_output_options(&self) -> Option<&Value> {
        self.data.output_options.as_ref()
    }

    pub fn get_file_dependencies(&self) -> &[PathBuf] {
        &self.data.file_dependencies
    }

    pub fn stats(&self) -> &BuildStats {
        &self.data.stats
    }

    pub fn warnings(&self) -> &[BuildWarning] {
        &self.warnings
    }

    pub fn request(&self) -> &BuildRequest {
        &self.request
    }

    pub fn data(&self) -> &BuildData {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use packbridge_core::Context;
    use serde_json::json;

    fn request() -> BuildRequest {
        BuildRequest {
            config_path: PathBuf::from("/app/webpack.config.js"),
            context: Context::new(),
            watch_config: false,
            watch_source: false,
            hmr: false,
            aggregate_timeout: 200,
            poll: None,
            output_root: PathBuf::from("/srv/static"),
            output_url: "/static/".to_string(),
            output_path: PathBuf::from("/srv/static/webpack/h1"),
            public_path: "/static/webpack/h1".to_string(),
            options_hash: "h1".to_string(),
            cache_key: "/app/webpack.config.js__h1".to_string(),
        }
    }

    fn bundle(data: serde_json::Value) -> BundleResult {
        BundleResult::new(
            request(),
            serde_json::from_value(data).unwrap(),
            Vec::new(),
            TagTemplates::default(),
        )
    }

    #[test]
    fn test_assets_keep_service_order_and_derive_urls() {
        let result = bundle(json!({
            "assets": {
                "main": [
                    {"name": "main-abc.js", "path": "/srv/static/webpack/h1/main-abc.js"},
                    {"name": "main-abc.css"}
                ],
                "vendor": [{"name": "vendor.js", "url": "https://cdn.example.com/vendor.js"}]
            }
        }));

        let assets = result.get_assets();
        let names: Vec<_> = assets.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["main-abc.js", "main-abc.css", "vendor.js"]);
        assert_eq!(assets[1].url, "/static/webpack/h1/main-abc.css");
        assert_eq!(assets[1].path, PathBuf::from("/srv/static/webpack/h1/main-abc.css"));
        assert_eq!(assets[2].url, "https://cdn.example.com/vendor.js");
    }

    #[test]
    fn test_service_urls_preferred_over_derived() {
        let result = bundle(json!({
            "assets": [
                "/srv/static/webpack/h1/bundle-abc.js",
                "/srv/static/webpack/h1/styles.css",
                "/srv/static/webpack/h1/unlisted.js"
            ],
            "urls": {"main": {
                "js": ["https://cdn.example.com/h1/bundle-abc.js"],
                "css": ["https://cdn.example.com/h1/styles.css"]
            }}
        }));

        assert_eq!(
            result.get_urls(),
            [
                "https://cdn.example.com/h1/bundle-abc.js",
                "https://cdn.example.com/h1/styles.css",
                "/static/webpack/h1/unlisted.js"
            ]
        );
        assert_eq!(
            result.render(),
            "<script src=\"https://cdn.example.com/h1/bundle-abc.js\"></script>\n\
             <link rel=\"stylesheet\" href=\"https://cdn.example.com/h1/styles.css\">\n\
             <script src=\"/static/webpack/h1/unlisted.js\"></script>"
        );
        assert_eq!(
            result.get_assets()[0].path,
            PathBuf::from("/srv/static/webpack/h1/bundle-abc.js")
        );
    }

    #[test]
    fn test_render_one_tag_per_asset() {
        let result = bundle(json!({
            "assets": [
                {"name": "styles.css"},
                {"name": "app.js"},
                {"name": "font.woff2"}
            ]
        }));

        let rendered = result.render();
        assert_eq!(
            rendered,
            "<link rel=\"stylesheet\" href=\"/static/webpack/h1/styles.css\">\n\
             <script src=\"/static/webpack/h1/app.js\"></script>\n\
             <script src=\"/static/webpack/h1/font.woff2\"></script>"
        );
        for url in result.get_urls() {
            assert!(rendered.contains(&url));
        }
    }

    #[test]
    fn test_render_by_kind_uses_url_groups() {
        let result = bundle(json!({
            "assets": {"main": [{"name": "a.js"}, {"name": "a.css"}]},
            "urls": {
                "main": {"js": ["/static/main.js"], "css": ["/static/main.css"]},
                "other": {"js": ["/static/other.js"], "css": []}
            }
        }));

        assert_eq!(
            result.render_js(),
            "<script src=\"/static/main.js\"></script>\n<script src=\"/static/other.js\"></script>"
        );
        assert_eq!(
            result.render_css(),
            "<link rel=\"stylesheet\" href=\"/static/main.css\">"
        );
    }

    #[test]
    fn test_url_groups_derived_from_assets() {
        let result = bundle(json!({
            "assets": {"main": [{"name": "a.js"}, {"name": "a.css"}, {"name": "a.map"}]}
        }));

        let urls = result.get_urls_by_entry();
        assert_eq!(urls.len(), 1);
        assert_eq!(urls["main"].js, ["/static/webpack/h1/a.js"]);
        assert_eq!(urls["main"].css, ["/static/webpack/h1/a.css"]);
    }

    #[test]
    fn test_custom_tag_templates() {
        let mut result = bundle(json!({"assets": [{"name": "app.js"}]}));
        result.tags = TagTemplates {
            css: String::new(),
            js: "<script defer src=\"{url}\"></script>".to_string(),
        };
        assert_eq!(
            result.render(),
            "<script defer src=\"/static/webpack/h1/app.js\"></script>"
        );
    }

    #[test]
    fn test_library_lookup() {
        let from_config = bundle(json!({
            "webpackConfig": {"output": {"library": "LIB_1"}},
            "outputOptions": {"library": "LIB_2"}
        }));
        assert_eq!(from_config.get_library().as_deref(), Some("LIB_1"));

        let from_options = bundle(json!({"outputOptions": {"library": "LIB_2"}}));
        assert_eq!(from_options.get_library().as_deref(), Some("LIB_2"));

        assert_eq!(bundle(json!({})).get_library(), None);
    }

    #[test]
    fn test_repeated_calls_are_equal() {
        let result = bundle(json!({"assets": [{"name": "a.js"}, {"name": "b.css"}]}));
        assert_eq!(result.get_assets(), result.get_assets());
        assert_eq!(result.render(), result.render());
    }
}
