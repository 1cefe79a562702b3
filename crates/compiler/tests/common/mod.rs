//! Shared fixtures for compiler integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use packbridge_client::BuildService;
use packbridge_compiler::Compiler;
use packbridge_config::{Settings, SettingsBuilder};
use packbridge_core::{BuildRequest, BuildResponse, Result};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Project layout with a handful of bundler configs
pub struct Fixture {
    pub temp_dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let configs = temp_dir.path().join("configs");
        for name in ["basic", "multiple_bundles", "broken", "warnings", "library"] {
            let dir = configs.join(name);
            fs::create_dir_all(&dir).unwrap();
            fs::write(dir.join("webpack.config.js"), "module.exports = {};").unwrap();
        }
        Self { temp_dir }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn cache_file(&self) -> PathBuf {
        self.root().join("cache").join("webpack-cache.json")
    }

    pub fn manifest_file(&self) -> PathBuf {
        self.root().join("webpack-manifest.json")
    }

    /// Settings with output locations and the config dir filled in
    pub fn settings(&self) -> SettingsBuilder {
        SettingsBuilder::new()
            .output_root(self.root().join("static"))
            .output_url("/static/")
            .config_dir(self.root().join("configs"))
    }

    pub fn compiler(&self, settings: Settings) -> (Compiler, Arc<FakeBuildService>) {
        let service = Arc::new(FakeBuildService::default());
        let compiler = Compiler::with_service(settings, service.clone()).unwrap();
        (compiler, service)
    }
}

/// Build service that writes small bundles to disk and counts its calls
#[derive(Debug, Default)]
pub struct FakeBuildService {
    calls: AtomicUsize,
}

impl FakeBuildService {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn write_file(request: &BuildRequest, name: &str, content: &str) -> PathBuf {
    fs::create_dir_all(&request.output_path).unwrap();
    let path = request.output_path.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn emit(request: &BuildRequest, name: &str, content: &str) -> serde_json::Value {
    let path = write_file(request, name, content);
    json!({"name": name, "path": path})
}

/// Writes each entry's files and describes them the way webpack-build does:
/// a flat list of output paths plus per-entry `urls` and `output` blocks
fn emit_entries(request: &BuildRequest, entries: &[(&str, Vec<(&str, &str)>)]) -> serde_json::Value {
    let mut assets = Vec::new();
    let mut urls = serde_json::Map::new();
    let mut output = serde_json::Map::new();

    for (entry, files) in entries {
        let mut js_urls = Vec::new();
        let mut js_paths = Vec::new();
        for (name, content) in files {
            let path = write_file(request, name, content);
            js_urls.push(format!("{}/{name}", request.public_path));
            js_paths.push(path.clone());
            assets.push(path);
        }
        urls.insert(entry.to_string(), json!({"js": js_urls, "css": []}));
        output.insert(entry.to_string(), json!({"js": js_paths, "css": []}));
    }

    json!({
        "stats": {"errors": [], "warnings": []},
        "assets": assets,
        "urls": urls,
        "output": output
    })
}

#[async_trait]
impl BuildService for FakeBuildService {
    async fn build(&self, request: &BuildRequest) -> Result<BuildResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let project = request
            .config_path
            .parent()
            .and_then(Path::file_name)
            .and_then(|name| name.to_str())
            .unwrap_or_default()
            .to_string();
        let source = request.config_path.with_file_name("entry.js");

        let envelope = match project.as_str() {
            "basic" => {
                let name = format!("bundle-{}.js", &request.options_hash[..8]);
                let content = format!("/* __ENTRY_TEST__ */ var context = {};", json!(request.context));
                let mut data = emit_entries(request, &[("main", vec![(name.as_str(), content.as_str())])]);
                data["fileDependencies"] = json!([source]);
                json!({"error": null, "data": data})
            }
            "multiple_bundles" => json!({
                "error": null,
                "data": emit_entries(
                    request,
                    &[
                        ("bundle_1", vec![("bundle-bundle_1.js", "__BUNDLE_ONE__")]),
                        ("bundle_2", vec![("bundle-bundle_2.js", "__BUNDLE_TWO__")]),
                    ],
                )
            }),
            "broken" => json!({
                "error": "Module build failed",
                "data": {
                    "stats": {
                        "errors": [{"message": "Unexpected token (1:4)", "stack": "SyntaxError: at entry.js:1:4"}],
                        "warnings": []
                    }
                }
            }),
            "warnings" => json!({
                "error": null,
                "data": {
                    "stats": {"errors": [], "warnings": ["asset size limit exceeded"]},
                    "assets": [emit(request, "big.js", "__BIG__")]
                }
            }),
            "library" => json!({
                "error": null,
                "data": {
                    "stats": {"errors": [], "warnings": []},
                    "assets": [emit(request, "lib.js", "__LIB__"), emit(request, "lib.css", "body {}")],
                    "webpackConfig": {"output": {"library": "LIB_TEST"}},
                    "outputOptions": {"library": "LIB_TEST"}
                }
            }),
            other => json!({"error": format!("unknown project {other}"), "data": null}),
        };

        Ok(serde_json::from_value(envelope).unwrap())
    }

    fn endpoint(&self) -> &str {
        "fake://build"
    }
}
