use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Runs the binary inside `tmp` with config and data lookups confined to it.
fn harsift(tmp: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!();
    cmd.current_dir(tmp.path())
        .env("HOME", tmp.path())
        .env("XDG_CONFIG_HOME", tmp.path().join("config"))
        .env("XDG_DATA_HOME", tmp.path().join("data"))
        .env_remove("APPDATA")
        .env_remove("HARSIFT_LOG");
    cmd
}

fn write(tmp: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = tmp.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn header_names(headers: &Value) -> Vec<String> {
    headers
        .as_array()
        .unwrap()
        .iter()
        .map(|h| h["name"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_help() {
    let tmp = TempDir::new().unwrap();
    harsift(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Filter HAR captures"));
}

#[test]
fn test_version() {
    let tmp = TempDir::new().unwrap();
    harsift(&tmp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("harsift"));
}

#[test]
fn test_export_har_with_defaults() {
    let tmp = TempDir::new().unwrap();
    let out = tmp.path().join("out.har");

    harsift(&tmp)
        .arg("export")
        .arg(fixture("shop.har"))
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 5 of 5 entries"));

    let har = read_json(&out);
    let entries = har["log"]["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 5);
    assert_eq!(har["log"]["pages"][0]["id"], "page_1");
    assert_eq!(har["log"]["creator"]["name"], "devtools");

    let first = &entries[0];
    assert_eq!(header_names(&first["request"]["headers"]), vec!["Cookie"]);
    assert_eq!(
        header_names(&first["response"]["headers"]),
        vec!["Content-Type", "Set-Cookie"]
    );
    assert_eq!(
        first["response"]["content"]["text"],
        "<html><head><title>Shop</title></head><body>Welcome</body></html>"
    );
    assert!(first.get("_resourceType").is_none());

    assert_eq!(entries[1]["request"]["postData"]["text"], r#"{"sku":42,"qty":1}"#);
    assert_eq!(entries[1]["response"]["content"]["text"], r#"{"cart":[42]}"#);
    assert_eq!(
        entries[2]["response"]["content"]["text"],
        "[base64-data: 0KB image/png]"
    );
}

#[test]
fn test_export_text_to_stdout() {
    let tmp = TempDir::new().unwrap();
    harsift(&tmp)
        .arg("export")
        .arg(fixture("shop.har"))
        .args(["--format", "text", "-o", "-"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--- #1 ---"))
        .stdout(predicate::str::contains("POST https://shop.test/api/cart?session=9"))
        .stdout(predicate::str::contains(r#"{"sku":42,"qty":1}"#))
        .stdout(predicate::str::contains("> 201 Created"))
        .stdout(predicate::str::contains("Exported").not());
}

#[test]
fn test_export_har_ends_with_single_newline() {
    let tmp = TempDir::new().unwrap();
    for extra in [&[][..], &["--compact"][..]] {
        let output = harsift(&tmp)
            .arg("export")
            .arg(fixture("cart.har"))
            .args(["-o", "-"])
            .args(extra)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        let text = String::from_utf8(output).unwrap();
        assert!(text.ends_with("}\n"), "{:?}", extra);
        assert!(!text.ends_with("\n\n"), "{:?}", extra);
        serde_json::from_str::<Value>(&text).unwrap();
    }
}

#[test]
fn test_export_default_file_name() {
    let tmp = TempDir::new().unwrap();
    harsift(&tmp)
        .arg("export")
        .arg(fixture("shop.har"))
        .args(["--format", "text"])
        .assert()
        .success();

    let names: Vec<String> = fs::read_dir(tmp.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n.starts_with("ai-"))
        .collect();
    assert_eq!(names.len(), 1);
    assert!(names[0].ends_with("_shop.har.txt"));
}

#[test]
fn test_export_with_filters_and_settings_files() {
    let tmp = TempDir::new().unwrap();
    let filters = write(&tmp, "filters.json", r#"{"quickFilters": {"image": true}}"#);
    let settings = write(
        &tmp,
        "settings.json",
        r#"{"excludedResponses": {"1": true}, "deselectedEntries": {"3": true}}"#,
    );
    let out = tmp.path().join("out.har");

    harsift(&tmp)
        .arg("export")
        .arg(fixture("shop.har"))
        .arg("--filters")
        .arg(&filters)
        .arg("--settings")
        .arg(&settings)
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 2 of 5 entries"));

    let har = read_json(&out);
    let entries = har["log"]["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[1]["request"]["method"], "POST");
    assert_eq!(entries[1]["response"]["status"], 201);
    assert_eq!(entries[1]["response"]["content"]["text"], "");
    assert_eq!(entries[1]["response"]["headers"], serde_json::json!([]));
}

#[test]
fn test_estimate_json() {
    let tmp = TempDir::new().unwrap();
    let filters = write(&tmp, "filters.json", r#"{"domainFilters": {"ads.example": true}}"#);
    let output = harsift(&tmp)
        .arg("estimate")
        .arg(fixture("shop.har"))
        .arg("--filters")
        .arg(&filters)
        .arg("--json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let summary: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(summary["total"], 5);
    assert_eq!(summary["visible"], 4);
    assert_eq!(summary["selected"], 4);
    assert!(summary["estimatedTokens"].as_u64().unwrap() > 0);
}

#[test]
fn test_list_with_expression_and_highlight() {
    let tmp = TempDir::new().unwrap();
    let filters = write(
        &tmp,
        "filters.json",
        r##"{
          "expressionTree": {
            "type": "group",
            "operator": "and",
            "children": [
              {"type": "property-filter", "field": "domain", "filterOperator": "equals", "value": "shop.test"},
              {"type": "text-search", "text": "welcome", "highlightOnly": true, "color": "#ff6b6b"}
            ]
          }
        }"##,
    );

    harsift(&tmp)
        .arg("list")
        .arg(fixture("shop.har"))
        .arg("--filters")
        .arg(&filters)
        .assert()
        .success()
        .stdout(predicate::str::contains("https://shop.test/"))
        .stdout(predicate::str::contains("[#ff6b6b] SEARCH: Req & Resp Hdrs & Bodies contains 'welcome'"))
        .stdout(predicate::str::contains("cdn.shop.test").not());

    let output = harsift(&tmp)
        .arg("list")
        .arg(fixture("shop.har"))
        .arg("--filters")
        .arg(&filters)
        .args(["--all", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let rows: Value = serde_json::from_slice(&output).unwrap();
    let visible: Vec<bool> = rows
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["visible"].as_bool().unwrap())
        .collect();
    assert_eq!(visible, vec![true, true, false, false, false]);
    assert_eq!(rows[0]["resourceType"], "document");
}

#[test]
fn test_list_sorted_by_size() {
    let tmp = TempDir::new().unwrap();
    let filters = write(
        &tmp,
        "filters.json",
        r#"{"sortColumn": "size", "sortDirection": "desc"}"#,
    );
    let output = harsift(&tmp)
        .arg("list")
        .arg(fixture("shop.har"))
        .arg("--filters")
        .arg(&filters)
        .arg("--json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let rows: Value = serde_json::from_slice(&output).unwrap();
    let positions: Vec<u64> = rows
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["position"].as_u64().unwrap())
        .collect();
    assert_eq!(positions, vec![2, 0, 4, 1, 3]);
}

#[test]
fn test_domains() {
    let tmp = TempDir::new().unwrap();
    harsift(&tmp)
        .arg("domains")
        .arg(fixture("shop.har"))
        .assert()
        .success()
        .stdout(predicate::str::contains("     2  cdn.shop.test"))
        .stdout(predicate::str::contains("     2  shop.test"))
        .stdout(predicate::str::contains("     1  ads.example"));
}

#[test]
fn test_quick_counts_and_toggle_save() {
    let tmp = TempDir::new().unwrap();
    let output = harsift(&tmp)
        .arg("quick")
        .arg(fixture("shop.har"))
        .arg("--json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let buttons: Value = serde_json::from_slice(&output).unwrap();
    let image = buttons
        .as_array()
        .unwrap()
        .iter()
        .find(|b| b["key"] == "image")
        .unwrap();
    assert_eq!(image["count"], 2);
    assert_eq!(image["active"], false);

    let filters = write(&tmp, "filters.json", "{}");
    harsift(&tmp)
        .arg("quick")
        .arg(fixture("shop.har"))
        .arg("--filters")
        .arg(&filters)
        .args(["--toggle", "image", "--toggle", ".js", "--save"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[x] image"));

    let saved = read_json(&filters);
    assert_eq!(saved["quickFilters"]["image"], true);
    assert_eq!(saved["quickFilters"][".js"], true);
}

#[test]
fn test_quick_rejects_unknown_key() {
    let tmp = TempDir::new().unwrap();
    harsift(&tmp)
        .arg("quick")
        .arg(fixture("shop.har"))
        .args(["--toggle", "gifs"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown quick filter 'gifs'"));
}

#[test]
fn test_noise_listing_and_edit() {
    let tmp = TempDir::new().unwrap();
    harsift(&tmp)
        .arg("noise")
        .assert()
        .success()
        .stdout(predicate::str::contains("[x] user-agent (builtin)"));

    let settings = write(&tmp, "settings.json", "{}");
    harsift(&tmp)
        .arg("noise")
        .arg(fixture("shop.har"))
        .arg("--settings")
        .arg(&settings)
        .args(["--add", "X-Trace-Id", "--disable", "date", "--save"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[x] x-trace-id (custom)"))
        .stdout(predicate::str::contains("[ ] date (builtin)"));

    let out = tmp.path().join("out.har");
    harsift(&tmp)
        .arg("export")
        .arg(fixture("shop.har"))
        .arg("--settings")
        .arg(&settings)
        .arg("-o")
        .arg(&out)
        .assert()
        .success();
    let har = read_json(&out);
    assert_eq!(
        header_names(&har["log"]["entries"][0]["response"]["headers"]),
        vec!["Content-Type", "Date", "Set-Cookie"]
    );
}

#[test]
fn test_store_save_use_and_copy() {
    let tmp = TempDir::new().unwrap();
    let store = tmp.path().join("store");
    let filters = write(&tmp, "filters.json", r#"{"quickFilters": {"image": true}}"#);

    harsift(&tmp)
        .args(["store", "save"])
        .arg(fixture("shop.har"))
        .arg("--filters")
        .arg(&filters)
        .arg("--store-dir")
        .arg(&store)
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved settings for shop.har"));

    harsift(&tmp)
        .arg("export")
        .arg(fixture("shop.har"))
        .args(["--use-store", "-o", "out.har", "--store-dir"])
        .arg(&store)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 3 of 5 entries"));

    harsift(&tmp)
        .args(["store", "copy"])
        .arg(fixture("shop.har"))
        .arg(fixture("cart.har"))
        .arg("--store-dir")
        .arg(&store)
        .assert()
        .success()
        .stdout(predicate::str::contains("Copied filters from shop.har to cart.har"));

    let output = harsift(&tmp)
        .args(["store", "show"])
        .arg(fixture("cart.har"))
        .arg("--store-dir")
        .arg(&store)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let shown: Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(shown["filters"]["quickFilters"]["image"], true);
    assert_eq!(shown["key"].as_str().unwrap().len(), 64);
    assert_eq!(shown["exportSettings"]["minifyJson"], true);
}

#[test]
fn test_config_file_is_honoured() {
    let tmp = TempDir::new().unwrap();
    write(&tmp, "harsift.toml", "[export]\nformat = \"text\"\n");

    harsift(&tmp)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("format = \"text\""));

    harsift(&tmp)
        .arg("export")
        .arg(fixture("shop.har"))
        .args(["-o", "-"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--- #5 ---"));
}

#[test]
fn test_invalid_har_fails() {
    let tmp = TempDir::new().unwrap();
    harsift(&tmp)
        .arg("list")
        .arg(fixture("not-a-har.har"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: Invalid HAR file"));
}

#[test]
fn test_missing_file_fails() {
    let tmp = TempDir::new().unwrap();
    harsift(&tmp)
        .arg("estimate")
        .arg(tmp.path().join("absent.har"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error: IO error"));
}
