use anyhow::Result;
use serde_json::Value;

use crate::{CliTest, capture};

const HERO: &str = "export const Hero = () => <h1>Welcome to the store</h1>;\n";

#[test]
fn test_scan_reports_pending_candidates() -> Result<()> {
    let test = CliTest::with_file("src/Hero.tsx", HERO)?;

    let out = capture(test.scan_command().output()?);
    assert_eq!(out.code, Some(1), "stderr: {}", out.stderr);
    assert!(out.stdout.contains("warning: \"Welcome to the store\"  static-text"));
    assert!(out.stdout.contains("--> src/Hero.tsx:1:31"));
    assert!(out.stdout.contains("= key: app.hero.welcome_to_the_store."));
    assert!(out.stdout.contains("1 pending candidate in 1 file, 0 dynamic keys"));

    Ok(())
}

#[test]
fn test_scan_clean_project_succeeds() -> Result<()> {
    let test = CliTest::with_file(
        "src/Counter.tsx",
        "export const Counter = ({ count }) => <span className=\"flex gap-2\">{count}</span>;\n",
    )?;

    let out = capture(test.scan_command().output()?);
    assert_eq!(out.code, Some(0), "stdout: {}", out.stdout);
    assert!(out.stdout.contains("Scanned 1 source file - no hardcoded text found"));

    Ok(())
}

#[test]
fn test_scan_json_output() -> Result<()> {
    let test = CliTest::with_file("src/Hero.tsx", HERO)?;

    let out = capture(test.scan_command().arg("--json").output()?);
    assert_eq!(out.code, Some(1));

    let report: Value = serde_json::from_str(&out.stdout)?;
    assert_eq!(report["filesScanned"], 1);
    let candidate = &report["candidates"][0];
    assert_eq!(candidate["text"], "Welcome to the store");
    assert_eq!(candidate["kind"], "static-text");
    assert_eq!(candidate["status"], "pending");
    assert_eq!(candidate["filePath"], "src/Hero.tsx");

    Ok(())
}

#[test]
fn test_scan_namespace_override() -> Result<()> {
    let test = CliTest::with_file("src/Hero.tsx", HERO)?;

    let out = capture(test.scan_command().args(["--namespace", "shop"]).output()?);
    assert!(out.stdout.contains("= key: shop.hero.welcome_to_the_store."));

    Ok(())
}

#[test]
fn test_scan_uses_config_file() -> Result<()> {
    let test = CliTest::with_file("src/Hero.tsx", HERO)?;
    test.write_file(
        ".glotxrc.json",
        r#"{ "ignoreTexts": ["Welcome to the store"] }"#,
    )?;

    let out = capture(test.scan_command().output()?);
    assert_eq!(out.code, Some(0), "stdout: {}", out.stdout);

    Ok(())
}

#[test]
fn test_scan_invalid_config_is_an_error() -> Result<()> {
    let test = CliTest::with_file("src/Hero.tsx", HERO)?;
    test.write_file(".glotxrc.json", r#"{ "hashLength": 0 }"#)?;

    let out = capture(test.scan_command().output()?);
    assert_eq!(out.code, Some(2));
    assert!(out.stderr.contains("hashLength"), "stderr: {}", out.stderr);

    Ok(())
}

#[test]
fn test_scan_writes_cache_unless_disabled() -> Result<()> {
    let test = CliTest::with_file("src/Hero.tsx", HERO)?;
    test.scan_command().arg("--no-cache").output()?;
    assert!(!test.root().join(".glotx-cache.json").exists());

    test.scan_command().output()?;
    let cache: Value = serde_json::from_str(&test.read_file(".glotx-cache.json")?)?;
    assert_eq!(cache["schemaVersion"], 1);
    assert!(cache["files"]["src/Hero.tsx"]["fingerprint"]["size"].is_u64());

    // A second run over unchanged files reports the same candidates.
    let out = capture(test.scan_command().output()?);
    assert!(out.stdout.contains("warning: \"Welcome to the store\""));

    Ok(())
}

#[test]
fn test_scan_vue_without_parser_falls_back() -> Result<()> {
    let test = CliTest::with_file(
        "src/Card.vue",
        "<template>\n  <p>Welcome aboard friend</p>\n</template>\n",
    )?;
    test.write_file(
        "src/List.vue",
        "<template>\n  <p>Nothing to see here</p>\n</template>\n",
    )?;

    let out = capture(test.scan_command().output()?);
    assert_eq!(out.code, Some(1));
    assert!(out.stdout.contains("\"Welcome aboard friend\""));
    assert!(out.stdout.contains("\"Nothing to see here\""));
    assert_eq!(
        out.stderr
            .matches("warning: no vue template parser available")
            .count(),
        1,
        "stderr: {}",
        out.stderr
    );

    Ok(())
}

#[test]
fn test_scan_reports_dynamic_keys() -> Result<()> {
    let test = CliTest::with_file(
        "src/Title.tsx",
        "export const Title = ({ prefix }) => <h2>{t(`${prefix}.title`)}</h2>;\n",
    )?;

    let out = capture(test.scan_command().output()?);
    assert_eq!(out.code, Some(0), "stdout: {}", out.stdout);
    assert!(out.stdout.contains("dynamic-key"));
    assert!(out.stdout.contains("note: key is built from a template literal"));

    Ok(())
}
