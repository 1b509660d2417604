use anyhow::{Context, Result};
use insta::assert_snapshot;
use serde_json::Value;

use crate::{CliTest, capture};

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    let out = capture(test.command().arg("init").output()?);
    assert_eq!(out.code, Some(0));
    assert_snapshot!(out.stdout.trim(), @"✓ Created .glotxrc.json");

    let content = test.read_file(".glotxrc.json")?;
    let parsed: Value = serde_json::from_str(&content).context("Config should be valid JSON")?;
    assert_eq!(parsed["namespace"], "app");
    assert_eq!(parsed["hashLength"], 6);
    assert_eq!(parsed["translationFn"], "t");
    assert_eq!(parsed["placeholderStyle"], "icu");
    assert!(content.contains("\n  \""), "Config should use 2-space indentation");

    Ok(())
}

#[test]
fn test_init_fails_if_exists() -> Result<()> {
    let test = CliTest::with_file(".glotxrc.json", "{}")?;

    let out = capture(test.command().arg("init").output()?);
    assert_eq!(out.code, Some(1));
    assert_snapshot!(out.stderr.trim(), @"Error: .glotxrc.json already exists");
    assert_eq!(test.read_file(".glotxrc.json")?, "{}");

    Ok(())
}

#[test]
fn test_init_config_is_immediately_usable() -> Result<()> {
    let test = CliTest::new()?;
    test.command().arg("init").output()?;
    test.write_file("src/App.tsx", "export const App = () => <p>{count}</p>;\n")?;

    let out = capture(test.scan_command().output()?);
    assert_eq!(out.code, Some(0), "stderr: {}", out.stderr);
    assert!(out.stdout.contains("no hardcoded text found"));

    Ok(())
}
