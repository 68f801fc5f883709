use anyhow::{Context, Result};
use serde_json::Value;

use crate::{CliTest, run};

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    let mut cmd = test.command();
    cmd.arg("init");
    let (code, stdout, _) = run(cmd)?;

    assert_eq!(code, 0);
    assert_eq!(stdout, "\u{2713} Created .keycheckrc.json\n");
    assert!(test.root().join(".keycheckrc.json").exists());

    let content = test.read_file(".keycheckrc.json")?;
    let parsed: Value = serde_json::from_str(&content).context("Config should be valid JSON")?;
    assert_eq!(parsed["localeDir"], "./locales/*.json");
    assert_eq!(parsed["extensions"], serde_json::json!([".js", ".vue"]));
    assert!(content.contains("\n  \""), "Config should use 2-space indentation");

    Ok(())
}

#[test]
fn test_init_fails_if_exists() -> Result<()> {
    let test = CliTest::with_file(".keycheckrc.json", "{}")?;

    let mut cmd = test.command();
    cmd.arg("init");
    let (code, _, stderr) = run(cmd)?;

    assert_eq!(code, 2);
    assert_eq!(stderr, "Error: .keycheckrc.json already exists\n");
    assert_eq!(test.read_file(".keycheckrc.json")?, "{}");

    Ok(())
}

#[test]
fn test_init_config_is_immediately_usable() -> Result<()> {
    let test = CliTest::new()?;

    test.command().arg("init").output()?;
    test.write_file("locales/en.json", r#"{ "hello": "Hello" }"#)?;
    test.write_file("src/main.js", "t('hello')")?;

    let (code, stdout, stderr) = run(test.check_command())?;
    assert_eq!(code, 0, "stderr: {}", stderr);
    assert!(stdout.contains("no issues found"));

    Ok(())
}
