use anyhow::Result;
use insta::assert_snapshot;
use serde_json::Value;

use crate::{CliTest, run};

const CONFIG: &str = r#"{ "localeDir": "locales/*.json", "src": "src" }"#;

fn json_records(stdout: &str) -> Result<Vec<Value>> {
    let value: Value = serde_json::from_str(stdout)?;
    Ok(value.as_array().cloned().unwrap_or_default())
}

#[test]
fn test_clean_project() -> Result<()> {
    let test = CliTest::with_file(".keycheckrc.json", CONFIG)?;
    test.write_file("locales/en.json", r#"{ "messages": { "hello": "Hello" } }"#)?;
    test.write_file(
        "src/App.vue",
        "<template>\n  <p>{{ $t('messages.hello') }}</p>\n</template>\n",
    )?;

    let (code, stdout, stderr) = run(test.check_command())?;

    assert_eq!(code, 0);
    assert_eq!(
        stdout,
        "\u{2713} Checked 1 source file, 1 locale file - no issues found\n"
    );
    assert_eq!(stderr, "");

    Ok(())
}

#[test]
fn test_missing_and_unused_report() -> Result<()> {
    let test = CliTest::with_file(".keycheckrc.json", CONFIG)?;
    test.write_file(
        "locales/en.json",
        "{\n  \"messages\": {\n    \"hello\": \"Hello\",\n    \"bye\": \"Bye\"\n  }\n}\n",
    )?;
    test.write_file("locales/ja.json", r#"{ "messages": {} }"#)?;
    test.write_file(
        "src/App.vue",
        "<template>\n  <p>{{ $t('messages.hello') }}</p>\n</template>\n",
    )?;

    let (code, stdout, _) = run(test.check_command())?;

    assert_eq!(code, 1);
    assert_snapshot!(stdout, @r#"
    warning: unused 'messages.bye' key  unused-key
      --> locales/en.json:4:5
      = note: in en ("Bye")

    error: 'messages.hello' does not exist in 'ja'  missing-key
      --> src/App.vue:2:9
      |
    2 |   <p>{{ $t('messages.hello') }}</p>
      |         ^

    ✘ 2 problems (1 error, 1 warning)
    "#);

    Ok(())
}

#[test]
fn test_unused_only_exits_zero() -> Result<()> {
    let test = CliTest::with_file(".keycheckrc.json", CONFIG)?;
    test.write_file("locales/en.json", r#"{ "used": "a", "stale": "b" }"#)?;
    test.write_file("src/main.js", "i18n.t('used'); i18n.t('absent')")?;

    let mut cmd = test.check_command();
    cmd.args(["unused", "--format", "json"]);
    let (code, stdout, _) = run(cmd)?;

    assert_eq!(code, 0);
    let records = json_records(&stdout)?;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["rule"], "unused-key");
    assert_eq!(records[0]["message"], "unused 'stale' key");
    assert_eq!(records[0]["severity"], "warning");

    Ok(())
}

#[test]
fn test_missing_locale_config() -> Result<()> {
    let test = CliTest::with_file("src/main.js", "t('hello')")?;

    let (code, stdout, _) = run(test.check_command())?;

    assert_eq!(code, 1);
    assert!(stdout.contains("error: No locale source configured."));
    assert!(stdout.contains("  --> .:1:1"));
    assert!(stdout.contains("1 problem (1 error, 0 warnings)"));

    Ok(())
}

#[test]
fn test_malformed_locale_is_isolated() -> Result<()> {
    let test = CliTest::with_file(".keycheckrc.json", CONFIG)?;
    test.write_file("locales/en.json", r#"{ "hello": "Hello" }"#)?;
    test.write_file("locales/ja.json", r#"{ "hello": "#)?;
    test.write_file("src/main.js", "t('hello'); t('bye')")?;

    let mut cmd = test.check_command();
    cmd.args(["--format", "json"]);
    let (code, stdout, _) = run(cmd)?;

    assert_eq!(code, 1);
    let records = json_records(&stdout)?;
    let parse_errors: Vec<&Value> = records
        .iter()
        .filter(|r| r["rule"] == "parse-error")
        .collect();
    assert_eq!(parse_errors.len(), 1);
    assert_eq!(parse_errors[0]["file"], "locales/ja.json");
    assert_eq!(
        parse_errors[0]["location"],
        serde_json::json!({ "line": 1, "column": 1 })
    );

    let missing: Vec<&str> = records
        .iter()
        .filter(|r| r["rule"] == "missing-key")
        .filter_map(|r| r["message"].as_str())
        .collect();
    assert_eq!(missing, vec!["'bye' does not exist in 'en'"]);

    Ok(())
}

#[test]
fn test_only_locale_file_malformed() -> Result<()> {
    let test = CliTest::with_file(".keycheckrc.json", CONFIG)?;
    test.write_file("locales/en.json", r#"{ "a": "x","#)?;
    test.write_file("src/main.js", "t('a')")?;

    let mut cmd = test.check_command();
    cmd.args(["--format", "json"]);
    let (code, stdout, _) = run(cmd)?;

    assert_eq!(code, 1);
    let records = json_records(&stdout)?;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["rule"], "parse-error");
    assert_eq!(records[0]["file"], "locales/en.json");

    Ok(())
}

#[test]
fn test_key_mode_from_flags() -> Result<()> {
    let test = CliTest::with_file(
        "i18n/messages.json",
        r#"{ "en": { "hello": "Hello" }, "ja": {} }"#,
    )?;
    test.write_file("src/main.js", "const label = i18n.t('hello')\n")?;

    let mut cmd = test.check_command();
    cmd.args([
        "--locale-dir",
        "i18n/messages.json",
        "--locale-key",
        "key",
        "--format",
        "json",
    ]);
    let (code, stdout, _) = run(cmd)?;

    assert_eq!(code, 1);
    assert_eq!(
        json_records(&stdout)?,
        vec![serde_json::json!({
            "file": "src/main.js",
            "rule": "missing-key",
            "severity": "error",
            "message": "'hello' does not exist in 'ja'",
            "location": { "line": 1, "column": 15 }
        })]
    );

    Ok(())
}

#[test]
fn test_linked_keys_are_used() -> Result<()> {
    let test = CliTest::with_file(".keycheckrc.json", CONFIG)?;
    test.write_file(
        "locales/en.json",
        r#"{ "greeting": "@:common.hello world", "common": { "hello": "Hello" } }"#,
    )?;
    test.write_file("src/main.js", "t('greeting')")?;

    let (code, stdout, _) = run(test.check_command())?;

    assert_eq!(code, 0);
    assert!(stdout.contains("no issues found"));

    Ok(())
}

#[test]
fn test_config_ignores_and_extensions() -> Result<()> {
    let test = CliTest::with_file(
        ".keycheckrc.json",
        r#"{
            "localeDir": "locales/*.json",
            "src": "src",
            "extensions": [".ts"],
            "ignores": ["**/generated/**"]
        }"#,
    )?;
    test.write_file("locales/en.json", r#"{ "app": { "title": "App" } }"#)?;
    test.write_file("src/main.ts", "const title: string = t('app.title')")?;
    test.write_file("src/generated/keys.ts", "t('generated.key')")?;
    test.write_file("src/legacy.js", "t('legacy.key')")?;

    let (code, stdout, _) = run(test.check_command())?;

    assert_eq!(code, 0);
    assert_eq!(
        stdout,
        "\u{2713} Checked 1 source file, 1 locale file - no issues found\n"
    );

    Ok(())
}

#[test]
fn test_unknown_config_field_fails() -> Result<()> {
    let test = CliTest::with_file(".keycheckrc.json", r#"{ "localeDirs": "locales/*.json" }"#)?;

    let (code, _, stderr) = run(test.check_command())?;

    assert_eq!(code, 2);
    assert!(stderr.starts_with("Error: Failed to parse config file"));

    Ok(())
}

#[test]
fn test_help() -> Result<()> {
    let test = CliTest::new()?;

    let mut cmd = test.command();
    cmd.arg("--help");
    let (code, stdout, _) = run(cmd)?;

    assert_eq!(code, 0);
    assert!(stdout.contains("check"));
    assert!(stdout.contains("init"));

    Ok(())
}
