//! Key usage collection for Vue single-file components.
//!
//! `<script>` blocks are parsed as whole modules. The `<template>` region is
//! scanned for the places vue-i18n keys appear: `{{ }}` interpolations,
//! directive and binding attribute values, the `v-t` directive, and the
//! `<i18n path>` / `<i18n-t keypath>` components.
//!
//! Every snippet is left-padded with newlines and spaces up to its offset in
//! the file before parsing, so positions coming out of the parser are already
//! file positions.

use std::{iter, sync::Arc, sync::LazyLock};

use regex::Regex;
use swc_common::SourceMap;
use swc_ecma_ast::{Expr, Prop, PropName, PropOrSpread};
use swc_ecma_visit::VisitWith;
use tracing::debug;

use crate::core::{
    CheckError, SourceContext, SourceLocation,
    collect::{
        KeyUsage,
        script::{KeyUsageVisitor, static_string},
    },
    parsers::script::{ScriptLang, parse_expression, parse_script_source},
    utils::LineIndex,
};

static SCRIPT_BLOCK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b([^>]*)>(.*?)</script\s*>").unwrap());

static TEMPLATE_OPEN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<template\b[^>]*>").unwrap());

static LANG_ATTR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\blang\s*=\s*["']([^"']+)["']"#).unwrap());

static MUSTACHE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{\{(.*?)\}\}").unwrap());

static START_TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"<([A-Za-z][\w\-.:]*)((?:\s+[^\s"'<>/=]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'=<>`]+))?)*)\s*/?>"#,
    )
    .unwrap()
});

static ATTRIBUTE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([^\s"'<>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#).unwrap()
});

/// A top-level SFC block: its inner content and where that content starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SfcBlock<'a> {
    pub content: &'a str,
    pub offset: usize,
    pub lang: Option<&'a str>,
}

/// Every `<script>` block in the file, including `<script setup>`.
pub fn script_blocks(text: &str) -> Vec<SfcBlock<'_>> {
    SCRIPT_BLOCK_REGEX
        .captures_iter(text)
        .filter_map(|caps| {
            let attrs = caps.get(1)?.as_str();
            let content = caps.get(2)?;
            let lang = LANG_ATTR_REGEX
                .captures(attrs)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str());
            Some(SfcBlock {
                content: content.as_str(),
                offset: content.start(),
                lang,
            })
        })
        .collect()
}

/// The root `<template>` block, spanning to the last `</template>`.
pub fn template_block(text: &str) -> Option<SfcBlock<'_>> {
    let open = TEMPLATE_OPEN_REGEX.find(text)?;
    let rest = &text[open.end()..];
    let end = rest.rfind("</template>")?;
    let lang = LANG_ATTR_REGEX
        .captures(open.as_str())
        .and_then(|c| c.get(1))
        .map(|m| m.as_str());
    Some(SfcBlock {
        content: &rest[..end],
        offset: open.end(),
        lang,
    })
}

/// Replace every byte of every `<!-- -->` comment with a space, keeping
/// newlines, so offsets into the result match offsets into `text`.
fn blank_html_comments(text: &str) -> String {
    let mut bytes = text.as_bytes().to_vec();
    let mut cursor = 0;
    while let Some(start) = text[cursor..].find("<!--").map(|i| i + cursor) {
        let end = text[start + 4..]
            .find("-->")
            .map_or(text.len(), |i| start + 4 + i + 3);
        for b in &mut bytes[start..end] {
            if *b != b'\n' {
                *b = b' ';
            }
        }
        cursor = end;
    }
    // Only whole UTF-8 sequences were replaced, and only by ASCII.
    String::from_utf8(bytes).unwrap_or_else(|_| text.to_string())
}

/// `code` prefixed so that its first character sits at `offset`'s line and
/// column.
fn padded(lines: &LineIndex, offset: usize, code: &str) -> String {
    let pos = lines.position(offset);
    let mut out = String::with_capacity(pos.line + pos.col + code.len());
    out.extend(iter::repeat_n('\n', pos.line - 1));
    out.extend(iter::repeat_n(' ', pos.col - 1));
    out.push_str(code);
    out
}

/// Collect key usages from a `.vue` file.
///
/// A `<script>` block that fails to parse makes the whole file an error.
/// Template expressions that fail to parse are skipped.
pub fn collect_vue_usages(
    text: &str,
    file_path: &str,
    functions: &[String],
) -> Result<Vec<KeyUsage>, CheckError> {
    let source_map = Arc::new(SourceMap::default());
    let lines = LineIndex::new(text);
    let mut usages = Vec::new();

    for block in script_blocks(text) {
        let lang = ScriptLang::from_lang_attr(block.lang);
        let code = padded(&lines, block.offset, block.content);
        let parsed = parse_script_source(code, file_path, lang, source_map.clone())
            .map_err(|e| CheckError::parse(file_path, e.to_string()))?;

        let mut visitor = KeyUsageVisitor::new(functions, &source_map, &lines, file_path);
        parsed.visit_with(&mut visitor);
        usages.extend(visitor.into_usages());
    }

    if let Some(template) = template_block(text) {
        let scanner = TemplateScanner {
            functions,
            source_map: &source_map,
            lines: &lines,
            file_path,
            usages: Vec::new(),
        };
        usages.extend(scanner.scan(template));
    }

    usages.sort_by(|a, b| a.context.location.cmp(&b.context.location));
    Ok(usages)
}

struct TemplateScanner<'a> {
    functions: &'a [String],
    source_map: &'a Arc<SourceMap>,
    lines: &'a LineIndex<'a>,
    file_path: &'a str,
    usages: Vec<KeyUsage>,
}

impl TemplateScanner<'_> {
    fn scan(mut self, template: SfcBlock) -> Vec<KeyUsage> {
        let content = blank_html_comments(template.content);
        let base = template.offset;

        for caps in MUSTACHE_REGEX.captures_iter(&content) {
            if let Some(expr) = caps.get(1) {
                self.expression(expr.as_str(), base + expr.start());
            }
        }

        for caps in START_TAG_REGEX.captures_iter(&content) {
            let (Some(tag), Some(attrs)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            for attr in ATTRIBUTE_REGEX.captures_iter(attrs.as_str()) {
                let Some(name) = attr.get(1) else {
                    continue;
                };
                let value = attr
                    .get(2)
                    .or_else(|| attr.get(3))
                    .or_else(|| attr.get(4))
                    .map(|v| (v.as_str(), base + attrs.start() + v.start()));
                let name_offset = base + attrs.start() + name.start();
                self.attribute(tag.as_str(), name.as_str(), name_offset, value);
            }
        }

        self.usages
    }

    fn attribute(&mut self, tag: &str, name: &str, name_offset: usize, value: Option<(&str, usize)>) {
        let Some((value, value_offset)) = value else {
            return;
        };

        if is_i18n_component(tag) {
            match name {
                "path" | "keypath" => {
                    self.record_static(value.to_string(), name_offset);
                    return;
                }
                ":path" | ":keypath" | "v-bind:path" | "v-bind:keypath" => {
                    if let Some(expr) = self.parse(value, value_offset)
                        && let Some(key) = static_string(&expr)
                    {
                        self.record_static(key, name_offset);
                    }
                    return;
                }
                _ => {}
            }
        }

        if name == "v-t" || name.starts_with("v-t.") {
            if let Some(expr) = self.parse(value, value_offset)
                && let Some(key) = v_t_key(&expr)
            {
                self.record_static(key, name_offset);
            }
            return;
        }

        if name.starts_with('#') || name.starts_with("v-slot") {
            return;
        }

        if name == "v-for" {
            let split = value.find(" in ").or_else(|| value.find(" of "));
            match split {
                Some(i) => self.expression(&value[i + 4..], value_offset + i + 4),
                None => self.expression(value, value_offset),
            }
            return;
        }

        if name.starts_with('@') || name.starts_with("v-on:") {
            self.statements(value, value_offset);
            return;
        }

        if name.starts_with(':') || name.starts_with("v-") {
            self.expression(value, value_offset);
        }
    }

    fn parse(&self, code: &str, offset: usize) -> Option<Box<Expr>> {
        let code = padded(self.lines, offset, code);
        match parse_expression(code, self.file_path, self.source_map) {
            Ok(expr) => Some(expr),
            Err(e) => {
                debug!("{}: skipping template expression: {}", self.file_path, e);
                None
            }
        }
    }

    fn expression(&mut self, code: &str, offset: usize) {
        if let Some(expr) = self.parse(code, offset) {
            let mut visitor =
                KeyUsageVisitor::new(self.functions, self.source_map, self.lines, self.file_path);
            expr.visit_with(&mut visitor);
            self.usages.extend(visitor.into_usages());
        }
    }

    /// Event handlers may hold several statements (`a = 1; save()`).
    fn statements(&mut self, code: &str, offset: usize) {
        let code = padded(self.lines, offset, code);
        match parse_script_source(code, self.file_path, ScriptLang::Ts, self.source_map.clone()) {
            Ok(parsed) => {
                let mut visitor = KeyUsageVisitor::new(
                    self.functions,
                    self.source_map,
                    self.lines,
                    self.file_path,
                );
                parsed.visit_with(&mut visitor);
                self.usages.extend(visitor.into_usages());
            }
            Err(e) => debug!("{}: skipping event handler: {}", self.file_path, e),
        }
    }

    fn record_static(&mut self, key: String, offset: usize) {
        let pos = self.lines.position(offset);
        self.usages.push(KeyUsage {
            key,
            context: SourceContext::new(
                SourceLocation::new(self.file_path, pos.line, pos.col),
                self.lines.line_text(pos.line),
            ),
        });
    }
}

fn is_i18n_component(tag: &str) -> bool {
    matches!(tag.to_ascii_lowercase().as_str(), "i18n" | "i18n-t" | "i18nt")
}

/// `v-t="'key'"` or `v-t="{ path: 'key', ... }"`.
fn v_t_key(expr: &Expr) -> Option<String> {
    if let Some(key) = static_string(expr) {
        return Some(key);
    }
    let Expr::Object(object) = expr else {
        return None;
    };
    object.props.iter().find_map(|prop| {
        let PropOrSpread::Prop(prop) = prop else {
            return None;
        };
        let Prop::KeyValue(kv) = &**prop else {
            return None;
        };
        let is_path = match &kv.key {
            PropName::Ident(ident) => ident.sym.as_str() == "path",
            PropName::Str(s) => s.value.as_str() == Some("path"),
            _ => false,
        };
        if is_path { static_string(&kv.value) } else { None }
    })
}
