use std::sync::Arc;

use anyhow::{Result, anyhow};
use swc_common::{FileName, GLOBALS, Globals, SourceMap};
use swc_ecma_ast::{Expr, Module};
use swc_ecma_parser::{EsSyntax, Parser, StringInput, Syntax, TsSyntax};

/// Script dialect, chosen from the file extension or a `<script lang>` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptLang {
    /// JavaScript with JSX enabled.
    Js,
    Ts,
    Tsx,
}

impl ScriptLang {
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            "ts" | "mts" | "cts" => ScriptLang::Ts,
            "tsx" => ScriptLang::Tsx,
            _ => ScriptLang::Js,
        }
    }

    /// Map a Vue `<script lang="...">` value to a dialect.
    pub fn from_lang_attr(lang: Option<&str>) -> Self {
        match lang {
            Some("ts") => ScriptLang::Ts,
            Some("tsx") => ScriptLang::Tsx,
            _ => ScriptLang::Js,
        }
    }

    fn syntax(self) -> Syntax {
        match self {
            ScriptLang::Js => Syntax::Es(EsSyntax {
                jsx: true,
                ..Default::default()
            }),
            ScriptLang::Ts => Syntax::Typescript(TsSyntax {
                tsx: false,
                ..Default::default()
            }),
            ScriptLang::Tsx => Syntax::Typescript(TsSyntax {
                tsx: true,
                ..Default::default()
            }),
        }
    }
}

/// Parse script source into a module AST.
///
/// Each call gets its own source file inside `source_map`, so positions from
/// several snippets of one Vue file can be looked up through the same map.
pub fn parse_script_source(
    code: String,
    file_path: &str,
    lang: ScriptLang,
    source_map: Arc<SourceMap>,
) -> Result<Module> {
    GLOBALS.set(&Globals::new(), || {
        let source_file = source_map.new_source_file(FileName::Real(file_path.into()).into(), code);
        let mut parser = Parser::new(lang.syntax(), StringInput::from(&*source_file), None);

        parser
            .parse_module()
            .map_err(|e| anyhow!("{}", e.into_kind().msg()))
    })
}

/// Parse a single expression, as found in Vue template bindings.
pub fn parse_expression(
    code: String,
    file_path: &str,
    source_map: &SourceMap,
) -> Result<Box<Expr>> {
    GLOBALS.set(&Globals::new(), || {
        let source_file = source_map.new_source_file(FileName::Real(file_path.into()).into(), code);
        let mut parser = Parser::new(
            ScriptLang::Ts.syntax(),
            StringInput::from(&*source_file),
            None,
        );

        parser
            .parse_expr()
            .map_err(|e| anyhow!("{}", e.into_kind().msg()))
    })
}
