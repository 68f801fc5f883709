//! Translation call detection over script ASTs.
//!
//! A call counts as a key usage when its callee is one of the configured
//! translation function names, either bare (`t('a')`) or as a member
//! (`this.$t('a')`, `i18n.t('a')`), and its first argument is a static string.
//! Dynamic keys are ignored.

use std::sync::Arc;

use swc_common::{BytePos, SourceMap};
use swc_ecma_ast::{CallExpr, Callee, Expr, Lit, MemberProp};
use swc_ecma_visit::{Visit, VisitWith};

use crate::core::{
    CheckError, SourceContext, SourceLocation,
    collect::KeyUsage,
    parsers::script::{ScriptLang, parse_script_source},
    utils::LineIndex,
};

/// Collects translation calls while walking a module or expression.
pub struct KeyUsageVisitor<'a> {
    functions: &'a [String],
    source_map: &'a SourceMap,
    lines: &'a LineIndex<'a>,
    file_path: &'a str,
    usages: Vec<KeyUsage>,
}

impl<'a> KeyUsageVisitor<'a> {
    /// `lines` indexes the original file text. Positions reported by
    /// `source_map` must already be in that file's coordinates.
    pub fn new(
        functions: &'a [String],
        source_map: &'a SourceMap,
        lines: &'a LineIndex<'a>,
        file_path: &'a str,
    ) -> Self {
        Self {
            functions,
            source_map,
            lines,
            file_path,
            usages: Vec::new(),
        }
    }

    pub fn into_usages(self) -> Vec<KeyUsage> {
        self.usages
    }

    fn is_translation_callee(&self, callee: &Expr) -> bool {
        let name = match callee {
            Expr::Ident(ident) => ident.sym.as_str(),
            Expr::Member(member) => match &member.prop {
                MemberProp::Ident(prop) => prop.sym.as_str(),
                _ => return false,
            },
            Expr::Paren(paren) => return self.is_translation_callee(&paren.expr),
            _ => return false,
        };
        self.functions.iter().any(|f| f == name)
    }

    fn record(&mut self, key: String, pos: BytePos) {
        let loc = self.source_map.lookup_char_pos(pos);
        let source_line = self.lines.line_text(loc.line);
        self.usages.push(KeyUsage {
            key,
            context: SourceContext::new(
                SourceLocation::new(self.file_path, loc.line, loc.col.0 + 1),
                source_line,
            ),
        });
    }
}

impl Visit for KeyUsageVisitor<'_> {
    fn visit_call_expr(&mut self, node: &CallExpr) {
        if let Callee::Expr(callee) = &node.callee
            && self.is_translation_callee(callee)
            && let Some(arg) = node.args.first()
            && arg.spread.is_none()
            && let Some(key) = static_string(&arg.expr)
        {
            self.record(key, node.span.lo);
        }

        node.visit_children_with(self);
    }
}

/// Value of a string literal or a template literal without substitutions.
pub fn static_string(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Lit(Lit::Str(s)) => s.value.as_str().map(str::to_owned),
        Expr::Tpl(tpl) if tpl.exprs.is_empty() => {
            let quasi = tpl.quasis.first()?;
            quasi.cooked.as_ref()?.as_str().map(str::to_owned)
        }
        Expr::Paren(paren) => static_string(&paren.expr),
        _ => None,
    }
}

/// Parse a standalone script file and collect its key usages.
pub fn collect_script_usages(
    text: &str,
    file_path: &str,
    lang: ScriptLang,
    functions: &[String],
) -> Result<Vec<KeyUsage>, CheckError> {
    let source_map = Arc::new(SourceMap::default());
    let parsed = parse_script_source(text.to_owned(), file_path, lang, source_map.clone())
        .map_err(|e| CheckError::parse(file_path, e.to_string()))?;

    let lines = LineIndex::new(text);
    let mut visitor = KeyUsageVisitor::new(functions, &source_map, &lines, file_path);
    parsed.visit_with(&mut visitor);
    Ok(visitor.into_usages())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn functions() -> Vec<String> {
        ["$t", "t", "$tc", "tc"].iter().map(|s| s.to_string()).collect()
    }

    fn keys(code: &str) -> Vec<String> {
        collect_script_usages(code, "src/a.js", ScriptLang::Js, &functions())
            .unwrap()
            .into_iter()
            .map(|u| u.key)
            .collect()
    }

    #[test]
    fn test_bare_and_member_calls() {
        let code = r#"
const a = t('bare');
const b = this.$t('member');
const c = i18n.tc('plural', 2);
"#;
        assert_eq!(keys(code), vec!["bare", "member", "plural"]);
    }

    #[test]
    fn test_static_template_literal() {
        assert_eq!(keys("$t(`tpl.key`)"), vec!["tpl.key"]);
    }

    #[test]
    fn test_dynamic_keys_are_ignored() {
        let code = r#"
$t(key);
$t(`prefix.${name}`);
$t('a' + 'b');
$t(...args);
"#;
        assert!(keys(code).is_empty());
    }

    #[test]
    fn test_unrelated_functions_are_ignored() {
        assert!(keys("translate('x'); foo['$t']('y'); $te('z');").is_empty());
    }

    #[test]
    fn test_nested_calls_are_found() {
        assert_eq!(keys("$t('outer', { named: $t('inner') })"), vec!["outer", "inner"]);
    }

    #[test]
    fn test_location_and_source_line() {
        let code = "export default {\n  computed: { title() { return this.$t('home.title') } }\n}\n";
        let usages = collect_script_usages(code, "src/a.js", ScriptLang::Js, &functions()).unwrap();

        assert_eq!(usages.len(), 1);
        let ctx = &usages[0].context;
        assert_eq!(ctx.file_path(), "src/a.js");
        assert_eq!(ctx.line(), 2);
        assert_eq!(ctx.col(), 32);
        assert_eq!(
            ctx.source_line,
            "  computed: { title() { return this.$t('home.title') } }"
        );
    }

    #[test]
    fn test_typescript_source() {
        let code = "const msg: string = t('typed') as string;";
        let usages = collect_script_usages(code, "src/a.ts", ScriptLang::Ts, &functions()).unwrap();
        assert_eq!(usages[0].key, "typed");
    }

    #[test]
    fn test_parse_error() {
        let err = collect_script_usages("const = ;", "src/broken.js", ScriptLang::Js, &functions())
            .unwrap_err();
        assert!(matches!(err, CheckError::Parse { file_path, .. } if file_path == "src/broken.js"));
    }
}
