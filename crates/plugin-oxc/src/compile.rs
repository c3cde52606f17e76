//! Compile options and the per-module oxc pipeline.
//!
//! Options are assembled as JSON layers (built-in fallbacks, the tsconfig
//! layer, then user overrides), merged with [`merge_layers`], deserialized
//! into [`CompileOptions`] and finally lowered into oxc's
//! `TransformOptions`.
//!
//! [`merge_layers`]: crate::merge_layers

use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions};
use oxc_parser::Parser;
use oxc_semantic::SemanticBuilder;
use oxc_sourcemap::SourceMap;
use oxc_span::SourceType;
use oxc_transformer::{
    DecoratorOptions, HelperLoaderMode, JsxOptions, JsxRuntime, TransformOptions, Transformer,
};
use plugin_oxc_tsconfig::{CompilerOptionsView, JsxMode, PathAliases};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::borrow::Cow;
use std::path::{Path, PathBuf};

use crate::error::{PluginError, Result};

/// Output of a compile or minify call.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    pub code: String,
    pub map: Option<SourceMap>,
}

/// Source dialect the parser runs in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceLang {
    #[default]
    Js,
    Jsx,
    Ts,
    Tsx,
}

impl SourceLang {
    /// Detect the dialect from a module id's extension.
    ///
    /// Anything unrecognized is plain JavaScript without JSX.
    pub fn from_id(id: &str) -> Self {
        match Path::new(id).extension().and_then(|ext| ext.to_str()) {
            Some("ts" | "mts" | "cts") => Self::Ts,
            Some("tsx") => Self::Tsx,
            Some("jsx") => Self::Jsx,
            _ => Self::Js,
        }
    }

    pub fn is_typescript(self) -> bool {
        matches!(self, Self::Ts | Self::Tsx)
    }

    pub fn is_jsx(self) -> bool {
        matches!(self, Self::Jsx | Self::Tsx)
    }

    fn source_type(self) -> SourceType {
        SourceType::mjs()
            .with_typescript(self.is_typescript())
            .with_jsx(self.is_jsx())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsxRuntimeKind {
    #[default]
    Classic,
    Automatic,
    /// Leave JSX untouched
    Preserve,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JsxConfig {
    pub runtime: JsxRuntimeKind,
    pub development: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pragma: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pragma_frag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import_source: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DecoratorConfig {
    /// Lower decorators with the pre-standard (TypeScript experimental)
    /// semantics. Standard decorators are left for the runtime, and
    /// `emit_metadata` only applies to legacy lowering.
    pub legacy: bool,
    pub emit_metadata: bool,
}

/// Everything the compiler needs for one module.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompileOptions {
    pub lang: SourceLang,
    pub jsx: JsxConfig,
    pub decorators: DecoratorConfig,
    /// Import helpers from `@oxc-project/runtime` instead of inlining them.
    pub external_helpers: bool,
    /// Lower-case ES target, e.g. `es2015`; `None` leaves syntax as is.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Root for `paths`. Read by import resolution, not by the transformer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<PathBuf>,
    /// Import aliases, see [`OxcPlugin::resolve`](crate::OxcPlugin::resolve).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paths: Option<PathAliases>,
}

impl CompileOptions {
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| PluginError::invalid(e.to_string()))
    }

    /// Lower into oxc transformer options.
    pub fn transform_options(&self) -> Result<TransformOptions> {
        let mut options = match &self.target {
            Some(target) => TransformOptions::from_target(target).map_err(PluginError::invalid)?,
            None => TransformOptions::default(),
        };

        options.decorator = DecoratorOptions {
            legacy: self.decorators.legacy,
            emit_decorator_metadata: self.decorators.emit_metadata,
        };

        options.jsx = JsxOptions {
            jsx_plugin: self.jsx.runtime != JsxRuntimeKind::Preserve,
            runtime: match self.jsx.runtime {
                JsxRuntimeKind::Automatic => JsxRuntime::Automatic,
                JsxRuntimeKind::Classic | JsxRuntimeKind::Preserve => JsxRuntime::Classic,
            },
            development: self.jsx.development,
            pragma: self.jsx.pragma.clone(),
            pragma_frag: self.jsx.pragma_frag.clone(),
            import_source: self.jsx.import_source.clone(),
            ..JsxOptions::default()
        };

        // Keeps `import { h } from 'preact'` alive when only JSX uses it.
        if let Some(pragma) = &self.jsx.pragma {
            options.typescript.jsx_pragma = Cow::Owned(pragma.clone());
        }
        if let Some(pragma_frag) = &self.jsx.pragma_frag {
            options.typescript.jsx_pragma_frag = Cow::Owned(pragma_frag.clone());
        }

        if self.external_helpers {
            options.helper_loader.mode = HelperLoaderMode::External;
        }

        Ok(options)
    }
}

/// Fallback layer: just the dialect implied by the module id.
pub(crate) fn fallback_layer(id: &str) -> Value {
    json!({ "lang": SourceLang::from_id(id) })
}

/// Translate discovered tsconfig options into a compile layer.
///
/// Absent fields are left out so they cannot shadow the fallbacks.
/// `experimentalDecorators` always decides legacy lowering when it is set.
/// Otherwise `standard_decorators` (plain JS, or TypeScript 5+) leaves
/// decorators in place, and older TypeScript lowers them the legacy way.
pub(crate) fn tsconfig_layer(view: &CompilerOptionsView, standard_decorators: bool) -> Value {
    let mut layer = Map::new();

    if let Some(helpers) = view.import_helpers {
        layer.insert("externalHelpers".into(), helpers.into());
    }

    let mut decorators = Map::new();
    decorators.insert(
        "legacy".into(),
        view.experimental_decorators
            .unwrap_or(!standard_decorators)
            .into(),
    );
    if let Some(metadata) = view.emit_decorator_metadata {
        decorators.insert("emitMetadata".into(), metadata.into());
    }
    layer.insert("decorators".into(), decorators.into());

    let mut jsx = Map::new();
    let runtime = match view.jsx {
        Some(mode) if mode.is_automatic() => JsxRuntimeKind::Automatic,
        Some(JsxMode::Preserve) => JsxRuntimeKind::Preserve,
        _ => JsxRuntimeKind::Classic,
    };
    jsx.insert("runtime".into(), json!(runtime));
    if view.jsx == Some(JsxMode::ReactJsxDev) {
        jsx.insert("development".into(), true.into());
    }
    for (key, value) in [
        ("pragma", &view.jsx_factory),
        ("pragmaFrag", &view.jsx_fragment_factory),
        ("importSource", &view.jsx_import_source),
    ] {
        if let Some(value) = value {
            jsx.insert(key.into(), value.clone().into());
        }
    }
    layer.insert("jsx".into(), jsx.into());

    if let Some(target) = &view.target {
        layer.insert("target".into(), target.to_lowercase().into());
    }
    if let Some(base_url) = &view.base_url {
        layer.insert("baseUrl".into(), json!(base_url));
    }
    if let Some(paths) = &view.paths {
        layer.insert("paths".into(), json!(paths));
    }

    Value::Object(layer)
}

/// Run one module through parse, transform and codegen.
///
/// Parse and transform errors are returned as-is; they are fatal for the
/// module.
pub fn compile(
    source: &str,
    id: &str,
    options: &CompileOptions,
    sourcemap: bool,
) -> Result<CompileOutput> {
    let transform_options = options.transform_options()?;
    let allocator = Allocator::default();

    let ret = Parser::new(&allocator, source, options.lang.source_type()).parse();
    if ret.panicked || !ret.errors.is_empty() {
        return Err(PluginError::Parse {
            id: id.to_string(),
            message: join_errors(ret.errors.iter()),
        });
    }
    let mut program = ret.program;

    let scoping = SemanticBuilder::new()
        .build(&program)
        .semantic
        .into_scoping();
    let transformed = Transformer::new(&allocator, Path::new(id), &transform_options)
        .build_with_scoping(scoping, &mut program);
    if !transformed.errors.is_empty() {
        return Err(PluginError::Transform {
            id: id.to_string(),
            message: join_errors(transformed.errors.iter()),
        });
    }

    let ret = Codegen::new()
        .with_options(CodegenOptions {
            source_map_path: sourcemap.then(|| PathBuf::from(id)),
            ..CodegenOptions::default()
        })
        .build(&program);

    Ok(CompileOutput {
        code: ret.code,
        map: ret.map,
    })
}

fn join_errors<E: std::fmt::Display>(errors: impl Iterator<Item = E>) -> String {
    errors.map(|e| e.to_string()).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::merge_layers;

    fn view() -> CompilerOptionsView {
        CompilerOptionsView::default()
    }

    #[test]
    fn lang_from_extension() {
        assert_eq!(SourceLang::from_id("/a/b.ts"), SourceLang::Ts);
        assert_eq!(SourceLang::from_id("/a/b.mts"), SourceLang::Ts);
        assert_eq!(SourceLang::from_id("/a/b.cts"), SourceLang::Ts);
        assert_eq!(SourceLang::from_id("/a/b.tsx"), SourceLang::Tsx);
        assert_eq!(SourceLang::from_id("/a/b.jsx"), SourceLang::Jsx);
        assert_eq!(SourceLang::from_id("/a/b.mjs"), SourceLang::Js);
        assert_eq!(SourceLang::from_id("/a/b"), SourceLang::Js);
    }

    #[test]
    fn tsconfig_layer_maps_fields() {
        let view = CompilerOptionsView {
            import_helpers: Some(true),
            experimental_decorators: Some(true),
            emit_decorator_metadata: Some(true),
            jsx_factory: Some("h".into()),
            jsx_fragment_factory: Some("Fragment".into()),
            jsx: Some(JsxMode::React),
            target: Some("ES2019".into()),
            ..view()
        };
        let options = CompileOptions::from_value(merge_layers([
            fallback_layer("/src/app.tsx"),
            tsconfig_layer(&view, false),
        ]))
        .unwrap();

        assert_eq!(options.lang, SourceLang::Tsx);
        assert!(options.external_helpers);
        assert!(options.decorators.legacy);
        assert!(options.decorators.emit_metadata);
        assert_eq!(options.jsx.runtime, JsxRuntimeKind::Classic);
        assert_eq!(options.jsx.pragma.as_deref(), Some("h"));
        assert_eq!(options.jsx.pragma_frag.as_deref(), Some("Fragment"));
        assert_eq!(options.target.as_deref(), Some("es2019"));
    }

    #[test]
    fn experimental_decorators_select_legacy_lowering() {
        let view = CompilerOptionsView {
            experimental_decorators: Some(true),
            emit_decorator_metadata: Some(true),
            ..view()
        };
        for standard in [true, false] {
            let options = CompileOptions::from_value(tsconfig_layer(&view, standard)).unwrap();
            assert!(options.decorators.legacy);
            assert!(options.decorators.emit_metadata);
        }
    }

    #[test]
    fn unset_experimental_decorators_follow_typescript_version() {
        let standard = CompileOptions::from_value(tsconfig_layer(&view(), true)).unwrap();
        assert!(!standard.decorators.legacy);

        let older = CompileOptions::from_value(tsconfig_layer(&view(), false)).unwrap();
        assert!(older.decorators.legacy);

        let disabled = CompilerOptionsView {
            experimental_decorators: Some(false),
            ..view()
        };
        let options = CompileOptions::from_value(tsconfig_layer(&disabled, false)).unwrap();
        assert!(!options.decorators.legacy);
    }

    #[test]
    fn legacy_decorators_are_lowered_with_metadata() {
        let options = CompileOptions {
            lang: SourceLang::Ts,
            decorators: DecoratorConfig {
                legacy: true,
                emit_metadata: true,
            },
            ..CompileOptions::default()
        };
        let out = compile(
            "declare function dec(target: any): void;\n\
             class Dep {}\n\
             @dec\n\
             export class Service {\n  constructor(private dep: Dep) {}\n}\n",
            "/src/service.ts",
            &options,
            false,
        )
        .unwrap();

        assert!(out.code.contains("decorate"));
        assert!(out.code.contains("decorateMetadata"));
        assert!(!out.code.contains("@dec"));
    }

    #[test]
    fn react_jsx_modes_select_automatic_runtime() {
        for (mode, development) in [(JsxMode::ReactJsx, false), (JsxMode::ReactJsxDev, true)] {
            let view = CompilerOptionsView {
                jsx: Some(mode),
                jsx_import_source: Some("preact".into()),
                ..view()
            };
            let options = CompileOptions::from_value(tsconfig_layer(&view, true)).unwrap();
            assert_eq!(options.jsx.runtime, JsxRuntimeKind::Automatic);
            assert_eq!(options.jsx.development, development);
            assert_eq!(options.jsx.import_source.as_deref(), Some("preact"));
        }
    }

    #[test]
    fn empty_view_leaves_defaults() {
        let options = CompileOptions::from_value(merge_layers([
            fallback_layer("/src/a.js"),
            tsconfig_layer(&view(), true),
        ]))
        .unwrap();
        assert_eq!(options, CompileOptions::default());
    }

    #[test]
    fn overrides_win() {
        let view = CompilerOptionsView {
            jsx_factory: Some("h".into()),
            target: Some("ES5".into()),
            ..view()
        };
        let options = CompileOptions::from_value(merge_layers([
            fallback_layer("/src/a.jsx"),
            tsconfig_layer(&view, true),
            json!({ "jsx": { "pragma": "m" }, "target": null }),
        ]))
        .unwrap();
        assert_eq!(options.jsx.pragma.as_deref(), Some("m"));
        assert_eq!(options.target, None);
    }

    #[test]
    fn transform_options_follow_compile_options() {
        let options = CompileOptions {
            jsx: JsxConfig {
                runtime: JsxRuntimeKind::Classic,
                pragma: Some("h".into()),
                ..JsxConfig::default()
            },
            decorators: DecoratorConfig {
                legacy: true,
                emit_metadata: true,
            },
            external_helpers: true,
            ..CompileOptions::default()
        };
        let transform = options.transform_options().unwrap();

        assert_eq!(transform.jsx.pragma.as_deref(), Some("h"));
        assert!(matches!(transform.jsx.runtime, JsxRuntime::Classic));
        assert!(transform.jsx.jsx_plugin);
        assert!(transform.decorator.legacy);
        assert!(transform.decorator.emit_decorator_metadata);
        assert_eq!(transform.typescript.jsx_pragma, "h");
        assert!(matches!(transform.helper_loader.mode, HelperLoaderMode::External));
    }

    #[test]
    fn unknown_target_is_invalid() {
        let options = CompileOptions {
            target: Some("es1999".into()),
            ..CompileOptions::default()
        };
        assert!(matches!(
            options.transform_options(),
            Err(PluginError::InvalidOption(_))
        ));
    }

    #[test]
    fn compiles_typescript() {
        let options = CompileOptions {
            lang: SourceLang::Ts,
            ..CompileOptions::default()
        };
        let out = compile(
            "const answer: number = 42;\nexport function id<T>(value: T): T { return value; }\n",
            "/src/a.ts",
            &options,
            true,
        )
        .unwrap();

        assert!(out.code.contains("const answer = 42"));
        assert!(!out.code.contains(": number"));
        assert!(out.map.is_some());
    }

    #[test]
    fn classic_jsx_uses_pragma() {
        let options = CompileOptions {
            lang: SourceLang::Tsx,
            jsx: JsxConfig {
                pragma: Some("h".into()),
                ..JsxConfig::default()
            },
            ..CompileOptions::default()
        };
        let out = compile(
            "import { h } from 'preact';\nexport const App = () => <div>hi</div>;\n",
            "/src/app.tsx",
            &options,
            false,
        )
        .unwrap();

        assert!(out.code.contains("h(\"div\""));
        assert!(out.code.contains("from \"preact\""));
        assert!(out.map.is_none());
    }

    #[test]
    fn parse_errors_are_fatal() {
        let err = compile("const = ;", "/src/bad.js", &CompileOptions::default(), false)
            .unwrap_err();
        assert!(matches!(err, PluginError::Parse { ref id, .. } if id == "/src/bad.js"));
    }
}
