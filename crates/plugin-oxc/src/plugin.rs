//! The Rolldown plugins: [`OxcPlugin`] and [`MinifyPlugin`].

use plugin_oxc_directive::DirectivePreserver;
use plugin_oxc_runtime::{NativeRuntime, Runtime};
use plugin_oxc_tsconfig::{
    CompilerOptionsView, ConfigResolver, ConfigWarning, DiagnosticSink, WarningCollector,
};
use rolldown_common::{LogWithoutPlugin, ModuleType};
use rolldown_plugin::{
    HookRenderChunkArgs, HookRenderChunkOutput, HookRenderChunkReturn, HookResolveIdArgs,
    HookResolveIdOutput, HookResolveIdReturn, HookTransformArgs, HookTransformOutput,
    HookTransformReturn, HookUsage, Plugin, PluginContext, SharedTransformPluginContext,
};
use serde_json::Value;
use path_clean::PathClean;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::compile::{
    compile, fallback_layer, tsconfig_layer, CompileOptions, CompileOutput, JsxRuntimeKind,
    SourceLang,
};
use crate::error::Result;
use crate::minify::{minify, MinifyLevel};
use crate::options::{merge_layers, Filter, PluginOptions};
use crate::resolve::ModuleResolver;
use crate::sourcemap::{lines_count, shift_lines};
use crate::{codes, typescript};

/// A compiled module plus the options it was compiled with.
#[derive(Debug, Clone)]
pub struct TransformedModule {
    pub output: CompileOutput,
    pub options: CompileOptions,
}

impl TransformedModule {
    /// Module type of the emitted code as the bundler should see it.
    pub fn module_type(&self) -> ModuleType {
        if self.options.jsx.runtime == JsxRuntimeKind::Preserve && self.options.lang.is_jsx() {
            ModuleType::Jsx
        } else {
            ModuleType::Js
        }
    }
}

/// Builder for [`OxcPlugin`].
#[derive(Debug)]
pub struct OxcPluginBuilder {
    options: PluginOptions,
    runtime: Option<Arc<dyn Runtime>>,
    directives: Option<Arc<DirectivePreserver>>,
}

impl OxcPluginBuilder {
    /// Filesystem access for discovery and resolution. Defaults to
    /// [`NativeRuntime`].
    pub fn runtime(mut self, runtime: Arc<dyn Runtime>) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Strip directives before compiling and re-emit them per chunk.
    pub fn preserve_directives(mut self, preserver: Arc<DirectivePreserver>) -> Self {
        self.directives = Some(preserver);
        self
    }

    pub fn build(self) -> Result<OxcPlugin> {
        let filter = Filter::new(&self.options.include, &self.options.exclude)?;
        let runtime = self
            .runtime
            .unwrap_or_else(|| Arc::new(NativeRuntime::new()) as Arc<dyn Runtime>);

        Ok(OxcPlugin {
            inner: Arc::new(Inner {
                filter,
                configs: ConfigResolver::new(Arc::clone(&runtime)),
                resolver: ModuleResolver::new(
                    Arc::clone(&runtime),
                    self.options.extensions.clone(),
                ),
                directives: self.directives,
                typescript: OnceCell::new(),
                runtime,
                options: self.options,
            }),
        })
    }
}

#[derive(Debug)]
struct Inner {
    options: PluginOptions,
    filter: Filter,
    runtime: Arc<dyn Runtime>,
    configs: ConfigResolver,
    resolver: ModuleResolver,
    directives: Option<Arc<DirectivePreserver>>,
    typescript: OnceCell<Option<u32>>,
}

/// Compiles TypeScript and JSX modules with oxc.
///
/// Per module, compiler options are layered from built-in fallbacks, the
/// nearest tsconfig/jsconfig, and the user's `compile` overrides. Relative
/// imports without an extension, directory imports and tsconfig `paths`
/// aliases are resolved here. Chunks are optionally minified and get their
/// modules' directives back.
///
/// Create one instance per build; it owns the configuration cache and the
/// directive registry for that build.
#[derive(Debug, Clone)]
pub struct OxcPlugin {
    inner: Arc<Inner>,
}

impl OxcPlugin {
    pub fn new(options: PluginOptions) -> Result<Self> {
        Self::builder(options).build()
    }

    pub fn builder(options: PluginOptions) -> OxcPluginBuilder {
        OxcPluginBuilder {
            options,
            runtime: None,
            directives: None,
        }
    }

    pub fn options(&self) -> &PluginOptions {
        &self.inner.options
    }

    pub fn config_resolver(&self) -> &ConfigResolver {
        &self.inner.configs
    }

    /// Whether `transform` compiles this module id.
    pub fn handles(&self, id: &str) -> bool {
        let inner = &self.inner;
        inner.filter.matches(id)
            && Path::new(id)
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| {
                    inner
                        .options
                        .extensions
                        .iter()
                        .any(|known| known.strip_prefix('.') == Some(ext))
                })
    }

    /// Resolve an import to a file on disk, or `Ok(None)` to defer to the
    /// bundler.
    ///
    /// Aliases come from the importer's merged compile options, so `baseUrl`
    /// and `paths` given as overrides take part as well.
    pub async fn resolve(
        &self,
        specifier: &str,
        importer: Option<&str>,
        sink: &dyn DiagnosticSink,
    ) -> Result<Option<PathBuf>> {
        if specifier.starts_with('\0') {
            return Ok(None);
        }
        let Some(importer) = importer.filter(|importer| !importer.starts_with('\0')) else {
            return Ok(None);
        };

        if specifier.starts_with('.') {
            return Ok(self.inner.resolver.resolve_relative(specifier, importer).await);
        }
        if Path::new(specifier).is_absolute() {
            return Ok(None);
        }

        let options = self.compile_options(importer, sink).await?;
        let Some(aliases) = self.alias_table(&options)? else {
            return Ok(None);
        };
        Ok(self.inner.resolver.resolve_alias(specifier, &aliases).await)
    }

    /// `paths` with an absolute `baseUrl`. Discovered values are already
    /// absolute; a relative or missing override falls back to the working
    /// directory.
    fn alias_table(&self, options: &CompileOptions) -> Result<Option<CompilerOptionsView>> {
        let Some(paths) = &options.paths else {
            return Ok(None);
        };
        let base_url = match &options.base_url {
            Some(base_url) if base_url.is_absolute() => base_url.clone(),
            Some(base_url) => self.inner.runtime.get_cwd()?.join(base_url).clean(),
            None => self.inner.runtime.get_cwd()?,
        };

        Ok(Some(CompilerOptionsView {
            base_url: Some(base_url),
            paths: Some(paths.clone()),
            ..CompilerOptionsView::default()
        }))
    }

    /// Options a module would be compiled with.
    pub async fn compile_options(
        &self,
        id: &str,
        sink: &dyn DiagnosticSink,
    ) -> Result<CompileOptions> {
        let lang = SourceLang::from_id(id);
        let view = self.config_for(id, sink).await;
        let standard_decorators = !lang.is_typescript()
            || self.typescript_major(sink).await.is_some_and(|major| major >= 5);

        CompileOptions::from_value(merge_layers([
            fallback_layer(id),
            tsconfig_layer(&view, standard_decorators),
            Value::Object(self.inner.options.compile.clone()),
        ]))
    }

    /// Compile one module. `Ok(None)` means the module is not ours.
    pub async fn transform_module(
        &self,
        code: &str,
        id: &str,
        sink: &dyn DiagnosticSink,
    ) -> Result<Option<TransformedModule>> {
        if !self.handles(id) {
            return Ok(None);
        }

        let options = self.compile_options(id, sink).await?;
        let stripped = self
            .inner
            .directives
            .as_ref()
            .and_then(|preserver| preserver.extract(id, code));
        let source = stripped.as_deref().unwrap_or(code);

        debug!("[oxc] compiling {} as {:?}", id, options.lang);
        let output = compile(source, id, &options, self.inner.options.sourcemap)?;
        Ok(Some(TransformedModule { output, options }))
    }

    /// Post-process a rendered chunk: minify, then prepend directives.
    ///
    /// `Ok(None)` leaves the chunk unchanged.
    pub fn render<S: AsRef<str>>(
        &self,
        code: &str,
        module_ids: &[S],
        file_name: &str,
        sourcemap: bool,
    ) -> Result<Option<CompileOutput>> {
        let mut output = match self.inner.options.minify {
            MinifyLevel::None => None,
            level => Some(minify(code, level, file_name, sourcemap)?),
        };

        if let Some(preserver) = &self.inner.directives {
            let current = output.as_ref().map_or(code, |out| out.code.as_str());
            let current_len = current.len();
            let rendered = preserver.render(current, module_ids, sourcemap && output.is_none());

            if let Some(rendered) = rendered {
                let banner = lines_count(&rendered.code[..rendered.code.len() - current_len]);
                let map = match output.and_then(|out| out.map) {
                    Some(map) => Some(shift_lines(&map, banner)),
                    None => rendered.map,
                };
                output = Some(CompileOutput {
                    code: rendered.code,
                    map,
                });
            }
        }

        Ok(output)
    }

    async fn config_for(&self, id: &str, sink: &dyn DiagnosticSink) -> Arc<CompilerOptionsView> {
        let directory = Path::new(id).parent().unwrap_or(Path::new(""));
        self.inner
            .configs
            .resolve(directory, &self.inner.options.tsconfig, sink)
            .await
    }

    /// Probed once per plugin instance; a missing install warns once.
    async fn typescript_major(&self, sink: &dyn DiagnosticSink) -> Option<u32> {
        *self
            .inner
            .typescript
            .get_or_init(|| async {
                let major = typescript::installed_major(self.inner.runtime.as_ref()).await;
                if major.is_none() {
                    sink.warn(ConfigWarning::new(
                        codes::TYPESCRIPT_NOT_FOUND,
                        "Failed to find TypeScript. Please check if TypeScript has been installed.",
                    ));
                }
                major
            })
            .await
    }
}

/// Hand collected warnings to the bundler and mirror them to tracing.
fn forward(warnings: &WarningCollector, emit: impl Fn(LogWithoutPlugin)) {
    for warning in warnings.take() {
        warn!("[oxc] {}", warning);
        emit(LogWithoutPlugin {
            message: warning.to_string(),
            ..Default::default()
        });
    }
}

impl Plugin for OxcPlugin {
    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("oxc")
    }

    fn register_hook_usage(&self) -> HookUsage {
        HookUsage::ResolveId | HookUsage::Transform | HookUsage::RenderChunk
    }

    fn resolve_id(
        &self,
        ctx: &PluginContext,
        args: &HookResolveIdArgs,
    ) -> impl std::future::Future<Output = HookResolveIdReturn> + Send {
        let plugin = self.clone();
        let ctx = ctx.clone();
        let specifier = args.specifier.to_string();
        let importer = args.importer.map(str::to_string);

        async move {
            let warnings = WarningCollector::new();
            let resolved = plugin
                .resolve(&specifier, importer.as_deref(), &warnings)
                .await;
            forward(&warnings, |log| {
                ctx.warn(log);
            });

            Ok(resolved?.map(|file| HookResolveIdOutput {
                id: file.to_string_lossy().into_owned().into(),
                ..Default::default()
            }))
        }
    }

    fn transform(
        &self,
        ctx: SharedTransformPluginContext,
        args: &HookTransformArgs<'_>,
    ) -> impl std::future::Future<Output = HookTransformReturn> + Send {
        let plugin = self.clone();
        let id = args.id.to_string();
        let code = args.code.to_string();

        async move {
            let warnings = WarningCollector::new();
            let transformed = plugin.transform_module(&code, &id, &warnings).await;
            forward(&warnings, |log| {
                ctx.warn(log);
            });

            Ok(transformed?.map(|module| HookTransformOutput {
                module_type: Some(module.module_type()),
                code: Some(module.output.code),
                map: module.output.map,
                side_effects: None,
            }))
        }
    }

    fn render_chunk(
        &self,
        _ctx: &PluginContext,
        args: &HookRenderChunkArgs<'_>,
    ) -> impl std::future::Future<Output = HookRenderChunkReturn> + Send {
        let module_ids: Vec<String> =
            args.chunk.module_ids.iter().map(|id| id.to_string()).collect();
        let rendered = self.render(
            &args.code,
            &module_ids,
            &args.chunk.filename,
            args.options.sourcemap.is_some(),
        );

        async move {
            Ok(rendered?.map(|out| HookRenderChunkOutput {
                code: out.code,
                map: out.map,
            }))
        }
    }
}

/// Minifies every chunk, independent of any compile step.
#[derive(Debug, Clone, Copy)]
pub struct MinifyPlugin {
    level: MinifyLevel,
}

impl MinifyPlugin {
    pub fn new(level: MinifyLevel) -> Self {
        Self { level }
    }
}

impl Default for MinifyPlugin {
    fn default() -> Self {
        Self::new(MinifyLevel::Identifiers)
    }
}

impl Plugin for MinifyPlugin {
    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("oxc-minify")
    }

    fn register_hook_usage(&self) -> HookUsage {
        HookUsage::RenderChunk
    }

    fn render_chunk(
        &self,
        _ctx: &PluginContext,
        args: &HookRenderChunkArgs<'_>,
    ) -> impl std::future::Future<Output = HookRenderChunkReturn> + Send {
        let rendered = if self.level.is_enabled() {
            minify(
                &args.code,
                self.level,
                &args.chunk.filename,
                args.options.sourcemap.is_some(),
            )
            .map(Some)
        } else {
            Ok(None)
        };

        async move {
            Ok(rendered?.map(|out| HookRenderChunkOutput {
                code: out.code,
                map: out.map,
            }))
        }
    }
}
