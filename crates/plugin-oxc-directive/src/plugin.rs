use rolldown_common::ModuleType;
use rolldown_plugin::{
    HookRenderChunkArgs, HookRenderChunkOutput, HookRenderChunkReturn, HookTransformArgs,
    HookTransformOutput, HookTransformReturn, HookUsage, Plugin, PluginContext,
    SharedTransformPluginContext,
};
use std::borrow::Cow;
use std::sync::Arc;

use crate::DirectivePreserver;

/// Rolldown plugin that keeps module directives alive through bundling.
///
/// Strips the directive prologue of every JS/TS module in `transform` and
/// prepends the chunk's directives in `render_chunk`. Use it alongside a
/// compiler plugin that does not handle directives itself.
#[derive(Debug, Default)]
pub struct PreserveDirectivesPlugin {
    preserver: Arc<DirectivePreserver>,
}

impl PreserveDirectivesPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share an existing registry, e.g. to inspect it after the build.
    pub fn with_preserver(preserver: Arc<DirectivePreserver>) -> Self {
        Self { preserver }
    }

    pub fn preserver(&self) -> Arc<DirectivePreserver> {
        Arc::clone(&self.preserver)
    }
}

impl Plugin for PreserveDirectivesPlugin {
    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("oxc:preserve-directives")
    }

    fn register_hook_usage(&self) -> HookUsage {
        HookUsage::Transform | HookUsage::RenderChunk
    }

    fn transform(
        &self,
        _ctx: SharedTransformPluginContext,
        args: &HookTransformArgs<'_>,
    ) -> impl std::future::Future<Output = HookTransformReturn> + Send {
        let handles = !args.id.starts_with('\0')
            && matches!(
                args.module_type,
                ModuleType::Js | ModuleType::Jsx | ModuleType::Ts | ModuleType::Tsx
            );
        let stripped = if handles {
            self.preserver.extract(args.id, args.code)
        } else {
            None
        };

        async move {
            Ok(stripped.map(|code| HookTransformOutput {
                code: Some(code),
                map: None,
                side_effects: None,
                module_type: None,
            }))
        }
    }

    fn render_chunk(
        &self,
        _ctx: &PluginContext,
        args: &HookRenderChunkArgs<'_>,
    ) -> impl std::future::Future<Output = HookRenderChunkReturn> + Send {
        let module_ids: Vec<String> = args.chunk.module_ids.iter().map(|id| id.to_string()).collect();
        let rendered = self
            .preserver
            .render(&args.code, &module_ids, args.options.sourcemap.is_some());

        async move {
            Ok(rendered.map(|chunk| HookRenderChunkOutput {
                code: chunk.code,
                map: chunk.map,
            }))
        }
    }
}
