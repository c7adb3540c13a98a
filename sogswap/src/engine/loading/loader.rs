use crate::loading::handler::{
    LoadError, LoadFuture, LoadRequest, LoaderError, MissingHandlerErr, NoHandlerErr, ParserRef,
    RegistrationShape, ResourceHandler, register_parser,
};
use futures::FutureExt;
use snafu::OptionExt;
use sogswap_asset::FormatVariant;
use std::collections::HashMap;

/// Keyword of the handler responsible for texture assets.
pub const TEXTURE: &str = "texture";

/// Dispatches load requests to the handler registered for a resource type.
#[derive(Default)]
pub struct ResourceLoader {
    handlers: HashMap<String, Box<dyn ResourceHandler>>,
}

impl ResourceLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_texture_handler(handler: impl ResourceHandler + 'static) -> Self {
        let mut loader = Self::new();
        loader.add_handler(TEXTURE, handler);
        loader
    }

    pub fn add_handler(&mut self, keyword: impl Into<String>, handler: impl ResourceHandler + 'static) {
        self.handlers.insert(keyword.into(), Box::new(handler));
    }

    pub fn get_handler(&self, keyword: &str) -> Option<&dyn ResourceHandler> {
        self.handlers.get(keyword).map(|handler| &**handler)
    }

    pub fn get_handler_mut(&mut self, keyword: &str) -> Option<&mut (dyn ResourceHandler + 'static)> {
        self.handlers.get_mut(keyword).map(|handler| &mut **handler)
    }

    /// Replaces the handler for `keyword` with whatever `wrap` builds around it.
    /// Returns false if no such handler exists.
    pub fn wrap_handler(
        &mut self,
        keyword: &str,
        wrap: impl FnOnce(Box<dyn ResourceHandler>) -> Box<dyn ResourceHandler>,
    ) -> bool {
        match self.handlers.remove(keyword) {
            Some(handler) => {
                self.handlers.insert(keyword.to_string(), wrap(handler));
                true
            }
            None => false,
        }
    }

    /// Registers a parser with the handler for `keyword`.
    pub fn register_parser(
        &mut self,
        keyword: &str,
        parser: ParserRef,
    ) -> Result<RegistrationShape, LoaderError> {
        let handler = self
            .get_handler_mut(keyword)
            .context(MissingHandlerErr { keyword })?;
        register_parser(keyword, handler, parser)
    }

    /// Whether the texture handler can decode the compressed variant.
    pub fn decoder_available(&self) -> bool {
        self.get_handler(TEXTURE)
            .is_some_and(|handler| handler.supports(FormatVariant::Compressed))
    }

    pub fn load(&self, keyword: &str, request: LoadRequest) -> LoadFuture<'_> {
        match self.handlers.get(keyword) {
            Some(handler) => handler.load(request),
            None => {
                let err = NoHandlerErr {
                    keyword,
                    locator: request.source,
                }
                .build();
                async move { Err::<_, LoadError>(err) }.boxed_local()
            }
        }
    }
}
