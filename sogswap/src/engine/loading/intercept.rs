use crate::loading::handler::{LoadFuture, LoadRequest, ParserRef, ResourceHandler};
use crate::remapper::AssetRemapper;
use sogswap_asset::FormatVariant;
use std::collections::HashMap;
use std::rc::Rc;

/// Wraps a texture handler so requests for a default variant are redirected to the
/// compressed one before the inner handler sees them.
///
/// Whether a decoder is registered is checked on every request, so requests issued before
/// registration keep their default locator.
pub struct InterceptingHandler {
    inner: Box<dyn ResourceHandler>,
    remapper: Rc<AssetRemapper>,
}

impl InterceptingHandler {
    pub fn new(inner: Box<dyn ResourceHandler>, remapper: Rc<AssetRemapper>) -> Self {
        Self { inner, remapper }
    }

    pub fn into_inner(self) -> Box<dyn ResourceHandler> {
        self.inner
    }
}

impl ResourceHandler for InterceptingHandler {
    fn load(&self, mut request: LoadRequest) -> LoadFuture<'_> {
        let decoder_ready = self.inner.supports(FormatVariant::Compressed);
        self.remapper.observe_decoder(decoder_ready);

        if decoder_ready {
            self.remapper.redirect(&mut request);
        }

        self.inner.load(request)
    }

    fn supports(&self, variant: FormatVariant) -> bool {
        self.inner.supports(variant)
    }

    fn add_parser(&mut self, parser: ParserRef) -> bool {
        self.inner.add_parser(parser)
    }

    fn parser_list(&mut self) -> Option<&mut Vec<ParserRef>> {
        self.inner.parser_list()
    }

    fn parser_map(&mut self) -> Option<&mut HashMap<FormatVariant, ParserRef>> {
        self.inner.parser_map()
    }

    fn parsers(&self) -> Option<Vec<ParserRef>> {
        self.inner.parsers()
    }

    fn replace_parsers(&mut self, parsers: Vec<ParserRef>) -> bool {
        self.inner.replace_parsers(parsers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loading::fetcher::MemoryFetcher;
    use crate::loading::handler::{LoadError, TextureHandler, register_parser};
    use crate::loading::parsers::tests::{VK_FORMAT_ASTC_6X6_UNORM_BLOCK, ktx2_bytes, webp_bytes};
    use crate::loading::parsers::{Ktx2Parser, WebpParser};
    use crate::remap_table::{RemapConfig, RemapTable};
    use futures::executor::block_on;
    use sogswap_asset::SourceLocator;
    use std::sync::Arc;

    fn intercepting() -> (Rc<MemoryFetcher>, InterceptingHandler) {
        let fetcher = Rc::new(MemoryFetcher::new());
        fetcher.insert("scene/means_l.webp", webp_bytes());
        fetcher.insert(
            "files/assets/astc6x6/means_l.ktx2",
            ktx2_bytes(VK_FORMAT_ASTC_6X6_UNORM_BLOCK),
        );

        let inner = TextureHandler::new(fetcher.clone()).with_parser(WebpParser);
        let remapper = Rc::new(AssetRemapper::new(Arc::new(RemapTable::new(
            &RemapConfig::default(),
        ))));
        (fetcher, InterceptingHandler::new(Box::new(inner), remapper))
    }

    #[test]
    fn passes_requests_through_without_decoder() {
        let (fetcher, handler) = intercepting();
        let request = LoadRequest::new(SourceLocator::new("scene/means_l.webp?v=3"));

        let loaded = block_on(handler.load(request)).unwrap();

        assert_eq!(loaded.resolved.url(), "scene/means_l.webp?v=3");
        assert_eq!(fetcher.requests(), vec!["scene/means_l.webp?v=3"]);
    }

    #[test]
    fn redirects_once_a_decoder_is_registered() {
        let (fetcher, mut handler) = intercepting();
        register_parser("texture", &mut handler, Rc::new(Ktx2Parser::default())).unwrap();

        let request = LoadRequest::new(SourceLocator::new("scene/means_l.webp?v=3"));
        let loaded = block_on(handler.load(request)).unwrap();

        assert_eq!(loaded.resolved.url(), "files/assets/astc6x6/means_l.ktx2");
        assert_eq!(loaded.resolved.filename(), "means_l.ktx2");
        assert!(loaded.resource.is_compressed());
        assert_eq!(fetcher.requests(), vec!["files/assets/astc6x6/means_l.ktx2"]);
    }

    #[test]
    fn failed_redirect_reports_the_alternate_locator() {
        let (fetcher, mut handler) = intercepting();
        register_parser("texture", &mut handler, Rc::new(Ktx2Parser::default())).unwrap();
        fetcher.remove("files/assets/astc6x6/means_l.ktx2");

        let request = LoadRequest::new(SourceLocator::new("scene/means_l.webp?v=3"));
        let err = block_on(handler.load(request)).unwrap_err();

        assert!(matches!(err, LoadError::Fetch { .. }));
        assert_eq!(err.locator().url(), "files/assets/astc6x6/means_l.ktx2");
        assert_eq!(err.locator().filename(), "means_l.ktx2");
    }

    #[test]
    fn unrelated_requests_are_untouched() {
        let (fetcher, mut handler) = intercepting();
        register_parser("texture", &mut handler, Rc::new(Ktx2Parser::default())).unwrap();

        let request = LoadRequest::new(SourceLocator::new("scene/background.webp"));
        let err = block_on(handler.load(request)).unwrap_err();

        assert!(matches!(err, LoadError::Fetch { .. }));
        assert_eq!(fetcher.requests(), vec!["scene/background.webp"]);
    }
}
