use crate::loading::fetcher::{FetchError, Fetcher};
use crate::loading::parsers::{ParseError, TextureParser};
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use snafu::{OptionExt, ResultExt, Snafu};
use sogswap_asset::{AssetId, FormatVariant, SourceLocator, TextureResource};
use std::collections::HashMap;
use std::rc::Rc;
use tracing::{debug, warn};

pub type ParserRef = Rc<dyn TextureParser>;

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Err)), visibility(pub(crate)))]
pub enum LoadError {
    #[snafu(display("no {keyword:?} handler is registered for {}", locator.url()))]
    NoHandler {
        keyword: String,
        locator: SourceLocator,
    },

    #[snafu(display("no parser registered for {}", locator.url()))]
    NoParser { locator: SourceLocator },

    #[snafu(display("failed to fetch {}: {source}", locator.url()))]
    Fetch {
        locator: SourceLocator,
        source: FetchError,
    },

    #[snafu(display("failed to decode {}: {source}", locator.url()))]
    Parse {
        locator: SourceLocator,
        source: ParseError,
    },
}

impl LoadError {
    /// The locator the failed request targeted, after any redirect.
    pub fn locator(&self) -> &SourceLocator {
        match self {
            LoadError::NoHandler { locator, .. }
            | LoadError::NoParser { locator }
            | LoadError::Fetch { locator, .. }
            | LoadError::Parse { locator, .. } => locator,
        }
    }

    pub fn url(&self) -> &str {
        self.locator().url()
    }
}

/// A request to fetch and decode one payload.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct LoadRequest {
    pub source: SourceLocator,
    pub asset: Option<AssetId>,
}

impl LoadRequest {
    pub fn new(source: SourceLocator) -> Self {
        Self {
            source,
            asset: None,
        }
    }

    pub fn for_asset(source: SourceLocator, asset: AssetId) -> Self {
        Self {
            source,
            asset: Some(asset),
        }
    }
}

/// A decoded payload together with the locator it was actually fetched from.
#[derive(Debug, Clone)]
pub struct LoadedTexture {
    pub resource: TextureResource,
    pub resolved: SourceLocator,
}

pub type LoadFuture<'a> = LocalBoxFuture<'a, Result<LoadedTexture, LoadError>>;

/// The ways a handler can accept an additional parser, in the order they are tried.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum RegistrationShape {
    /// A dedicated registration method.
    AddParser,
    /// An ordered parser list, the new parser is put in front.
    OrderedList,
    /// A map keyed by container format.
    KeyedMap,
    /// The whole parser set is written back with the new parser in front.
    DirectReplace,
}

impl RegistrationShape {
    pub const PRIORITY: [RegistrationShape; 4] = [
        RegistrationShape::AddParser,
        RegistrationShape::OrderedList,
        RegistrationShape::KeyedMap,
        RegistrationShape::DirectReplace,
    ];
}

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Err)), visibility(pub(crate)))]
pub enum LoaderError {
    #[snafu(display("no {keyword:?} handler is registered"))]
    MissingHandler { keyword: String },

    #[snafu(display("the {keyword:?} handler exposes no way to register the {parser} parser"))]
    NoRegistrationShape {
        keyword: String,
        parser: &'static str,
    },
}

/// A resource handler as the loader dispatches to it.
///
/// Only `load` and `supports` are required. The registration entry points are optional,
/// a handler exposes whichever of them its engine build has.
pub trait ResourceHandler {
    fn load(&self, request: LoadRequest) -> LoadFuture<'_>;

    /// Whether a payload of this variant can currently be decoded.
    fn supports(&self, variant: FormatVariant) -> bool;

    fn add_parser(&mut self, _parser: ParserRef) -> bool {
        false
    }

    fn parser_list(&mut self) -> Option<&mut Vec<ParserRef>> {
        None
    }

    fn parser_map(&mut self) -> Option<&mut HashMap<FormatVariant, ParserRef>> {
        None
    }

    /// Current parser set, if the handler lets it be replaced wholesale.
    fn parsers(&self) -> Option<Vec<ParserRef>> {
        None
    }

    fn replace_parsers(&mut self, _parsers: Vec<ParserRef>) -> bool {
        false
    }
}

fn try_register(
    shape: RegistrationShape,
    handler: &mut dyn ResourceHandler,
    parser: &ParserRef,
) -> bool {
    let variant = parser.variant();
    match shape {
        RegistrationShape::AddParser => handler.add_parser(parser.clone()),
        RegistrationShape::OrderedList => match handler.parser_list() {
            Some(list) => {
                list.retain(|existing| existing.variant() != variant);
                list.insert(0, parser.clone());
                true
            }
            None => false,
        },
        RegistrationShape::KeyedMap => match handler.parser_map() {
            Some(map) => {
                map.insert(variant, parser.clone());
                true
            }
            None => false,
        },
        RegistrationShape::DirectReplace => {
            let Some(mut parsers) = handler.parsers() else {
                return false;
            };
            parsers.retain(|existing| existing.variant() != variant);
            parsers.insert(0, parser.clone());
            handler.replace_parsers(parsers)
        }
    }
}

/// Registers `parser` through the first registration shape the handler supports.
pub fn register_parser(
    keyword: &str,
    handler: &mut dyn ResourceHandler,
    parser: ParserRef,
) -> Result<RegistrationShape, LoaderError> {
    for shape in RegistrationShape::PRIORITY {
        if try_register(shape, handler, &parser) {
            if shape == RegistrationShape::DirectReplace {
                warn!(
                    "Standard parser registration failed, replaced the {keyword} parser set directly"
                );
            }
            debug!("Registered {} parser via {shape:?}", parser.name());
            return Ok(shape);
        }
    }

    // reported through the returned error
    debug!("Could not add the {} parser, no suitable method found", parser.name());
    NoRegistrationShapeErr {
        keyword,
        parser: parser.name(),
    }
    .fail()
}

/// Which registration entry points a [`TextureHandler`] exposes.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum HandlerSurface {
    Method,
    List,
    Map,
    Replace,
    /// Accepts no new parsers.
    Sealed,
}

/// The engine's texture handler: picks a parser by file extension, fetches and decodes.
pub struct TextureHandler {
    fetcher: Rc<dyn Fetcher>,
    parsers: Vec<ParserRef>,
    keyed: HashMap<FormatVariant, ParserRef>,
    surface: HandlerSurface,
}

impl TextureHandler {
    pub fn new(fetcher: Rc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            parsers: Vec::new(),
            keyed: HashMap::new(),
            surface: HandlerSurface::List,
        }
    }

    pub fn with_parser(mut self, parser: impl TextureParser + 'static) -> Self {
        self.parsers.push(Rc::new(parser));
        self
    }

    pub fn with_surface(mut self, surface: HandlerSurface) -> Self {
        self.surface = surface;
        self
    }

    pub fn parser_names(&self) -> Vec<&'static str> {
        self.keyed
            .values()
            .chain(&self.parsers)
            .map(|parser| parser.name())
            .collect()
    }

    fn parser_for(&self, variant: FormatVariant) -> Option<ParserRef> {
        self.keyed
            .get(&variant)
            .or_else(|| self.parsers.iter().find(|parser| parser.variant() == variant))
            .cloned()
    }
}

impl ResourceHandler for TextureHandler {
    fn load(&self, request: LoadRequest) -> LoadFuture<'_> {
        let parser = FormatVariant::from_path(request.source.url())
            .and_then(|variant| self.parser_for(variant));

        async move {
            let locator = &request.source;
            let parser = parser.with_context(|| NoParserErr {
                locator: locator.clone(),
            })?;
            let bytes = self
                .fetcher
                .fetch(locator.url())
                .await
                .with_context(|_| FetchErr {
                    locator: locator.clone(),
                })?;
            let resource = parser.parse(&bytes).with_context(|_| ParseErr {
                locator: locator.clone(),
            })?;

            Ok(LoadedTexture {
                resource,
                resolved: request.source,
            })
        }
        .boxed_local()
    }

    fn supports(&self, variant: FormatVariant) -> bool {
        self.parser_for(variant).is_some()
    }

    fn add_parser(&mut self, parser: ParserRef) -> bool {
        if self.surface != HandlerSurface::Method {
            return false;
        }
        let variant = parser.variant();
        self.parsers.retain(|existing| existing.variant() != variant);
        self.parsers.insert(0, parser);
        true
    }

    fn parser_list(&mut self) -> Option<&mut Vec<ParserRef>> {
        (self.surface == HandlerSurface::List).then_some(&mut self.parsers)
    }

    fn parser_map(&mut self) -> Option<&mut HashMap<FormatVariant, ParserRef>> {
        (self.surface == HandlerSurface::Map).then_some(&mut self.keyed)
    }

    fn parsers(&self) -> Option<Vec<ParserRef>> {
        (self.surface == HandlerSurface::Replace).then(|| self.parsers.clone())
    }

    fn replace_parsers(&mut self, parsers: Vec<ParserRef>) -> bool {
        if self.surface != HandlerSurface::Replace {
            return false;
        }
        self.parsers = parsers;
        true
    }
}
