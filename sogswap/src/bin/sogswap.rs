use snafu::{OptionExt, ResultExt, Snafu};
use sogswap::listing::{AssetListing, ListingError};
use sogswap::loading::{FsFetcher, ResourceLoader, TextureHandler, WebpParser};
use sogswap::{ConfigError, SwapConfig, SwapContext};
use sogswap_utils::SwapArgs;
use std::path::Path;
use std::rc::Rc;
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Err)))]
enum CliError {
    #[snafu(display("no asset listing given"))]
    MissingListing,

    #[snafu(display("{source}"))]
    Config { source: ConfigError },

    #[snafu(display("{source}"))]
    Listing { source: ListingError },
}

fn run(args: &SwapArgs) -> Result<(), CliError> {
    let config = SwapConfig::from_args(args).context(ConfigErr)?;
    let listing_path = args.assets.as_deref().context(MissingListingErr)?;
    let listing = AssetListing::read(listing_path).context(ListingErr)?;

    let root = Path::new(listing_path)
        .parent()
        .unwrap_or_else(|| Path::new("."));
    let handler = TextureHandler::new(Rc::new(FsFetcher::new(root))).with_parser(WebpParser);
    let mut context = SwapContext::new(&config, ResourceLoader::with_texture_handler(handler));

    let extensions = args.extensions.clone().unwrap_or_default();
    context.probe(&extensions);

    listing.register_into(context.registry_mut());
    let report = context.install();
    info!(
        "Inspected {} textures, rewrote {}, {} already remapped, {} left without decoder",
        report.remap.inspected,
        report.remap.rewritten,
        report.remap.already_remapped,
        report.remap.skipped_without_decoder
    );

    for (name, source) in context.texture_sources() {
        println!("{name}\t{}", source.url());
    }

    Ok(())
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_filter(EnvFilter::from_default_env()))
        .init();

    if let Err(e) = run(&SwapArgs::from_env()) {
        error!("{e}");
        std::process::exit(1);
    }
}
