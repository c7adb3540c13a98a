mod common;

use common::*;
use futures::executor::block_on;
use sogswap::fixup::{FixupOutcome, PostLoadFixup};
use sogswap::loading::{HandlerSurface, LoadError, LoadRequest, TEXTURE};
use sogswap::remap_table::{RemapConfig, RemapTable};
use sogswap::sogswap_asset::{
    AssetDescriptor, FormatVariant, LoadOutcome, LoadState, SamplerState, SourceLocator,
};
use sogswap::{SwapConfig, SwapContext};
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;

#[test]
fn without_decoder_nothing_changes_and_the_fallback_is_logged_once() {
    let counter = ProblemCounter::default();
    let subscriber = tracing_subscriber::registry().with(counter.clone());

    tracing::subscriber::with_default(subscriber, || {
        let fetcher = scene_fetcher();
        let mut context = SwapContext::new(
            &SwapConfig::default(),
            loader(fetcher.clone(), HandlerSurface::Sealed),
        );
        let ids = add_scene(context.registry_mut());

        let report = context.install();
        let late = context.registry_mut().add(scene_asset("sh0"));
        let again = context.remap_registered();
        let outcome = block_on(context.load_asset(ids[0]));

        assert_eq!(report.decoder, None);
        assert_eq!(report.remap.rewritten, 0);
        assert_eq!(report.remap.skipped_without_decoder, 5);
        assert_eq!(again.rewritten, 0);
        assert_eq!(outcome, Some(LoadOutcome::Loaded));

        for (channel, id) in SCENE_CHANNELS.iter().zip(&ids) {
            assert_eq!(url_of(&context, *id), default_url(channel));
        }
        assert_eq!(url_of(&context, late), default_url("sh0"));
        assert_eq!(fetcher.requests(), vec![default_url("means_l")]);
    });

    assert_eq!(counter.matching("No KTX2 decoder"), 1);
    assert_eq!(counter.count(), 1);
}

#[test]
fn compressed_requests_fail_closed_without_decoder() {
    let fetcher = scene_fetcher();
    let loader = loader(fetcher.clone(), HandlerSurface::Sealed);
    let handler = loader.get_handler(TEXTURE).unwrap();
    assert!(!handler.supports(FormatVariant::Compressed));

    let request = LoadRequest::new(SourceLocator::new(alternate_url("quats")));
    let err = block_on(loader.load(TEXTURE, request)).unwrap_err();

    assert!(matches!(err, LoadError::NoParser { .. }));
    assert!(fetcher.requests().is_empty());
}

#[test]
fn fixup_only_touches_loaded_alternates() {
    let mut context = context(scene_fetcher(), &SwapConfig::default());
    let ids = add_scene(context.registry_mut());
    context.install();

    // remapped but not loaded yet
    let fixup = PostLoadFixup::new(Arc::new(RemapTable::new(&RemapConfig::default())));
    let asset = context.registry_mut().get_mut(ids[0]).unwrap();
    assert_eq!(asset.state(), LoadState::Unloaded);
    assert_eq!(fixup.apply(asset), FixupOutcome::NotLoaded);
    assert!(asset.resource().is_none());

    // loaded on the default variant
    block_on(context.load_asset(ids[5]));
    let background = context.registry_mut().get_mut(ids[5]).unwrap();
    assert_eq!(fixup.apply(background), FixupOutcome::NotAlternate);
    let texture = background.resource().unwrap();
    assert_eq!(texture.sampler, SamplerState::default());
    assert_eq!(texture.upload_requests(), 0);

    // never registered
    let mut loose = AssetDescriptor::texture("loose", SourceLocator::new(alternate_url("sh0")));
    assert_eq!(fixup.apply(&mut loose), FixupOutcome::NotLoaded);
}
