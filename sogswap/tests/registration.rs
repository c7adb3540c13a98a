mod common;

use common::*;
use futures::executor::block_on;
use sogswap::loading::{HandlerSurface, RegistrationShape};
use sogswap::sogswap_asset::{DecodePath, LoadOutcome};
use sogswap::{ActivationModes, SwapConfig, SwapContext};

#[test]
fn decoder_registration_follows_the_handler_surface() {
    let expectations = [
        (HandlerSurface::Method, Some(RegistrationShape::AddParser)),
        (HandlerSurface::List, Some(RegistrationShape::OrderedList)),
        (HandlerSurface::Map, Some(RegistrationShape::KeyedMap)),
        (HandlerSurface::Replace, Some(RegistrationShape::DirectReplace)),
        (HandlerSurface::Sealed, None),
    ];

    for (surface, expected) in expectations {
        let mut context = SwapContext::new(&SwapConfig::default(), loader(scene_fetcher(), surface));
        add_scene(context.registry_mut());

        let report = context.install();

        assert_eq!(report.decoder, expected, "{surface:?}");
        assert_eq!(context.loader().decoder_available(), expected.is_some());
        let rewritten = if expected.is_some() { 5 } else { 0 };
        assert_eq!(report.remap.rewritten, rewritten, "{surface:?}");
    }
}

#[test]
fn decode_path_follows_the_probed_capability() {
    for (extensions, path) in [
        (vec!["WEBKIT_WEBGL_compressed_texture_astc"], DecodePath::HardwareAstc),
        (vec!["WEBGL_compressed_texture_etc"], DecodePath::SoftwareAstc),
    ] {
        let mut context = context(scene_fetcher(), &SwapConfig::default());
        let ids = add_scene(context.registry_mut());

        let flag = context.probe(&extensions);
        // later probes keep the first answer
        assert_eq!(context.probe(&["WEBGL_compressed_texture_astc"]), flag);
        context.install();

        assert_eq!(block_on(context.load_asset(ids[4])), Some(LoadOutcome::Loaded));
        let texture = context.registry().get(ids[4]).unwrap().resource().unwrap();
        assert_eq!(texture.decode_path, path);
    }
}

#[test]
fn installing_twice_wraps_and_hooks_once() {
    let fetcher = scene_fetcher();
    let config = SwapConfig::builder()
        .modes(ActivationModes {
            eager: false,
            intercept: true,
            add_hook: true,
        })
        .build();
    let mut context = context(fetcher.clone(), &config);

    let first = context.install();
    let second = context.install();

    assert_eq!(first.decoder, Some(RegistrationShape::OrderedList));
    assert_eq!(second.decoder, first.decoder);
    assert!(second.intercepting && second.add_hook);

    let id = context.registry_mut().add(scene_asset("quats"));
    assert_eq!(url_of(&context, id), alternate_url("quats"));
    assert_eq!(block_on(context.load_asset(id)), Some(LoadOutcome::Loaded));
    assert_eq!(fetcher.requests(), vec![alternate_url("quats")]);
}
