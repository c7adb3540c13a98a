use crate::context::{ActivationModes, FailurePolicy};
use crate::remap_table::{DEFAULT_KTX2_BASE, RemapConfig};
use bon::Builder;
use snafu::{ResultExt, Snafu};
use sogswap_asset::{TextureChannel, UnknownChannel};
use sogswap_utils::{FailurePolicyArg, SwapArgs};

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Err)))]
pub enum ConfigError {
    #[snafu(display("invalid --channels: {source}"))]
    Channel { source: UnknownChannel },
}

/// Everything a [`SwapContext`](crate::SwapContext) is configured with.
#[derive(Debug, Clone, Default, Eq, PartialEq, Builder)]
pub struct SwapConfig {
    #[builder(default)]
    pub remap: RemapConfig,
    #[builder(default)]
    pub modes: ActivationModes,
    #[builder(default)]
    pub policy: FailurePolicy,
}

impl SwapConfig {
    pub fn from_args(args: &SwapArgs) -> Result<SwapConfig, ConfigError> {
        let channels = match &args.channels {
            Some(names) => names
                .iter()
                .map(|name| name.parse::<TextureChannel>())
                .collect::<Result<Vec<_>, _>>()
                .context(ChannelErr)?,
            None => TextureChannel::ALL.to_vec(),
        };

        let remap = RemapConfig::builder()
            .base_dir(args.ktx2_base.as_deref().unwrap_or(DEFAULT_KTX2_BASE))
            .channels(channels)
            .build();

        let modes = ActivationModes {
            eager: !args.no_eager,
            intercept: !args.no_intercept,
            add_hook: !args.no_add_hook,
        };

        let policy = match args.failure_policy.unwrap_or_default() {
            FailurePolicyArg::Surface => FailurePolicy::Surface,
            FailurePolicyArg::Revert => FailurePolicy::RevertToDefault,
        };

        Ok(SwapConfig {
            remap,
            modes,
            policy,
        })
    }
}
