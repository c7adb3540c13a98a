use argh::FromArgs;

fn comma_list(list: &str) -> Result<Vec<String>, String> {
    let items: Vec<String> = list
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect();

    if items.is_empty() {
        return Err(format!("expected a comma separated list, got {list:?}"));
    }

    Ok(items)
}

fn failure_policy(policy: &str) -> Result<FailurePolicyArg, String> {
    match policy {
        "surface" => Ok(FailurePolicyArg::Surface),
        "revert" => Ok(FailurePolicyArg::Revert),
        _ => Err(format!(
            "unknown failure policy {policy:?}, expected \"surface\" or \"revert\""
        )),
    }
}

/// What to do when a texture that was moved to the compressed variant fails to load.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum FailurePolicyArg {
    #[default]
    Surface,
    Revert,
}

/// Swap compressed KTX2 variants in for the WebP textures of a splat scene.
#[derive(Debug, Default, FromArgs)]
pub struct SwapArgs {
    /// directory holding the .ktx2 variants
    #[argh(option)]
    pub ktx2_base: Option<String>,
    /// comma separated channel names to remap
    #[argh(option, from_str_fn(comma_list))]
    pub channels: Option<Vec<String>>,
    /// comma separated extension names the graphics context reports
    #[argh(option, from_str_fn(comma_list))]
    pub extensions: Option<Vec<String>>,
    /// failure policy, "surface" (default) or "revert"
    #[argh(option, from_str_fn(failure_policy))]
    pub failure_policy: Option<FailurePolicyArg>,

    /// skip the pass over already registered assets
    #[argh(switch)]
    pub no_eager: bool,
    /// do not wrap the texture handler's load entry point
    #[argh(switch)]
    pub no_intercept: bool,
    /// do not remap assets as they are added to the registry
    #[argh(switch)]
    pub no_add_hook: bool,

    /// asset listing to remap
    #[argh(positional)]
    pub assets: Option<String>,
}

impl SwapArgs {
    /// Parses arguments without the command name.
    pub fn parse(args: &[&str]) -> Result<SwapArgs, String> {
        SwapArgs::from_args(&["sogswap"], args).map_err(|exit| exit.output)
    }

    /// Parses the process arguments. Prints usage or the parse error and exits when they
    /// are not valid.
    pub fn from_env() -> SwapArgs {
        argh::from_env()
    }
}
