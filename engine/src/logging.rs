/// Installs `env_logger` as the backend of the `log` facade.
///
/// `RUST_LOG` overrides the default filter, which keeps wgpu quiet and shows
/// engine and game messages from `info` up.
pub fn init() {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("error,engine=info,cottage_demo=info"),
    )
    .try_init();
}
