use cartwise_core::config::ConfigOverrides;

use crate::commands::{build_async_runtime, load_config, open_catalog, CommandResult, Failure};

pub fn run() -> CommandResult {
    let config = match load_config("migrate", ConfigOverrides::default()) {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match build_async_runtime("migrate") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let pool = open_catalog(&config).await?;
        pool.close().await;
        Ok::<(), Failure>(())
    });

    match result {
        Ok(()) => CommandResult::success("migrate", "applied pending migrations"),
        Err(failure) => CommandResult::from_failure("migrate", failure),
    }
}
