use cartwise_core::config::ConfigOverrides;
use cartwise_db::{SeedCatalog, SqlCatalogRepository};

use crate::commands::{build_async_runtime, load_config, open_catalog, CommandResult, Failure};

pub fn run() -> CommandResult {
    let config = match load_config("seed", ConfigOverrides::default()) {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match build_async_runtime("seed") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let pool = open_catalog(&config).await?;
        let catalog = SqlCatalogRepository::new(pool.clone());

        let outcome = async {
            let seeded = SeedCatalog::load(&catalog)
                .await
                .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;
            let verification = SeedCatalog::verify(&catalog)
                .await
                .map_err(|error| ("seed_verification", error.to_string(), 6u8))?;

            if !verification.all_present {
                let failed = verification
                    .checks
                    .iter()
                    .filter_map(|(check, passed)| (!passed).then_some(*check))
                    .collect::<Vec<_>>();
                return Err(("seed_verification", verification_message(&failed), 6u8));
            }
            Ok::<_, Failure>(seeded)
        }
        .await;

        pool.close().await;
        outcome
    });

    match result {
        Ok(seeded) => CommandResult::success(
            "seed",
            format!(
                "seeded {} products across {} categories",
                seeded.products_seeded, seeded.categories
            ),
        ),
        Err(failure) => CommandResult::from_failure("seed", failure),
    }
}

fn verification_message(failed_checks: &[&str]) -> String {
    if failed_checks.is_empty() {
        "Some seed data failed to load".to_string()
    } else {
        format!("Seed verification failed for checks: {}", failed_checks.join(", "))
    }
}
