use std::collections::BTreeSet;

use storefront_db::{SampleCatalog, SeedResult};

use crate::commands::{with_migrated_pool, CommandResult, EXIT_EXECUTION};

pub fn run() -> CommandResult {
    let outcome = with_migrated_pool("seed", |_, pool| async move {
        let loaded = SampleCatalog::load(&pool)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), EXIT_EXECUTION))?;

        let verification = SampleCatalog::verify(&pool)
            .await
            .map_err(|error| ("seed_verification", error.to_string(), EXIT_EXECUTION))?;
        if !verification.all_present {
            let missing = verification
                .checks
                .iter()
                .filter_map(|(sku, present)| (!present).then_some(sku.as_str()))
                .collect::<Vec<_>>();
            return Err(("seed_verification", verification_message(&missing), EXIT_EXECUTION));
        }

        Ok(loaded)
    });

    match outcome {
        Ok(loaded) => CommandResult::success("seed", summary(&loaded)),
        Err(result) => result,
    }
}

fn summary(loaded: &SeedResult) -> String {
    let categories = SampleCatalog::products()
        .into_iter()
        .map(|product| product.category)
        .collect::<BTreeSet<_>>();
    format!(
        "sample catalog loaded: {} created, {} updated across {} categories ({})",
        loaded.created,
        loaded.updated,
        categories.len(),
        categories.into_iter().collect::<Vec<_>>().join(", ")
    )
}

fn verification_message(missing: &[&str]) -> String {
    if missing.is_empty() {
        "Some sample products failed to load".to_string()
    } else {
        format!("Seed verification failed for SKUs: {}", missing.join(", "))
    }
}
