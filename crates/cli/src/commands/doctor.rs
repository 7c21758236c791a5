use cartwise_agent::embedding::EmbeddingProvider;
use cartwise_agent::index::ProductIndex;
use cartwise_agent::providers::{build_embedder, build_index};
use cartwise_core::config::{AppConfig, ClassifierKind, IndexBackend, LoadOptions};
use cartwise_db::{connect_with_config, ping, CatalogRepository, SqlCatalogRepository};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

impl DoctorCheck {
    fn pass(name: &'static str, details: impl Into<String>) -> Self {
        Self { name, status: CheckStatus::Pass, details: details.into() }
    }

    fn fail(name: &'static str, details: impl Into<String>) -> Self {
        Self { name, status: CheckStatus::Fail, details: details.into() }
    }

    fn skipped(name: &'static str, reason: &str) -> Self {
        Self { name, status: CheckStatus::Skipped, details: format!("skipped because {reason}") }
    }
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

const DEPENDENT_CHECKS: &[&str] =
    &["llm_readiness", "database_connectivity", "catalog_contents", "embedding_provider", "product_index"];

pub fn run(json_output: bool) -> String {
    let report = build_report();

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck::pass("config_validation", "configuration loaded and validated"));
            checks.push(check_llm_readiness(&config));
            checks.extend(check_database(&config));
            checks.extend(check_search_backends(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck::fail("config_validation", error.to_string()));
            checks.extend(
                DEPENDENT_CHECKS
                    .iter()
                    .map(|name| DoctorCheck::skipped(*name, "configuration did not load")),
            );
        }
    }

    let failed = checks.iter().any(|check| check.status == CheckStatus::Fail);
    let overall_status = if failed { CheckStatus::Fail } else { CheckStatus::Pass };
    let summary = if failed {
        "doctor: one or more readiness checks failed".to_string()
    } else {
        "doctor: all readiness checks passed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_llm_readiness(config: &AppConfig) -> DoctorCheck {
    match config.router.classifier {
        ClassifierKind::Rules => {
            DoctorCheck::pass("llm_readiness", "rule-based classifier needs no language backend")
        }
        ClassifierKind::Llm => DoctorCheck::pass(
            "llm_readiness",
            format!(
                "{:?} model `{}` at {} (api key {})",
                config.llm.provider,
                config.llm.model,
                config.llm.effective_base_url(),
                if config.llm.api_key.is_some() { "present" } else { "not set" }
            ),
        ),
    }
}

fn check_database(config: &AppConfig) -> Vec<DoctorCheck> {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return vec![
                DoctorCheck::fail(
                    "database_connectivity",
                    format!("failed to initialize async runtime: {error}"),
                ),
                DoctorCheck::skipped("catalog_contents", "the async runtime did not start"),
            ];
        }
    };

    runtime.block_on(async {
        let pool = match connect_with_config(&config.database).await {
            Ok(pool) => pool,
            Err(error) => {
                return vec![
                    DoctorCheck::fail(
                        "database_connectivity",
                        format!("failed to connect to database: {error}"),
                    ),
                    DoctorCheck::skipped("catalog_contents", "the database is unreachable"),
                ];
            }
        };

        let mut checks = Vec::new();
        match ping(&pool).await {
            Ok(()) => checks.push(DoctorCheck::pass(
                "database_connectivity",
                format!("connected using `{}`", config.database.url),
            )),
            Err(error) => checks.push(DoctorCheck::fail(
                "database_connectivity",
                format!("connected but ping failed: {error}"),
            )),
        }

        let catalog = SqlCatalogRepository::new(pool.clone());
        checks.push(match catalog.count().await {
            Ok(0) => DoctorCheck::fail("catalog_contents", "catalog is empty; run `cartwise seed`"),
            Ok(count) => DoctorCheck::pass("catalog_contents", format!("{count} products in catalog")),
            Err(error) => DoctorCheck::fail(
                "catalog_contents",
                format!("could not count products ({error}); run `cartwise migrate`"),
            ),
        });

        pool.close().await;
        checks
    })
}

fn check_search_backends(config: &AppConfig) -> Vec<DoctorCheck> {
    let embedding = match build_embedder(&config.embedding) {
        Ok(embedder) => DoctorCheck::pass(
            "embedding_provider",
            format!("{} embedder with {} dimensions", embedder.name(), embedder.dimensions()),
        ),
        Err(error) => DoctorCheck::fail("embedding_provider", error.to_string()),
    };

    let index = match build_index(&config.index) {
        Ok(index) => match config.index.backend {
            IndexBackend::Memory => DoctorCheck::pass(
                "product_index",
                format!("in-memory collection `{}` is hydrated at startup", index.collection()),
            ),
            IndexBackend::Qdrant => DoctorCheck::pass(
                "product_index",
                format!(
                    "qdrant client ready for collection `{}` at {}",
                    index.collection(),
                    config.index.url.as_deref().unwrap_or("<unset>")
                ),
            ),
        },
        Err(error) => DoctorCheck::fail("product_index", error.to_string()),
    };

    vec![embedding, index]
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::{render_human, CheckStatus, DoctorCheck, DoctorReport};

    #[test]
    fn human_rendering_marks_each_check() {
        let report = DoctorReport {
            overall_status: CheckStatus::Fail,
            summary: "doctor: one or more readiness checks failed".to_string(),
            checks: vec![
                DoctorCheck::pass("config_validation", "configuration loaded and validated"),
                DoctorCheck::fail("catalog_contents", "catalog is empty; run `cartwise seed`"),
                DoctorCheck::skipped("product_index", "configuration did not load"),
            ],
        };

        let rendered = render_human(&report);
        assert!(rendered.contains("- [ok] config_validation"));
        assert!(rendered.contains("- [fail] catalog_contents"));
        assert!(rendered.contains("- [skip] product_index: skipped because configuration did not load"));
    }
}
