// src/cli/run.rs — Command handlers: compare, generate, evaluate, distance

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::core::events::EventSink;
use crate::core::run::{ComparisonRun, ComparisonRunner};
use crate::core::types::{GeoPoint, ItineraryRequest, Strategy};
use crate::evaluation::route::leg_km;
use crate::evaluation::{
    aggregate, total_distance_km, Geocoder, Judge, NominatimService, PlaceExtractor,
};
use crate::generation::Generator;
use crate::infra::config::Config;
use crate::infra::paths;
use crate::prompts::PromptBuilder;
use crate::provider::{resolver, ModelProvider, ModelRef};

use super::progress::terminal_progress;
use super::report::{render_json, render_report};

/// A resolved model role: the provider plus the bare model name it expects.
struct Role {
    provider: Arc<dyn ModelProvider>,
    model: String,
}

fn resolve_role(
    config: &Config,
    configured: &str,
    model_override: Option<&str>,
) -> anyhow::Result<Role> {
    let reference = model_override.unwrap_or(configured);
    let model_ref = ModelRef::parse(reference).ok_or_else(|| {
        anyhow::anyhow!(
            "Invalid model '{reference}', expected provider/model (e.g. groq/llama-3.1-8b-instant)"
        )
    })?;
    let provider = resolver::resolve(&model_ref, &config.retry)?;
    Ok(Role {
        provider,
        model: model_ref.model,
    })
}

fn build_judge(
    config: &Config,
    model_override: Option<&str>,
    prompts: Arc<PromptBuilder>,
) -> anyhow::Result<Judge> {
    let role = resolve_role(config, &config.models.judge, model_override)?;
    Ok(Judge::new(role.provider, role.model, prompts))
}

/// Wire every pipeline component from config.
pub fn build_runner(
    config: &Config,
    model_override: Option<&str>,
    quiet: bool,
) -> anyhow::Result<ComparisonRunner> {
    let prompts = Arc::new(PromptBuilder::new()?);

    let generator_role = resolve_role(config, &config.models.generator, model_override)?;
    let extractor_role = resolve_role(config, &config.models.extractor, model_override)?;

    let generator = Generator::new(
        generator_role.provider,
        generator_role.model,
        prompts.clone(),
        config.generation.clone(),
    );
    let extractor = PlaceExtractor::new(
        extractor_role.provider,
        extractor_role.model,
        prompts.clone(),
        Duration::from_secs(config.comparison.extraction_delay_secs),
    );
    let geocoder = Geocoder::new(
        Arc::new(NominatimService::new(&config.geocoding)),
        &config.geocoding,
    );
    let judge = build_judge(config, model_override, prompts)?;

    let runner = ComparisonRunner::new(
        generator,
        extractor,
        geocoder,
        judge,
        config.comparison.clone(),
        config.retrieval.clone(),
    );
    Ok(if quiet {
        runner
    } else {
        runner.with_progress(terminal_progress())
    })
}

fn output_path(output: Option<&str>, run: &ComparisonRun) -> PathBuf {
    output
        .map(PathBuf::from)
        .unwrap_or_else(|| paths::run_file_path(&run.id))
}

fn print_run(run: &ComparisonRun, json: bool) -> anyhow::Result<()> {
    if json {
        let records = run.records.as_deref().unwrap_or_default();
        println!("{}", render_json(records)?);
    } else {
        print!("{}", render_report(run));
    }
    Ok(())
}

fn ensure_any_result(run: &ComparisonRun) -> anyhow::Result<()> {
    if run.results.is_empty() && !run.failures.is_empty() {
        anyhow::bail!("All {} strategies failed", run.failures.len());
    }
    Ok(())
}

/// `wayfare compare`
pub async fn run_compare(
    request: ItineraryRequest,
    strategies: &[Strategy],
    config: &Config,
    model_override: Option<&str>,
    output: Option<&str>,
    json: bool,
    quiet: bool,
) -> anyhow::Result<()> {
    let runner = build_runner(config, model_override, quiet)?;
    let run = runner.compare(request, strategies).await?;

    let path = output_path(output, &run);
    run.save(&path)?;
    if !quiet {
        eprintln!("[saved] {}", path.display());
    }

    print_run(&run, json)?;
    ensure_any_result(&run)
}

/// `wayfare generate`
pub async fn run_generate(
    request: ItineraryRequest,
    strategies: &[Strategy],
    config: &Config,
    model_override: Option<&str>,
    output: Option<&str>,
    quiet: bool,
) -> anyhow::Result<()> {
    let runner = build_runner(config, model_override, quiet)?;
    let run = runner.generate(request, strategies).await?;

    let path = output_path(output, &run);
    run.save(&path)?;
    println!("{}", path.display());

    for failure in &run.failures {
        eprintln!("  {} failed: {}", failure.strategy.id(), failure.error);
    }
    ensure_any_result(&run)
}

/// `wayfare evaluate <run.json>`. Re-scores the run and writes it back.
pub async fn run_evaluate(
    run_path: &Path,
    config: &Config,
    model_override: Option<&str>,
    json: bool,
    quiet: bool,
) -> anyhow::Result<()> {
    let mut run = ComparisonRun::load(run_path)?;
    if run.results.is_empty() {
        anyhow::bail!("Run {} has no results to evaluate", run.id);
    }

    let prompts = Arc::new(PromptBuilder::new()?);
    let judge = build_judge(config, model_override, prompts)?;
    let events = if quiet {
        EventSink::none()
    } else {
        EventSink::new(terminal_progress())
    };

    run.records = Some(aggregate(&run.results, &run.request, &judge, &events).await);
    run.save(run_path)?;

    print_run(&run, json)
}

/// `wayfare distance`
pub fn run_distance(points: &[GeoPoint]) -> anyhow::Result<()> {
    if points.is_empty() {
        anyhow::bail!("Give at least one --point lat,lon");
    }
    for (i, pair) in points.windows(2).enumerate() {
        println!(
            "  leg {}: {} -> {}  {:.2} km",
            i + 1,
            pair[0].name,
            pair[1].name,
            leg_km(&pair[0], &pair[1])
        );
    }
    println!(
        "Total: {:.2} km over {} point(s)",
        total_distance_km(points),
        points.len()
    );
    Ok(())
}
