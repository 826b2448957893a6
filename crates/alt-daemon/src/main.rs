#![deny(unsafe_code)]
use alt_config::{DescriberStrategy, PipelineConfig, TranslatorStrategy};
use alt_daemon::transport::{
    HttpClient, ReqwestDescriberTransport, ReqwestIdentityTransport, ReqwestStorageTransport,
    ReqwestTranslatorTransport,
};
use alt_daemon::{build_app, AppState};
use alt_describe::{CaptionTagsDescriber, Describer, MultimodalDescriber, Phi4Describer};
use alt_identity::IdentityTokenProvider;
use alt_orchestrator::PipelineOrchestrator;
use alt_prompt::PromptLibrary;
use alt_storage::ObjectStoreClient;
use alt_translate::{ChatCompletionTranslator, DedicatedTranslator, Translator};
use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Ingest container name (§6 "Persisted state layout"). Fixed, not configurable.
const INGEST_CONTAINER: &str = "ingest";
/// Public container name (§6 "Persisted state layout"). Fixed, not configurable.
const PUBLIC_CONTAINER: &str = "public";

#[derive(Parser, Debug)]
#[command(name = "alt-daemon", version, about = "Image alt-text pipeline daemon")]
struct Args {
    /// Bind address.
    #[arg(long, default_value = "0.0.0.0:8080")]
    bind: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (config, warnings) = PipelineConfig::from_env().context("load pipeline configuration")?;

    let filter = EnvFilter::new(format!("alt={},alt_daemon={}", config.log_level, config.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    for warning in &warnings {
        warn!(%warning, "configuration warning");
    }

    let http = HttpClient::new().context("build reqwest client")?;

    let identity = Arc::new(IdentityTokenProvider::new(
        Arc::new(ReqwestIdentityTransport(http.clone())),
        config.identity_endpoint.clone(),
        config.identity_header.clone(),
        config.client_id.clone(),
    ));

    let storage = ObjectStoreClient::new(ReqwestStorageTransport(http.clone()), config.storage_account.clone());

    let describer = build_describer(&config, &http)?;
    let translator = build_translator(&config, &http)?;

    let orchestrator = PipelineOrchestrator::new(storage, identity, describer, translator, INGEST_CONTAINER, PUBLIC_CONTAINER);

    let state = Arc::new(AppState::new(orchestrator));
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("bind {}", args.bind))?;
    info!(bind = %args.bind, describer = ?config.describer_strategy, translator = ?config.translator_strategy, "alt-daemon listening");

    axum::serve(listener, app).await.context("serve")
}

fn build_describer(config: &PipelineConfig, http: &HttpClient) -> Result<Arc<dyn Describer>> {
    let prompts = PromptLibrary::embedded();
    let endpoint = config
        .foundry_endpoint
        .clone()
        .context("AZURE_FOUNDRY_ENDPOINT is required for the selected describer strategy")?;

    Ok(match config.describer_strategy {
        DescriberStrategy::Slm => {
            let deployment = config.deployment_slm.clone().context("AZURE_FOUNDRY_DEPLOYMENT_SLM is not set")?;
            Arc::new(MultimodalDescriber::new(
                ReqwestDescriberTransport(http.clone()),
                prompts,
                endpoint,
                deployment,
                MultimodalDescriber::<ReqwestDescriberTransport>::SLM_MAX_TOKENS,
            ))
        }
        DescriberStrategy::Llm => {
            let deployment = config.deployment_llm.clone().context("AZURE_FOUNDRY_DEPLOYMENT_LLM is not set")?;
            Arc::new(MultimodalDescriber::new(
                ReqwestDescriberTransport(http.clone()),
                prompts,
                endpoint,
                deployment,
                MultimodalDescriber::<ReqwestDescriberTransport>::LLM_MAX_TOKENS,
            ))
        }
        DescriberStrategy::Vision => {
            let vision_endpoint = config.vision_endpoint.clone().context("AZURE_VISION_ENDPOINT is not set")?;
            Arc::new(CaptionTagsDescriber::new(ReqwestDescriberTransport(http.clone()), vision_endpoint))
        }
        DescriberStrategy::Phi4 => {
            let deployment = config.deployment_llm.clone().context("AZURE_FOUNDRY_DEPLOYMENT_LLM is not set")?;
            Arc::new(Phi4Describer::new(ReqwestDescriberTransport(http.clone()), prompts, endpoint, deployment))
        }
    })
}

fn build_translator(config: &PipelineConfig, http: &HttpClient) -> Result<Arc<dyn Translator>> {
    Ok(match config.translator_strategy {
        TranslatorStrategy::Translator => {
            let endpoint = config.translator_endpoint.clone().context("AZURE_TRANSLATOR_ENDPOINT is not set")?;
            let region = config.translator_region.clone().unwrap_or_default();
            Arc::new(DedicatedTranslator::new(ReqwestTranslatorTransport(http.clone()), endpoint, region))
        }
        TranslatorStrategy::ChatCompletion => {
            let endpoint = config.foundry_endpoint.clone().context("AZURE_FOUNDRY_ENDPOINT is not set")?;
            let deployment = config.deployment_llm.clone().context("AZURE_FOUNDRY_DEPLOYMENT_LLM is not set")?;
            Arc::new(ChatCompletionTranslator::new(ReqwestTranslatorTransport(http.clone()), endpoint, deployment))
        }
    })
}
