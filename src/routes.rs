use anyhow::Context;
use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, info_span, Instrument};

use crate::audio::AudioPayload;
use crate::error::{panic_response, ApiError};
use crate::health::ReadinessReport;
use crate::job::ConversionJob;
use crate::rvc::InferenceRequest;
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    let body_limit = state.config.server.max_upload_bytes;

    let router = Router::new()
        .route("/clone", post(clone_voice))
        .route("/health", get(health_check));
    with_middleware(router, body_limit).with_state(state)
}

fn with_middleware<S>(router: Router<S>, body_limit: usize) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(CorsLayer::permissive())
            .layer(DefaultBodyLimit::max(body_limit)),
    )
}

async fn health_check(State(state): State<AppState>) -> Json<ReadinessReport> {
    Json(ReadinessReport::collect(&state.layout, &state.profile))
}

/// Fields of a `/clone` upload
#[derive(Debug, Default)]
struct CloneForm {
    audio: Option<Bytes>,
    target_voice: Option<String>,
}

impl CloneForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = CloneForm::default();
        let mut seen_field = false;
        loop {
            let field = match multipart.next_field().await {
                Ok(Some(field)) => field,
                Ok(None) => break,
                // A form with no parts at all fails to parse
                Err(e) if !seen_field && e.status() == StatusCode::BAD_REQUEST => {
                    return Err(ApiError::MissingAudio)
                }
                Err(e) => return Err(e.into()),
            };
            seen_field = true;
            match field.name() {
                Some("audio") => form.audio = Some(field.bytes().await?),
                Some("target_voice") => form.target_voice = Some(field.text().await?),
                _ => {}
            }
        }
        Ok(form)
    }
}

async fn clone_voice(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<AudioPayload, ApiError> {
    let multipart = multipart.map_err(|e| ApiError::InvalidUpload(e.body_text()))?;
    let form = CloneForm::read(multipart).await?;

    let audio = form.audio.ok_or(ApiError::MissingAudio)?;
    let target_voice = form
        .target_voice
        .unwrap_or_else(|| state.profile.name.clone());
    info!("Voice cloning request: {}", target_voice);

    if !state.profile.matches(&target_voice) {
        return Err(ApiError::UnsupportedVoice {
            requested: target_voice,
            supported: state.profile.name.clone(),
        });
    }
    if audio.is_empty() {
        return Err(ApiError::EmptyAudio);
    }
    if !state.layout.is_installed() {
        return Err(ApiError::RvcNotInstalled {
            root: state.layout.root().to_path_buf(),
        });
    }

    // Detached: a client disconnect must not kill RVC or skip job cleanup
    tokio::spawn(convert(state, audio))
        .await
        .context("Conversion task aborted")?
}

async fn convert(state: AppState, audio: Bytes) -> Result<AudioPayload, ApiError> {
    let _slot = match &state.job_slots {
        Some(slots) => Some(
            slots
                .clone()
                .acquire_owned()
                .await
                .context("Job limiter closed")?,
        ),
        None => None,
    };

    let job = ConversionJob::create_in(&state.scratch_dir).context("Failed to create job directory")?;
    let span = info_span!("conversion", job_id = %job.id(), voice = %state.profile.name);

    async {
        tokio::fs::write(job.input_path(), &audio)
            .await
            .context("Failed to save uploaded audio")?;
        info!("Input saved: {} ({} bytes)", job.input_path().display(), audio.len());

        let request = InferenceRequest {
            input_path: job.input_path().to_path_buf(),
            output_path: job.output_path().to_path_buf(),
            profile: (*state.profile).clone(),
        };
        let output = state.runner.convert(&request).await?;

        let payload =
            AudioPayload::assemble(state.transcoder.as_ref(), &output, &state.profile.name).await?;
        info!(
            "Sending {} ({} bytes)",
            payload.format.content_type(),
            payload.bytes.len()
        );
        Ok::<_, ApiError>(payload)
    }
    .instrument(span)
    .await
    // `job` drops here and removes every temporary
}
