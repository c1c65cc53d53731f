//! services/api/src/bin/farmer.rs
//!
//! A terminal client for the farming assistant. It signs in, onboards the
//! farmer if needed, prints the dashboard and then chats. `/pest <image>`
//! analyses a crop photo and `/quit` signs out.

use api_lib::{adapters::HttpBackend, config::ConfigError, error::ApiError};
use rytu_mitra_core::client::{
    chat::{ChatClient, ChatTurn},
    dashboard::{load_dashboard, sign_out, Dashboard, DashboardLoad},
    detection::{DetectionOutcome, ImageUpload, PestDetectionClient},
    display::weather_advice,
    onboarding::{OnboardingClient, Route},
    Notification,
};
use rytu_mitra_core::domain::{Language, KNOWN_CROPS};
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type Input = Lines<BufReader<Stdin>>;

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingVar(name.to_string()))
}

async fn prompt(input: &mut Input, label: &str) -> Result<Option<String>, ApiError> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(label.as_bytes()).await?;
    stdout.flush().await?;
    Ok(input.next_line().await?.map(|l| l.trim().to_string()))
}

fn show(notification: Option<Notification>) {
    if let Some(n) = notification {
        println!("[{:?}] {}", n.level, n.message);
    }
}

fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/jpeg",
    }
}

fn print_dashboard(dashboard: &Dashboard) {
    println!("=== {} ===", dashboard.title());
    if let Some(name) = dashboard.profile.as_ref().and_then(|p| p.full_name.as_deref()) {
        println!("{}", name);
    }
    let w = &dashboard.weather;
    println!(
        "{}: {} | humidity {} | wind {} | rain {}",
        w.location, w.temperature, w.humidity, w.wind_speed, w.rainfall
    );
    println!("{}", weather_advice(dashboard.language));
    for sample in &dashboard.crop_health {
        println!("  {:>10}  {}", sample.label, sample.health);
    }
}

async fn onboard(backend: Arc<HttpBackend>, input: &mut Input) -> Result<Route, ApiError> {
    let mut onboarding = OnboardingClient::new(backend);
    println!("Known crops: {}", KNOWN_CROPS.join(", "));

    let Some(location) = prompt(input, "Location: ").await? else {
        return Ok(Route::Landing);
    };
    let Some(crop) = prompt(input, "Crop: ").await? else {
        return Ok(Route::Landing);
    };
    let Some(language) = prompt(input, "Language [telugu/english]: ").await? else {
        return Ok(Route::Landing);
    };

    onboarding.form.location = location;
    onboarding.form.crop_type = crop;
    if !language.is_empty() {
        onboarding.form.preferred_language = Language::from_preference(&language);
    }

    let route = onboarding.submit().await;
    show(onboarding.take_notification());
    Ok(route)
}

async fn analyze_image(detection: &mut PestDetectionClient, path: &str) {
    let path = Path::new(path);
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            println!("Cannot read {}: {}", path.display(), e);
            return;
        }
    };
    match detection.analyze(ImageUpload::new(bytes, mime_for(path))).await {
        DetectionOutcome::Analyzed { report, recording } => {
            let marker = if report.is_high_severity() { "!!" } else { "--" };
            println!("{} {} ({})", marker, report.pest_name, report.severity);
            println!("{}", report.recommendations);
            if let Err(e) = recording.await {
                warn!(error = %e, "Detection record task failed.");
            }
        }
        DetectionOutcome::Failed { .. } => {}
    }
    show(detection.take_notification());
}

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(env_or("RUST_LOG", "warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let base_url = env_or("RYTU_API_URL", "http://localhost:3000");
    let email = required_env("FARMER_EMAIL")?;
    let password = required_env("FARMER_PASSWORD")?;

    let backend = Arc::new(HttpBackend::new(base_url)?);
    backend.login(&email, &password).await?;

    let mut input = BufReader::new(tokio::io::stdin()).lines();

    let dashboard = loop {
        match load_dashboard(&*backend).await {
            DashboardLoad::Ready(dashboard) => break dashboard,
            DashboardLoad::Redirect(Route::Onboarding) => {
                if onboard(backend.clone(), &mut input).await? != Route::Dashboard {
                    return Ok(());
                }
            }
            DashboardLoad::Redirect(route) => {
                println!("Cannot open the dashboard ({:?}).", route);
                return Ok(());
            }
        }
    };
    print_dashboard(&dashboard);

    let mut chat = ChatClient::new(backend.clone(), dashboard.language);
    let mut detection = PestDetectionClient::new(backend.clone(), dashboard.language);
    println!("{}", chat.empty_hint());

    while let Some(line) = prompt(&mut input, "> ").await? {
        if line == "/quit" {
            break;
        }
        if let Some(path) = line.strip_prefix("/pest ") {
            analyze_image(&mut detection, path.trim()).await;
            continue;
        }

        chat.set_input(line);
        match chat.send().await {
            ChatTurn::Answered { reply, recording } => {
                println!("{}", reply);
                if let Err(e) = recording.await {
                    warn!(error = %e, "Query record task failed.");
                }
            }
            ChatTurn::Failed { .. } | ChatTurn::Skipped => {}
        }
        show(chat.take_notification());
    }

    let (_, notification) = sign_out(&*backend).await;
    println!("{}", notification.message);
    Ok(())
}
