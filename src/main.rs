use std::sync::Arc;

use fitx_coach::coaching::{CoachController, TransitionContext, ViewOptions};
use fitx_coach::config::{CoachConfig, RunMode};
use fitx_coach::llm::create_provider;
use fitx_coach::sessions::{self, SessionStore};
use fitx_coach::web::{AppState, coach_routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = CoachConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  export OPENAI_API_KEY=sk-...");
        std::process::exit(1);
    });

    eprintln!("💪 FitX Coach v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Model: {}", config.llm.model);
    if let Some(limit) = config.history_limit {
        eprintln!("   Chat history: last {limit} messages");
    }

    let llm = create_provider(&config.llm)?;
    let controller = Arc::new(CoachController::new(
        llm,
        TransitionContext {
            history_limit: config.history_limit,
        },
    ));

    match config.mode {
        RunMode::Cli => {
            eprintln!("   Mode: cli (/quit to exit)\n");
            let options = ViewOptions {
                booking_url: config.booking_url,
                voice: false,
            };
            fitx_coach::cli::run(controller, options).await?;
        }
        RunMode::Server => {
            eprintln!("   Mode: server");
            eprintln!("   Sessions API: http://0.0.0.0:{}/api/sessions", config.port);
            eprintln!(
                "   Session idle timeout: {} min\n",
                config.session_idle_timeout.as_secs() / 60
            );

            let store = SessionStore::new(config.session_idle_timeout);
            let _expiry_handle = sessions::spawn_expiry_task(store.clone());

            let app = coach_routes(AppState {
                sessions: store,
                controller,
                view_options: ViewOptions {
                    booking_url: config.booking_url,
                    voice: true,
                },
            });

            let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
            tracing::info!(port = config.port, "Coach server started");
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
