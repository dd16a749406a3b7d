use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use log::{error, info, warn};
use std::sync::Arc;

use lazytodo::auth::{PasswordHasher, TokenService};
use lazytodo::config::Config;
use lazytodo::mail::{Mailer, MemoryMailer, SmtpMailer};
use lazytodo::motivation::OpenAiClient;
use lazytodo::routes::{self, health};
use lazytodo::store::{MemoryStore, PgStore, Store};
use lazytodo::{AppError, AppState};

async fn build_state(config: &Config) -> Result<AppState, AppError> {
    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => Arc::new(PgStore::connect(url).await?),
        None => {
            warn!("DATABASE_URL is not set; data is kept in memory and lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let mailer: Arc<dyn Mailer> = match &config.mail {
        Some(mail) => Arc::new(SmtpMailer::new(mail, &config.mail_sender)?),
        None => {
            warn!("SMTP_HOST is not set; outgoing email is only logged");
            Arc::new(MemoryMailer::new())
        }
    };

    if config.openai.api_key.is_none() {
        warn!("OPENAI_API_KEY is not set; motivation requests will be rejected upstream");
    }

    Ok(AppState::new(
        store,
        TokenService::from_millis(&config.jwt_secret, config.jwt_expiration_ms),
        PasswordHasher::new(config.bcrypt_cost),
        mailer,
        Arc::new(OpenAiClient::new(&config.openai)?),
    ))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let config = Config::from_env().map_err(|e| {
        error!("Invalid configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;

    let state = build_state(&config).await.map_err(|e| {
        error!("Failed to start: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e)
    })?;
    let state = web::Data::new(state);

    info!("Starting lazytodo server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(health::health)
            .service(web::scope("/api").configure(routes::config))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
