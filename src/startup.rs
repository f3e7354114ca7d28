use crate::adapters::Repositories;
use crate::authentication::TokenService;
use crate::configuration::{DatabaseSettings, Settings, StorageBackend};
use crate::domains::{DonationRequestRepository, FundRepository, UserRepository};
use crate::routes::{self, add_error_chain, health_check, not_found, ApiError};
use actix_web::dev::Server;
use actix_web::http::StatusCode;
use actix_web::middleware::{Condition, ErrorHandlers};
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

pub struct Application {
    server: Server,
    port: u16,
}

impl Application {
    /// Builds the store selected by `database.backend`, migrating Postgres first.
    pub async fn build(settings: &Settings) -> Result<Self, anyhow::Error> {
        let repositories = match settings.database.backend {
            StorageBackend::Postgres => {
                let pool = get_connection_pool(&settings.database);
                sqlx::migrate!("./migrations")
                    .run(&pool)
                    .await
                    .context("Failed to migrate the database")?;
                Repositories::postgres(pool, settings.database.timeout())
            }
            StorageBackend::InMemory => Repositories::in_memory(),
        };
        Self::build_with_repositories(settings, repositories)
    }

    pub fn build_with_repositories(
        settings: &Settings,
        repositories: Repositories,
    ) -> Result<Self, anyhow::Error> {
        let address = format!("{}:{}", settings.application.host, settings.application.port);
        let listener = TcpListener::bind(&address)
            .with_context(|| format!("Failed to bind {}", address))?;
        let port = listener.local_addr()?.port();
        let tokens = TokenService::new(
            settings.application.token_secret.clone(),
            settings.application.token_ttl(),
        );
        let server = run(
            listener,
            repositories,
            tokens,
            settings.environment.exposes_error_details(),
        )?;

        Ok(Self { server, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn get_connection_pool(settings: &DatabaseSettings) -> PgPool {
    PgPoolOptions::new()
        .acquire_timeout(settings.timeout())
        .connect_lazy_with(settings.with_db())
}

fn run(
    listener: TcpListener,
    repositories: Repositories,
    tokens: TokenService,
    expose_error_details: bool,
) -> Result<Server, std::io::Error> {
    let users: web::Data<dyn UserRepository> = web::Data::from(repositories.users);
    let donation_requests: web::Data<dyn DonationRequestRepository> =
        web::Data::from(repositories.donation_requests);
    let funds: web::Data<dyn FundRepository> = web::Data::from(repositories.funds);
    let tokens = web::Data::new(tokens);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Condition::new(
                expose_error_details,
                ErrorHandlers::new().handler(StatusCode::INTERNAL_SERVER_ERROR, add_error_chain),
            ))
            .wrap(TracingLogger::default())
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                ApiError::ValidationError(err.to_string()).into()
            }))
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                ApiError::ValidationError(err.to_string()).into()
            }))
            .app_data(web::PathConfig::default().error_handler(|err, _req| {
                ApiError::NotFound(format!("Resource not found: {}", err)).into()
            }))
            .app_data(users.clone())
            .app_data(donation_requests.clone())
            .app_data(funds.clone())
            .app_data(tokens.clone())
            .service(health_check)
            .configure(routes::api)
            .default_service(web::to(not_found))
    })
    .listen(listener)?
    .run();

    Ok(server)
}
