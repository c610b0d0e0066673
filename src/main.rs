use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::io;
use std::sync::Arc;

use todo_api::{
    auth::TokenIssuer,
    config::Config,
    routes,
    store::{postgres, PgTodoStore, PgUserStore, TodoStore, UserStore},
};

fn startup_error(err: impl std::fmt::Display) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err.to_string())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env().map_err(startup_error)?;
    let issuer = web::Data::new(TokenIssuer::new(config.token_settings()).map_err(startup_error)?);

    let pool = postgres::connect(&config).await.map_err(startup_error)?;
    let users: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool.clone(), config.db_timeout));
    let todos: Arc<dyn TodoStore> = Arc::new(PgTodoStore::new(pool, config.db_timeout));
    let users = web::Data::from(users);
    let todos = web::Data::from(todos);

    log::info!("Starting todo-api server at {}", config.server_url());
    HttpServer::new(move || {
        let issuer = issuer.clone();
        App::new()
            .app_data(users.clone())
            .app_data(todos.clone())
            .app_data(issuer.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(|cfg| routes::config(cfg, issuer))
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
