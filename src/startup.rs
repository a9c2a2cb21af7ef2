use actix_web::dev::Server;
use actix_web::{middleware::Logger, web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::admin::AdminManager;
use crate::api_tokens::ApiTokenManager;
use crate::auth::TokenService;
use crate::configuration::JwtSettings;
use crate::identity::IdentityStore;
use crate::ledger::{LedgerStore, RevocationLedger};
use crate::middleware::{OptionalApiToken, RequireApiToken, RequireRole, SessionAuth};
use crate::routes::{
    change_full_name, change_password, create_api_token, delete_account, delete_all_api_tokens,
    delete_api_token, get_current_user, grant_admin, health_check, list_api_tokens, list_users,
    login, logout, register, whoami,
};

/// Assembles the application over explicitly injected stores, so tests can
/// drive it with the in-memory implementations.
pub fn run(
    listener: TcpListener,
    identities: Arc<dyn IdentityStore>,
    ledger_store: Arc<dyn LedgerStore>,
    jwt: JwtSettings,
) -> Result<Server, std::io::Error> {
    let ledger = RevocationLedger::new(ledger_store);
    let tokens = TokenService::new(jwt, ledger);

    let sessions = web::Data::new(crate::sessions::SessionManager::new(
        identities.clone(),
        tokens.clone(),
    ));
    let api_tokens = web::Data::new(ApiTokenManager::new(identities.clone(), tokens.clone()));
    let admin = web::Data::new(AdminManager::new(identities));

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(sessions.clone())
            .app_data(api_tokens.clone())
            .app_data(admin.clone())
            // Public routes
            .route("/health_check", web::get().to(health_check))
            .route("/auth/register", web::post().to(register))
            .route("/auth/login", web::post().to(login))
            // Bearer-authenticated machine surface. OptionalApiToken is the
            // outer wrap: it resolves the context RequireApiToken checks.
            .service(
                web::scope("/api")
                    .wrap(RequireApiToken)
                    .wrap(OptionalApiToken::new(tokens.clone()))
                    .route("/whoami", web::get().to(whoami)),
            )
            // Session-authenticated surface
            .service(
                web::scope("")
                    .wrap(SessionAuth::new(tokens.clone()))
                    .route("/auth/logout", web::post().to(logout))
                    .route("/auth/me", web::get().to(get_current_user))
                    .route("/users/delete", web::delete().to(delete_account))
                    .route("/users/update/full_name", web::put().to(change_full_name))
                    .route("/users/update/password", web::put().to(change_password))
                    .route("/users/api_token/create", web::post().to(create_api_token))
                    .route("/users/api_token/list", web::get().to(list_api_tokens))
                    // "/all" must register before the "{token}" catch-all
                    .route("/users/api_token/all", web::delete().to(delete_all_api_tokens))
                    .route("/users/api_token/{token}", web::delete().to(delete_api_token))
                    .service(
                        web::scope("/admin")
                            .service(
                                web::resource("/users")
                                    .wrap(RequireRole::admin())
                                    .route(web::get().to(list_users)),
                            )
                            .service(
                                web::resource("/grant-admin/{target_id}")
                                    .wrap(RequireRole::super_admin())
                                    .route(web::get().to(grant_admin)),
                            ),
                    ),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
