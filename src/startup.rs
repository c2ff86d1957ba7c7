use actix_files as fs;
use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;

use crate::auth::roles;
use crate::configuration::JwtSettings;
use crate::logger::RequestLogger;
use crate::middleware::{RequireAuth, RequireRoles};
use crate::routes::{health_check, list_users, login, logout, me, refresh, register};
use crate::store::UserStore;

pub fn run(
    listener: TcpListener,
    store: UserStore,
    jwt_config: JwtSettings,
) -> Result<Server, std::io::Error> {
    let store = web::Data::new(store);
    let jwt_config_data = web::Data::new(jwt_config.clone());

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestLogger)
            // Shared state
            .app_data(store.clone())
            .app_data(jwt_config_data.clone())
            // Public routes
            .route("/health_check", web::get().to(health_check))
            .route("/auth/register", web::post().to(register))
            .route("/auth/login", web::post().to(login))
            .route("/auth/refresh", web::get().to(refresh))
            .route("/auth/logout", web::get().to(logout))
            // Protected routes (valid access token required)
            .service(
                web::scope("/api")
                    .wrap(RequireAuth::new(jwt_config.clone()))
                    .route("/me", web::get().to(me))
                    .service(
                        web::resource("/users")
                            .wrap(RequireRoles::any_of(&[roles::ADMIN, roles::EDITOR]))
                            .route(web::get().to(list_users)),
                    ),
            )
            // Static file serving (must be last to not override API routes)
            .service(fs::Files::new("/", "./public").index_file("index.html"))
    })
    .listen(listener)?
    .run();

    Ok(server)
}
