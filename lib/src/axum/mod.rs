pub mod auth;
pub mod car;
pub mod error;
pub mod extract;
pub mod gallery;
pub mod user;

pub use extract::user::User;

use std::sync::Arc;

use axum::Extension;

use crate::Result;
use crate::{Config, Database};

pub type Router = axum::Router<cookie::Key>;

pub type ConfigExt<C = Config> = Extension<Arc<C>>;
pub type DbExt = Extension<Arc<Database>>;

/// Registers gari routes on the provided router.
///
/// Meant to be used if there is a need to register custom middleware that
/// will run on gari routes.
///
/// # Configurable routes
///
/// It's possible to customize the routes registered with this function
/// through relevant config declarations. This is helpful in cases where we
/// want to still register the same route with the same gari handler but
/// also add a middleware layer on top of that route.
pub fn router(mut router: Router, config: &Config) -> Router {
    router = conditional_merge("auth", router, auth::router(config), config);
    router = conditional_merge("user", router, user::router(), config);
    router = conditional_merge("car", router, car::router(), config);
    conditional_merge("gallery", router, gallery::router(), config)
}

fn conditional_merge(route: &str, routera: Router, routerb: Router, config: &Config) -> Router {
    if config.routes.enable.contains(&route.to_string())
        || !config.routes.disable.contains(&route.to_string())
    {
        routera.merge(routerb)
    } else {
        routera
    }
}

/// Registers gari routes on the provided router, initializes application
/// state and starts the web server.
pub async fn start(router: Router, config: Config) -> Result<()> {
    let db = if config.db.temporary {
        Database::temporary()?
    } else {
        Database::open(&config.db.path)?
    };
    start_with(db, router, config).await
}

pub async fn start_with(db: Database, mut router: Router, config: Config) -> Result<()> {
    crate::tracing::init(&config).unwrap_or_else(|e| {
        log::warn!("failed to initialize tracing (perhaps it was already initialized?): {e}")
    });

    // Provide initial state as defined in config
    if config.init.enabled {
        crate::init::initialize(&config, &db)?;
    }

    // Generate mock data. Basically we want to be able to create a full
    // "synthetic" state consisting of all the different data items.
    if config.dev.enabled && config.dev.mock {
        crate::mock::generate(&config, &db)?;
    }

    // Generate the cookie key. We store the cookie key in state instead of
    // in the state extension because of how cookies extraction is
    // currently implemented in axum.
    let key = if config.dev.enabled {
        // In dev mode the cookie key is stored in memory and only persists
        // until application is rerun.
        cookie::Key::generate()
    } else {
        // Otherwise the cookie key is stored in the db and persisted
        // between application restarts.
        match db.get_at::<Vec<u8>>("cookie_keys", uuid::Uuid::nil()) {
            Ok(k) => cookie::Key::from(&k),
            Err(_) => {
                let k = cookie::Key::generate();
                db.set_raw_at("cookie_keys", &k.master(), uuid::Uuid::nil())?;
                k
            }
        }
    };

    if config.assets.serve {
        router = router.nest_service(
            "/assets",
            tower_http::services::ServeDir::new(&config.assets.path),
        );
    }

    // Encapsulate application state
    let addr = config.address;

    let router = router
        // Register common state extension for all routes
        .layer(Extension(Arc::new(config)))
        .layer(Extension(Arc::new(db)))
        .with_state(key);

    // Serve the application
    tracing::info!("starting server at {addr}");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed binding to addr: {addr}");
    axum::serve(listener, router).await.map_err(|e| e.into())
}
