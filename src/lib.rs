//! Bookshelf application library
//!
//! Wires settings, the database, and the application modules into a servable
//! [`Application`].

pub mod modules;

use anyhow::Context;
use axum::Router;
use bookshelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};
use sea_orm::{ConnectionTrait, DatabaseConnection};

/// A bootstrapped application: open database, installed schema, initialized modules.
pub struct Application {
    pub settings: Settings,
    pub db: DatabaseConnection,
    pub registry: ModuleRegistry,
}

impl Application {
    /// Connect, install every module's tables, and initialize the modules.
    ///
    /// With `reset` all tables are dropped and recreated, then seeded.
    pub async fn bootstrap(settings: Settings, reset: bool) -> anyhow::Result<Self> {
        let db = bookshelf_db::connect(&settings.database).await?;

        let mut registry = ModuleRegistry::new();
        modules::register_all(&mut registry, &db);

        let tables: Vec<_> = registry
            .collect_schema(db.get_database_backend())
            .into_iter()
            .map(|(_, table)| table)
            .collect();
        bookshelf_db::install_schema(&db, &tables, reset)
            .await
            .with_context(|| "failed to install schema")?;

        let ctx = InitCtx {
            settings: &settings,
            db: &db,
        };
        if reset {
            registry.seed_modules(&ctx).await?;
        }
        registry.init_modules(&ctx).await?;

        Ok(Self {
            settings,
            db,
            registry,
        })
    }

    /// The full HTTP router, middleware included.
    pub fn router(&self) -> Router {
        bookshelf_http::build_router(&self.registry, &self.settings)
    }

    /// Start the modules and serve HTTP until shutdown, then stop the modules.
    pub async fn serve(&self) -> anyhow::Result<()> {
        let ctx = InitCtx {
            settings: &self.settings,
            db: &self.db,
        };
        self.registry.start_modules(&ctx).await?;

        let served = bookshelf_http::start_server(&self.registry, &self.settings).await;
        self.registry.stop_modules().await?;
        served
    }
}
