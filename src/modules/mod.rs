pub mod catalog;

use bookshelf_kernel::ModuleRegistry;
use sea_orm::DatabaseConnection;

/// Register all application modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, db: &DatabaseConnection) {
    registry.register(catalog::create_module(db.clone()));
}
