//! Built-in catalog for Stratus.
//!
//! Three layers, each registered into its own registry:
//!
//! ```text
//! web_application          Registry<Blueprint>
//!      │ composes
//!      ▼
//! network compute database cache cdn monitoring      Registry<Component>
//!      │ declare
//!      ▼
//! aws_vpc aws_subnet aws_lb aws_db_instance ...      Registry<ResourceKind>
//! ```
//!
//! Everything here is submitted through `inventory` and can also be
//! registered explicitly. Both paths use the defining module as the
//! provider, so loading the catalog twice is a no-op.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod components;
pub mod estimate;
pub mod kinds;
pub mod web_application;

pub use components::{register_components, subnet_cidr};
pub use estimate::{monthly_cost, security_score};
pub use kinds::{kind_names, register_kinds};
pub use web_application::web_application;

use stratus_compose::Blueprint;
use stratus_foundation::Result;
use stratus_registry::Registry;

/// Registers every catalog blueprint into `registry`, returning how many
/// were registered.
///
/// # Errors
///
/// Fails if another provider already registered `web_application`, or if
/// the registry is frozen.
pub fn register_blueprints(registry: &Registry<Blueprint>) -> Result<usize> {
    let blueprint = web_application::blueprint(web_application::PROVIDER);
    registry.register(blueprint.kind().to_string(), blueprint)?;
    Ok(1)
}


#[cfg(test)]
mod tests {
    use super::*;
    use stratus_compose::register_blueprints as inventory_blueprints;

    #[test]
    fn blueprints_register_once_across_both_paths() {
        let registry = Registry::new("blueprint");
        assert_eq!(register_blueprints(&registry).unwrap(), 1);
        inventory_blueprints(&registry).unwrap();
        assert_eq!(registry.names(), vec!["web_application".to_string()]);
    }
}
