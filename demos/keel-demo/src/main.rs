use std::sync::Arc;

use keel_di::{Instance, Lifecycle, ResolveError, Resolver, TypeCatalog};
use tracing_subscriber::EnvFilter;

use health::{AppConfig, HealthService, IProbe, Probe};

mod health;

fn main() -> Result<(), ResolveError> {
    // RUST_LOG=keel_di=trace shows every request
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let catalog = TypeCatalog::new()
        .interface::<dyn IProbe>()
        .implementation::<Probe, dyn IProbe>();

    let resolver = Resolver::global();
    resolver.configure(|registry| {
        registry
            .add_instance(Arc::new(AppConfig {
                app_name: "keel-demo".to_string(),
                port: 8080,
            }))?
            .add_interfaces_with_matching_implementations(&catalog)?
            .add_with_lifecycle::<HealthService, HealthService>(Lifecycle::Singleton)?;
        Ok(())
    })?;

    let health = resolver.get::<HealthService>()?;
    tracing::info!("{}", health.report());

    // Ad hoc configuration only lives for one resolution
    let staging = resolver.get_with::<AppConfig>([Instance::of(Arc::new(AppConfig {
        app_name: "keel-staging".to_string(),
        port: 9090,
    }))])?;
    tracing::info!("Staging config: {} on :{}", staging.app_name, staging.port);

    let mut resolution = resolver.scope();
    let probe = resolution.get::<dyn IProbe>()?;
    let again = resolution.get::<dyn IProbe>()?;
    tracing::info!(
        "Probe shared within one resolution: {}",
        Arc::ptr_eq(&probe, &again)
    );
    drop(resolution);

    let concrete = resolver.get::<Probe>();
    tracing::info!("Concrete probe is not registered: {:?}", concrete.err());

    tracing::debug!("{:?}", resolver);
    Ok(())
}
