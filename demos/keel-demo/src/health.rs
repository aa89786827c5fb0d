use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use keel_di::{capability, implements, Component, Constructor};

/// Configuration handed to the resolver as an instance
pub struct AppConfig {
    pub app_name: String,
    pub port: u16,
}
capability!(AppConfig);

pub trait IProbe: Send + Sync {
    fn check(&self) -> bool;
}
capability!(dyn IProbe);

pub struct Probe {
    checks: AtomicU64,
}
impl IProbe for Probe {
    fn check(&self) -> bool {
        self.checks.fetch_add(1, Ordering::Relaxed);
        true
    }
}
impl Component for Probe {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::from_fn(|| Probe {
            checks: AtomicU64::new(0),
        })]
    }
}
implements!(Probe => dyn IProbe);
capability!(Probe);

pub struct HealthService {
    config: Arc<AppConfig>,
    probe: Arc<dyn IProbe>,
}
impl HealthService {
    pub fn report(&self) -> String {
        let status = if self.probe.check() { "up" } else { "down" };
        format!("{} on :{} is {}", self.config.app_name, self.config.port, status)
    }
}
impl Component for HealthService {
    fn constructors() -> Vec<Constructor<Self>> {
        vec![Constructor::inject2(
            |config: Arc<AppConfig>, probe: Arc<dyn IProbe>| HealthService { config, probe },
        )]
    }
}
capability!(HealthService);
