//! Load Catalogs use case.
//!
//! Fetches the perspective catalog and the provider catalog (availability
//! plus each usable provider's models) and converts gateway failures into
//! session errors.

use crate::ports::council_gateway::CouncilGateway;
use council_domain::{ModelId, PerspectiveCatalog, Provider, ProviderCatalog, SessionError};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};

/// Use case for loading the selection catalogs
#[derive(Clone)]
pub struct LoadCatalogsUseCase {
    gateway: Arc<dyn CouncilGateway>,
}

impl LoadCatalogsUseCase {
    pub fn new(gateway: Arc<dyn CouncilGateway>) -> Self {
        Self { gateway }
    }

    pub async fn load_perspectives(&self) -> Result<PerspectiveCatalog, SessionError> {
        info!("Loading perspectives");
        match self.gateway.perspectives().await {
            Ok(catalog) => {
                info!("Loaded {} perspectives", catalog.len());
                Ok(catalog)
            }
            Err(e) => {
                warn!("Failed to load perspectives: {}", e);
                Err(SessionError::perspectives_unavailable())
            }
        }
    }

    /// Availability of every known provider, then the models of each usable
    /// one (fetched concurrently).
    ///
    /// A failed availability check marks only that provider unusable; the
    /// load fails when no check succeeds at all. A failed model fetch leaves
    /// that provider's list empty.
    pub async fn load_providers(&self) -> Result<ProviderCatalog, SessionError> {
        let providers = Provider::checked_providers();
        info!("Checking availability of {} providers", providers.len());

        let checks = join_all(
            providers
                .iter()
                .map(|provider| self.gateway.provider_availability(provider)),
        )
        .await;

        let mut availability = Vec::with_capacity(providers.len());
        let mut failed = 0;
        for (provider, check) in providers.iter().zip(checks) {
            match check {
                Ok(available) => availability.push((provider.clone(), available)),
                Err(e) => {
                    warn!("Availability check for {} failed: {}", provider, e);
                    failed += 1;
                    availability.push((provider.clone(), false));
                }
            }
        }
        if failed == providers.len() {
            return Err(SessionError::providers_unavailable());
        }

        let mut catalog = ProviderCatalog::new(availability);
        let usable: Vec<Provider> = catalog.usable().cloned().collect();
        let lists = join_all(usable.iter().map(|provider| self.gateway.models(provider))).await;
        for (provider, list) in usable.into_iter().zip(lists) {
            match list {
                Ok(models) => catalog.set_models(provider, models),
                Err(e) => {
                    warn!("Failed to fetch models for {}: {}", provider, e);
                    catalog.set_models(provider, Vec::new());
                }
            }
        }

        info!(
            "Usable providers: {}",
            catalog
                .usable()
                .map(|p| p.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        Ok(catalog)
    }

    pub async fn load_models(&self, provider: &Provider) -> Result<Vec<ModelId>, SessionError> {
        info!("Loading models for {}", provider);
        self.gateway.models(provider).await.map_err(|e| {
            warn!("Failed to fetch models for {}: {}", provider, e);
            SessionError::models_unavailable(provider)
        })
    }
}
