//! License lifecycle operations.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use gatesync_core::config::device::DeviceConfig;
use gatesync_core::error::AppError;
use gatesync_core::result::AppResult;
use gatesync_core::types::pagination::{PageRequest, PageResponse};
use gatesync_database::repositories::gate::GateRepository;
use gatesync_database::repositories::license::LicenseRepository;
use gatesync_entity::gate::Gate;
use gatesync_entity::license::DeviceLicense;

use super::keygen::generate_key;

/// Issues, validates, regenerates, and revokes device license keys.
#[derive(Debug, Clone)]
pub struct LicenseService {
    licenses: Arc<LicenseRepository>,
    gates: Arc<GateRepository>,
    config: DeviceConfig,
}

impl LicenseService {
    /// Creates a new license service.
    pub fn new(
        licenses: Arc<LicenseRepository>,
        gates: Arc<GateRepository>,
        config: DeviceConfig,
    ) -> Self {
        Self {
            licenses,
            gates,
            config,
        }
    }

    /// Issue `quantity` licenses bound to a gate the company owns.
    pub async fn generate(
        &self,
        company_id: Uuid,
        gate_id: Uuid,
        quantity: u32,
    ) -> AppResult<Vec<DeviceLicense>> {
        if quantity == 0 || quantity > self.config.max_batch_size {
            return Err(AppError::validation(format!(
                "quantity must be between 1 and {}",
                self.config.max_batch_size
            )));
        }

        let gate = self
            .gates
            .find_owned(gate_id, company_id)
            .await?
            .ok_or_else(|| AppError::not_found("Gate not found for this company"))?;

        let mut issued = Vec::with_capacity(quantity as usize);
        for _ in 0..quantity {
            let key = self.draw_unique_key().await?;
            let license = self.licenses.create(&key, gate.id, company_id).await?;
            issued.push(license);
        }

        info!(
            gate_id = %gate_id,
            company_id = %company_id,
            count = issued.len(),
            "Issued device licenses"
        );
        Ok(issued)
    }

    /// Issue a new key for an existing license, forgetting usage history.
    ///
    /// The old key is rejected from this point on; `first_used_at` and
    /// `last_used_at` are reset to unset.
    pub async fn regenerate(&self, license_id: Uuid) -> AppResult<DeviceLicense> {
        let key = self.draw_unique_key().await?;
        let license = self
            .licenses
            .replace_key(license_id, &key)
            .await?
            .ok_or_else(|| AppError::not_found("License not found"))?;

        info!(license_id = %license_id, "Regenerated license key");
        Ok(license)
    }

    /// Validate a key: active, not soft-deleted, with its gate binding.
    pub async fn validate(&self, key: &str) -> AppResult<(DeviceLicense, Gate)> {
        let license = self
            .licenses
            .find_valid_by_key(key)
            .await?
            .ok_or_else(|| AppError::not_found("License not found"))?;

        let gate = self
            .gates
            .find_by_id(license.gate_id)
            .await?
            .ok_or_else(|| AppError::not_found("Gate for license not found"))?;

        Ok((license, gate))
    }

    /// Soft-delete licenses. Existing connections are not terminated;
    /// validity is re-checked on every request instead.
    pub async fn revoke(&self, company_id: Uuid, ids: &[Uuid]) -> AppResult<u64> {
        let revoked = self.licenses.soft_delete(ids, company_id).await?;
        info!(company_id = %company_id, revoked, "Revoked licenses");
        Ok(revoked)
    }

    /// Paginated license listing for the admin surface.
    pub async fn list(
        &self,
        company_id: Uuid,
        page: PageRequest,
    ) -> AppResult<PageResponse<DeviceLicense>> {
        let (items, total) = self.licenses.list_by_company(company_id, &page).await?;
        Ok(PageResponse::new(items, page.page, page.page_size, total))
    }

    /// Draw a key that does not collide with any existing one.
    ///
    /// Bounded: after `max_generate_attempts` collisions the call fails
    /// instead of spinning.
    async fn draw_unique_key(&self) -> AppResult<String> {
        for _ in 0..self.config.max_generate_attempts {
            let key = generate_key(self.config.license_key_length);
            if !self.licenses.key_exists(&key).await? {
                return Ok(key);
            }
        }
        Err(AppError::internal(
            "Exhausted license key generation attempts",
        ))
    }
}
