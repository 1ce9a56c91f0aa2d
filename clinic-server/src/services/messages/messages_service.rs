use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use clinic_core::{ClinicService, ServiceCapabilities, TenantContext};
use serde_json::Value;

use crate::services::{ClinicParams, ClinicState};

use super::{messages_shared, MessageFilter};

/// Read-only view over the stored WhatsApp conversation log.
pub struct MessagesService {
    pub state: Arc<ClinicState>,
}

#[async_trait]
impl ClinicService<Value, ClinicParams> for MessagesService {
    fn capabilities(&self) -> ServiceCapabilities {
        messages_shared::capabilities()
    }

    async fn find(&self, ctx: &TenantContext, params: ClinicParams) -> Result<Vec<Value>> {
        let filter = MessageFilter::try_from(&params)?;
        let result = self.state.run(ctx, messages_shared::find_statement(&filter)).await?;
        Ok(result.rows)
    }
}
