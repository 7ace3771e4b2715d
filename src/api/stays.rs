//! Stay endpoints.

use tracing::{info, instrument};

use super::client::{segment, StayHubClient};
use super::error::Result;
use super::types::PublicStay;

impl StayHubClient {
    /// Get the public check-in instructions of a stay.
    ///
    /// This endpoint does not require a session.
    #[instrument(skip(self))]
    pub async fn public_stay(&self, stay_id: &str) -> Result<PublicStay> {
        self.get(&format!("/public/stay/{}", segment(stay_id))).await
    }

    /// Cancel a stay.
    #[instrument(skip(self))]
    pub async fn cancel_stay(&self, stay_id: &str) -> Result<()> {
        self.delete(&format!("/stay/{}", segment(stay_id))).await?;
        info!(stay_id = %stay_id, "Stay cancelled");
        Ok(())
    }
}
