use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::inquiries::services::InquiryService;
use crate::features::locations::services::LocationService;

/// Geocode a location, then refresh the distance of the inquiry that needs it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeocodeJob {
    pub location_id: Uuid,
    pub inquiry_id: Uuid,
}

/// Sending half of the geocode queue
#[derive(Clone)]
pub struct GeocodeDispatcher {
    tx: mpsc::Sender<GeocodeJob>,
}

impl GeocodeDispatcher {
    /// Create a bounded queue and its dispatcher
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<GeocodeJob>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Enqueue without waiting. Returns false when the job was dropped.
    pub fn dispatch(&self, job: GeocodeJob) -> bool {
        match self.tx.try_send(job) {
            Ok(()) => true,
            Err(TrySendError::Full(job)) => {
                tracing::warn!(
                    "Geocode queue full, dropping job for inquiry {} (location {})",
                    job.inquiry_id,
                    job.location_id
                );
                false
            }
            Err(TrySendError::Closed(job)) => {
                tracing::error!(
                    "Geocode worker is not running, dropping job for inquiry {}",
                    job.inquiry_id
                );
                false
            }
        }
    }
}

/// Background worker that resolves location coordinates outside the request path
pub struct GeocodeWorker {
    rx: mpsc::Receiver<GeocodeJob>,
    location_service: Arc<LocationService>,
    inquiry_service: Arc<InquiryService>,
}

impl GeocodeWorker {
    pub fn new(
        rx: mpsc::Receiver<GeocodeJob>,
        location_service: Arc<LocationService>,
        inquiry_service: Arc<InquiryService>,
    ) -> Self {
        Self {
            rx,
            location_service,
            inquiry_service,
        }
    }

    /// Process jobs until every dispatcher is dropped
    pub async fn run(mut self) {
        tracing::info!("Starting geocode worker");

        while let Some(job) = self.rx.recv().await {
            if let Err(e) = self.process_job(job).await {
                tracing::error!(
                    "Failed to process geocode job for inquiry {}: {:?}",
                    job.inquiry_id,
                    e
                );
            }
        }

        tracing::info!("Geocode worker stopped");
    }

    async fn process_job(&self, job: GeocodeJob) -> Result<()> {
        let location = self.location_service.get_by_id(job.location_id).await?;
        let (location, outcome) = self.location_service.ensure_coordinates(location).await?;

        if !outcome.is_resolved() {
            tracing::info!(
                "Location {} still has no coordinates ({:?}), inquiry {} keeps no distance",
                location.id,
                outcome,
                job.inquiry_id
            );
            return Ok(());
        }

        let inquiry = self
            .inquiry_service
            .recompute_distance(job.inquiry_id)
            .await?;

        tracing::debug!(
            "Inquiry {} distance filled in: {:?} km",
            inquiry.id,
            inquiry.distance_km
        );

        Ok(())
    }
}
