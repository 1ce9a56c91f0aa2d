use std::sync::Arc;

use clinic_core::ClinicApp;

pub struct ClinicAxumState<R, P>
where
    R: Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    pub app: Arc<ClinicApp<R, P>>,
}

impl<R, P> Clone for ClinicAxumState<R, P>
where
    R: Send + Sync + 'static,
    P: Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            app: Arc::clone(&self.app),
        }
    }
}
