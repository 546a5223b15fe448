use async_trait::async_trait;

use crate::application::pipeline::TaskError;

/// Named unit of work run once per height
#[async_trait]
pub trait Task<P: Send>: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self, payload: &mut P) -> Result<(), TaskError>;
}

/// Scratch state built fresh for every height
pub trait HeightPayload: Send {
    fn for_height(height: i64) -> Self;
}
