use studybot_core::{
    classify, ApplicationError, BuildInfo, BuildRegistry, ChatMessage, ChatbotResponse, Intent,
    JobProvider, ValidationError,
};
use tracing::info;

use crate::responses;

pub struct ChatbotService<P> {
    registry: BuildRegistry<P>,
}

impl<P> ChatbotService<P>
where
    P: JobProvider,
{
    pub fn new(provider: P) -> Self {
        Self { registry: BuildRegistry::new(provider) }
    }

    pub fn registry(&self) -> &BuildRegistry<P> {
        &self.registry
    }

    /// Blank text is rejected before classification. Provider failures while
    /// listing or resolving a build propagate; a failed scheduling call does
    /// not, it becomes a `build_failed` response.
    pub async fn process_message(
        &self,
        message: &ChatMessage,
    ) -> Result<ChatbotResponse, ApplicationError> {
        if message.is_blank() {
            return Err(ValidationError::EmptyMessage.into());
        }

        let intent = classify(&message.text);
        info!(
            event_name = "agent.message.classified",
            student_id = %message.student_id,
            intent = intent.label(),
            text = %message.text,
            "processing message from student"
        );

        let response = match intent {
            Intent::Help => responses::help(),
            Intent::ListBuilds => responses::build_list(self.available_builds().await?),
            Intent::StartBuild { number } => {
                self.handle_build_request(&number, &message.student_id).await?
            }
            Intent::Greeting => responses::greeting(),
            Intent::Unknown => responses::not_understood(),
        };
        Ok(response)
    }

    pub async fn available_builds(&self) -> Result<Vec<BuildInfo>, ApplicationError> {
        Ok(self.registry.list_available_builds().await?)
    }

    pub async fn start_build(&self, build_number: &str, student_id: &str) -> bool {
        self.registry.start_build(build_number, student_id).await
    }

    async fn handle_build_request(
        &self,
        build_number: &str,
        student_id: &str,
    ) -> Result<ChatbotResponse, ApplicationError> {
        let Some(job_name) = self.registry.find_job_by_build_number(build_number).await? else {
            return Ok(responses::build_not_found(build_number));
        };

        if self.registry.start_build(build_number, student_id).await {
            Ok(responses::build_started(build_number, &job_name))
        } else {
            Ok(responses::build_failed(build_number))
        }
    }
}
