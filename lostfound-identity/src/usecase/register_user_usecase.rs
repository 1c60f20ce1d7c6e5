use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lostfound::{Error, Result};
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::{
    service::UserService,
    usecase::{
        MSG_REGISTRATION_DECLINED, RegisterUserUseCase, RegistrationOutcome,
        RegistrationRequest,
    },
    validator::validate_submission,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    Validating,
    CheckingDuplicate,
    Persisting,
    /// Terminal. The caller moves on to the login screen.
    Succeeded,
}

/// Turns the engine's error text into something a user can read. This is a
/// plain substring match on the message, so it follows the engine wording.
pub fn classify_database_error(message: &str) -> String {
    let lower = message.to_lowercase();
    if lower.contains("duplicate entry") && lower.contains("email") {
        "Email already registered".to_string()
    } else if lower.contains("foreign key constraint") {
        "Invalid user data: related record not found".to_string()
    } else {
        format!("Database error: {}", message)
    }
}

fn lock(state: &Mutex<WorkflowState>) -> MutexGuard<'_, WorkflowState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Claim on the workflow for one attempt. Whoever holds it decides the
/// final state; dropping it unsettled (worker panic) reopens the form.
struct InFlight {
    state: Arc<Mutex<WorkflowState>>,
    settled: bool,
}

impl InFlight {
    fn begin(state: &Arc<Mutex<WorkflowState>>) -> Result<Self> {
        let mut current = lock(state);
        match *current {
            WorkflowState::Idle => {
                *current = WorkflowState::Validating;
                Ok(Self {
                    state: Arc::clone(state),
                    settled: false,
                })
            }
            WorkflowState::Succeeded => Err(Error::RegistrationClosed),
            _ => Err(Error::SubmissionInFlight),
        }
    }

    fn advance(&self, next: WorkflowState) {
        tracing::trace!(?next, "registration workflow");
        *lock(&self.state) = next;
    }

    fn settle(mut self, outcome: &RegistrationOutcome) {
        *lock(&self.state) = if outcome.is_success() {
            WorkflowState::Succeeded
        } else {
            WorkflowState::Idle
        };
        self.settled = true;
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if !self.settled {
            *lock(&self.state) = WorkflowState::Idle;
        }
    }
}

/// Registration workflow of one form: validate, check for an existing
/// account, then write on a worker task. At most one attempt runs at a time.
pub struct RegistrationWorkflow<S: UserService + 'static> {
    service: Arc<S>,
    state: Arc<Mutex<WorkflowState>>,
}

impl<S: UserService + 'static> RegistrationWorkflow<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self {
            service,
            state: Arc::new(Mutex::new(WorkflowState::Idle)),
        }
    }

    pub fn state(&self) -> WorkflowState {
        *lock(&self.state)
    }

    /// Inputs and buttons are only live while nothing is in flight.
    pub fn is_form_enabled(&self) -> bool {
        self.state() == WorkflowState::Idle
    }

    /// Runs one attempt to completion. Rejected with
    /// [`Error::SubmissionInFlight`] while another attempt is pending and
    /// with [`Error::RegistrationClosed`] once an attempt has succeeded.
    pub async fn submit(
        &self,
        request: RegistrationRequest,
    ) -> Result<RegistrationOutcome> {
        let flight = InFlight::begin(&self.state)?;
        let span = tracing::info_span!(
            "registration",
            email = %request.email,
            role = %request.role,
        );
        Ok(self.run(flight, request).instrument(span).await)
    }

    /// Fire-and-forget variant for event loops: the in-flight check happens
    /// now, the attempt runs on a task and `on_complete` gets its outcome.
    pub fn submit_with<F>(
        self: &Arc<Self>,
        request: RegistrationRequest,
        on_complete: F,
    ) -> Result<JoinHandle<()>>
    where
        F: FnOnce(RegistrationOutcome) + Send + 'static,
    {
        let flight = InFlight::begin(&self.state)?;
        let span = tracing::info_span!(
            "registration",
            email = %request.email,
            role = %request.role,
        );
        let this = Arc::clone(self);
        Ok(tokio::spawn(
            async move {
                let outcome = this.run(flight, request).await;
                on_complete(outcome);
            }
            .instrument(span),
        ))
    }

    async fn run(
        &self,
        flight: InFlight,
        request: RegistrationRequest,
    ) -> RegistrationOutcome {
        tracing::info!("attempting user registration");

        if let Err(e) = validate_submission(
            &request.full_name,
            &request.email,
            &request.contact_number,
            &request.password,
            &request.confirm_password,
        ) {
            tracing::warn!(
                field = ?e.field,
                "registration failed: {}",
                e.message
            );
            let outcome = RegistrationOutcome::ValidationFailure {
                field: e.field,
                message: e.message.to_string(),
            };
            flight.settle(&outcome);
            return outcome;
        }

        flight.advance(WorkflowState::CheckingDuplicate);
        match self.service.find_user_by_email(&request.email).await {
            Ok(None) => {}
            Ok(Some(_)) => {
                tracing::warn!("registration failed: email already exists");
                let outcome = RegistrationOutcome::DuplicateEmail;
                flight.settle(&outcome);
                return outcome;
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    "database error during email check"
                );
                let message =
                    e.database_message().unwrap_or_else(|| e.to_string());
                let outcome = RegistrationOutcome::PersistenceFailure {
                    message: classify_database_error(&message),
                };
                flight.settle(&outcome);
                return outcome;
            }
        }

        flight.advance(WorkflowState::Persisting);
        let service = Arc::clone(&self.service);
        let worker = tokio::spawn(
            async move {
                let result = service
                    .register_user_with_role(
                        &request.full_name,
                        &request.email,
                        &request.password,
                        request.role,
                        &request.contact_number,
                    )
                    .await;
                let outcome = interpret_registration(result);
                flight.settle(&outcome);
                outcome
            }
            .in_current_span(),
        );

        match worker.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(error = %e, "registration worker failed");
                RegistrationOutcome::PersistenceFailure {
                    message: format!("Registration failed: {}", e),
                }
            }
        }
    }
}

fn interpret_registration(result: Result<bool>) -> RegistrationOutcome {
    match result {
        Ok(true) => {
            tracing::info!("registration successful");
            RegistrationOutcome::Success
        }
        Ok(false) => {
            tracing::warn!("registration failed: store declined the user");
            RegistrationOutcome::PersistenceFailure {
                message: MSG_REGISTRATION_DECLINED.to_string(),
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "registration error");
            let message = match e.database_message() {
                Some(engine) => classify_database_error(&engine),
                None => format!("Registration failed: {}", e),
            };
            RegistrationOutcome::PersistenceFailure { message }
        }
    }
}

#[async_trait::async_trait]
impl<S: UserService + 'static> RegisterUserUseCase for RegistrationWorkflow<S> {
    async fn execute(
        &self,
        req: RegistrationRequest,
    ) -> Result<RegistrationOutcome> {
        self.submit(req).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Utc;
    use tokio::sync::Notify;

    use super::*;
    use crate::entity::{Role, User};
    use crate::service::MockUserService;
    use crate::usecase::Field;

    fn valid_request() -> RegistrationRequest {
        RegistrationRequest {
            full_name: "Ann Finder".into(),
            email: "ann@lostfound.local".into(),
            contact_number: "1234567890".into(),
            password: "password1".into(),
            confirm_password: "password1".into(),
            role: Role::User,
        }
    }

    fn existing_user() -> User {
        User {
            user_id: 7,
            name: "Ann Finder".into(),
            email: "ann@lostfound.local".into(),
            contact: "1234567890".into(),
            role: Role::User,
            created_at: Utc::now(),
        }
    }

    fn engine_error(message: &str) -> Error {
        Error::Database(anyhow::anyhow!(message.to_string()))
    }

    fn workflow_with(
        mock: MockUserService,
    ) -> RegistrationWorkflow<MockUserService> {
        RegistrationWorkflow::new(Arc::new(mock))
    }

    #[test]
    fn test_classify_database_error() {
        assert_eq!(
            classify_database_error(
                "1062 (23000): Duplicate entry 'ann@lostfound.local' for key 'email'"
            ),
            "Email already registered"
        );
        assert_eq!(
            classify_database_error(
                "Cannot add or update a child row: a FOREIGN KEY CONSTRAINT fails"
            ),
            "Invalid user data: related record not found"
        );
        // duplicate on another key is not an email problem
        assert_eq!(
            classify_database_error("Duplicate entry '5' for key 'PRIMARY'"),
            "Database error: Duplicate entry '5' for key 'PRIMARY'"
        );
        assert_eq!(
            classify_database_error("Communications link FAILURE"),
            "Database error: Communications link FAILURE"
        );
    }

    #[tokio::test]
    async fn test_all_empty_fails_on_full_name() {
        // no expectations: any call into the store panics
        let workflow = workflow_with(MockUserService::new());

        let outcome =
            workflow.submit(RegistrationRequest::default()).await.unwrap();

        assert_eq!(
            outcome,
            RegistrationOutcome::ValidationFailure {
                field: Field::FullName,
                message: "All fields are required".into(),
            }
        );
        assert!(workflow.is_form_enabled());
    }

    #[tokio::test]
    async fn test_password_mismatch_reported_on_confirm_field() {
        let workflow = workflow_with(MockUserService::new());
        let mut request = valid_request();
        request.confirm_password = "password2".into();

        let outcome = workflow.submit(request).await.unwrap();

        assert!(matches!(
            outcome,
            RegistrationOutcome::ValidationFailure {
                field: Field::ConfirmPassword,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_duplicate_email_never_registers() {
        let mut mock = MockUserService::new();
        mock.expect_find_user_by_email()
            .times(1)
            .returning(|_| Ok(Some(existing_user())));
        mock.expect_register_user_with_role().never();
        let workflow = workflow_with(mock);

        let outcome = workflow.submit(valid_request()).await.unwrap();

        assert_eq!(outcome, RegistrationOutcome::DuplicateEmail);
        assert_eq!(workflow.state(), WorkflowState::Idle);
    }

    #[tokio::test]
    async fn test_lookup_failure_stops_before_registering() {
        let mut mock = MockUserService::new();
        mock.expect_find_user_by_email()
            .returning(|_| Err(engine_error("Communications link failure")));
        mock.expect_register_user_with_role().never();
        let workflow = workflow_with(mock);

        let outcome = workflow.submit(valid_request()).await.unwrap();

        assert_eq!(
            outcome,
            RegistrationOutcome::PersistenceFailure {
                message: "Database error: Communications link failure".into(),
            }
        );
        assert!(workflow.is_form_enabled());
    }

    #[tokio::test]
    async fn test_engine_duplicate_classified_as_email_taken() {
        let mut mock = MockUserService::new();
        mock.expect_find_user_by_email().returning(|_| Ok(None));
        mock.expect_register_user_with_role().times(1).returning(
            |_, _, _, _, _| {
                Err(engine_error(
                    "Duplicate entry 'ann@lostfound.local' for key 'email'",
                ))
            },
        );
        let workflow = workflow_with(mock);

        let outcome = workflow.submit(valid_request()).await.unwrap();

        assert_eq!(
            outcome,
            RegistrationOutcome::PersistenceFailure {
                message: "Email already registered".into(),
            }
        );
        assert!(workflow.is_form_enabled());
    }

    #[tokio::test]
    async fn test_foreign_key_failure_classified() {
        let mut mock = MockUserService::new();
        mock.expect_find_user_by_email().returning(|_| Ok(None));
        mock.expect_register_user_with_role().returning(|_, _, _, _, _| {
            Err(engine_error(
                "Cannot add or update a child row: a foreign key constraint fails",
            ))
        });

        let outcome =
            workflow_with(mock).submit(valid_request()).await.unwrap();

        assert_eq!(
            outcome.message(),
            "Invalid user data: related record not found"
        );
    }

    #[tokio::test]
    async fn test_declined_registration_reopens_form() {
        let mut mock = MockUserService::new();
        mock.expect_find_user_by_email().returning(|_| Ok(None));
        mock.expect_register_user_with_role()
            .returning(|_, _, _, _, _| Ok(false));
        let workflow = workflow_with(mock);

        let outcome = workflow.submit(valid_request()).await.unwrap();

        assert_eq!(outcome.message(), "Registration failed. Please try again.");
        assert_eq!(workflow.state(), WorkflowState::Idle);
    }

    #[tokio::test]
    async fn test_non_database_error_keeps_generic_prefix() {
        let mut mock = MockUserService::new();
        mock.expect_find_user_by_email().returning(|_| Ok(None));
        mock.expect_register_user_with_role().returning(|_, _, _, _, _| {
            Err(Error::Internal(anyhow::anyhow!("pool closed")))
        });

        let outcome =
            workflow_with(mock).submit(valid_request()).await.unwrap();

        assert!(outcome.message().starts_with("Registration failed: "));
    }

    #[tokio::test]
    async fn test_success_is_terminal() {
        let mut mock = MockUserService::new();
        mock.expect_find_user_by_email().returning(|_| Ok(None));
        mock.expect_register_user_with_role()
            .times(1)
            .returning(|name, email, _, role, contact| {
                assert_eq!(name, "Ann Finder");
                assert_eq!(email, "ann@lostfound.local");
                assert_eq!(role, Role::User);
                assert_eq!(contact, "1234567890");
                Ok(true)
            });
        let workflow = workflow_with(mock);

        let outcome = workflow.submit(valid_request()).await.unwrap();
        assert_eq!(outcome, RegistrationOutcome::Success);
        assert_eq!(workflow.state(), WorkflowState::Succeeded);
        assert!(!workflow.is_form_enabled());

        let again = workflow.submit(valid_request()).await;
        assert!(matches!(again, Err(Error::RegistrationClosed)));
    }

    struct CrashingUserService;

    #[async_trait::async_trait]
    impl UserService for CrashingUserService {
        async fn find_user_by_email(
            &self,
            _email: &str,
        ) -> Result<Option<User>> {
            Ok(None)
        }

        async fn register_user_with_role(
            &self,
            _name: &str,
            _email: &str,
            _password: &str,
            _role: Role,
            _contact: &str,
        ) -> Result<bool> {
            panic!("driver crashed")
        }
    }

    #[tokio::test]
    async fn test_worker_panic_reopens_form() {
        let workflow = RegistrationWorkflow::new(Arc::new(CrashingUserService));

        let outcome = workflow.submit(valid_request()).await.unwrap();

        assert!(outcome.message().starts_with("Registration failed: "));
        assert!(workflow.is_form_enabled());
    }

    #[derive(Default)]
    struct GatedUserService {
        entered: Notify,
        release: Notify,
        registrations: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl UserService for GatedUserService {
        async fn find_user_by_email(
            &self,
            _email: &str,
        ) -> Result<Option<User>> {
            Ok(None)
        }

        async fn register_user_with_role(
            &self,
            _name: &str,
            _email: &str,
            _password: &str,
            _role: Role,
            _contact: &str,
        ) -> Result<bool> {
            self.registrations.fetch_add(1, Ordering::SeqCst);
            self.entered.notify_one();
            self.release.notified().await;
            Ok(true)
        }
    }

    #[tokio::test]
    async fn test_second_submit_rejected_while_persisting() {
        let service = Arc::new(GatedUserService::default());
        let workflow = Arc::new(RegistrationWorkflow::new(service.clone()));

        let first = tokio::spawn({
            let workflow = workflow.clone();
            async move { workflow.submit(valid_request()).await }
        });

        service.entered.notified().await;
        assert_eq!(workflow.state(), WorkflowState::Persisting);
        assert!(!workflow.is_form_enabled());

        let second = workflow.submit(valid_request()).await;
        assert!(matches!(second, Err(Error::SubmissionInFlight)));

        service.release.notify_one();
        let outcome = first.await.unwrap().unwrap();
        assert_eq!(outcome, RegistrationOutcome::Success);
        assert_eq!(service.registrations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_submit_with_delivers_single_outcome() {
        let service = Arc::new(GatedUserService::default());
        let workflow = Arc::new(RegistrationWorkflow::new(service.clone()));
        let (tx, rx) = tokio::sync::oneshot::channel();

        let handle = workflow
            .submit_with(valid_request(), move |outcome| {
                let _ = tx.send(outcome);
            })
            .unwrap();

        // claimed synchronously, before the task even runs
        assert!(matches!(
            workflow.submit_with(valid_request(), |_| {}),
            Err(Error::SubmissionInFlight)
        ));

        service.release.notify_one();
        handle.await.unwrap();
        assert_eq!(rx.await.unwrap(), RegistrationOutcome::Success);
        assert_eq!(workflow.state(), WorkflowState::Succeeded);
    }

    #[tokio::test]
    async fn test_usecase_trait_delegates_to_submit() {
        let workflow = workflow_with(MockUserService::new());
        let usecase: &dyn RegisterUserUseCase = &workflow;

        let outcome =
            usecase.execute(RegistrationRequest::default()).await.unwrap();

        assert!(!outcome.is_success());
    }
}
