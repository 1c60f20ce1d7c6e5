use lostfound::{Error, Result};

use crate::{
    form::RegistrationForm,
    service::UserService,
    usecase::{RegistrationOutcome, RegistrationWorkflow, WorkflowState},
};

/// What the controller needs from the screen.
pub trait RegistrationView: Send {
    fn set_form_enabled(&mut self, enabled: bool);
    fn set_busy(&mut self, busy: bool);
    fn show_error(&mut self, message: &str);
    fn show_success(&mut self, message: &str);
    fn navigate_to_login(&mut self);
}

/// Glue between one form, its workflow and the view showing it.
pub struct RegistrationController<S, V>
where
    S: UserService + 'static,
    V: RegistrationView,
{
    form: RegistrationForm,
    workflow: RegistrationWorkflow<S>,
    view: V,
}

impl<S, V> RegistrationController<S, V>
where
    S: UserService + 'static,
    V: RegistrationView,
{
    pub fn new(
        form: RegistrationForm,
        workflow: RegistrationWorkflow<S>,
        view: V,
    ) -> Self {
        Self {
            form,
            workflow,
            view,
        }
    }

    pub fn form(&self) -> &RegistrationForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut RegistrationForm {
        &mut self.form
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn workflow(&self) -> &RegistrationWorkflow<S> {
        &self.workflow
    }

    /// Submits the current form content. The view stays disabled and busy
    /// until the outcome is in, then either moves to login or comes back
    /// with the reason.
    pub async fn register(&mut self) -> Result<RegistrationOutcome> {
        match self.workflow.state() {
            WorkflowState::Idle => {}
            WorkflowState::Succeeded => return Err(Error::RegistrationClosed),
            _ => return Err(Error::SubmissionInFlight),
        }

        let request = self.form.to_request();
        self.view.set_form_enabled(false);
        self.view.set_busy(true);

        let outcome = match self.workflow.submit(request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.view.set_busy(false);
                self.view.set_form_enabled(self.workflow.is_form_enabled());
                return Err(e);
            }
        };

        self.view.set_busy(false);
        if outcome.is_success() {
            self.view.show_success(outcome.message());
            self.view.navigate_to_login();
        } else {
            self.view.set_form_enabled(true);
            self.view.show_error(outcome.message());
        }
        Ok(outcome)
    }

    pub fn clear(&mut self) {
        self.form.clear();
    }

    pub fn back_to_login(&mut self) {
        tracing::info!("navigating back to login");
        self.view.navigate_to_login();
    }
}
