use std::sync::Arc;

use lostfound_identity::{
    controller::{RegistrationController, RegistrationView},
    entity::Role,
    form::RegistrationForm,
    infra::MySqlUserRepository,
    service::DefaultUserService,
    usecase::RegistrationWorkflow,
    validator::{Field, FieldValidationState},
};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// Console stand-in for the registration window.
struct ConsoleView;

impl RegistrationView for ConsoleView {
    fn set_form_enabled(&mut self, _enabled: bool) {}

    fn set_busy(&mut self, busy: bool) {
        if busy {
            println!("Registering...");
        }
    }

    fn show_error(&mut self, message: &str) {
        eprintln!("Error: {}", message);
    }

    fn show_success(&mut self, message: &str) {
        println!("{}", message);
    }

    fn navigate_to_login(&mut self) {
        println!("-> login");
    }
}

fn label(field: Field) -> &'static str {
    match field {
        Field::FullName => "Full Name",
        Field::Email => "Email Address",
        Field::ContactNumber => "Contact Number",
        Field::Password => "Password",
        Field::ConfirmPassword => "Confirm Password",
    }
}

async fn read_line(
    lines: &mut Lines<BufReader<Stdin>>,
) -> anyhow::Result<String> {
    match lines.next_line().await? {
        Some(line) => Ok(line),
        None => anyhow::bail!("input closed before registration finished"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = lostfound::config::AppConfig::new(
        lostfound::util::workspace_dir().join("configs"),
    )?;
    lostfound::logging::init_tracing(&config.logging)?;
    tracing::info!("app config: {:?}", config);

    let actor_is_admin = std::env::args().any(|arg| arg == "--admin");

    let pool = lostfound::db::connect(&config.database).await?;
    let service =
        Arc::new(DefaultUserService::new(pool, Arc::new(MySqlUserRepository)));
    let mut controller = RegistrationController::new(
        RegistrationForm::new(actor_is_admin),
        RegistrationWorkflow::new(service),
        ConsoleView,
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        println!("Create New Account");
        for field in Field::ALL {
            print!("{}: ", label(field));
            std::io::Write::flush(&mut std::io::stdout())?;
            let value = read_line(&mut lines).await?;
            let form = controller.form_mut();
            form.focus(field);
            for (changed, state) in form.set_field(field, value) {
                if state == FieldValidationState::Invalid {
                    eprintln!("  ! {} looks wrong", label(changed));
                }
            }
            form.blur();
        }

        if controller.form().roles().len() > 1 {
            print!("Account Type [User/Admin]: ");
            std::io::Write::flush(&mut std::io::stdout())?;
            let role = match read_line(&mut lines).await?.trim() {
                "Admin" => Role::Admin,
                _ => Role::User,
            };
            controller.form_mut().select_role(role)?;
        }

        if controller.register().await?.is_success() {
            break;
        }
    }
    Ok(())
}
