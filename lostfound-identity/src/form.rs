//! State behind the registration screen: what was typed, which field has
//! focus, and which roles may be picked.

use lostfound::{Error, Result};

use crate::{
    entity::{Role, available_roles},
    usecase::RegistrationRequest,
    validator::{Field, FieldValidationState, validate_field},
};

#[derive(Debug, Clone)]
pub struct RegistrationForm {
    full_name: String,
    email: String,
    contact_number: String,
    password: String,
    confirm_password: String,
    focused: Option<Field>,
    role: Role,
    roles: Vec<Role>,
}

impl RegistrationForm {
    pub fn new(actor_is_admin: bool) -> Self {
        let roles = available_roles(actor_is_admin);
        Self {
            full_name: String::new(),
            email: String::new(),
            contact_number: String::new(),
            password: String::new(),
            confirm_password: String::new(),
            focused: None,
            role: roles.first().copied().unwrap_or_default(),
            roles,
        }
    }

    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::FullName => &self.full_name,
            Field::Email => &self.email,
            Field::ContactNumber => &self.contact_number,
            Field::Password => &self.password,
            Field::ConfirmPassword => &self.confirm_password,
        }
    }

    fn value_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::FullName => &mut self.full_name,
            Field::Email => &mut self.email,
            Field::ContactNumber => &mut self.contact_number,
            Field::Password => &mut self.password,
            Field::ConfirmPassword => &mut self.confirm_password,
        }
    }

    /// Replaces a field's content and returns the fields whose live state
    /// has to be redrawn. Editing the password also affects the
    /// confirmation.
    pub fn set_field(
        &mut self,
        field: Field,
        value: impl Into<String>,
    ) -> Vec<(Field, FieldValidationState)> {
        *self.value_mut(field) = value.into();
        let mut touched = vec![field];
        if field == Field::Password {
            touched.push(Field::ConfirmPassword);
        }
        touched
            .into_iter()
            .map(|f| (f, self.field_state(f)))
            .collect()
    }

    pub fn focus(&mut self, field: Field) {
        self.focused = Some(field);
    }

    pub fn blur(&mut self) {
        self.focused = None;
    }

    pub fn focused(&self) -> Option<Field> {
        self.focused
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn select_role(&mut self, role: Role) -> Result<()> {
        if !self.roles.contains(&role) {
            return Err(Error::RoleNotOffered(role.to_string()));
        }
        self.role = role;
        Ok(())
    }

    /// Empties every field and puts the role back on the first option.
    pub fn clear(&mut self) {
        for field in Field::ALL {
            self.value_mut(field).clear();
        }
        self.focused = None;
        self.role = self.roles.first().copied().unwrap_or_default();
        tracing::info!("form cleared");
    }

    pub fn field_state(&self, field: Field) -> FieldValidationState {
        let raw = self.value(field);
        let value = if field.is_secret() { raw } else { raw.trim() };
        validate_field(
            field,
            value,
            self.focused == Some(field),
            &self.password,
        )
    }

    pub fn field_states(&self) -> Vec<(Field, FieldValidationState)> {
        Field::ALL
            .into_iter()
            .map(|f| (f, self.field_state(f)))
            .collect()
    }

    pub fn to_request(&self) -> RegistrationRequest {
        RegistrationRequest {
            full_name: self.full_name.trim().to_string(),
            email: self.email.trim().to_string(),
            contact_number: self.contact_number.trim().to_string(),
            password: self.password.clone(),
            confirm_password: self.confirm_password.clone(),
            role: self.role,
        }
    }
}
