use serde::Deserialize;

/// Body of `POST /api/users` and `PUT /api/users/{id}`.
///
/// Absent fields decode to their zero value so they fail [`UserInput::validate`]
/// rather than the decoder.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UserInput {
    pub name: String,
    pub email: String,
    pub age: i64,
}

impl UserInput {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.is_empty() || self.email.is_empty() || self.age <= 0 {
            return Err("name and email must not be empty and age must be greater than 0");
        }
        Ok(())
    }
}
