use colored::*;
use reshape_core::{
    TypeDescriptor,
    client::{ClientConnectError, DynamicCallError},
    prost_reflect::DynamicMessage,
    reflect::ReflectError,
    tonic::Status,
};
use std::fmt::Display;
use user_service::pb::User;

/// A wrapper struct for a formatted, colored string.
///
/// Implements `Display` so it can be printed directly.
pub struct FormattedString(pub String);

pub struct GenericError<T: Display>(pub &'static str, pub T);

/// A titled block of the demo walkthrough.
pub struct Section<T: Display>(pub &'static str, pub T);

/// A registry user, printed as JSON.
pub struct UserView(pub User);

/// A message descriptor as seen by the transformer, with the message it was derived from.
pub struct Described(pub String, pub TypeDescriptor);

impl std::fmt::Display for FormattedString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f)?;
        writeln!(f, "{}", self.0)?;
        Ok(())
    }
}

impl From<serde_json::Value> for FormattedString {
    fn from(value: serde_json::Value) -> Self {
        FormattedString(serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string()))
    }
}

impl From<String> for FormattedString {
    fn from(value: String) -> Self {
        FormattedString(value)
    }
}

impl From<UserView> for FormattedString {
    fn from(UserView(user): UserView) -> Self {
        let mut message = DynamicMessage::new(user_service::user_descriptor());
        let json = message
            .transcode_from(&user)
            .ok()
            .and_then(|()| serde_json::to_value(&message).ok());

        match json {
            Some(json) => FormattedString::from(json),
            None => FormattedString(format!("{user:#?}")),
        }
    }
}

impl From<Status> for FormattedString {
    fn from(status: Status) -> Self {
        FormattedString(format!(
            "{} code={:?} message={:?}",
            "gRPC Failed:".red().bold(),
            status.code(),
            status.message()
        ))
    }
}

impl From<DynamicCallError> for FormattedString {
    fn from(err: DynamicCallError) -> Self {
        FormattedString(format!("{}\n\n'{}'", "Call Failed:".red().bold(), err))
    }
}

impl From<ClientConnectError> for FormattedString {
    fn from(err: ClientConnectError) -> Self {
        FormattedString(format!("{}\n\n'{}'", "Connection Error:".red().bold(), err))
    }
}

impl From<ReflectError> for FormattedString {
    fn from(err: ReflectError) -> Self {
        FormattedString(format!(
            "{}\n\n'{}'",
            "Reflection Failed:".red().bold(),
            err
        ))
    }
}

impl<T: Display> From<GenericError<T>> for FormattedString {
    fn from(GenericError(msg, err): GenericError<T>) -> Self {
        FormattedString(format!("{}:\n\n'{}'", msg.red().bold(), err))
    }
}

impl<T: Display> From<Section<T>> for FormattedString {
    fn from(Section(title, body): Section<T>) -> Self {
        FormattedString(format!("{}\n{}", format!("== {title} ==").cyan().bold(), body))
    }
}

impl From<Described> for FormattedString {
    fn from(Described(name, descriptor): Described) -> Self {
        FormattedString(format!(
            "{} {}\n\n{}",
            "message".cyan(),
            name.green(),
            descriptor
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reshape_core::tonic::Code;

    #[test]
    fn test_status_mentions_code_and_message() {
        colored::control::set_override(false);

        let formatted = FormattedString::from(Status::new(Code::NotFound, "User 'Jane' not found"));

        assert_eq!(
            formatted.0,
            "gRPC Failed: code=NotFound message=\"User 'Jane' not found\""
        );
    }

    #[test]
    fn test_json_is_pretty_printed() {
        let formatted = FormattedString::from(serde_json::json!({ "name": "TARZAN" }));

        assert_eq!(formatted.0, "{\n  \"name\": \"TARZAN\"\n}");
        assert_eq!(formatted.to_string(), "\n{\n  \"name\": \"TARZAN\"\n}\n");
    }

    #[test]
    fn test_user_is_rendered_with_json_names() {
        let user = User {
            name: "Tarzan".to_string(),
            height_in_meters: 1.91,
            ..Default::default()
        };

        let formatted = FormattedString::from(UserView(user));

        assert!(formatted.0.contains("\"name\": \"Tarzan\""));
        assert!(formatted.0.contains("\"heightInMeters\": 1.91"));
    }

    #[test]
    fn test_described_lists_fields() {
        colored::control::set_override(false);

        let descriptor = TypeDescriptor::structure("Pet", [("name", TypeDescriptor::string())]);
        let formatted = FormattedString::from(Described("users.Pet".to_string(), descriptor));

        assert!(formatted.0.starts_with("message users.Pet\n\n"));
        assert!(formatted.0.contains("name: string"));
    }
}
