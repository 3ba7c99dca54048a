//! # Demo
//!
//! An offline tour of the registry types: building a `User`, editing it through its
//! dynamic form, enum and oneof variants, the binary and JSON encodings, keyed lookup
//! through a protobuf map and finally the transformer.
use crate::formatter::{Described, FormattedString, Section, UserView};
use anyhow::Context;
use prost::Message;
use reshape_core::prost_reflect::{DynamicMessage, Value as ProtoValue};
use reshape_core::reflect;
use user_service::pb::{Directory, Hobby, Pet, User, user::Contact};

const DIRECTORY_MESSAGE: &str = "users.Directory";

pub fn run() -> anyhow::Result<()> {
    let tarzan = tarzan();
    show("Typed user", UserView(tarzan.clone()));

    // Typed messages are plain structs; the dynamic form is edited by field name.
    let descriptor = user_service::user_descriptor();
    let mut dynamic = DynamicMessage::new(descriptor.clone());
    dynamic
        .transcode_from(&tarzan)
        .context("Failed to load the user into a dynamic message")?;
    dynamic.set_field_by_name("quote", ProtoValue::String("Me Tarzan, you Jane".to_string()));
    let edited: User = dynamic
        .transcode_to()
        .context("Failed to read the edited user back")?;
    show("Edited through reflection", UserView(edited.clone()));

    show("Variants", describe_variants(&edited));

    let bytes = edited.encode_to_vec();
    let decoded = User::decode(bytes.as_slice()).context("Failed to decode the user")?;
    anyhow::ensure!(decoded == edited, "Binary round trip changed the user");
    show(
        "Binary encoding",
        format!("{} bytes, decodes back to the same user", bytes.len()),
    );

    let json = serde_json::to_value(&dynamic).context("Failed to map the user to JSON")?;
    show("JSON encoding", FormattedString::from(json));

    let directory = Directory {
        users_by_name: [(edited.name.clone(), edited.clone())].into_iter().collect(),
    };
    let found = directory
        .users_by_name
        .get("Tarzan")
        .map(|user| format!("'Tarzan' -> {:?}", user.quote()))
        .unwrap_or_else(|| "'Tarzan' is not in the directory".to_string());
    show("Keyed lookup", found);

    let shape = reflect::describe_value(&dynamic)?;
    show(
        "Shape seen by the transformer",
        FormattedString::from(Described(descriptor.full_name().to_string(), shape)),
    );

    let shouted = reflect::transform_typed(&edited, &descriptor)?;
    show("Shouted user", UserView(shouted));

    let directory_descriptor = user_service::descriptor_pool()
        .get_message_by_name(DIRECTORY_MESSAGE)
        .with_context(|| format!("'{DIRECTORY_MESSAGE}' is missing from the schema"))?;
    let shouted = reflect::transform_typed(&directory, &directory_descriptor)?;
    let mut keys: Vec<_> = shouted.users_by_name.keys().cloned().collect();
    keys.sort();
    show("Shouted directory keys", format!("{keys:?}"));

    Ok(())
}

fn show(title: &'static str, body: impl Into<FormattedString>) {
    let FormattedString(body) = body.into();
    println!("{}", FormattedString::from(Section(title, body)));
}

fn describe_variants(user: &User) -> String {
    let contact = match &user.contact {
        Some(Contact::Email(email)) => format!("email({email})"),
        Some(Contact::Phone(phone)) => format!("phone(+{} {})", phone.country_code, phone.number),
        None => "none".to_string(),
    };

    format!(
        "favorite_hobby = {} (constant)\ncontact = {} (wrapper)",
        user.favorite_hobby().as_str_name(),
        contact
    )
}

fn tarzan() -> User {
    User {
        name: "Tarzan".to_string(),
        quote: Some("aAaA".to_string()),
        height_in_meters: 1.91,
        pets: vec![Pet {
            name: "Cheeta".to_string(),
            picture: "🐒".to_string(),
            age_in_years: Some(3.5),
        }],
        favorite_hobby: Hobby::Yodeling as i32,
        contact: Some(Contact::Email("tarzan@jungle.org".to_string())),
        created_at: Some(prost_types::Timestamp {
            seconds: 1_700_000_000,
            nanos: 0,
        }),
        avatar: vec![0x89, 0x50, 0x4e, 0x47],
        nicknames: [("jungle".to_string(), "King of the Apes".to_string())]
            .into_iter()
            .collect(),
        age: 30,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variants_name_hobby_and_contact() {
        let described = describe_variants(&tarzan());

        assert_eq!(
            described,
            "favorite_hobby = HOBBY_YODELING (constant)\ncontact = email(tarzan@jungle.org) (wrapper)"
        );
    }

    #[test]
    fn test_demo_runs_offline() {
        run().unwrap();
    }
}
